//! Built-in scan profiles.
//!
//! A [`ScanProfile`] is the full description of one kind of scan: which
//! ports to probe and which verifiers to run on them. The tables below are
//! the defaults; `--ports`, `--paths` and `--creds` replace them through
//! [`ProfileOptions`].

use std::sync::Arc;
use std::time::Duration;

use camprobe_common::models::Credential;

use crate::credentials::trials::HttpFormLogin;
use crate::credentials::{FormLoginAttempt, FormSpec, LoginMethod};
use crate::fingerprint::{
    BodyContains, ElementClass, ElementId, FingerprintRule, HeaderContains, MatchPolicy, RuleSet,
    SelectorPresent, TagPresent,
};
use crate::network::http::HttpClient;
use crate::vendors::{VendorTable, credential_list};
use crate::verifier::http::HttpFingerprintVerifier;
use crate::verifier::rtsp::RtspVerifier;
use crate::verifier::stream::HttpStreamVerifier;
use crate::verifier::{ProtocolVerifier, normalize_path};

pub const DEFAULT_PORTS: &[u16] = &[
    80, 443, 8080, 8443, 37777, 34567, 9001, 9002, 8899, 8000, 7001, 8091, 8999, 8086,
];

pub const COMMON_PORTS: &[u16] = &[
    80, 81, 82, 83, 84, 85, 88, 443, 8000, 8080, 8081, 8082, 8083, 8084, 8085, 8086, 8088, 9000,
    37777, 34567, 9001, 9002, 8899, 7001, 8091, 8999,
];

pub const RTSP_PORTS: &[u16] = &[554, 8554, 10554];

/// Login pages checked by the first-match identifier.
pub const LOGIN_PATHS: &[&str] = &["/doc/page/login.asp", "/"];

/// Pages checked by the scoring identifier.
pub const FINDER_PATHS: &[&str] = &[
    "/",
    "/doc/page/login.asp",
    "/ISAPI/Security/userCheck",
    "/login.asp",
    "/login.html",
    "/login",
    "/view/index.shtml",
    "/view/indexFrame.html",
    "/cgi-bin/webui",
    "/web/index.html",
    "/webadmin.html",
    "/doc/html/index.html",
    "/dvr/html",
    "/index.asp",
    "/index.htm",
    "/ipcam/index.asp",
    "/live/index.html",
    "/live.htm",
    "/camera",
];

/// Server and body markers of camera firmware.
const CAMERA_MARKERS: &[&str] = &[
    "Hikvision", "DVRDVS-Webs", "DNVRS-Webs", "App-webs", "WebServer", "Dahua", "DVR Components",
    "RTSP", "IPCamera", "Network Camera", "IPC", "NVR", "DVR", "Axis", "Sony", "Panasonic",
    "Samsung", "Bosch", "Pelco", "Avigilon", "Arecont", "ACTi", "Vivotek", "Mobotix", "Geovision",
    "Foscam", "D-Link", "Trendnet", "Ubiquiti", "Amcrest", "Reolink", "Lorex", "Swann", "Uniview",
    "Tiandy", "TVT", "Kedacom", "Sunell", "Milesight",
];

/// Element ids and classes typical of camera web interfaces.
const CAMERA_ELEMENTS: &[&str] = &[
    "login", "username", "password", "channel", "preview", "playback", "ptz", "stream", "camera",
    "nvr", "dvr", "ipcam", "videoin", "surveillance",
];

pub const DEFAULT_THRESHOLD: u32 = 4;

pub const STREAM_PATHS: &[&str] = &[
    "/onvif/device_service",
    "/onvif/media_service",
    "/onvif/snapshot",
    "/video.mjpg",
    "/video.cgi",
    "/mjpg/video.mjpg",
    "/cgi-bin/mjpg/video.cgi",
    "/axis-cgi/mjpg/video.cgi",
    "/nphMotionJpeg",
    "/live.mjpg",
    "/live/mjpeg",
    "/live/stream",
    "/live_stream",
    "/stream.mjpg",
    "/videostream.cgi",
    "/video/mjpg",
    "/video.mp4",
    "/live/main",
    "/live/sub",
    "/live/ch1",
    "/live/ch2",
    "/live.jpg",
    "/live.h264",
    "/live.mp4",
    "/live.flv",
    "/ISAPI/Streaming/channels/101/httpPreview",
    "/ISAPI/Streaming/channels/102/httpPreview",
    "/PSIA/Streaming/channels/1",
    "/PSIA/Streaming/channels/2",
    "/cgi-bin/snapshot.cgi",
    "/cgi-bin/mjpg/video.cgi?channel=1&subtype=1",
    "/cgi-bin/snapshot.cgi?channel=1",
    "/cgi-bin/snapshot.cgi?channel=2",
    "/axis-cgi/jpg/image.cgi",
    "/axis-cgi/mjpg/video.cgi?camera=1",
    "/view/viewer_index.shtml",
    "/control/faststream.jpg?stream=full",
    "/cgi-bin/faststream.jpg?stream=full",
    "/control/faststream.jpg?stream=preview",
    "/faststream.jpg",
    "/cgi-bin/viewer/video.jpg",
    "/cgi-bin/video.jpg",
    "/nphMotionJpeg?Resolution=640x480&Quality=Standard",
    "/cgi-bin/camera",
    "/SnapshotJPEG?Resolution=640x480",
    "/image/jpeg.cgi",
    "/image",
    "/oneshotimage.jpg",
    "/jpg/image.cgi",
    "/rtsp_tunnel",
    "/snap.jpg",
    "/jpg/image.jpg",
    "/video",
    "/mjpeg?res=half&doublescan=0&fps=15&compression=1",
    "/mjpeg?res=full&fps=0",
    "/image?res=half",
    "/PictureCatch.cgi",
    "/JPGStream.cgi",
    "/streaming/channels",
    "/videostream.asf",
    "/view/index.shtml",
    "/live/jpeg.cgi",
    "/mjpeg",
];

pub const RTSP_PATHS: &[&str] = &[
    "/onvif/device_service",
    "/onvif/media",
    "/onvif/live",
    "/h264_ulaw.sdp",
    "/h264.sdp",
    "/live",
    "/1",
    "/live/ch00_0",
    "/live/ch01_0",
    "/live/main",
    "/live/sub",
    "/11",
    "/12",
    "/media/video1",
    "/media/video2",
    "/profile1",
    "/profile2",
    "/stream1",
    "/stream2",
    "/Streaming/Channels/101",
    "/Streaming/Channels/102",
    "/h264/ch1/main/av_stream",
    "/h264/ch1/sub/av_stream",
    "/cam/realmonitor?channel=1&subtype=0",
    "/cam/realmonitor?channel=1&subtype=1",
    "/video1",
    "/video2",
    "/axis-media/media.amp",
    "/mpeg4/media.amp",
    "/axis-media/media.3gp",
    "/live.sdp",
    "/live1.sdp",
    "/live2.sdp",
    "/rtsp_tunnel",
    "/h264",
    "/MediaInput/h264",
    "/nphMpeg4/nil-640x480",
];

pub const AUTH_COMBINATIONS: &[(&str, &str)] = &[
    ("admin", "admin"),
    ("admin", ""),
    ("admin", "12345"),
    ("admin", "password"),
    ("root", "root"),
    ("admin", "123456"),
    ("admin", "9999"),
    ("admin", "camera"),
    ("admin", "1234"),
    ("admin", "system"),
    ("admin", "admin12345"),
    ("admin", "Admin12345"),
    ("admin", "hikvision"),
    ("admin", "hik12345"),
    ("888888", "888888"),
    ("admin", "dahua"),
    ("admin", "dh123456"),
    ("root", "pass"),
    ("admin", "axis2023"),
    ("root", "axis"),
    ("admin", "axis123"),
];

/// Usernames paired with a single `--password`.
pub const PASSWORD_USERNAMES: &[&str] = &["admin", "root", "888888"];

/// One configured kind of scan.
pub struct ScanProfile {
    pub name: &'static str,
    pub ports: Vec<u16>,
    pub verifiers: Vec<Box<dyn ProtocolVerifier>>,
}

/// User overrides applied on top of a built-in profile.
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub timeout: Duration,
    pub credentials: Option<Vec<Credential>>,
    pub paths: Option<Vec<String>>,
    pub ports: Option<Vec<u16>>,
    pub policy: MatchPolicy,
    pub password: Option<String>,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            credentials: None,
            paths: None,
            ports: None,
            policy: MatchPolicy::FirstMatch,
            password: None,
        }
    }
}

impl ProfileOptions {
    fn ports_or(&self, defaults: &[u16]) -> Vec<u16> {
        self.ports.clone().unwrap_or_else(|| defaults.to_vec())
    }

    fn paths_or(&self, defaults: &[&str]) -> Vec<String> {
        match &self.paths {
            Some(paths) => paths.iter().map(|path| normalize_path(path)).collect(),
            None => defaults.iter().map(|path| path.to_string()).collect(),
        }
    }

    fn vendor_table(&self) -> VendorTable {
        match &self.credentials {
            Some(credentials) => VendorTable::with_credentials(credentials.clone()),
            None => VendorTable::builtin(),
        }
    }
}

/// HTTP fingerprinting with default login checks.
pub fn identify(opts: &ProfileOptions) -> anyhow::Result<ScanProfile> {
    let client = HttpClient::new(opts.timeout)?;
    let forms = Arc::new(HttpFormLogin::new(client.clone()));
    identify_with(opts, client, forms)
}

/// [`identify`] with a caller supplied form login, e.g. a browser driver.
pub fn identify_with(
    opts: &ProfileOptions,
    client: HttpClient,
    forms: Arc<dyn FormLoginAttempt>,
) -> anyhow::Result<ScanProfile> {
    let (mut rules, paths, both_schemes) = match opts.policy {
        MatchPolicy::FirstMatch => (login_page_rules()?, opts.paths_or(LOGIN_PATHS), false),
        MatchPolicy::Score { threshold } => (scoring_rules(threshold)?, opts.paths_or(FINDER_PATHS), true),
    };

    if let Some(credentials) = &opts.credentials {
        for rule in rules.rules_mut().filter(|rule| rule.login.is_some()) {
            rule.credentials = credentials.clone();
        }
    }

    let ports = opts.ports_or(DEFAULT_PORTS);
    let verifier = HttpFingerprintVerifier::new(client, ports.clone(), paths, rules, forms)
        .both_schemes(both_schemes);

    Ok(ScanProfile {
        name: "identify",
        ports,
        verifiers: vec![Box::new(verifier)],
    })
}

/// RTSP streams only, with one shared credential list.
pub fn rtsp(opts: &ProfileOptions) -> ScanProfile {
    let credentials = match (&opts.password, &opts.credentials) {
        (Some(password), _) => PASSWORD_USERNAMES
            .iter()
            .map(|user| Credential::new(*user, password.as_str()))
            .collect(),
        (None, Some(credentials)) => credentials.clone(),
        (None, None) => credential_list(AUTH_COMBINATIONS),
    };

    let ports = opts.ports_or(RTSP_PORTS);
    let verifier = RtspVerifier::new(ports.clone(), opts.paths_or(RTSP_PATHS), opts.timeout, credentials);

    ScanProfile {
        name: "rtsp",
        ports,
        verifiers: vec![Box::new(verifier)],
    }
}

/// HTTP snapshot/MJPEG endpoints and RTSP streams, with vendor credentials.
///
/// `--ports` replaces the HTTP ports only; RTSP ports stay fixed.
pub fn streams(opts: &ProfileOptions) -> anyhow::Result<ScanProfile> {
    let client = HttpClient::new(opts.timeout)?;
    let vendors = Arc::new(opts.vendor_table());

    let http_ports = opts.ports_or(COMMON_PORTS);
    let http = HttpStreamVerifier::new(client, http_ports.clone(), opts.paths_or(STREAM_PATHS), vendors.clone());
    let rtsp = RtspVerifier::new(RTSP_PORTS.to_vec(), to_strings(RTSP_PATHS), opts.timeout, Vec::new())
        .with_vendors(vendors);

    let mut ports = http_ports;
    for port in RTSP_PORTS {
        if !ports.contains(port) {
            ports.push(*port);
        }
    }

    Ok(ScanProfile {
        name: "streams",
        ports,
        verifiers: vec![Box::new(http), Box::new(rtsp)],
    })
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn hikvision_form() -> anyhow::Result<LoginMethod> {
    Ok(LoginMethod::Form(FormSpec::new("username", "password", ".login-error")?))
}

fn legacy_form() -> anyhow::Result<LoginMethod> {
    Ok(LoginMethod::Form(FormSpec::new("UserName", "Password", "#ErrorMsg, .login-error")?))
}

/// Login pages recognised by a single element, checked in order. A match
/// without a login method is logged and never recorded.
fn login_page_rules() -> anyhow::Result<RuleSet> {
    let common = [("admin", "admin"), ("admin", "12345"), ("admin", "888888")];

    let rules = vec![
        FingerprintRule::new("hikvision_red_login_page")
            .signal(ElementClass::new("loginbg"), 1)
            .credentials(credential_list(&[("admin", "admin"), ("admin", "123456"), ("admin", "888888")]))
            .login(legacy_form()?),
        FingerprintRule::new("hikvision_default_login_page")
            .signal(ElementClass::new("login-part"), 1)
            .credentials(credential_list(&[
                ("admin", "admin"),
                ("admin", "123456"),
                ("admin", "12345"),
                ("admin", "hikvision"),
                ("admin", "admin123"),
            ]))
            .login(hikvision_form()?),
        FingerprintRule::new("hikvision_haikon_login_page")
            .signal(ElementClass::new("loginbar"), 1)
            .credentials(credential_list(&common))
            .login(legacy_form()?),
        FingerprintRule::new("sanetron_login_page")
            .signal(ElementClass::new("loginingtip"), 1)
            .credentials(credential_list(&common))
            .login(LoginMethod::HttpBasic {
                path: "/vb.htm".to_string(),
            }),
        FingerprintRule::new("dahua_xvr_login_page").signal(ElementId::new("image-1010-img"), 1),
    ];

    Ok(RuleSet::new(rules, MatchPolicy::FirstMatch))
}

/// A Hikvision rule ahead of a generic camera rule built from weighted
/// markers and interface elements.
fn scoring_rules(threshold: u32) -> anyhow::Result<RuleSet> {
    let hikvision = FingerprintRule::new("hikvision")
        .signal(ElementClass::new("login-part"), threshold)
        .signal(HeaderContains::new("DVRDVS-Webs"), 2)
        .signal(HeaderContains::new("App-webs"), 2)
        .signal(BodyContains::new("hikvision"), 1)
        .credentials(credential_list(&[
            ("admin", "12345"),
            ("admin", "123456"),
            ("admin", "hikvision"),
        ]))
        .login(hikvision_form()?);

    let mut generic = FingerprintRule::new("ip_camera");
    for marker in CAMERA_MARKERS {
        generic = generic
            .signal(HeaderContains::new(marker), 2)
            .signal(BodyContains::new(marker), 1);
    }
    for element in CAMERA_ELEMENTS {
        generic = generic
            .signal(ElementId::new(element), 2)
            .signal(ElementClass::new(element), 1);
    }
    generic = generic
        .signal(TagPresent::new("video"), 3)
        .signal(SelectorPresent::new("object[type=\"application/x-vlc-plugin\"]")?, 3);

    Ok(RuleSet::new(vec![hikvision, generic], MatchPolicy::Score { threshold }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
