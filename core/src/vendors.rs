//! Vendor detection for stream endpoints and vendor specific default logins.

use camprobe_common::models::Credential;

use crate::network::http::HttpReply;

struct VendorEntry {
    name: &'static str,
    patterns: &'static [&'static str],
    credentials: &'static [(&'static str, &'static str)],
}

const VENDORS: &[VendorEntry] = &[
    VendorEntry {
        name: "hikvision",
        patterns: &["/ISAPI/", "Hikvision", "/Streaming/Channels/", "webui"],
        credentials: &[
            ("admin", "12345"),
            ("admin", "admin12345"),
            ("admin", "Admin12345"),
            ("admin", "hikvision"),
            ("admin", "hik12345"),
        ],
    },
    VendorEntry {
        name: "dahua",
        patterns: &["cam/realmonitor", "cgi-bin/snapshot.cgi", "Dahua", "lechange"],
        credentials: &[
            ("admin", "admin"),
            ("admin", "Admin123"),
            ("888888", "888888"),
            ("admin", "dahua"),
            ("admin", "dh123456"),
        ],
    },
    VendorEntry {
        name: "axis",
        patterns: &["axis-cgi", "axis-media", "view/viewer", "axis"],
        credentials: &[
            ("root", "pass"),
            ("admin", "admin"),
            ("admin", "axis2023"),
            ("root", "axis"),
            ("admin", "axis123"),
        ],
    },
    VendorEntry {
        name: "mobotix",
        patterns: &["control/faststream", "mobotix", "MxPEG"],
        credentials: &[
            ("admin", "meinsm"),
            ("admin", "admin"),
            ("admin", "mobotix"),
            ("admin", "mx123"),
            ("service", "meinsm"),
        ],
    },
    VendorEntry {
        name: "vivotek",
        patterns: &["viewer/video", "vivotek", "live.sdp"],
        credentials: &[
            ("root", "root"),
            ("admin", "admin"),
            ("vivotek", "vivotek"),
            ("admin", "vivo123"),
            ("root", "vivo1234"),
        ],
    },
    VendorEntry {
        name: "panasonic",
        patterns: &["nphMotionJpeg", "panasonic", "i-pro"],
        credentials: &[
            ("admin", "12345"),
            ("admin", "admin"),
            ("pana", "pana"),
            ("admin", "panasonic"),
            ("service", "service"),
        ],
    },
    VendorEntry {
        name: "sony",
        patterns: &["image/jpeg.cgi", "sony", "snc"],
        credentials: &[
            ("admin", "admin"),
            ("root", "sony"),
            ("admin", "sony1234"),
            ("admin", "sony123"),
            ("service", "service"),
        ],
    },
    VendorEntry {
        name: "bosch",
        patterns: &["rtsp_tunnel", "bosch", "rcp"],
        credentials: &[
            ("service", "service"),
            ("admin", "admin"),
            ("live", "live"),
            ("admin", "bosch"),
            ("service", "bosch123"),
        ],
    },
    VendorEntry {
        name: "arecont",
        patterns: &["mjpeg?res=", "arecont", "av_stream"],
        credentials: &[
            ("admin", "admin"),
            ("arecont", "arecont"),
            ("admin", "arecont123"),
            ("admin", "are123"),
            ("service", "arecont"),
        ],
    },
    VendorEntry {
        name: "geovision",
        patterns: &["PictureCatch", "geovision", "JPGStream"],
        credentials: &[
            ("admin", "admin"),
            ("supervisor", "supervisor"),
            ("admin", "geo123"),
            ("admin", "geovision"),
            ("service", "geo1234"),
        ],
    },
];

const GENERAL_CREDENTIALS: &[(&str, &str)] = &[
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
];

pub fn credential_list(pairs: &[(&str, &str)]) -> Vec<Credential> {
    pairs
        .iter()
        .map(|(user, pass)| Credential::new(*user, *pass))
        .collect()
}

/// Vendor patterns plus the credentials to try for each vendor.
#[derive(Debug, Clone)]
pub struct VendorTable {
    override_credentials: Option<Vec<Credential>>,
}

impl Default for VendorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VendorTable {
    pub fn builtin() -> Self {
        Self {
            override_credentials: None,
        }
    }

    /// Replaces every vendor list, and the general one, with `credentials`.
    pub fn with_credentials(credentials: Vec<Credential>) -> Self {
        Self {
            override_credentials: Some(credentials),
        }
    }

    /// Vendor named by the url alone.
    pub fn detect_url(&self, url: &str) -> Option<&'static str> {
        let url = url.to_lowercase();
        VENDORS
            .iter()
            .find(|vendor| contains_any(&url, vendor.patterns))
            .map(|vendor| vendor.name)
    }

    /// Checks url, `Server` header, body and the other headers, vendor by
    /// vendor in table order.
    pub fn detect(&self, reply: &HttpReply) -> Option<&'static str> {
        let url = reply.url.to_lowercase();
        let server = reply.header("server").unwrap_or_default().to_lowercase();
        let body = reply.text().to_lowercase();
        let headers: Vec<String> = reply
            .headers
            .iter()
            .map(|(_, value)| value.to_lowercase())
            .collect();

        VENDORS
            .iter()
            .find(|vendor| {
                contains_any(&url, vendor.patterns)
                    || contains_any(&server, vendor.patterns)
                    || contains_any(&body, vendor.patterns)
                    || headers.iter().any(|value| contains_any(value, vendor.patterns))
            })
            .map(|vendor| vendor.name)
    }

    /// Vendor defaults first, then the general list, without repeats.
    pub fn credentials_for(&self, vendor: Option<&str>) -> Vec<Credential> {
        if let Some(credentials) = &self.override_credentials {
            return credentials.clone();
        }

        let specific = vendor
            .and_then(|name| VENDORS.iter().find(|entry| entry.name == name))
            .map(|entry| entry.credentials)
            .unwrap_or_default();

        let mut credentials: Vec<Credential> = Vec::new();
        for credential in credential_list(specific)
            .into_iter()
            .chain(credential_list(GENERAL_CREDENTIALS))
        {
            if !credentials.contains(&credential) {
                credentials.push(credential);
            }
        }
        credentials
    }
}

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns
        .iter()
        .any(|pattern| haystack.contains(&pattern.to_lowercase()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
