pub mod filter;
pub mod scan;

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use camprobe_common::config::Config;
use camprobe_common::network::source::AddressSource;
use clap::{Args, Parser, Subcommand};

pub const FOUND_DEVICES: &str = "found_devices.txt";
pub const RTSP_STREAMS: &str = "rtsp_streams.txt";
pub const LIVE_STREAMS: &str = "live_streams.txt";
pub const HOST_LIST: &str = "ips.txt";

#[derive(Parser)]
#[command(name = "camprobe", version)]
#[command(about = "Finds IP cameras on networks you are authorised to audit and checks them for factory-default logins.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output: -q hides headers, -qq prints only the summary
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner line
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Do not listen for 'q' on the terminal
    #[arg(long, global = true)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fingerprint camera web interfaces and check their default logins
    #[command(alias = "i")]
    Identify(IdentifyArgs),
    /// Find HTTP and RTSP video streams, trying vendor default logins
    #[command(alias = "s")]
    Streams(ScanArgs),
    /// Find RTSP streams only, trying generic default logins
    #[command(alias = "r")]
    Rtsp(RtspArgs),
    /// Reduce a result file to a bare address list
    #[command(alias = "f")]
    Filter(FilterArgs),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// A single IPv4 address
    #[arg(long)]
    pub ip: Option<Ipv4Addr>,

    /// A subnet in CIDR notation, e.g. 192.168.1.0/24
    #[arg(long)]
    pub subnet: Option<String>,

    /// A file with one address, range, subnet or url per line
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl TargetArgs {
    pub fn source(&self) -> Option<AddressSource> {
        match (&self.ip, &self.subnet, &self.file) {
            (Some(ip), _, _) => Some(AddressSource::Single(*ip)),
            (_, Some(subnet), _) => Some(AddressSource::Subnet(subnet.clone())),
            (_, _, Some(file)) => Some(AddressSource::File(file.clone())),
            (None, None, None) => None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Addresses scanned at the same time
    #[arg(long, default_value_t = 50)]
    pub threads: usize,

    /// Seconds to wait for an HTTP or RTSP reply
    #[arg(long, default_value_t = 3)]
    pub timeout: u64,

    /// Seconds to wait for a TCP connect
    #[arg(long, default_value_t = 2)]
    pub probe_timeout: u64,

    /// Sockets open at the same time across all probes
    #[arg(long, default_value_t = 1000)]
    pub max_sockets: usize,

    /// Credentials tried at the same time per endpoint
    #[arg(long, default_value_t = 5)]
    pub credential_workers: usize,

    /// Paths checked at the same time per endpoint
    #[arg(long, default_value_t = 10)]
    pub path_workers: usize,

    /// File with one user:pass per line, replaces the built-in lists
    #[arg(long)]
    pub creds: Option<PathBuf>,

    /// File with one path per line, replaces the built-in paths
    #[arg(long)]
    pub paths: Option<PathBuf>,

    /// Comma separated ports, replaces the built-in ports
    #[arg(long, value_delimiter = ',')]
    pub ports: Option<Vec<u16>>,

    /// Discovery file, appended to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also append the address of every host with a discovery to this file
    #[arg(long)]
    pub hosts_output: Option<PathBuf>,
}

impl ScanArgs {
    pub fn config(&self, cli: &CommandLine) -> Config {
        Config {
            threads: self.threads.max(1),
            timeout: Duration::from_secs(self.timeout),
            probe_timeout: Duration::from_secs(self.probe_timeout),
            max_sockets: self.max_sockets.max(1),
            path_workers: self.path_workers.max(1),
            credential_workers: self.credential_workers.max(1),
            quiet: cli.quiet,
            no_banner: cli.no_banner,
            disable_input: cli.no_input,
            ..Config::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct IdentifyArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Identify by weighted markers instead of known login pages
    #[arg(long)]
    pub scoring: bool,

    /// Score needed to count a page as a camera
    #[arg(long, default_value_t = 4, requires = "scoring")]
    pub threshold: u32,
}

#[derive(Args, Debug, Clone)]
pub struct RtspArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Try only this password, with the usernames admin, root and 888888
    #[arg(long, conflicts_with = "creds")]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Raw result file to read
    pub input: PathBuf,

    /// Address list to append to
    #[arg(short, long, default_value = HOST_LIST)]
    pub output: PathBuf,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_consistent() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn exactly_one_target_is_required() {
        assert!(CommandLine::try_parse_from(["camprobe", "rtsp"]).is_err());
        assert!(
            CommandLine::try_parse_from([
                "camprobe", "rtsp", "--ip", "10.0.0.1", "--subnet", "10.0.0.0/24"
            ])
            .is_err()
        );
    }

    #[test]
    fn identify_flags_parse() {
        let cli = CommandLine::try_parse_from([
            "camprobe", "i", "--subnet", "10.0.0.0/24", "--scoring", "--threshold", "6",
            "--ports", "80,8080", "-q",
        ])
        .unwrap();

        let Commands::Identify(args) = &cli.command else {
            panic!("expected identify");
        };
        assert!(args.scoring);
        assert_eq!(args.threshold, 6);
        assert_eq!(args.scan.ports, Some(vec![80, 8080]));
        assert!(matches!(args.scan.target.source(), Some(AddressSource::Subnet(_))));

        let config = args.scan.config(&cli);
        assert_eq!(config.quiet, 1);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn empty_target_args_have_no_source() {
        let target = TargetArgs {
            ip: None,
            subnet: None,
            file: None,
        };
        assert!(target.source().is_none());
    }

    #[test]
    fn password_conflicts_with_creds() {
        let parsed = CommandLine::try_parse_from([
            "camprobe", "r", "--ip", "10.0.0.1", "--password", "x", "--creds", "creds.txt",
        ]);
        assert!(parsed.is_err());
    }
}
