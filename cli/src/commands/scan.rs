use std::path::{Path, PathBuf};
use std::sync::Arc;

use camprobe_common::config::Config;
use camprobe_common::lists;
use camprobe_common::models::FoundDevice;
use camprobe_common::{success, warn};
use camprobe_core::fingerprint::MatchPolicy;
use camprobe_core::profiles::{self, ProfileOptions, ScanProfile};
use camprobe_core::scanner::{ScanSummary, Scanner};
use camprobe_core::session::ScanSession;
use camprobe_core::sink::ResultSink;
use colored::*;

use super::{CommandLine, IdentifyArgs, LIVE_STREAMS, FOUND_DEVICES, RTSP_STREAMS, RtspArgs, ScanArgs};
use crate::mprint;
use crate::terminal::input::InputHandle;
use crate::terminal::progress::ScanProgressBar;
use crate::terminal::{colors, format, print};

pub async fn identify(args: &IdentifyArgs, cli: &CommandLine) -> anyhow::Result<()> {
    let mut opts = options(&args.scan)?;
    if args.scoring {
        opts.policy = MatchPolicy::Score {
            threshold: args.threshold,
        };
    }
    let profile = profiles::identify(&opts)?;
    run(&args.scan, cli, profile, FOUND_DEVICES).await
}

pub async fn streams(args: &ScanArgs, cli: &CommandLine) -> anyhow::Result<()> {
    let opts = options(args)?;
    let profile = profiles::streams(&opts)?;
    run(args, cli, profile, LIVE_STREAMS).await
}

pub async fn rtsp(args: &RtspArgs, cli: &CommandLine) -> anyhow::Result<()> {
    let mut opts = options(&args.scan)?;
    opts.password = args.password.clone();
    let profile = profiles::rtsp(&opts);
    run(&args.scan, cli, profile, RTSP_STREAMS).await
}

fn options(args: &ScanArgs) -> anyhow::Result<ProfileOptions> {
    let credentials = match &args.creds {
        Some(path) => Some(lists::load_credentials(path)?),
        None => None,
    };
    let paths = match &args.paths {
        Some(path) => Some(lists::read_list(path)?),
        None => None,
    };

    if let (Some(path), Some(list)) = (&args.paths, &paths)
        && list.is_empty()
    {
        anyhow::bail!("{} contains no paths", path.display());
    }

    Ok(ProfileOptions {
        timeout: std::time::Duration::from_secs(args.timeout),
        credentials,
        paths,
        ports: args.ports.clone(),
        ..ProfileOptions::default()
    })
}

async fn run(args: &ScanArgs, cli: &CommandLine, profile: ScanProfile, default_output: &str) -> anyhow::Result<()> {
    let cfg: Config = args.config(cli);
    let Some(source) = args.target.source() else {
        anyhow::bail!("one of --ip, --subnet or --file is required");
    };
    let addresses = source.resolve()?;

    let output: PathBuf = args.output.clone().unwrap_or_else(|| PathBuf::from(default_output));
    let sink = ResultSink::open(&output)?;
    let hosts = args.hosts_output.as_ref().map(ResultSink::open).transpose()?;

    print_settings(&cfg, &profile, addresses.len(), &output);

    if addresses.is_empty() {
        warn!("No addresses to scan");
        scan_ends(&[], &ScanSummary::default(), &cfg, &output);
        return Ok(());
    }

    let interactive = !cfg.disable_input && std::io::IsTerminal::is_terminal(&std::io::stdin());
    let bar = ScanProgressBar::start(addresses.len(), interactive);

    let mut session = ScanSession::new(cfg.clone(), addresses, sink).on_progress(bar.reporter());
    if let Some(hosts) = hosts {
        session = session.with_hosts_output(hosts);
    }
    let session = Arc::new(session);

    let stop = session.stop_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });
    let input = if interactive {
        InputHandle::start(session.stop_handle())
    } else {
        None
    };

    let summary = Scanner::new(session.clone(), Arc::new(profile)).run().await;

    drop(input);
    ctrl_c.abort();
    drop(bar);

    if summary.interrupted {
        warn!(
            "Scan interrupted after {}/{} addresses, results so far are saved",
            summary.completed, summary.total
        );
    }

    let mut found = session.found();
    found.sort_by(|a, b| a.url.cmp(&b.url));
    scan_ends(&found, &summary, &cfg, &output);
    Ok(())
}

fn print_settings(cfg: &Config, profile: &ScanProfile, total: usize, output: &Path) {
    print::banner(cfg.no_banner, cfg.quiet);
    print::header(&format!("{} scan", profile.name), cfg.quiet);
    if cfg.quiet > 0 {
        return;
    }

    let ports = profile
        .ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<String>>()
        .join(",");

    print::aligned_lines(vec![
        ("Targets", total.to_string()),
        ("Ports", ports),
        ("Workers", cfg.threads.to_string()),
        ("Timeout", format!("{}s", cfg.timeout.as_secs())),
        ("Output", output.display().to_string()),
    ]);
}

fn scan_ends(found: &[FoundDevice], summary: &ScanSummary, cfg: &Config, output: &Path) {
    if found.is_empty() {
        if cfg.quiet < 2 {
            print::header("zero cameras detected", cfg.quiet);
            print::no_results();
        }
        print_summary(summary, cfg, output);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Discoveries", cfg.quiet);
    if cfg.quiet < 2 {
        for (idx, device) in found.iter().enumerate() {
            print::tree_head(idx, &device.url);
            print::as_tree_one_level(format::device_to_details(device));
            if idx + 1 != found.len() {
                mprint!();
            }
        }
    }
    print_summary(summary, cfg, output);
}

fn print_summary(summary: &ScanSummary, cfg: &Config, output: &Path) {
    let discoveries: ColoredString = format!("{} discoveries", summary.discoveries).bold().green();
    let output_line: ColoredString = format!(
        "Scan Complete: {discoveries} in {}",
        format::elapsed(summary.elapsed)
    )
    .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output_line.to_string());
            print::aligned_lines(vec![
                ("Scanned", format!("{}/{}", summary.completed, summary.total)),
                ("Unreachable", summary.unreachable.to_string()),
                ("Unverified", summary.unverified.to_string()),
                ("Locked", summary.locked.to_string()),
                ("Failed", summary.failed.to_string()),
                ("Saved to", output.display().to_string()),
            ]);
            print::end_of_program();
        }
        1 => {
            mprint!();
            success!("{output_line}");
        }
        _ => print::print(&output_line.to_string()),
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
