use camprobe_core::session::ScanProgress;
use colored::*;
use indicatif::ProgressStyle;
use tracing::span::EnteredSpan;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];
const TIP: &str = "You can press 'q' to finish early";

/// Progress bar of a running scan, drawn by the indicatif tracing layer.
pub struct ScanProgressBar {
    span: Span,
    _entered: EnteredSpan,
}

impl ScanProgressBar {
    pub fn start(total: usize, interactive: bool) -> Self {
        let span = info_span!("scan", indicatif.pb_show = true);
        span.pb_set_style(&style());
        span.pb_set_length(total as u64);
        if interactive {
            span.pb_set_message(&format!("{}", TIP.italic().white()));
        }

        let entered = span.clone().entered();
        Self {
            span,
            _entered: entered,
        }
    }

    /// Callback for the scan session, called from worker tasks.
    pub fn reporter(&self) -> impl Fn(ScanProgress) + Send + Sync + 'static {
        let span = self.span.clone();
        move |progress: ScanProgress| span.pb_set_position(progress.completed as u64)
    }
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} [{bar:32.green/white}] {pos}/{len} {elapsed} {msg}")
        .map(|style| style.tick_strings(TICKS).progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
