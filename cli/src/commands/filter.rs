use camprobe_common::lists;
use camprobe_common::network::source;
use camprobe_common::{success, warn};
use camprobe_core::sink::ResultSink;

use super::FilterArgs;

/// Appends the host of every line in `args.input` to `args.output`, once.
pub fn filter(args: &FilterArgs) -> anyhow::Result<usize> {
    let content = lists::read_input(&args.input)?;
    let sink = ResultSink::open(&args.output)?;

    let mut skipped = 0;
    for (line_no, line) in lists::clean_lines(&content) {
        match source::extract_host(line) {
            Some(addr) => {
                sink.record_line(&addr.to_string());
            }
            None => {
                warn!("{}:{line_no}: no IPv4 host found", args.input.display());
                skipped += 1;
            }
        }
    }

    let written = sink.len();
    success!(
        "{written} addresses written to {} ({skipped} lines skipped)",
        args.output.display()
    );
    Ok(written)
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

    #[test]
    fn raw_results_become_an_address_list() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("found_devices.txt");
        let output = dir.path().join("ips.txt");
        std::fs::write(
            &input,
            "http://192.168.1.64:80/doc/page/login.asp (Auth: admin:12345) [Vendor: hikvision]\n\
             rtsp://192.168.1.64:554/Streaming/Channels/101\n\
             10.0.0.7\n\
             garbage line\n",
        )
        .unwrap();

        let written = filter(&FilterArgs {
            input,
            output: output.clone(),
        })
        .unwrap();

        assert_eq!(written, 2);
        assert_eq!(std::fs::read_to_string(output).unwrap(), "192.168.1.64\n10.0.0.7\n");
    }
}
