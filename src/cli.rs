//! Argument parsing and report formatting for the `netspeed` binary.
//!
//! Pure functions, unit-testable without a runtime or a real network stack.

use crate::core::monitor::TickReport;
use crate::error::MonitorError;

pub const USAGE: &str = "\
Usage: netspeed [--list] [--json] [ADAPTER ...]

Samples per-adapter byte counters once per second and prints upload and
download speeds until Ctrl-C.

  ADAPTER   monitor only the named adapters (default: all adapters)
  --list    print the enumerated adapter names and exit
  --json    print one JSON object per tick
  -h, --help  show this help";

/// Parsed command line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliOptions {
    pub list: bool,
    pub json: bool,
    pub help: bool,
    pub adapters: Vec<String>,
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<CliOptions, MonitorError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    for arg in args {
        match arg.as_str() {
            "--list" => options.list = true,
            "--json" => options.json = true,
            "-h" | "--help" => options.help = true,
            flag if flag.starts_with('-') => {
                return Err(MonitorError::InvalidInput(format!("unknown option '{flag}'")));
            }
            _ => {
                if !options.adapters.contains(&arg) {
                    options.adapters.push(arg);
                }
            }
        }
    }
    Ok(options)
}

/// Format a speed value in a compact human-readable form.
///
/// Negative speeds (counter resets) keep their sign.
pub fn format_speed_compact(bps: f64) -> String {
    let magnitude = bps.abs();
    if magnitude < 1024.0 {
        format!("{:.0} B/s", bps)
    } else if magnitude < 1024.0 * 1024.0 {
        format!("{:.1} KB/s", bps / 1024.0)
    } else {
        format!("{:.2} MB/s", bps / (1024.0 * 1024.0))
    }
}

/// One human-readable line per tick.
pub fn format_report_line(report: &TickReport) -> String {
    let mut parts: Vec<String> = report
        .speeds
        .iter()
        .map(|s| {
            format!(
                "{}: \u{2193}{} \u{2191}{}",
                s.name,
                format_speed_compact(s.download_speed),
                format_speed_compact(s.upload_speed)
            )
        })
        .collect();
    for name in &report.removed {
        parts.push(format!("{name}: removed"));
    }
    format!("[{:>4}] {}", report.tick, parts.join(" | "))
}

pub fn format_report_json(report: &TickReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adapter::AdapterSpeed;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn speed(name: &str, down: i64, up: i64) -> AdapterSpeed {
        AdapterSpeed {
            name: name.to_string(),
            received_delta: down,
            sent_delta: up,
            download_speed: down as f64,
            upload_speed: up as f64,
        }
    }

    #[test]
    fn test_parse_args_defaults() {
        assert_eq!(parse_args(args(&[])).unwrap(), CliOptions::default());
    }

    #[test]
    fn test_parse_args_flags_and_adapters() {
        let options = parse_args(args(&["--json", "Ethernet", "Wi-Fi", "Ethernet"])).unwrap();
        assert!(options.json);
        assert!(!options.list);
        assert_eq!(options.adapters, vec!["Ethernet", "Wi-Fi"]);
    }

    #[test]
    fn test_parse_args_unknown_flag() {
        let err = parse_args(args(&["--verbose"])).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
        assert!(err.to_string().contains("--verbose"));
    }

    #[test]
    fn test_format_speed_compact_bytes() {
        assert_eq!(format_speed_compact(0.0), "0 B/s");
        assert_eq!(format_speed_compact(512.0), "512 B/s");
        assert_eq!(format_speed_compact(1023.0), "1023 B/s");
    }

    #[test]
    fn test_format_speed_compact_kilobytes() {
        assert_eq!(format_speed_compact(1024.0), "1.0 KB/s");
        assert_eq!(format_speed_compact(1536.0), "1.5 KB/s");
    }

    #[test]
    fn test_format_speed_compact_megabytes() {
        assert_eq!(format_speed_compact(1048576.0), "1.00 MB/s");
        assert_eq!(format_speed_compact(2621440.0), "2.50 MB/s");
    }

    #[test]
    fn test_format_speed_compact_negative_keeps_sign() {
        assert_eq!(format_speed_compact(-300.0), "-300 B/s");
        assert_eq!(format_speed_compact(-2048.0), "-2.0 KB/s");
    }

    #[test]
    fn test_format_report_line() {
        let report = TickReport {
            tick: 7,
            speeds: vec![speed("Ethernet", 1536, 0), speed("Wi-Fi", 10, 20)],
            removed: vec!["USB".to_string()],
        };
        assert_eq!(
            format_report_line(&report),
            "[   7] Ethernet: \u{2193}1.5 KB/s \u{2191}0 B/s | Wi-Fi: \u{2193}10 B/s \u{2191}20 B/s | USB: removed"
        );
    }

    #[test]
    fn test_format_report_json() {
        let report = TickReport {
            tick: 1,
            speeds: vec![speed("Ethernet", 500, -300)],
            removed: vec![],
        };
        let json: serde_json::Value =
            serde_json::from_str(&format_report_json(&report).unwrap()).unwrap();
        assert_eq!(json["tick"], 1);
        assert_eq!(json["speeds"][0]["name"], "Ethernet");
        assert_eq!(json["speeds"][0]["sent_delta"], -300);
        assert!(json["removed"].as_array().unwrap().is_empty());
    }
}
