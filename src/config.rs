//! Centralized runtime constants for the network speed monitor.
//!
//! All tunable intervals, names, and sizes are collected here so they can be
//! found and adjusted in a single place rather than scattered across modules.

/// Interval at which the sampler refreshes every monitored adapter (seconds).
pub const SAMPLE_INTERVAL_SECS: u64 = 1;

/// Interface instance names that denote the loopback pseudo-interface.
/// The first entry is the name the Windows "Network Interface" counter
/// category reports; the others are the Linux and BSD/macOS names.
pub const LOOPBACK_INTERFACE_NAMES: &[&str] = &["MS TCP Loopback interface", "lo", "lo0"];

/// Divisor for the kilobytes/sec view.
pub const BYTES_PER_KILOBYTE: f64 = 1024.0;

/// Number of tick reports buffered for slow subscribers before they lag.
pub const REPORT_CHANNEL_CAPACITY: usize = 16;

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "netspeed_lib=info,netspeed=info";

/// Returns true if `name` is the loopback pseudo-interface.
pub fn is_loopback(name: &str) -> bool {
    LOOPBACK_INTERFACE_NAMES.contains(&name)
}
