//! Core logic: adapter enumeration, counter sampling, speed calculation.
//!
//! - [`CounterProvider`] / [`SysinfoProvider`] — OS interface-statistics seam
//! - [`enumerate`] — one [`NetworkAdapter`] per non-loopback interface
//! - [`NetworkAdapter`] / [`AdapterSpeed`] — per-adapter delta speeds
//! - [`MonitoredSet`] — adapters receiving per-tick refreshes
//! - [`NetworkMonitor`] — start/stop subscription and the tick itself

pub mod adapter;
pub mod enumerator;
pub mod monitor;
pub mod monitored;
pub mod provider;

pub use adapter::{AdapterSpeed, NetworkAdapter};
pub use enumerator::enumerate;
pub use monitor::{ControllerState, NetworkMonitor, TickReport};
pub use monitored::MonitoredSet;
pub use provider::{CounterHandle, CounterKind, CounterProvider, SysinfoProvider};
