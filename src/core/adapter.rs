//! One network interface and its receive/send byte counters.
//!
//! An adapter keeps the previous cumulative sample of both counters and the
//! delta computed by the last refresh. All of that lives behind one mutex so a
//! reader always sees the receive/send pair from the same tick.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::config;
use crate::core::provider::{CounterHandle, CounterKind, CounterProvider};
use crate::error::MonitorError;

/// Counter values for a single adapter.
#[derive(Debug, Clone, Copy)]
struct AdapterCounters {
    prev_received: i64,
    prev_sent: i64,
    received_delta: i64,
    sent_delta: i64,
    interval_secs: f64,
}

impl Default for AdapterCounters {
    fn default() -> Self {
        Self {
            prev_received: 0,
            prev_sent: 0,
            received_delta: 0,
            sent_delta: 0,
            interval_secs: config::SAMPLE_INTERVAL_SECS as f64,
        }
    }
}

/// Snapshot of one adapter's speed, serializable for consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterSpeed {
    pub name: String,
    /// Bytes received between the last two samples. Negative after a counter reset.
    pub received_delta: i64,
    /// Bytes sent between the last two samples. Negative after a counter reset.
    pub sent_delta: i64,
    /// Download speed in bytes/sec.
    pub download_speed: f64,
    /// Upload speed in bytes/sec.
    pub upload_speed: f64,
}

impl AdapterSpeed {
    /// Download speed in kilobytes/sec.
    pub fn download_kbps(&self) -> f64 {
        self.download_speed / config::BYTES_PER_KILOBYTE
    }

    /// Upload speed in kilobytes/sec.
    pub fn upload_kbps(&self) -> f64 {
        self.upload_speed / config::BYTES_PER_KILOBYTE
    }
}

/// A network interface being (or available to be) monitored.
///
/// Created only by enumeration; lives for the rest of the process.
pub struct NetworkAdapter {
    name: String,
    received: CounterHandle,
    sent: CounterHandle,
    provider: Arc<dyn CounterProvider>,
    counters: Mutex<AdapterCounters>,
}

impl NetworkAdapter {
    pub(crate) fn new(name: impl Into<String>, provider: Arc<dyn CounterProvider>) -> Self {
        let name = name.into();
        Self {
            received: CounterHandle::new(name.clone(), CounterKind::BytesReceived),
            sent: CounterHandle::new(name.clone(), CounterKind::BytesSent),
            name,
            provider,
            counters: Mutex::new(AdapterCounters::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take one (received, sent) sample. Nothing is stored on failure.
    fn sample(&self) -> Result<(i64, i64), MonitorError> {
        let received = self.provider.sample(&self.received)?;
        let sent = self.provider.sample(&self.sent)?;
        Ok((received, sent))
    }

    /// Seed the previous values from a fresh sample without touching the deltas.
    ///
    /// Must run each time the adapter joins the monitored set so the first
    /// delta afterwards is not computed against zero or a stale session.
    pub fn initialize(&self) -> Result<(), MonitorError> {
        let (received, sent) = self.sample()?;
        let mut c = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        c.prev_received = received;
        c.prev_sent = sent;
        Ok(())
    }

    /// Refresh over the standard one-second interval.
    pub fn refresh(&self) -> Result<(), MonitorError> {
        self.refresh_over(Duration::from_secs(config::SAMPLE_INTERVAL_SECS))
    }

    /// Sample both counters, compute the deltas against the previous sample,
    /// and keep the new values as the next baseline.
    ///
    /// A counter that went backwards (reset, reconnect) yields a negative
    /// delta. It is passed through unclamped; consumers decide how to show it.
    pub fn refresh_over(&self, interval: Duration) -> Result<(), MonitorError> {
        let (received, sent) = self.sample()?;
        let mut c = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        c.received_delta = received - c.prev_received;
        c.sent_delta = sent - c.prev_sent;
        c.prev_received = received;
        c.prev_sent = sent;
        c.interval_secs = interval.as_secs_f64();
        Ok(())
    }

    /// Consistent snapshot of the last computed speeds.
    pub fn speed(&self) -> AdapterSpeed {
        let c = *self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let secs = if c.interval_secs > 0.0 { c.interval_secs } else { 1.0 };
        AdapterSpeed {
            name: self.name.clone(),
            received_delta: c.received_delta,
            sent_delta: c.sent_delta,
            download_speed: c.received_delta as f64 / secs,
            upload_speed: c.sent_delta as f64 / secs,
        }
    }
}

impl fmt::Display for NetworkAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for NetworkAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkAdapter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::fake::FakeProvider;

    fn adapter_with(received: i64, sent: i64) -> (Arc<FakeProvider>, NetworkAdapter) {
        let provider = Arc::new(FakeProvider::default());
        provider.set("Ethernet", received, sent);
        let adapter = NetworkAdapter::new("Ethernet", provider.clone());
        (provider, adapter)
    }

    #[test]
    fn test_initialize_then_refresh_without_change_is_zero() {
        let (_provider, adapter) = adapter_with(123_456, 7_890);
        adapter.initialize().unwrap();
        adapter.refresh().unwrap();
        let speed = adapter.speed();
        assert_eq!(speed.received_delta, 0);
        assert_eq!(speed.sent_delta, 0);
    }

    #[test]
    fn test_refresh_delta_is_exact_difference() {
        let (provider, adapter) = adapter_with(1000, 400);
        adapter.initialize().unwrap();
        provider.set("Ethernet", 4096, 1424);
        adapter.refresh().unwrap();

        let speed = adapter.speed();
        assert_eq!(speed.received_delta, 3096);
        assert_eq!(speed.sent_delta, 1024);
        assert_eq!(speed.download_speed, 3096.0);
        assert_eq!(speed.download_kbps(), 3096.0 / 1024.0);
        assert_eq!(speed.upload_kbps(), 1.0);
    }

    #[test]
    fn test_initialize_does_not_touch_deltas() {
        let (provider, adapter) = adapter_with(0, 0);
        adapter.initialize().unwrap();
        provider.set("Ethernet", 500, 50);
        adapter.refresh().unwrap();

        provider.set("Ethernet", 9000, 900);
        adapter.initialize().unwrap();
        let speed = adapter.speed();
        assert_eq!(speed.received_delta, 500);
        assert_eq!(speed.sent_delta, 50);

        adapter.refresh().unwrap();
        assert_eq!(adapter.speed().received_delta, 0);
    }

    #[test]
    fn test_counter_reset_passes_negative_delta_through() {
        let (provider, adapter) = adapter_with(1000, 0);
        adapter.initialize().unwrap();
        provider.set("Ethernet", 1500, 0);
        adapter.refresh().unwrap();
        assert_eq!(adapter.speed().received_delta, 500);

        provider.set("Ethernet", 1200, 0);
        adapter.refresh().unwrap();
        let speed = adapter.speed();
        assert_eq!(speed.received_delta, -300);
        assert_eq!(speed.download_speed, -300.0);
    }

    #[test]
    fn test_refresh_over_longer_interval_divides_by_elapsed_seconds() {
        let (provider, adapter) = adapter_with(0, 0);
        adapter.initialize().unwrap();
        provider.set("Ethernet", 4096, 2048);
        adapter.refresh_over(Duration::from_secs(2)).unwrap();

        let speed = adapter.speed();
        assert_eq!(speed.received_delta, 4096);
        assert_eq!(speed.download_speed, 2048.0);
        assert_eq!(speed.upload_speed, 1024.0);
        assert_eq!(speed.download_kbps(), 2.0);
    }

    #[test]
    fn test_refresh_on_unplugged_adapter_keeps_last_state() {
        let (provider, adapter) = adapter_with(0, 0);
        adapter.initialize().unwrap();
        provider.set("Ethernet", 2048, 0);
        adapter.refresh().unwrap();

        provider.unplug("Ethernet");
        let err = adapter.refresh().unwrap_err();
        assert_eq!(err.kind(), "CounterUnavailable");
        assert_eq!(adapter.speed().received_delta, 2048);
    }

    #[test]
    fn test_display_is_adapter_name() {
        let (_provider, adapter) = adapter_with(0, 0);
        assert_eq!(adapter.to_string(), "Ethernet");
    }

    #[test]
    fn test_speed_serializes_for_consumers() {
        let (_provider, adapter) = adapter_with(0, 0);
        let json = serde_json::to_value(adapter.speed()).unwrap();
        assert_eq!(json["name"], "Ethernet");
        assert_eq!(json["received_delta"], 0);
        assert_eq!(json["upload_speed"], 0.0);
    }
}
