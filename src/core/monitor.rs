//! Sampling controller: owns the enumerated adapters, the monitored set, and
//! the Idle/Active state that gates the one-second tick.
//!
//! Every mutation of the monitored set, and every tick, runs under the same
//! mutex, so ticks never overlap each other or a start/stop. Tick results are
//! published on a broadcast channel for consumers on other threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::config;
use crate::core::adapter::{AdapterSpeed, NetworkAdapter};
use crate::core::enumerator;
use crate::core::monitored::MonitoredSet;
use crate::core::provider::CounterProvider;
use crate::error::MonitorError;

/// Whether the periodic tick is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ControllerState {
    /// Timer disabled.
    #[default]
    Idle,
    /// Timer enabled, fires every interval.
    Active,
}

/// Controller state plus a counter bumped on every switch to Active.
///
/// A stop and restart that both land before the sampler wakes show up as a
/// single watch change; the generation tells the sampler to restart its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Activation {
    pub(crate) state: ControllerState,
    pub(crate) generation: u64,
}

/// Result of one tick, published to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// 1-based tick sequence number.
    pub tick: u64,
    /// Speeds of every adapter still monitored after this tick.
    pub speeds: Vec<AdapterSpeed>,
    /// Adapters dropped this tick because their counters became unavailable.
    pub removed: Vec<String>,
}

/// Monitors network speed for the adapters installed on this machine.
pub struct NetworkMonitor {
    provider: Arc<dyn CounterProvider>,
    adapters: Vec<Arc<NetworkAdapter>>,
    monitored: Mutex<MonitoredSet>,
    state: watch::Sender<Activation>,
    reports: broadcast::Sender<TickReport>,
    interval: Duration,
    ticks: AtomicU64,
}

impl NetworkMonitor {
    /// Enumerate adapters from `provider` and build an Idle monitor over them.
    pub fn new(provider: Arc<dyn CounterProvider>) -> Result<Self, MonitorError> {
        let adapters = enumerator::enumerate(&provider)?;
        Ok(Self::with_adapters(
            provider,
            adapters,
            Duration::from_secs(config::SAMPLE_INTERVAL_SECS),
        ))
    }

    /// Build an Idle monitor over `adapters`, whose counters `provider` serves.
    pub fn with_adapters(
        provider: Arc<dyn CounterProvider>,
        adapters: Vec<Arc<NetworkAdapter>>,
        interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(Activation::default());
        let (reports, _) = broadcast::channel(config::REPORT_CHANNEL_CAPACITY);
        Self {
            provider,
            adapters,
            monitored: Mutex::new(MonitoredSet::new()),
            state,
            reports,
            interval,
            ticks: AtomicU64::new(0),
        }
    }

    /// Enumerated adapters, in enumeration order.
    pub fn adapters(&self) -> &[Arc<NetworkAdapter>] {
        &self.adapters
    }

    pub fn adapter(&self, name: &str) -> Option<Arc<NetworkAdapter>> {
        self.adapters.iter().find(|a| a.name() == name).cloned()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> ControllerState {
        self.state.borrow().state
    }

    pub fn is_monitored(&self, name: &str) -> bool {
        self.lock_monitored().contains(name)
    }

    pub fn monitored_names(&self) -> Vec<String> {
        self.lock_monitored().names()
    }

    /// Receive a [`TickReport`] after every tick.
    pub fn subscribe(&self) -> broadcast::Receiver<TickReport> {
        self.reports.subscribe()
    }

    pub(crate) fn watch_state(&self) -> watch::Receiver<Activation> {
        self.state.subscribe()
    }

    fn lock_monitored(&self) -> MutexGuard<'_, MonitoredSet> {
        self.monitored.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the provider for a fresh counter snapshot. A failure is logged and
    /// the adapters then read whatever the provider still holds.
    fn refresh_provider(&self) {
        if let Err(e) = self.provider.refresh() {
            tracing::warn!("Counter snapshot refresh failed: {e}");
        }
    }

    fn set_state(&self, next: ControllerState) {
        let changed = self.state.send_if_modified(|current| {
            if current.state == next {
                return false;
            }
            current.state = next;
            if next == ControllerState::Active {
                current.generation += 1;
            }
            true
        });
        if changed {
            tracing::info!("Sampling controller is now {next:?}");
        }
    }

    /// Monitor every enumerated adapter that is not monitored yet.
    ///
    /// Returns the number of adapters added. Fails with
    /// [`MonitorError::NoAdapters`] when enumeration found nothing; the
    /// controller then stays Idle. An adapter whose counters cannot be read is
    /// skipped with a warning.
    pub fn start_all(&self) -> Result<usize, MonitorError> {
        if self.adapters.is_empty() {
            tracing::warn!("No network adapters to monitor");
            return Err(MonitorError::NoAdapters);
        }

        let mut monitored = self.lock_monitored();
        self.refresh_provider();
        let mut added = 0;
        for adapter in &self.adapters {
            if monitored.contains(adapter.name()) {
                continue;
            }
            match adapter.initialize() {
                Ok(()) => {
                    monitored.insert(Arc::clone(adapter));
                    added += 1;
                }
                Err(e) => tracing::warn!("Skipping adapter {adapter}: {e}"),
            }
        }
        if !monitored.is_empty() {
            self.set_state(ControllerState::Active);
        }
        tracing::info!("Monitoring {} adapters ({added} newly started)", monitored.len());
        Ok(added)
    }

    /// Monitor `adapter`. Starting an adapter that is already monitored only
    /// makes sure the controller is Active.
    pub fn start(&self, adapter: &Arc<NetworkAdapter>) -> Result<(), MonitorError> {
        let mut monitored = self.lock_monitored();
        if !monitored.contains(adapter.name()) {
            self.refresh_provider();
            adapter.initialize()?;
            monitored.insert(Arc::clone(adapter));
            tracing::info!("Started monitoring {adapter}");
        }
        self.set_state(ControllerState::Active);
        Ok(())
    }

    pub fn start_by_name(&self, name: &str) -> Result<(), MonitorError> {
        let adapter = self
            .adapter(name)
            .ok_or_else(|| MonitorError::UnknownAdapter(name.to_string()))?;
        self.start(&adapter)
    }

    /// Stop monitoring `adapter`. Going Idle once nothing is left.
    pub fn stop(&self, adapter: &NetworkAdapter) {
        self.stop_by_name(adapter.name());
    }

    pub fn stop_by_name(&self, name: &str) {
        let mut monitored = self.lock_monitored();
        if !monitored.remove(name) {
            return;
        }
        tracing::info!("Stopped monitoring {name}");
        if monitored.is_empty() {
            self.set_state(ControllerState::Idle);
        }
    }

    /// Clear the monitored set and disable the tick.
    pub fn stop_all(&self) {
        let mut monitored = self.lock_monitored();
        monitored.clear();
        self.set_state(ControllerState::Idle);
    }

    /// Consistent speed snapshot of every monitored adapter.
    pub fn speeds(&self) -> Vec<AdapterSpeed> {
        self.lock_monitored().iter().map(|a| a.speed()).collect()
    }

    /// Run one tick: refresh every monitored adapter and publish the result.
    ///
    /// Returns `None` while Idle. An adapter whose counters have disappeared
    /// is dropped from the set and listed in [`TickReport::removed`]; the
    /// other adapters still refresh in the same tick.
    pub fn tick(&self) -> Option<TickReport> {
        let mut monitored = self.lock_monitored();
        if self.state() == ControllerState::Idle {
            return None;
        }

        self.refresh_provider();
        let mut removed = Vec::new();
        for adapter in monitored.iter() {
            if let Err(e) = adapter.refresh_over(self.interval) {
                tracing::warn!("Removing adapter {adapter} from monitoring: {e}");
                removed.push(adapter.name().to_string());
            }
        }
        for name in &removed {
            monitored.remove(name);
        }
        if monitored.is_empty() {
            self.set_state(ControllerState::Idle);
        }

        let report = TickReport {
            tick: self.ticks.fetch_add(1, Ordering::Relaxed) + 1,
            speeds: monitored.iter().map(|a| a.speed()).collect(),
            removed,
        };
        drop(monitored);

        tracing::debug!("Tick {}: refreshed {} adapters", report.tick, report.speeds.len());
        // Sending only fails when nobody is subscribed.
        let _ = self.reports.send(report.clone());
        Some(report)
    }
}
