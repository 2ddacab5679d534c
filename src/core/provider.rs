//! Interface-statistics provider seam.
//!
//! The monitoring core only needs two things from the operating system: the
//! list of active interface instance names, and the raw cumulative value of a
//! byte counter bound to one of those names. [`CounterProvider`] captures that
//! contract; [`SysinfoProvider`] implements it on top of `sysinfo::Networks`.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use sysinfo::Networks;

use crate::error::MonitorError;

/// Which of an interface's two byte counters a handle reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    BytesReceived,
    BytesSent,
}

impl CounterKind {
    /// Counter display name, as the "Network Interface" category labels it.
    pub fn as_str(self) -> &'static str {
        match self {
            CounterKind::BytesReceived => "Bytes Received/sec",
            CounterKind::BytesSent => "Bytes Sent/sec",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A counter bound to one interface instance name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterHandle {
    pub instance: String,
    pub kind: CounterKind,
}

impl CounterHandle {
    pub fn new(instance: impl Into<String>, kind: CounterKind) -> Self {
        Self {
            instance: instance.into(),
            kind,
        }
    }

    /// The error reported when this handle's instance has disappeared.
    pub fn unavailable(&self) -> MonitorError {
        MonitorError::CounterUnavailable {
            adapter: self.instance.clone(),
            counter: self.kind.as_str().to_string(),
        }
    }
}

/// Source of interface names and raw cumulative byte counters.
pub trait CounterProvider: Send + Sync {
    /// Names of the currently active interface instances, in provider order.
    fn list_instance_names(&self) -> Result<Vec<String>, MonitorError>;

    /// Take a new snapshot of every counter. Samples read from the latest
    /// snapshot, so both counters of one adapter come from the same read.
    /// Providers that read live values need not override this.
    fn refresh(&self) -> Result<(), MonitorError> {
        Ok(())
    }

    /// Read a counter's raw cumulative value from the latest snapshot.
    fn sample(&self, handle: &CounterHandle) -> Result<i64, MonitorError>;
}

/// Provider backed by the `sysinfo` crate's per-interface totals.
pub struct SysinfoProvider {
    networks: Mutex<Networks>,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterProvider for SysinfoProvider {
    fn list_instance_names(&self) -> Result<Vec<String>, MonitorError> {
        let mut networks = self.networks.lock().unwrap_or_else(PoisonError::into_inner);
        networks.refresh_list();
        let mut names: Vec<String> = networks.list().keys().cloned().collect();
        // sysinfo keeps interfaces in a HashMap; sort for a stable order.
        names.sort();
        Ok(names)
    }

    fn refresh(&self) -> Result<(), MonitorError> {
        // refresh_list also drops interfaces that have gone away.
        self.networks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refresh_list();
        Ok(())
    }

    fn sample(&self, handle: &CounterHandle) -> Result<i64, MonitorError> {
        let networks = self.networks.lock().unwrap_or_else(PoisonError::into_inner);
        let data = networks
            .list()
            .get(&handle.instance)
            .ok_or_else(|| handle.unavailable())?;
        let raw = match handle.kind {
            CounterKind::BytesReceived => data.total_received(),
            CounterKind::BytesSent => data.total_transmitted(),
        };
        Ok(i64::try_from(raw).unwrap_or(i64::MAX))
    }
}
