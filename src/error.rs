//! Unified error type for the monitoring core.
//!
//! `MonitorError` is returned by every fallible provider, adapter, and
//! controller operation. It serializes as `{ "kind": "...", "message": "..." }`
//! so a presentation layer can programmatically distinguish error categories.

use serde::ser::SerializeStruct;

/// Monitoring error.
///
/// Each variant maps to a distinct failure domain.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A counter handle refers to an interface that no longer exists
    /// (adapter removed or unplugged while monitored).
    #[error("counter '{counter}' unavailable for adapter '{adapter}'")]
    CounterUnavailable { adapter: String, counter: String },

    /// Enumeration produced no adapters, so monitoring cannot start.
    #[error("No network adapters found on this computer.")]
    NoAdapters,

    /// No enumerated adapter carries the requested name.
    #[error("unknown network adapter '{0}'")]
    UnknownAdapter(String),

    /// The statistics provider itself failed.
    #[error("{0}")]
    Provider(String),

    /// Invalid or missing user input.
    #[error("{0}")]
    InvalidInput(String),
}

impl MonitorError {
    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorError::CounterUnavailable { .. } => "CounterUnavailable",
            MonitorError::NoAdapters => "NoAdapters",
            MonitorError::UnknownAdapter(_) => "UnknownAdapter",
            MonitorError::Provider(_) => "Provider",
            MonitorError::InvalidInput(_) => "InvalidInput",
        }
    }
}

/// Custom Serialize: produces `{ "kind": "Variant", "message": "..." }`.
impl serde::Serialize for MonitorError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("MonitorError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}
