//! Discovers installed network interfaces.

use std::sync::Arc;

use crate::config;
use crate::core::adapter::NetworkAdapter;
use crate::core::provider::CounterProvider;
use crate::error::MonitorError;

/// Build one adapter per active interface, in provider order, skipping loopback.
///
/// An empty result is not an error here; callers report it.
pub fn enumerate(
    provider: &Arc<dyn CounterProvider>,
) -> Result<Vec<Arc<NetworkAdapter>>, MonitorError> {
    let adapters: Vec<Arc<NetworkAdapter>> = provider
        .list_instance_names()?
        .into_iter()
        .filter(|name| !config::is_loopback(name))
        .map(|name| Arc::new(NetworkAdapter::new(name, Arc::clone(provider))))
        .collect();

    tracing::debug!("Enumerated {} network adapters", adapters.len());
    Ok(adapters)
}
