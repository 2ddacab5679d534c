pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod services;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::core::provider::{CounterProvider, SysinfoProvider};
use crate::core::{ControllerState, NetworkMonitor};
use crate::error::MonitorError;
use crate::services::Sampler;

pub use crate::core::{AdapterSpeed, NetworkAdapter, TickReport};

fn init_tracing() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC in netspeed: {info}");
        default_hook(info);
    }));

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Enumerate adapters, start monitoring, and print a line per tick until Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let options = cli::parse_args(std::env::args().skip(1))?;
    if options.help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    let provider: Arc<dyn CounterProvider> = Arc::new(SysinfoProvider::new());
    let monitor = Arc::new(NetworkMonitor::new(provider)?);

    if options.list {
        for adapter in monitor.adapters() {
            println!("{adapter}");
        }
        return Ok(());
    }

    if monitor.adapters().is_empty() {
        // Not fatal: report it and never start.
        println!("{}", MonitorError::NoAdapters);
        return Ok(());
    }

    let mut reports = monitor.subscribe();
    let sampler = Sampler::spawn(Arc::clone(&monitor));

    if options.adapters.is_empty() {
        monitor.start_all()?;
    } else {
        for name in &options.adapters {
            monitor.start_by_name(name)?;
        }
    }
    tracing::info!("Monitoring {}", monitor.monitored_names().join(", "));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
            received = reports.recv() => match received {
                Ok(report) => {
                    if options.json {
                        println!("{}", cli::format_report_json(&report)?);
                    } else {
                        println!("{}", cli::format_report_line(&report));
                    }
                    if monitor.state() == ControllerState::Idle {
                        tracing::warn!("No monitored adapters remain");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Output fell behind; skipped {skipped} ticks");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    monitor.stop_all();
    sampler.stop();
    Ok(())
}
