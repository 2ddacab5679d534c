//! Background sampler lifecycle.
//!
//! `Sampler` owns the one task that drives [`NetworkMonitor::tick`]. The task
//! sleeps while the controller is Idle and runs a non-overlapping interval
//! while it is Active, so a tick never re-enters itself. Every switch to
//! Active starts a fresh interval, even when a stop and restart happen
//! between two wakeups of the task.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::core::monitor::{Activation, ControllerState, NetworkMonitor};

/// Handle to the background tick task. Dropping it stops the task.
pub struct Sampler {
    task: JoinHandle<()>,
}

impl Sampler {
    /// Spawn the tick task on the current tokio runtime.
    pub fn spawn(monitor: Arc<NetworkMonitor>) -> Self {
        let state = monitor.watch_state();
        let task = tokio::spawn(run_sampler(monitor, state));
        tracing::info!("Sampler started");
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        tracing::debug!("Sampler dropped; stopping tick task");
        self.task.abort();
    }
}

async fn run_sampler(monitor: Arc<NetworkMonitor>, mut state: watch::Receiver<Activation>) {
    loop {
        // Wait for Active. A closed channel means the monitor is gone.
        let generation = {
            let Ok(activation) = state
                .wait_for(|a| a.state == ControllerState::Active)
                .await
            else {
                return;
            };
            activation.generation
        };

        let period = monitor.interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if monitor.tick().is_none() {
                        break;
                    }
                }
                changed = state.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let current = *state.borrow_and_update();
                    if current.state == ControllerState::Idle || current.generation != generation {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Sampler idle");
    }
}
