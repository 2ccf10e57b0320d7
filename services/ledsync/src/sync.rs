//! Sync client: reconciles the cached panel state with the remote LED

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::api::{PanelApi, SetOutcome};
use crate::state::StateHandle;
use crate::view::View;

/// Outcome of a user-initiated write, as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The panel applied the change; carries the authoritative status
    Applied(bool),
    /// The panel refused the change; carries its error text
    Rejected(String),
    /// The panel could not be reached
    Unreachable,
    /// Another write is still in flight
    Busy,
}

/// Keeps the local state in agreement with the remote LED
///
/// All network failures are absorbed here: they degrade connectivity and
/// never change the cached LED status. The periodic poll is the only retry
/// mechanism.
pub struct SyncClient {
    api: PanelApi,
    state: StateHandle,
    view: Arc<dyn View>,
    poll_interval: Duration,
    // Stands in for the disabled toggle button: a second write while one is
    // in flight is reported busy instead of queued
    write_gate: Mutex<()>,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("api", &self.api)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl SyncClient {
    pub fn new(
        api: PanelApi,
        state: StateHandle,
        view: Arc<dyn View>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            api,
            state,
            view,
            poll_interval,
            write_gate: Mutex::new(()),
        }
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Read the authoritative status from the panel and reconcile
    pub async fn refresh(&self) {
        match self.api.status().await {
            Ok(led_on) => self.record_success(led_on).await,
            Err(e) => {
                tracing::debug!("Status poll failed: {}", e);
                self.record_failure().await;
            }
        }
    }

    /// Flip the LED to the negation of the cached status
    pub async fn toggle(&self) -> WriteOutcome {
        let Ok(_guard) = self.write_gate.try_lock() else {
            tracing::debug!("Write already in flight, ignoring toggle");
            return WriteOutcome::Busy;
        };

        let desired = !self.state.read().await.led_on;
        let outcome = self.write(desired).await;
        if let WriteOutcome::Rejected(message) = &outcome {
            self.view
                .alert(&format!("Failed to toggle LED: {}", message))
                .await;
        }
        outcome
    }

    /// Drive the LED to an explicit status
    pub async fn set(&self, desired: bool) -> WriteOutcome {
        let Ok(_guard) = self.write_gate.try_lock() else {
            tracing::debug!("Write already in flight, ignoring set");
            return WriteOutcome::Busy;
        };

        let outcome = self.write(desired).await;
        if let WriteOutcome::Rejected(message) = &outcome {
            let target = if desired { "on" } else { "off" };
            self.view
                .alert(&format!("Failed to set LED {}: {}", target, message))
                .await;
        }
        outcome
    }

    /// Poll the panel once at startup and then on every interval tick until
    /// cancelled. Polls are serialized; a slow exchange delays the next tick
    /// instead of overlapping it.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            self.refresh().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = cancel.cancelled() => {
                    tracing::debug!("Poll loop cancelled");
                    break;
                }
            }
        }
    }

    async fn write(&self, desired: bool) -> WriteOutcome {
        match self.api.set(desired).await {
            Ok(SetOutcome::Applied(led_on)) => {
                self.record_success(led_on).await;
                WriteOutcome::Applied(led_on)
            }
            Ok(SetOutcome::Rejected(message)) => WriteOutcome::Rejected(message),
            Err(e) => {
                tracing::debug!("Status write failed: {}", e);
                self.record_failure().await;
                WriteOutcome::Unreachable
            }
        }
    }

    async fn record_success(&self, led_on: bool) {
        let now_ms = current_epoch_ms();
        let (led_changed, connectivity_changed) =
            self.state.write().await.apply_success(led_on, now_ms);

        if led_changed {
            self.view.status(led_on, now_ms).await;
        }
        if connectivity_changed {
            self.view.connection(true).await;
        }
    }

    async fn record_failure(&self) {
        let (connectivity_changed, failures) = {
            let mut state = self.state.write().await;
            let changed = state.apply_failure();
            (changed, state.consecutive_failures)
        };

        if failures == 5 {
            tracing::warn!("{} consecutive failed exchanges with the panel", failures);
        }
        if connectivity_changed {
            self.view.connection(false).await;
        }
    }
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
