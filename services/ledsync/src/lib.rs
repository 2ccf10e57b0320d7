//! Ledsync - LED control panel synchronization client
//!
//! Polls a remote LED panel for its on/off status, mirrors it in a local
//! state cache, and applies user-requested changes. Transient network
//! failure degrades a connectivity flag only; the cached status is never
//! changed by anything but a successful server response.

pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod state;
pub mod sync;
pub mod view;

pub use config::{load_config, Config};
pub use error::{LedSyncError, Result};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::PanelApi;
use crate::io::ReqwestHttpClient;
use crate::sync::SyncClient;
use crate::view::{ConsoleView, View};

/// Build a sync client from configuration, rendering onto the given view
pub fn build_client(config: &Config, view: Arc<dyn View>) -> SyncClient {
    let auth = config
        .server
        .auth
        .as_ref()
        .map(|a| (a.username.clone(), a.password.clone()));
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(auth));
    let api = PanelApi::new(config.server.base_url(), http);
    let state = state::new_state_handle();

    SyncClient::new(
        api,
        state,
        view,
        Duration::from_secs(config.poll_interval_seconds),
    )
}

/// Run the watch mode: poll the panel until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let base_url = config.server.base_url();
    let client = build_client(&config, Arc::new(ConsoleView));
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    tracing::info!("Watching LED panel at {}", base_url);
    client.run(cancel).await;
    tracing::info!("Panel sync stopped");

    Ok(())
}
