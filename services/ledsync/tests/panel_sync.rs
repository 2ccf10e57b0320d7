//! End-to-end tests against an in-process mock panel server

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use ledsync::api::PanelApi;
use ledsync::io::ReqwestHttpClient;
use ledsync::state::{new_state_handle, Connectivity};
use ledsync::sync::{SyncClient, WriteOutcome};
use ledsync::view::View;

/// Mock panel with injectable failure modes
#[derive(Clone, Default)]
struct PanelFixture {
    led: Arc<RwLock<bool>>,
    /// When set, writes are answered with `success: false` and this text
    reject_with: Arc<RwLock<Option<String>>>,
    /// When set, every request is answered with a 500
    fail: Arc<RwLock<bool>>,
}

async fn get_led(State(panel): State<PanelFixture>) -> (StatusCode, Json<Value>) {
    if *panel.fail.read().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "panel offline"})),
        );
    }
    (StatusCode::OK, Json(json!({"status": *panel.led.read().await})))
}

async fn post_led(
    State(panel): State<PanelFixture>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if *panel.fail.read().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "panel offline"})),
        );
    }
    if let Some(message) = panel.reject_with.read().await.clone() {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "error": message})),
        );
    }

    let desired = body["status"].as_bool().unwrap_or(false);
    *panel.led.write().await = desired;
    (StatusCode::OK, Json(json!({"success": true, "status": desired})))
}

async fn spawn_panel(panel: PanelFixture) -> String {
    let app = Router::new()
        .route("/api/led", get(get_led).post(post_led))
        .with_state(panel);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn sync_client(base_url: &str, poll_interval: Duration) -> (Arc<SyncClient>, Arc<RecordingView>) {
    let http = Arc::new(ReqwestHttpClient::default());
    let api = PanelApi::new(base_url, http);
    let view = Arc::new(RecordingView::default());
    let client = SyncClient::new(
        api,
        new_state_handle(),
        Arc::clone(&view) as Arc<dyn View>,
        poll_interval,
    );
    (Arc::new(client), view)
}

#[tokio::test]
async fn initial_sync_reports_off_and_connected() {
    let fixture = PanelFixture::default();
    let base_url = spawn_panel(fixture).await;
    let (client, view) = sync_client(&base_url, Duration::from_secs(5));

    client.refresh().await;

    let state = client.state().read().await;
    assert!(!state.led_on);
    assert!(state.connected());
    assert!(state.last_synced_epoch_ms.is_some());

    let events = view.recorded().await;
    assert_eq!(events, vec![Event::Status(false), Event::Connection(true)]);
}

#[tokio::test]
async fn toggle_turns_led_on() {
    let fixture = PanelFixture::default();
    let base_url = spawn_panel(fixture.clone()).await;
    let (client, view) = sync_client(&base_url, Duration::from_secs(5));

    client.refresh().await;
    let outcome = client.toggle().await;

    assert_eq!(outcome, WriteOutcome::Applied(true));
    assert!(*fixture.led.read().await);
    assert!(client.state().read().await.led_on);
    assert!(view.recorded().await.contains(&Event::Status(true)));
}

#[tokio::test]
async fn rejected_toggle_alerts_and_preserves_state() {
    let fixture = PanelFixture::default();
    *fixture.reject_with.write().await = Some("GPIO busy".to_string());
    let base_url = spawn_panel(fixture.clone()).await;
    let (client, view) = sync_client(&base_url, Duration::from_secs(5));

    client.refresh().await;
    let outcome = client.toggle().await;

    assert_eq!(outcome, WriteOutcome::Rejected("GPIO busy".to_string()));
    assert!(!*fixture.led.read().await);

    let state = client.state().read().await;
    assert!(!state.led_on);
    assert!(state.connected());

    let events = view.recorded().await;
    assert_eq!(
        events,
        vec![
            Event::Status(false),
            Event::Connection(true),
            Event::Alert("Failed to toggle LED: GPIO busy".to_string()),
        ]
    );
}

#[tokio::test]
async fn outage_flips_connectivity_and_recovery_restores_it() {
    let fixture = PanelFixture::default();
    *fixture.led.write().await = true;
    let base_url = spawn_panel(fixture.clone()).await;
    let (client, view) = sync_client(&base_url, Duration::from_secs(5));

    client.refresh().await;
    let synced_at = client.state().read().await.last_synced_epoch_ms;

    *fixture.fail.write().await = true;
    client.refresh().await;
    {
        let state = client.state().read().await;
        assert_eq!(state.connectivity, Connectivity::Disconnected);
        // A failed exchange never touches the cached status or its stamp
        assert!(state.led_on);
        assert_eq!(state.last_synced_epoch_ms, synced_at);
    }

    *fixture.fail.write().await = false;
    client.refresh().await;
    {
        let state = client.state().read().await;
        assert!(state.connected());
        assert!(state.led_on);
    }

    let events = view.recorded().await;
    assert_eq!(
        events,
        vec![
            Event::Status(true),
            Event::Connection(true),
            Event::Connection(false),
            Event::Connection(true),
        ]
    );
}

#[tokio::test]
async fn watch_loop_picks_up_external_changes() {
    let fixture = PanelFixture::default();
    let base_url = spawn_panel(fixture.clone()).await;
    let (client, view) = sync_client(&base_url, Duration::from_millis(50));

    let cancel = CancellationToken::new();
    let loop_handle = {
        let client = Arc::clone(&client);
        let cancel = cancel.clone();
        tokio::spawn(async move { client.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(80)).await;
    // Another client flips the LED behind our back
    *fixture.led.write().await = true;
    tokio::time::sleep(Duration::from_millis(150)).await;

    cancel.cancel();
    loop_handle.await.unwrap();

    assert!(client.state().read().await.led_on);
    let events = view.recorded().await;
    assert_eq!(
        events,
        vec![
            Event::Status(false),
            Event::Connection(true),
            Event::Status(true),
        ]
    );
}

/// Recording test double for the rendering surface
#[derive(Debug, Default)]
struct RecordingView {
    events: RwLock<Vec<Event>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Status(bool),
    Connection(bool),
    Alert(String),
}

impl RecordingView {
    async fn recorded(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }
}

#[async_trait::async_trait]
impl View for RecordingView {
    async fn status(&self, led_on: bool, _timestamp_epoch_ms: u64) {
        self.events.write().await.push(Event::Status(led_on));
    }

    async fn connection(&self, connected: bool) {
        self.events.write().await.push(Event::Connection(connected));
    }

    async fn alert(&self, message: &str) {
        self.events.write().await.push(Event::Alert(message.to_string()));
    }
}
