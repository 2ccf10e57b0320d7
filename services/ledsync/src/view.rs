//! Rendering surface for panel state transitions

use async_trait::async_trait;
use chrono::TimeZone;

/// Projection of sync state onto a display surface
///
/// Implementations hold no business logic; the sync client decides what
/// changed and when to call these.
#[async_trait]
pub trait View: Send + Sync + std::fmt::Debug {
    /// The LED status after a successful exchange that changed it
    async fn status(&self, led_on: bool, timestamp_epoch_ms: u64);

    /// The connectivity flag after it flipped
    async fn connection(&self, connected: bool);

    /// A message that must reach the user immediately, e.g. the server
    /// refusing a write
    async fn alert(&self, message: &str);
}

/// Terminal renderer used by the CLI
#[derive(Debug, Default)]
pub struct ConsoleView;

#[async_trait]
impl View for ConsoleView {
    async fn status(&self, led_on: bool, timestamp_epoch_ms: u64) {
        let time = format_local_time(timestamp_epoch_ms);
        if led_on {
            println!("LED is ON  (updated {})", time);
        } else {
            println!("LED is OFF (updated {})", time);
        }
    }

    async fn connection(&self, connected: bool) {
        if connected {
            println!("Connected");
        } else {
            println!("Disconnected");
        }
    }

    async fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

fn format_local_time(epoch_ms: u64) -> String {
    chrono::Local
        .timestamp_millis_opt(epoch_ms as i64)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}
