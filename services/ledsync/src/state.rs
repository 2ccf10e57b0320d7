//! Cached panel state shared between the sync loop and command surfaces

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Connectivity to the panel server as observed by the most recent exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// No exchange has completed yet
    Unknown,
    Connected,
    Disconnected,
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Unknown => write!(f, "Unknown"),
            Connectivity::Connected => write!(f, "Connected"),
            Connectivity::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Locally cached view of the remote LED
///
/// `led_on` mirrors the most recent *successful* server response and nothing
/// else; failed exchanges touch connectivity and the failure counter only.
#[derive(Debug)]
pub struct PanelState {
    pub led_on: bool,
    pub connectivity: Connectivity,
    pub last_synced_epoch_ms: Option<u64>,
    pub consecutive_failures: u32,
}

impl PanelState {
    pub fn new() -> Self {
        Self {
            led_on: false,
            connectivity: Connectivity::Unknown,
            last_synced_epoch_ms: None,
            consecutive_failures: 0,
        }
    }

    /// Record a successful exchange carrying the authoritative LED status.
    /// Returns `(led_changed, connectivity_changed)`; the first successful
    /// sync counts as a change so the initial state gets rendered.
    pub fn apply_success(&mut self, led_on: bool, now_ms: u64) -> (bool, bool) {
        let led_changed = self.led_on != led_on || self.last_synced_epoch_ms.is_none();
        let connectivity_changed = self.connectivity != Connectivity::Connected;

        self.led_on = led_on;
        self.connectivity = Connectivity::Connected;
        self.last_synced_epoch_ms = Some(now_ms);
        self.consecutive_failures = 0;

        (led_changed, connectivity_changed)
    }

    /// Record a failed exchange. Returns true when the connectivity flag
    /// flipped to disconnected.
    pub fn apply_failure(&mut self) -> bool {
        let connectivity_changed = self.connectivity != Connectivity::Disconnected;
        self.connectivity = Connectivity::Disconnected;
        self.consecutive_failures += 1;
        connectivity_changed
    }

    pub fn connected(&self) -> bool {
        self.connectivity == Connectivity::Connected
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<PanelState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(PanelState::new()))
}
