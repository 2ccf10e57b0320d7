//! JSON/HTTP client for the LED panel API

use std::sync::Arc;

use serde::Deserialize;

use crate::io::HttpClient;

/// Panel response for a status read
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: bool,
}

/// Panel response for a status write
#[derive(Debug, Deserialize)]
struct SetResponse {
    success: bool,
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

/// Result of a write request that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The server applied the change; carries the authoritative status
    Applied(bool),
    /// The server refused the change; carries its error text
    Rejected(String),
}

/// Client for the two-endpoint LED panel contract
///
/// `GET {base}/api/led` reads the current status, `POST {base}/api/led`
/// requests a new one. The server's response is authoritative in both
/// directions; callers never assume a write took effect.
pub struct PanelApi {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PanelApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PanelApi {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("Created PanelApi at {}", base_url);
        Self { base_url, http }
    }

    fn led_url(&self) -> String {
        format!("{}/api/led", self.base_url)
    }

    /// Read the current LED status
    pub async fn status(&self) -> crate::Result<bool> {
        let url = self.led_url();
        let response = self.http.get(&url).await?;

        if response.status != 200 {
            return Err(crate::LedSyncError::Api(format!(
                "status read returned {}",
                response.status
            )));
        }

        let parsed: StatusResponse = serde_json::from_str(&response.body)?;
        Ok(parsed.status)
    }

    /// Request a new LED status
    pub async fn set(&self, desired: bool) -> crate::Result<SetOutcome> {
        let url = self.led_url();
        let body = serde_json::json!({ "status": desired });
        let response = self.http.post_json(&url, &body).await?;

        if response.status != 200 {
            return Err(crate::LedSyncError::Api(format!(
                "status write returned {}",
                response.status
            )));
        }

        let parsed: SetResponse = serde_json::from_str(&response.body)?;
        if parsed.success {
            // The server reports what it actually did, which wins over what
            // was asked for
            Ok(SetOutcome::Applied(parsed.status.unwrap_or(desired)))
        } else {
            let message = parsed
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            tracing::debug!("Panel refused status write: {}", message);
            Ok(SetOutcome::Rejected(message))
        }
    }
}
