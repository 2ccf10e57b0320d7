//! HTTP client abstraction for testability

use async_trait::async_trait;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
///
/// Carries optional HTTP Basic credentials; the panel server forces basic
/// auth on every route when so configured.
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    auth: Option<(String, String)>,
}

impl ReqwestHttpClient {
    pub fn new(auth: Option<(String, String)>) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((username, password)) => request.basic_auth(username, Some(password)),
            None => request,
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| crate::LedSyncError::Http(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::LedSyncError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse> {
        tracing::debug!("POST {}", url);
        let response = self
            .authorized(self.client.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| crate::LedSyncError::Http(format!("POST {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::LedSyncError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
