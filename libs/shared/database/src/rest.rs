use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::RemoteError;

/// JSON client for the clinic backend. Every request carries the configured timeout.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RestClient {
    pub fn new(config: &AppConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn url_for(&self, path: &str) -> String {
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!("{}{}{}", self.base_url, separator, path)
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response, RemoteError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            let message = if error_text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                error_text
            };

            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Sends a request whose response must be a JSON document.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_optional(method, path, body)
            .await?
            .ok_or_else(|| RemoteError::Decode(format!("empty response body from {}", path)))
    }

    /// Like [`request`](Self::request), but an empty or non-JSON body yields `None`.
    pub async fn request_optional<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, RemoteError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, body).await?;

        if !has_json_body(response.headers()) {
            return Ok(None);
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| RemoteError::Decode(format!("{} (from {})", e, path)))
    }

    /// Sends a request and discards whatever the backend answers.
    pub async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), RemoteError>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body).await.map(|_| ())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            error!("Request timed out after {:?}", self.timeout);
            RemoteError::Timeout { after: self.timeout }
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            error!("Request failed: {}", err);
            RemoteError::Network(err.to_string())
        }
    }
}

fn has_json_body(headers: &HeaderMap) -> bool {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    let is_empty = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);

    is_json && !is_empty
}
