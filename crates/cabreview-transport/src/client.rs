// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for gateway deliveries and dispatcher booking lookups.
//!
//! Provides [`HttpSender`], which turns an [`OutboundRequest`] into one HTTP
//! call. There is no retry: a failed request is logged and reported to the
//! caller as an empty body.

use std::time::Duration;

use async_trait::async_trait;
use cabreview_config::model::HttpConfig;
use cabreview_core::types::{AlternateService, HttpMethod, OutboundRequest};
use cabreview_core::{CabreviewError, Sender};
use reqwest::StatusCode;
use tracing::{debug, warn};

/// Body reported for any HTTP 200 from the Veezu service.
const VEEZU_ACCEPTED: &str = r#"{"success":"1"}"#;

/// Pooled HTTP client shared by every delivery.
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: reqwest::Client,
}

impl HttpSender {
    /// Creates a sender whose connect, idle, and overall timeouts are `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CabreviewError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(20)
            .build()
            .map_err(|e| CabreviewError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, CabreviewError> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }

    fn prepare(&self, request: &OutboundRequest) -> Result<reqwest::RequestBuilder, CabreviewError> {
        let mut builder = match request.method {
            HttpMethod::Get => {
                let mut url =
                    reqwest::Url::parse(request.url.trim()).map_err(|e| CabreviewError::Transport {
                        message: format!("invalid URL {:?}: {e}", request.url),
                        source: Some(Box::new(e)),
                    })?;
                if !request.form_params.is_empty() {
                    url.query_pairs_mut().extend_pairs(&request.form_params);
                }
                self.client.get(url)
            }
            HttpMethod::Post => {
                let body = match &request.json_body {
                    Some(json) => json.clone(),
                    None if request.is_json => String::new(),
                    None => serde_urlencoded::to_string(&request.form_params).map_err(|e| {
                        CabreviewError::Transport {
                            message: format!("failed to encode form body: {e}"),
                            source: Some(Box::new(e)),
                        }
                    })?,
                };
                self.client.post(request.url.trim()).body(body)
            }
        };

        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if !request.basic_user.is_empty() && !request.basic_pass.is_empty() {
            builder = builder.basic_auth(&request.basic_user, Some(&request.basic_pass));
        }
        Ok(builder)
    }

    /// Performs the request and returns the response text.
    ///
    /// Non-success statuses still return their body; the gateway verifier
    /// decides what it means.
    pub async fn execute(&self, request: &OutboundRequest) -> Result<String, CabreviewError> {
        let response = self
            .prepare(request)?
            .send()
            .await
            .map_err(|e| CabreviewError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(url = %request.url, method = %request.method, status = %status, "response received");

        if request.variant_hint == Some(AlternateService::Veezu) && status == StatusCode::OK {
            return Ok(VEEZU_ACCEPTED.to_string());
        }
        response.text().await.map_err(|e| CabreviewError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&self, request: &OutboundRequest) -> String {
        match self.execute(request).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %request.url, error = %e, "outbound request failed");
                String::new()
            }
        }
    }
}
