use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, SmokeError};
use crate::protocol::RequestEnvelope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub status: u16,
    pub body: String,
}

/// JSON body plus the status it arrived with.
#[derive(Debug, Clone)]
pub struct JsonReply {
    pub status: StatusCode,
    pub body: Value,
}

pub struct SmokeClient {
    http: reqwest::Client,
    base_url: String,
}

impl SmokeClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        // Loopback targets never go through HTTP(S)_PROXY
        if is_loopback(&config.base_url) {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(SmokeError::Client)?;

        Ok(SmokeClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /health`. Any status is accepted; the body is kept as raw text.
    pub async fn health(&self) -> Result<HealthReport> {
        let url = self.url("/health");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| SmokeError::Connection { url: url.clone(), source })?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|source| SmokeError::Connection { url, source })?;

        Ok(HealthReport { status, body })
    }

    /// `GET /manifest`.
    pub async fn manifest(&self) -> Result<JsonReply> {
        let url = self.url("/manifest");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| SmokeError::Connection { url: url.clone(), source })?;
        read_json(url, resp).await
    }

    /// `POST /mcp` with the envelope as JSON body.
    pub async fn call(&self, request: &RequestEnvelope) -> Result<JsonReply> {
        let url = self.url("/mcp");
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| SmokeError::Connection { url: url.clone(), source })?;
        read_json(url, resp).await
    }
}

fn is_loopback(base_url: &str) -> bool {
    let rest = base_url
        .strip_prefix("http://")
        .or_else(|| base_url.strip_prefix("https://"))
        .unwrap_or(base_url);
    let authority = rest.split('/').next().unwrap_or_default();
    let host = match authority.strip_prefix('[') {
        Some(v6) => v6.split(']').next().unwrap_or_default(),
        None => authority.split(':').next().unwrap_or_default(),
    };
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<std::net::IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
}

async fn read_json(url: String, resp: reqwest::Response) -> Result<JsonReply> {
    let status = resp.status();
    let text = match resp.text().await {
        Ok(text) => text,
        Err(source) => return Err(SmokeError::Connection { url, source }),
    };
    let body = serde_json::from_str(&text).map_err(|source| SmokeError::Decode { url, source })?;

    Ok(JsonReply { status, body })
}
