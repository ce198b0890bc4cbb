use anyhow::{bail, Context, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// `None` leaves reqwest's default in place, which never times out.
    pub request_timeout_seconds: Option<u64>,
    /// Value for the envelope's `jsonrpc` field; omitted from the wire when unset.
    pub jsonrpc: Option<String>,
    pub include_initialize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_seconds: None,
            jsonrpc: None,
            include_initialize: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let base_url = normalize_base_url(
            &var("MCP_SMOKE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;

        let request_timeout_seconds = match var("MCP_SMOKE_REQUEST_TIMEOUT") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .context("MCP_SMOKE_REQUEST_TIMEOUT must be a number of seconds")?;
                if secs == 0 {
                    bail!("MCP_SMOKE_REQUEST_TIMEOUT must be greater than zero");
                }
                Some(secs)
            }
            None => None,
        };

        let jsonrpc = var("MCP_SMOKE_JSONRPC").map(|s| s.trim().to_string());

        let include_initialize = match var("MCP_SMOKE_INITIALIZE") {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("MCP_SMOKE_INITIALIZE must be a boolean, got '{}'", raw))?,
            None => false,
        };

        Ok(Config {
            base_url,
            request_timeout_seconds,
            jsonrpc,
            include_initialize,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!(
            "Invalid MCP_SMOKE_BASE_URL: '{}'. Expected an http:// or https:// URL",
            raw
        );
    }
    Ok(url.to_string())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
