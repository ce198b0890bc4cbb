#[derive(Debug, thiserror::Error)]
pub enum SmokeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl SmokeError {
    pub fn is_connection(&self) -> bool {
        matches!(self, SmokeError::Connection { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, SmokeError::Decode { .. })
    }
}

pub type Result<T, E = SmokeError> = std::result::Result<T, E>;
