//! MCP smoke runner
//!
//! Drives a fixed sequence of round trips against a running MCP-style
//! service and prints every response:
//! 1. `GET /health` (status code and raw body)
//! 2. `GET /manifest` (pretty JSON)
//! 3. `POST /mcp` for `add`, `getSystemInfo`, `processText` and an unknown method
//!
//! Responses are printed as received; nothing is validated. The first
//! connection or decode fault aborts the run.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod render;
pub mod runner;

pub use client::SmokeClient;
pub use config::Config;
pub use error::SmokeError;
pub use runner::{plan, run, RunSummary};
