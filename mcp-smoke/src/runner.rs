use std::io::Write;
use std::time::Instant;

use serde_json::json;

use crate::client::{JsonReply, SmokeClient};
use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Outcome, RequestEnvelope, ResponseView};
use crate::render::{self, Escape};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Health,
    Manifest,
    Call(RequestEnvelope),
}

#[derive(Debug, Clone)]
pub struct Step {
    pub name: &'static str,
    pub heading: &'static str,
    pub action: Action,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub steps_completed: usize,
    /// Dispatch calls whose response carried an error shape.
    pub error_responses: usize,
}

/// The fixed sequence of round trips. `initialize` is only included on request.
pub fn plan(config: &Config) -> Vec<Step> {
    let rpc = config.jsonrpc.as_deref();
    let mut steps = vec![
        Step {
            name: "health",
            heading: "Health check",
            action: Action::Health,
        },
        Step {
            name: "manifest",
            heading: "Service manifest",
            action: Action::Manifest,
        },
    ];

    if config.include_initialize {
        steps.push(Step {
            name: "initialize",
            heading: "Testing initialize",
            action: Action::Call(
                RequestEnvelope::new("0", "initialize")
                    .with_jsonrpc(rpc)
                    .param("protocolVersion", PROTOCOL_VERSION)
                    .param(
                        "clientInfo",
                        json!({"name": "mcp-smoke", "version": env!("CARGO_PKG_VERSION")}),
                    ),
            ),
        });
    }

    steps.extend([
        Step {
            name: "add",
            heading: "Testing add capability",
            action: Action::Call(
                RequestEnvelope::new("1", "add")
                    .with_jsonrpc(rpc)
                    .param("a", 5)
                    .param("b", 3.5),
            ),
        },
        Step {
            name: "system_info",
            heading: "Testing system info capability",
            action: Action::Call(RequestEnvelope::new("2", "getSystemInfo").with_jsonrpc(rpc)),
        },
        Step {
            name: "process_text",
            heading: "Testing text processing capability",
            action: Action::Call(
                RequestEnvelope::new("3", "processText")
                    .with_jsonrpc(rpc)
                    .param("text", "Hello MCP Protocol!"),
            ),
        },
        Step {
            name: "unknown_method",
            heading: "Testing error request",
            action: Action::Call(RequestEnvelope::new("4", "unknownMethod").with_jsonrpc(rpc)),
        },
    ]);

    steps
}

/// Execute `steps` in order, writing the report to `out`.
///
/// The first fault aborts the run; nothing for later steps is written.
pub async fn run<W: Write>(client: &SmokeClient, steps: &[Step], out: &mut W) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for step in steps {
        let started = Instant::now();

        match &step.action {
            Action::Health => {
                let report = client.health().await?;
                writeln!(out, "{}: {} - {}", step.heading, report.status, report.body)?;
                tracing::info!(
                    step = step.name,
                    status = report.status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Health checked"
                );
            }
            Action::Manifest => {
                let reply = client.manifest().await?;
                write_section(out, step.heading, &reply, Escape::None)?;
                let capabilities = reply
                    .body
                    .get("capabilities")
                    .and_then(|c| c.as_array())
                    .map(|c| c.len());
                tracing::info!(
                    step = step.name,
                    status = reply.status.as_u16(),
                    capabilities = ?capabilities,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Manifest fetched"
                );
                warn_on_status(step, &reply);
            }
            Action::Call(request) => {
                let reply = client.call(request).await?;
                write_section(out, step.heading, &reply, Escape::NonAscii)?;
                if log_dispatch(step, request, &reply, started) == Outcome::Error {
                    summary.error_responses += 1;
                }
            }
        }

        out.flush()?;
        summary.steps_completed += 1;
    }

    Ok(summary)
}

/// Manifests print non-ASCII text as-is; dispatch responses escape it.
fn write_section<W: Write>(
    out: &mut W,
    heading: &str,
    reply: &JsonReply,
    escape: Escape,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}:", heading)?;
    render::write_json(out, &reply.body, escape)
}

fn log_dispatch(step: &Step, request: &RequestEnvelope, reply: &JsonReply, started: Instant) -> Outcome {
    let view = ResponseView::from_value(&reply.body);
    let outcome = view.outcome();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Outcome::Error => tracing::info!(
            step = step.name,
            method = %request.method,
            status = reply.status.as_u16(),
            code = ?view.error_code(),
            error_message = view.error_message().unwrap_or_default(),
            elapsed_ms,
            "Dispatch returned an error"
        ),
        _ => tracing::info!(
            step = step.name,
            method = %request.method,
            status = reply.status.as_u16(),
            outcome = ?outcome,
            elapsed_ms,
            "Dispatch completed"
        ),
    }

    if view.echoes(&request.id) == Some(false) {
        tracing::warn!(
            step = step.name,
            request_id = %request.id,
            response_id = ?view.id,
            "Response id does not echo request id"
        );
    }
    warn_on_status(step, reply);

    outcome
}

fn warn_on_status(step: &Step, reply: &JsonReply) {
    if !reply.status.is_success() {
        tracing::warn!(
            step = step.name,
            status = reply.status.as_u16(),
            "Non-success HTTP status"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methods(steps: &[Step]) -> Vec<&str> {
        steps
            .iter()
            .filter_map(|s| match &s.action {
                Action::Call(req) => Some(req.method.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_default_plan_order() {
        let steps = plan(&Config::default());
        let names: Vec<_> = steps.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["health", "manifest", "add", "system_info", "process_text", "unknown_method"]
        );
        assert_eq!(
            methods(&steps),
            ["add", "getSystemInfo", "processText", "unknownMethod"]
        );
    }

    #[test]
    fn test_default_plan_bodies() {
        let steps = plan(&Config::default());
        let bodies: Vec<_> = steps
            .iter()
            .filter_map(|s| match &s.action {
                Action::Call(req) => Some(serde_json::to_value(req).unwrap()),
                _ => None,
            })
            .collect();

        assert_eq!(
            bodies,
            vec![
                json!({"id": "1", "method": "add", "params": {"a": 5, "b": 3.5}}),
                json!({"id": "2", "method": "getSystemInfo", "params": {}}),
                json!({"id": "3", "method": "processText", "params": {"text": "Hello MCP Protocol!"}}),
                json!({"id": "4", "method": "unknownMethod", "params": {}}),
            ]
        );
    }

    #[test]
    fn test_initialize_step_inserted_after_manifest() {
        let config = Config {
            include_initialize: true,
            jsonrpc: Some("2.0".to_string()),
            ..Config::default()
        };
        let steps = plan(&config);
        assert_eq!(steps.len(), 7);
        assert_eq!(steps[2].name, "initialize");

        let Action::Call(init) = &steps[2].action else {
            panic!("initialize must be a dispatch call");
        };
        assert_eq!(init.params["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(init.params["clientInfo"]["name"], "mcp-smoke");

        // jsonrpc applies to every call once configured
        for step in &steps {
            if let Action::Call(req) = &step.action {
                assert_eq!(req.jsonrpc.as_deref(), Some("2.0"));
            }
        }
    }
}
