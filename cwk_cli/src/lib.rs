#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! Wiring between the process boundary (stdin/stdout/exit code) and [`cwk_app::handle_request`].

mod args;

use serde_json::Value;

use cwk_model::request::Request;
use cwk_registry::Registry;

pub use args::Cli;

/// A failed request, carrying the `command` tag (when it could be determined) alongside the
/// underlying error, so the caller can build the `{"status":"error",...}` envelope.
pub struct Failure {
    pub command: Option<String>,
    pub error: cwk_app::Error,
}

/// The `command` tags [`Request`]'s internal tagging recognizes, kept in lockstep with its
/// `#[serde(tag = "command", rename_all = "snake_case")]` variant list.
const KNOWN_COMMANDS: &[&str] =
    &["generate_mnemonic", "validate_mnemonic", "get_keys_batch", "sign_transaction"];

/// Parse `input` as a single request document and dispatch it. The registry is (re)loaded once
/// per invocation, matching the worker's single-request lifecycle (§5).
pub fn run(input: &str) -> Result<Value, Failure> {
    let raw: Value = serde_json::from_str(input).map_err(|e| Failure {
        command: None,
        error: cwk_app::Error::InputParseError(e.to_string()),
    })?;
    let command = raw
        .get("command")
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    match command.as_deref() {
        Some(tag) if !KNOWN_COMMANDS.contains(&tag) => {
            return Err(Failure {
                command: command.clone(),
                error: cwk_app::Error::UnknownCommand(tag.to_string()),
            })
        }
        _ => {}
    }

    let registry = Registry::load().map_err(|e| Failure {
        command: command.clone(),
        error: cwk_app::Error::from(e),
    })?;

    let request: Request = serde_json::from_value(raw).map_err(|e| Failure {
        command: command.clone(),
        error: cwk_app::Error::InputParseError(e.to_string()),
    })?;

    cwk_app::handle_request(&registry, request).map_err(|error| Failure { command, error })
}
