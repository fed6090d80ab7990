//! Invocation of external helper tools speaking the single-line JSON protocol.
//!
//! Helper tools (the icon converter, the archive packager) report their
//! result as one JSON object on standard output. Tool-level failures come
//! back as structured `{error, errorCode}` fields inside that object, so the
//! response is parsed regardless of the exit status; output that cannot be
//! parsed at all is a [`Error::Tool`] carrying the raw output for diagnosis.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use tokio::process::Command;

/// Runs a helper tool and parses its single-line JSON response.
pub async fn run_json_tool<T>(tool: &str, command: &mut Command) -> Result<T>
where
    T: DeserializeOwned,
{
    let output = command.output().await.map_err(|error| Error::CommandFailed {
        command: tool.to_string(),
        error,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();

    serde_json::from_str(line).map_err(|error| {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Error::Tool {
            tool: tool.to_string(),
            error,
            output: format!("{stdout}{stderr}"),
        }
    })
}
