//! Archive container collaborator.
//!
//! The container codec itself lives in an external tool; this module owns
//! only its configuration and invocation contract. The pipeline needs two
//! operations from the collaborator: building a container from a staged file
//! tree (honoring unpack exceptions, which remain loose files beside the
//! container), and a "locate path, report exists + is-regular-file" query
//! used by the post-packaging sanity check.
//!
//! [`ArchivePackager`] is the seam; [`AsarTool`] is the process-backed
//! implementation speaking the single-line JSON protocol.

use crate::{
    error::{Error, Result},
    options::{AsarOptions, CompressionLevel},
    util::tool::run_json_tool,
    BoxFuture,
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Default name of the archive container inside the resources directory.
pub const DEFAULT_ARCHIVE_NAME: &str = "app.asar";

/// Result of locating a path inside a container.
#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArchiveEntry {
    /// The path exists inside the container.
    pub exists: bool,
    /// The path is a regular file (not a directory or link).
    pub is_file: bool,
}

/// Integrity metadata reported by the archive packager.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveIntegrity {
    /// Digest algorithm, e.g. `SHA256`.
    pub algorithm: String,
    /// Hex-encoded digest of the container.
    pub hash: String,
}

/// Invocation contract of the archive container collaborator.
pub trait ArchivePackager: Send + Sync {
    /// Builds a container at `destination` from the staged tree.
    ///
    /// Files matching `unpack_patterns` stay as loose files beside the
    /// container so they remain independently locatable at runtime.
    fn pack<'a>(
        &'a self,
        stage_dir: &'a Path,
        destination: &'a Path,
        options: &'a AsarOptions,
        unpack_patterns: &'a [String],
        compression: CompressionLevel,
    ) -> BoxFuture<'a, Result<ArchiveIntegrity>>;

    /// Locates `path` inside the container at `archive`.
    fn stat<'a>(&'a self, archive: &'a Path, path: &'a str) -> BoxFuture<'a, Result<ArchiveEntry>>;
}

/// Process-backed archive packager.
///
/// Invokes the external `app-archiver` helper; override the executable with
/// the `APP_PACKAGER_ASAR_TOOL` environment variable.
pub struct AsarTool {
    executable: PathBuf,
}

impl AsarTool {
    /// Creates an invoker for a specific executable.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Resolves the helper from the environment or the search path.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var("APP_PACKAGER_ASAR_TOOL") {
            return Ok(Self::new(path));
        }
        let executable = which::which("app-archiver").map_err(|_| {
            Error::configuration(
                "app-archiver was not found in PATH. Install it or point \
                 APP_PACKAGER_ASAR_TOOL at the executable",
            )
        })?;
        Ok(Self::new(executable))
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackResponse {
    integrity: Option<ArchiveIntegrity>,
    error: Option<String>,
    error_code: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatResponse {
    exists: Option<bool>,
    is_file: Option<bool>,
    error: Option<String>,
    error_code: Option<String>,
}

fn tool_failure(error: Option<String>, error_code: Option<String>) -> Error {
    let message = error.unwrap_or_else(|| "archive packager reported an error".to_string());
    match error_code {
        Some(code) => Error::configuration(format!("{message} (code: {code})")),
        None => Error::configuration(message),
    }
}

impl ArchivePackager for AsarTool {
    fn pack<'a>(
        &'a self,
        stage_dir: &'a Path,
        destination: &'a Path,
        options: &'a AsarOptions,
        unpack_patterns: &'a [String],
        compression: CompressionLevel,
    ) -> BoxFuture<'a, Result<ArchiveIntegrity>> {
        Box::pin(async move {
            let mut command = Command::new(&self.executable);
            command
                .arg("pack")
                .arg("--stage")
                .arg(stage_dir)
                .arg("--out")
                .arg(destination)
                .arg("--compression")
                .arg(match compression {
                    CompressionLevel::Store => "store",
                    CompressionLevel::Normal => "normal",
                    CompressionLevel::Maximum => "maximum",
                });
            for pattern in unpack_patterns {
                command.arg("--unpack").arg(pattern);
            }
            if let Some(ordering) = &options.ordering {
                command.arg("--ordering").arg(ordering);
            }
            if options.external_allowed {
                command.arg("--external-allowed");
            }
            if !options.smart_unpack {
                command.arg("--no-smart-unpack");
            }

            log::info!("packing {} into {}", stage_dir.display(), destination.display());
            let response: PackResponse =
                run_json_tool("app-archiver", &mut command).await?;
            if response.error.is_some() || response.error_code.is_some() {
                return Err(tool_failure(response.error, response.error_code));
            }
            response.integrity.ok_or_else(|| {
                Error::configuration("archive packager returned no integrity metadata")
            })
        })
    }

    fn stat<'a>(&'a self, archive: &'a Path, path: &'a str) -> BoxFuture<'a, Result<ArchiveEntry>> {
        Box::pin(async move {
            let mut command = Command::new(&self.executable);
            command
                .arg("stat")
                .arg("--archive")
                .arg(archive)
                .arg("--path")
                .arg(path);

            let response: StatResponse = run_json_tool("app-archiver", &mut command).await?;
            if response.error.is_some() || response.error_code.is_some() {
                return Err(tool_failure(response.error, response.error_code));
            }
            Ok(ArchiveEntry {
                exists: response.exists.unwrap_or(false),
                is_file: response.is_file.unwrap_or(false),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_carries_error_code() {
        let err = tool_failure(Some("icon not found".into()), Some("ERR_ICON".into()));
        assert_eq!(err.to_string(), "icon not found (code: ERR_ICON)");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_stat_response_parses_camel_case() {
        let response: StatResponse =
            serde_json::from_str(r#"{"exists": true, "isFile": true}"#).unwrap();
        assert_eq!(response.exists, Some(true));
        assert_eq!(response.is_file, Some(true));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_pack_response_parses_integrity() {
        let response: PackResponse =
            serde_json::from_str(r#"{"integrity": {"algorithm": "SHA256", "hash": "ab"}}"#)
                .unwrap();
        let integrity = response.integrity.unwrap();
        assert_eq!(integrity.algorithm, "SHA256");
        assert_eq!(integrity.hash, "ab");
        assert!(response.error_code.is_none());
    }
}
