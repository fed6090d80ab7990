//! Icon resolution and conversion.
//!
//! Rasterization and format conversion live in an external converter tool;
//! this module owns the fallback search order and the invocation contract.
//! The converter is called as
//! `icon --format <fmt> --root <build-resources> --root <project> --out <dir> [--input <path>]*`
//! and answers with a single-line JSON object
//! `{icons?: [{file, size}], error?, errorCode?}`.

use crate::{
    error::{Error, Result},
    util::{fs::first_existing, tool::run_json_tool},
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// A resolved icon file with its pixel size.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct IconInfo {
    /// Path of the converted icon file.
    pub file: PathBuf,
    /// Pixel size of the (square) icon.
    pub size: u32,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResponse {
    icons: Option<Vec<IconInfo>>,
    error: Option<String>,
    error_code: Option<String>,
}

/// Resolves icon assets for one platform packager.
pub struct IconResolver {
    executable: PathBuf,
    build_resources_dir: PathBuf,
    project_dir: PathBuf,
}

impl IconResolver {
    /// Creates a resolver rooted at the build-resources and project dirs.
    pub fn new(
        executable: impl Into<PathBuf>,
        build_resources_dir: impl Into<PathBuf>,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            build_resources_dir: build_resources_dir.into(),
            project_dir: project_dir.into(),
        }
    }

    /// Resolves the converter executable from the environment or the search
    /// path.
    pub fn from_env(
        build_resources_dir: impl Into<PathBuf>,
        project_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let executable = match std::env::var("APP_PACKAGER_ICON_TOOL") {
            Ok(path) => PathBuf::from(path),
            Err(_) => which::which("icon-converter").map_err(|_| {
                Error::configuration(
                    "icon-converter was not found in PATH. Install it or point \
                     APP_PACKAGER_ICON_TOOL at the executable",
                )
            })?,
        };
        Ok(Self::new(executable, build_resources_dir, project_dir))
    }

    /// Resolves icons for `output_format`, converting as needed.
    ///
    /// Candidate sources are tried in a fixed order: the explicitly
    /// configured icon, then conventionally named resource files. When no
    /// candidate exists at all, packaging proceeds with the runtime's bundled
    /// default icon and a warning; an empty list signals exactly that.
    pub async fn resolve(
        &self,
        explicit: Option<&Path>,
        output_format: &str,
        out_dir: &Path,
    ) -> Result<Vec<IconInfo>> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(explicit) = explicit {
            candidates.push(if explicit.is_absolute() {
                explicit.to_path_buf()
            } else {
                self.project_dir.join(explicit)
            });
        }
        for name in candidate_names(output_format) {
            if let Some(found) = first_existing([
                self.build_resources_dir.join(name),
                self.project_dir.join(name),
            ])
            .await
            {
                candidates.push(found);
            }
        }

        if candidates.is_empty() {
            log::warn!(
                "no icon configured and no conventional icon file found, \
                 the default runtime icon will be used"
            );
            return Ok(Vec::new());
        }

        self.convert(&candidates, output_format, out_dir).await
    }

    async fn convert(
        &self,
        inputs: &[PathBuf],
        output_format: &str,
        out_dir: &Path,
    ) -> Result<Vec<IconInfo>> {
        let mut command = Command::new(&self.executable);
        command
            .arg("icon")
            .arg("--format")
            .arg(output_format)
            .arg("--root")
            .arg(&self.build_resources_dir)
            .arg("--root")
            .arg(&self.project_dir)
            .arg("--out")
            .arg(out_dir);
        for input in inputs {
            command.arg("--input").arg(input);
        }

        let response: ConvertResponse = run_json_tool("icon-converter", &mut command).await?;
        if response.error.is_some() || response.error_code.is_some() {
            let message = response
                .error
                .unwrap_or_else(|| "icon conversion failed".to_string());
            return Err(match response.error_code {
                Some(code) => Error::configuration(format!("{message} (code: {code})")),
                None => Error::configuration(message),
            });
        }
        Ok(response.icons.unwrap_or_default())
    }
}

/// Conventionally named icon sources, in priority order per output format.
fn candidate_names(output_format: &str) -> &'static [&'static str] {
    match output_format {
        "icns" => &["icon.icns", "icon.png", "icons"],
        "ico" => &["icon.ico", "icon.png", "icons"],
        // png icon sets for Linux desktop entries
        _ => &["icons", "icon.png", "icon.icns"],
    }
}
