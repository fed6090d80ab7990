//! macOS platform support.

use super::{Platform, PlatformSupport};
use crate::{
    app_info::AppInfo,
    error::{Error, Result},
    options::SignOptions,
    BoxFuture,
};
use std::path::{Path, PathBuf};

/// Packages into a `.app` bundle layout and signs with `codesign`.
pub struct MacSupport;

impl MacSupport {
    fn bundle_name(app_info: &AppInfo) -> String {
        format!("{}.app", app_info.product_filename())
    }
}

impl PlatformSupport for MacSupport {
    fn platform(&self) -> Platform {
        Platform::Mac
    }

    fn default_target(&self) -> &'static str {
        "dir"
    }

    fn icon_format(&self) -> &'static str {
        "icns"
    }

    fn resources_relative_dir(&self, app_info: &AppInfo) -> PathBuf {
        PathBuf::from(Self::bundle_name(app_info))
            .join("Contents")
            .join("Resources")
    }

    fn extra_files_root(&self, app_out_dir: &Path, app_info: &AppInfo) -> PathBuf {
        app_out_dir.join(Self::bundle_name(app_info)).join("Contents")
    }

    fn sign_app<'a>(
        &'a self,
        app_out_dir: &'a Path,
        app_info: &'a AppInfo,
        options: &'a SignOptions,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let Some(identity) = options
                .identity
                .clone()
                .or_else(|| std::env::var("CSC_NAME").ok())
            else {
                log::warn!("no signing identity configured, skipping codesign");
                return Ok(false);
            };
            let bundle = app_out_dir.join(Self::bundle_name(app_info));
            let output = tokio::process::Command::new("codesign")
                .arg("--sign")
                .arg(&identity)
                .arg("--force")
                .arg("--deep")
                .arg(&bundle)
                .output()
                .await
                .map_err(|error| Error::CommandFailed {
                    command: "codesign".into(),
                    error,
                })?;
            if !output.status.success() {
                return Err(Error::Sign(format!(
                    "codesign failed for {}: {}",
                    bundle.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
            Ok(true)
        })
    }
}
