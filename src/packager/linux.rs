//! Linux platform support.

use super::{Platform, PlatformSupport};
use crate::{app_info::AppInfo, error::Result, options::SignOptions, BoxFuture};
use std::path::Path;

/// Packages for Linux. Artifacts are not code-signed on this platform;
/// package-level signatures belong to the format builders.
pub struct LinuxSupport;

impl PlatformSupport for LinuxSupport {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn default_target(&self) -> &'static str {
        "tar.gz"
    }

    fn icon_format(&self) -> &'static str {
        "png"
    }

    fn sign_app<'a>(
        &'a self,
        _app_out_dir: &'a Path,
        _app_info: &'a AppInfo,
        _options: &'a SignOptions,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async { Ok(false) })
    }
}
