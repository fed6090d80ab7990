//! Windows platform support.
//!
//! Signing runs the Windows sign tool through the compatibility runner, so
//! it works from non-Windows hosts as well.

use super::{Platform, PlatformSupport};
use crate::{
    app_info::AppInfo,
    error::Result,
    options::SignOptions,
    wine::exec_wine,
    BoxFuture,
};
use std::{ffi::OsStr, path::Path};

/// Certificate env fallbacks, most specific first.
const CERTIFICATE_ENV: [&str; 2] = ["WIN_CSC_LINK", "CSC_LINK"];
const PASSWORD_ENV: [&str; 2] = ["WIN_CSC_KEY_PASSWORD", "CSC_KEY_PASSWORD"];

pub struct WindowsSupport;

impl PlatformSupport for WindowsSupport {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn default_target(&self) -> &'static str {
        "dir"
    }

    fn icon_format(&self) -> &'static str {
        "ico"
    }

    fn sign_app<'a>(
        &'a self,
        app_out_dir: &'a Path,
        app_info: &'a AppInfo,
        options: &'a SignOptions,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let Some(certificate) = options.certificate_with_env(&CERTIFICATE_ENV) else {
                log::warn!("no signing certificate configured, skipping signing");
                return Ok(false);
            };
            let executable = app_out_dir.join(format!("{}.exe", app_info.product_filename()));

            let mut args: Vec<&OsStr> = vec![
                OsStr::new("sign"),
                OsStr::new("/f"),
                OsStr::new(&certificate),
            ];
            let password = options.password_with_env(&PASSWORD_ENV);
            if let Some(password) = &password {
                args.push(OsStr::new("/p"));
                args.push(OsStr::new(password));
            }
            args.push(executable.as_os_str());

            exec_wine("signtool.exe", &args, None).await?;
            Ok(true)
        })
    }
}
