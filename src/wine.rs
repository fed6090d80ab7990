//! Compatibility runner for Windows build tools on non-Windows hosts.
//!
//! Windows-targeted tools (signing, resource editing) are executed through
//! wine when the host is not Windows. Resolution happens once per process:
//! the first caller resolves the binary and its environment overlay, and
//! every later caller — including concurrent first callers, which are
//! coalesced by the `OnceCell` — reuses the completed result.
//!
//! Host behavior:
//! - `USE_SYSTEM_WINE` set: the system-installed binary is used
//!   unconditionally, with no version probe.
//! - macOS: a pinned build is chosen by the detected OS version, downloaded
//!   into the cache with checksum verification, and run with an isolated
//!   prefix and a library search path overlay.
//! - other unix hosts: the system wine is probed for a minimum version.
//! - Windows: commands execute directly, no shim involved.

#![cfg_attr(windows, allow(dead_code))]

use crate::error::{Error, Result};
use semver::Version;
use std::{
    ffi::OsStr,
    path::PathBuf,
    process::Output,
    time::Duration,
};
use tokio::{process::Command, sync::OnceCell};

/// Minimum supported wine version.
const MIN_WINE_VERSION: &str = "1.8.0";

/// Default timeout for shimmed commands when the caller specifies none.
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);

const WINE_DOCS_URL: &str = "https://wiki.winehq.org/Download";

static WINE: OnceCell<WineEnv> = OnceCell::const_new();

/// Resolved shim: binary path plus required environment overlay.
#[derive(Clone, Debug)]
struct WineEnv {
    path: PathBuf,
    env: Vec<(String, String)>,
}

/// Executes a Windows binary, through the shim on non-Windows hosts.
///
/// The original command is prepended as the shim's first argument; the
/// caller's environment is overlaid with the shim's required variables
/// (shim keys win on conflict). The default timeout is 120000 ms.
///
/// # Errors
///
/// [`Error::Configuration`] when the shim is missing or too old;
/// [`Error::CommandTimeout`] when the command exceeds the timeout;
/// a generic error carrying stderr when the command exits non-zero.
pub async fn exec_wine(
    executable: impl AsRef<OsStr>,
    args: &[&OsStr],
    timeout: Option<Duration>,
) -> Result<Output> {
    let executable = executable.as_ref();
    let mut command;
    if cfg!(windows) {
        command = Command::new(executable);
        command.args(args);
    } else {
        let wine = WINE.get_or_try_init(resolve_wine).await?;
        command = Command::new(&wine.path);
        command.arg(executable);
        command.args(args);
        for (key, value) in &wine.env {
            command.env(key, value);
        }
    }
    command.kill_on_drop(true);

    let display = executable.to_string_lossy().to_string();
    let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| Error::CommandTimeout {
            command: display.clone(),
            timeout_ms: timeout.as_millis() as u64,
        })?
        .map_err(|error| Error::CommandFailed {
            command: display.clone(),
            error,
        })?;

    if !output.status.success() {
        crate::bail!(
            "{display} failed with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output)
}

async fn resolve_wine() -> Result<WineEnv> {
    if std::env::var_os("USE_SYSTEM_WINE").is_some() {
        log::debug!("USE_SYSTEM_WINE is set, using system wine without version probe");
        return Ok(WineEnv {
            path: find_system_wine()?,
            env: Vec::new(),
        });
    }

    #[cfg(target_os = "macos")]
    {
        return resolve_pinned_wine().await;
    }

    #[cfg(not(target_os = "macos"))]
    {
        let path = find_system_wine()?;
        check_wine_version(&path).await?;
        return Ok(WineEnv {
            path,
            env: Vec::new(),
        });
    }
}

fn find_system_wine() -> Result<PathBuf> {
    which::which("wine").map_err(|_| {
        Error::configuration(format!(
            "wine is required to build Windows artifacts on this host but was not found. \
             Please install wine >= {MIN_WINE_VERSION} ({WINE_DOCS_URL})"
        ))
    })
}

/// Probes `wine --version` and rejects versions below the minimum.
#[cfg(not(target_os = "macos"))]
async fn check_wine_version(path: &std::path::Path) -> Result<()> {
    let output = Command::new(path)
        .arg("--version")
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: format!("{} --version", path.display()),
            error,
        })?;
    let raw = String::from_utf8_lossy(&output.stdout);
    check_version_string(&raw)
}

#[cfg(any(test, not(target_os = "macos")))]
fn check_version_string(raw: &str) -> Result<()> {
    let normalized = normalize_wine_version(raw);
    let version = Version::parse(&normalized).map_err(|e| {
        Error::configuration(format!(
            "cannot parse wine version \"{}\": {e} ({WINE_DOCS_URL})",
            raw.trim()
        ))
    })?;
    let minimum = Version::parse(MIN_WINE_VERSION)?;
    if version < minimum {
        return Err(Error::configuration(format!(
            "wine {version} is too old, please update to at least {MIN_WINE_VERSION} \
             ({WINE_DOCS_URL})"
        )));
    }
    Ok(())
}

/// Normalizes raw `wine --version` output to a semver string.
///
/// Strips the `wine-` label prefix, truncates at the first space or hyphen
/// and pads a two-component version with `.0`.
#[cfg(any(test, not(target_os = "macos")))]
fn normalize_wine_version(raw: &str) -> String {
    let version = raw.trim();
    let version = version.strip_prefix("wine-").unwrap_or(version);
    let version = version.split(' ').next().unwrap_or(version);
    let version = version.split('-').next().unwrap_or(version);
    if version.bytes().filter(|b| *b == b'.').count() == 1 {
        format!("{version}.0")
    } else {
        version.to_string()
    }
}

#[cfg(target_os = "macos")]
mod pinned {
    //! Pinned wine builds for macOS hosts, keyed on the OS version.

    use super::*;
    use crate::error::ErrorExt;
    use sha2::{Digest, Sha512};

    pub(super) struct PinnedWine {
        pub version: &'static str,
        pub url: &'static str,
        pub sha512: &'static str,
    }

    /// Wine build for macOS 10.14+ (and all macOS 11+ releases).
    const WINE_MODERN: PinnedWine = PinnedWine {
        version: "4.0.1",
        url: "https://github.com/app-packager/binaries/releases/download/wine-4.0.1/wine-4.0.1-mac.tar.gz",
        sha512: "a1704716e34f8a7a62bd18b64fca7dbc786a4978d50b1dbbc26986222eeaa0d5e36dbb2d2b461a6cdd41ed7a79eacd6b6ae6a4103b7286e4b2fa0a9dcf68a916",
    };

    /// Wine build for older macOS 10.x releases.
    const WINE_LEGACY: PinnedWine = PinnedWine {
        version: "2.0.3",
        url: "https://github.com/app-packager/binaries/releases/download/wine-2.0.3/wine-2.0.3-mac.tar.gz",
        sha512: "cf0d7e4be0e7ae0d12f3bbdbb884daa44b51d5e263f4b0140e0bd0aba8224ef9a0e9b517a8b1ba41ce1ef9349cb7a0a5e6b10e3cff8f4a541b2dadf05fce6bbe",
    };

    fn pinned_for_host(major: u32, minor: u32) -> &'static PinnedWine {
        if major >= 11 || (major == 10 && minor >= 14) {
            &WINE_MODERN
        } else {
            &WINE_LEGACY
        }
    }

    async fn host_os_version() -> Result<(u32, u32)> {
        let output = Command::new("sw_vers")
            .arg("-productVersion")
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: "sw_vers -productVersion".into(),
                error,
            })?;
        let raw = String::from_utf8_lossy(&output.stdout);
        let mut parts = raw.trim().split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(10);
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Ok((major, minor))
    }

    pub(super) async fn resolve_pinned_wine() -> Result<WineEnv> {
        let (major, minor) = host_os_version().await?;
        let pinned = pinned_for_host(major, minor);

        let cache_root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("app-packager")
            .join("wine");
        let install_dir = cache_root.join(pinned.version);
        let wine_path = install_dir.join("bin").join("wine");

        if !wine_path.is_file() {
            download_and_unpack(pinned, &cache_root, &install_dir).await?;
        } else {
            log::debug!("using cached wine {} at {}", pinned.version, install_dir.display());
        }

        let prefix = cache_root.join("wine-home");
        tokio::fs::create_dir_all(&prefix)
            .await
            .fs_context("creating wine prefix", &prefix)?;

        let lib_dir = install_dir.join("lib");
        let mut library_path = lib_dir.display().to_string();
        if let Ok(existing) = std::env::var("DYLD_FALLBACK_LIBRARY_PATH") {
            // keep the original value as fallback
            library_path = format!("{library_path}:{existing}");
        }

        Ok(WineEnv {
            path: wine_path,
            env: vec![
                ("WINEDEBUG".into(), "-all,trace+msgbox".into()),
                ("WINEDLLOVERRIDES".into(), "winemenubuilder.exe=d".into()),
                ("WINEPREFIX".into(), prefix.display().to_string()),
                ("DYLD_FALLBACK_LIBRARY_PATH".into(), library_path),
            ],
        })
    }

    async fn download_and_unpack(
        pinned: &PinnedWine,
        cache_root: &std::path::Path,
        install_dir: &std::path::Path,
    ) -> Result<()> {
        log::info!("downloading wine {} from {}", pinned.version, pinned.url);
        let response = reqwest::get(pinned.url).await?.error_for_status()?;
        let data = response.bytes().await?;

        let actual = hex::encode(Sha512::digest(&data));
        if actual != pinned.sha512 {
            return Err(Error::HashMismatch {
                expected: pinned.sha512.to_string(),
                actual,
            });
        }

        tokio::fs::create_dir_all(cache_root)
            .await
            .fs_context("creating cache directory", cache_root)?;
        let install_dir = install_dir.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let decoder = flate2::read::GzDecoder::new(&data[..]);
            tar::Archive::new(decoder).unpack(&install_dir)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::GenericError(format!("wine unpack task panicked: {e}")))?
    }
}

#[cfg(target_os = "macos")]
use pinned::resolve_pinned_wine;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_label_and_build_suffix() {
        assert_eq!(normalize_wine_version("wine-3.0.3 (Some-build)"), "3.0.3");
    }

    #[test]
    fn test_normalize_pads_two_component_version() {
        assert_eq!(normalize_wine_version("1.8"), "1.8.0");
        assert_eq!(normalize_wine_version("wine-2.0-rc5"), "2.0.0");
    }

    #[test]
    fn test_normalize_keeps_three_components() {
        assert_eq!(normalize_wine_version("4.0.1\n"), "4.0.1");
    }

    #[test]
    fn test_version_check_accepts_minimum_and_above() {
        check_version_string("wine-3.0.3 (Some-build)").unwrap();
        check_version_string("1.8").unwrap();
    }

    #[test]
    fn test_version_check_rejects_old_wine() {
        let err = check_version_string("wine-1.6.2").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains(WINE_DOCS_URL));
    }

    #[test]
    fn test_version_check_rejects_garbage() {
        assert!(check_version_string("not a version").is_err());
    }
}
