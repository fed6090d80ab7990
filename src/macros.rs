//! Macro expansion and artifact name generation.
//!
//! User-configurable name and path patterns may contain `${token}`
//! placeholders that are resolved at packaging time against the build's
//! [`AppInfo`], the target architecture, the platform key, environment
//! variables (`${env.NAME}`) and caller-supplied extra fields such as
//! `${ext}`. Unresolved tokens are configuration errors, reported with both
//! the offending token and the original pattern so the user can locate the
//! misconfiguration.

use crate::{
    app_info::AppInfo,
    arch::Arch,
    error::{Error, Result},
};
use regex::Regex;
use std::{collections::HashMap, sync::Arc, sync::LazyLock};

static MACRO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([a-zA-Z0-9_./*+]+)}").expect("macro regex is valid"));

static SAFE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z._-]+$").expect("safe name regex is valid"));

/// Separator forms stripped from a pattern when the architecture is absent,
/// so an omitted architecture never leaves a dangling separator.
const ARCH_SEPARATORS: [&str; 4] = ["-${arch}", " ${arch}", "_${arch}", "/${arch}"];

/// Expands `${token}` placeholders in a pattern.
///
/// When `arch` is `None`, exactly one occurrence of each arch-adjacent
/// separator form (`-${arch}`, ` ${arch}`, `_${arch}`, `/${arch}`) is removed
/// before substitution. A pattern containing no recognized tokens comes back
/// unchanged.
///
/// # Errors
///
/// [`Error::Configuration`] when an `${env.NAME}` token names an undefined
/// environment variable, or any other token matches neither a built-in, an
/// [`AppInfo`] field nor a caller-supplied extra field.
pub fn expand_macro(
    pattern: &str,
    arch: Option<&str>,
    os_name: &str,
    app_info: &AppInfo,
    extra: &HashMap<String, String>,
    sanitized_product_name: bool,
) -> Result<String> {
    let mut pattern = pattern.to_string();
    if arch.is_none() {
        for sep in ARCH_SEPARATORS {
            pattern = pattern.replacen(sep, "", 1);
        }
    }

    let mut out = String::with_capacity(pattern.len());
    let mut last = 0;
    for caps in MACRO_RE.captures_iter(&pattern) {
        let whole = caps.get(0).expect("capture 0 always present");
        let token = &caps[1];
        out.push_str(&pattern[last..whole.start()]);

        let value = match token {
            "productName" => {
                if sanitized_product_name {
                    app_info.product_filename()
                } else {
                    app_info.product_name.clone()
                }
            }
            "arch" => match arch {
                Some(a) => a.to_string(),
                None => return Err(unresolved_token(token, &pattern)),
            },
            "os" => os_name.to_string(),
            "channel" => app_info.channel_or_default().to_string(),
            t if t.starts_with("env.") => {
                let var = &t[4..];
                std::env::var(var).map_err(|_| {
                    Error::configuration(format!(
                        "environment variable {var} referenced by macro ${{{t}}} in pattern \
                         \"{pattern}\" is not defined"
                    ))
                })?
            }
            t => match extra.get(t).cloned().or_else(|| app_info.field(t)) {
                Some(v) => v,
                None => return Err(unresolved_token(t, &pattern)),
            },
        };
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&pattern[last..]);
    Ok(out)
}

fn unresolved_token(token: &str, pattern: &str) -> Error {
    Error::configuration(format!(
        "macro ${{{token}}} in pattern \"{pattern}\" cannot be resolved"
    ))
}

/// Returns true when every character of `name` is in `[0-9A-Za-z._-]`.
///
/// Names failing this check cannot be uploaded as release assets without
/// mangling, so they trigger regeneration via the fixed fallback pattern.
pub fn is_safe_github_name(name: &str) -> bool {
    SAFE_NAME_RE.is_match(name)
}

/// Maps an architecture to the classifier expected by a given output format.
///
/// Package managers disagree on architecture spellings, so the mapping is
/// keyed on the file extension. Combinations not listed use the canonical
/// display name; x64 is omitted entirely when `skip_x64` is set, since x64 is
/// the implicit default architecture.
pub fn arch_classifier(arch: Arch, ext: &str, skip_x64: bool) -> Option<&'static str> {
    match (arch, ext) {
        (Arch::X64, "AppImage" | "rpm") => Some("x86_64"),
        (Arch::X64, "deb") => Some("amd64"),
        (Arch::Ia32, "deb" | "AppImage") => Some("i386"),
        (Arch::Ia32, "pacman" | "rpm") => Some("i686"),
        (Arch::X64, _) if skip_x64 => None,
        (arch, _) => Some(arch.name()),
    }
}

/// Returns the real file extension for a requested format.
///
/// Pacman packages are always `pkg.tar.xz` regardless of the requested
/// extension.
pub fn complete_extension(ext: &str) -> &str {
    if ext == "pacman" { "pkg.tar.xz" } else { ext }
}

/// Fixed fallback pattern used when a generated artifact name is unsafe.
const SAFE_FALLBACK_PATTERN: &str = "${name}-${version}-${arch}.${ext}";

/// Artifact name generation for one platform.
///
/// Owns the pieces name generation needs (app metadata, platform key, the
/// user's artifact name pattern) so targets can compute file names without a
/// reference back to the packager.
#[derive(Clone)]
pub struct ArtifactNaming {
    app_info: Arc<AppInfo>,
    os_name: String,
    artifact_pattern: Option<String>,
}

impl ArtifactNaming {
    /// Creates naming state for one platform.
    pub fn new(app_info: Arc<AppInfo>, os_name: impl Into<String>, artifact_pattern: Option<String>) -> Self {
        Self {
            app_info,
            os_name: os_name.into(),
            artifact_pattern,
        }
    }

    /// Expands an artifact name pattern with `${ext}` bound to `ext`.
    pub fn expand_pattern(&self, pattern: &str, ext: &str, arch: Option<Arch>) -> Result<String> {
        let extra = HashMap::from([("ext".to_string(), complete_extension(ext).to_string())]);
        expand_macro(
            pattern,
            arch.map(Arch::name),
            &self.os_name,
            &self.app_info,
            &extra,
            true,
        )
    }

    /// Resolves the artifact file name for `ext` and `arch`.
    ///
    /// Uses the configured artifact name pattern (or the platform default
    /// `${productName}-${version}-${arch}.${ext}`), omitting the architecture
    /// when `skip_x64` is set and the architecture is x64. An unsafe result is
    /// regenerated from the fixed fallback pattern.
    pub fn resolve(&self, ext: &str, arch: Arch, skip_x64: bool) -> Result<String> {
        let arch_arg = if skip_x64 && arch == Arch::X64 {
            None
        } else {
            Some(arch)
        };
        let pattern = self
            .artifact_pattern
            .as_deref()
            .unwrap_or("${productName}-${version}-${arch}.${ext}");
        let name = self.expand_pattern(pattern, ext, arch_arg)?;
        if is_safe_github_name(&name) {
            return Ok(name);
        }
        log::warn!(
            "artifact name \"{name}\" is not safe for upload, regenerating from {SAFE_FALLBACK_PATTERN}"
        );
        self.expand_pattern(SAFE_FALLBACK_PATTERN, ext, Some(arch))
    }

    /// Generates a package file name from explicit parts.
    ///
    /// The separator between name, version and classifier is `_` for the deb
    /// format and `-` for everything else; package managers rely on this
    /// exact layout.
    pub fn file_name(&self, ext: Option<&str>, classifier: Option<&str>, deb: bool) -> String {
        let sep = if deb || ext == Some("deb") { "_" } else { "-" };
        let mut name = format!("{}{sep}{}", self.app_info.product_filename(), self.app_info.version);
        if let Some(classifier) = classifier {
            name.push_str(sep);
            name.push_str(classifier);
        }
        if let Some(ext) = ext {
            name.push('.');
            name.push_str(complete_extension(ext));
        }
        name
    }

    /// Generates a package file name for `ext`/`arch` using the per-format
    /// classifier table.
    pub fn package_file_name(&self, ext: &str, arch: Arch, skip_x64: bool) -> String {
        let classifier = arch_classifier(arch, ext, skip_x64);
        self.file_name(Some(ext), classifier, ext == "deb")
    }
}
