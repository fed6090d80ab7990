//! Resolved build configuration for one platform.
//!
//! [`BuildOptions`] is produced by configuration loading and merging, which
//! happens outside this crate; the pipeline consumes it read-only. The one
//! piece of computation that lives here is [`compute_asar_options`], which
//! turns the user-facing asar toggle/object into resolved [`AsarOptions`]
//! while rejecting the deprecated keys of earlier releases.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::PathBuf;

/// Compression level applied to archive containers and archive targets.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression, fastest builds.
    Store,
    /// Balanced compression.
    #[default]
    Normal,
    /// Best compression, slowest builds.
    Maximum,
}

impl CompressionLevel {
    /// Maps the level onto a flate2 compression setting.
    pub fn to_flate2(self) -> flate2::Compression {
        match self {
            CompressionLevel::Store => flate2::Compression::none(),
            CompressionLevel::Normal => flate2::Compression::default(),
            CompressionLevel::Maximum => flate2::Compression::best(),
        }
    }
}

/// A file type the installed application registers itself for.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileAssociation {
    /// File extension without the leading dot.
    pub ext: String,
    /// Display name of the file type.
    pub name: Option<String>,
    /// Description shown by the OS file manager.
    pub description: Option<String>,
    /// MIME type (Linux desktop integration).
    pub mime_type: Option<String>,
    /// Role the application takes for this type (macOS CFBundleTypeRole).
    pub role: Option<String>,
}

/// Code-signing parameters.
///
/// The certificate and password fall back to environment variables so CI
/// setups never have to write secrets into configuration files. Platform
/// packagers pass their preferred variable names to the accessors, e.g.
/// `WIN_CSC_LINK` before `CSC_LINK` on Windows.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignOptions {
    /// Path or URL of the signing certificate.
    pub certificate: Option<String>,
    /// Password protecting the certificate.
    pub certificate_password: Option<String>,
    /// Signing identity (macOS keychain identity name).
    pub identity: Option<String>,
}

impl SignOptions {
    /// Returns the certificate, consulting the given environment variables in
    /// order when unset.
    pub fn certificate_with_env(&self, env_names: &[&str]) -> Option<String> {
        self.certificate
            .clone()
            .or_else(|| first_env(env_names))
    }

    /// Returns the certificate password, consulting the given environment
    /// variables in order when unset.
    pub fn password_with_env(&self, env_names: &[&str]) -> Option<String> {
        self.certificate_password
            .clone()
            .or_else(|| first_env(env_names))
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

/// User-facing asar configuration: a toggle or an options object.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum AsarConfig {
    /// `true` enables the container with defaults; `false` disables it.
    Toggle(bool),
    /// Options deep-merged over the defaults.
    Options(serde_json::Map<String, Value>),
}

/// Resolved archive container options.
///
/// `None` at the pipeline level means no container: the application files are
/// copied as a plain tree. The unpack-exception patterns live in
/// [`BuildOptions::asar_unpack`], not here, because they are matched as a
/// file matcher group together with the other glob lists.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AsarOptions {
    /// Automatically leave native modules outside the container.
    pub smart_unpack: bool,
    /// Optional file-ordering hint passed to the archive packager.
    pub ordering: Option<PathBuf>,
    /// Allow files outside the application directory to enter the container.
    pub external_allowed: bool,
}

impl Default for AsarOptions {
    fn default() -> Self {
        Self {
            smart_unpack: true,
            ordering: None,
            external_allowed: false,
        }
    }
}

/// Resolved, merged build configuration for one platform.
///
/// Immutable per packaging run. Unrecognized keys are retained in
/// [`other`](Self::other) so deprecated top-level keys can still be detected
/// and reported.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildOptions {
    /// Compression level for containers and archive targets.
    pub compression: CompressionLevel,
    /// Archive container toggle or options.
    pub asar: Option<AsarConfig>,
    /// Artifact file name pattern with `${token}` macros.
    pub artifact_name: Option<String>,
    /// Explicitly configured icon path.
    pub icon: Option<PathBuf>,
    /// File types to register for the installed application.
    pub file_associations: Vec<FileAssociation>,
    /// Code-signing parameters.
    pub sign: SignOptions,
    /// Fail the build when signing is not possible instead of skipping it.
    pub force_code_signing: bool,
    /// Glob patterns selecting the main application files.
    pub files: Vec<String>,
    /// Glob patterns for resources copied next to the application files.
    pub extra_resources: Vec<String>,
    /// Glob patterns for files copied into the package root.
    pub extra_files: Vec<String>,
    /// Glob patterns for files kept outside the archive container.
    pub asar_unpack: Vec<String>,
    /// Prebuilt base runtime distribution to unpack into the output.
    pub runtime_dist: Option<PathBuf>,
    /// Unrecognized configuration keys, kept for deprecation checks.
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

/// Top-level keys replaced by `asarUnpack`. Their presence, with any value,
/// is a hard configuration error.
const DEPRECATED_ASAR_KEYS: [&str; 2] = ["asar-unpack", "asar-unpack-dir"];

/// Sub-keys of the asar options object replaced by `asarUnpack`.
const DEPRECATED_ASAR_SUB_KEYS: [&str; 2] = ["unpackDir", "unpack"];

/// Computes the resolved archive options from the build configuration.
///
/// `prebuilt_asar_exists` suppresses the "asar disabled" warning when a
/// prebuilt container already sits at the legacy default filename.
///
/// # Errors
///
/// [`Error::Configuration`] when a deprecated key is present, at the top
/// level or nested inside the options object.
pub fn compute_asar_options(
    options: &BuildOptions,
    prebuilt_asar_exists: bool,
) -> Result<Option<AsarOptions>> {
    for key in DEPRECATED_ASAR_KEYS {
        if options.other.contains_key(key) {
            return Err(Error::configuration(format!(
                "{key} is deprecated, please set the asarUnpack option instead"
            )));
        }
    }

    match &options.asar {
        Some(AsarConfig::Toggle(false)) => {
            if !prebuilt_asar_exists {
                log::warn!(
                    "asar usage is disabled — it is strongly recommended to keep the application \
                     files in an archive container"
                );
            }
            Ok(None)
        }
        None | Some(AsarConfig::Toggle(true)) => Ok(Some(AsarOptions::default())),
        Some(AsarConfig::Options(map)) => {
            for key in DEPRECATED_ASAR_SUB_KEYS {
                if map.contains_key(key) {
                    return Err(Error::configuration(format!(
                        "asar.{key} is deprecated, please set the asarUnpack option instead"
                    )));
                }
            }
            let mut merged = serde_json::to_value(AsarOptions::default())?;
            merge_json(&mut merged, &Value::Object(map.clone()));
            Ok(Some(serde_json::from_value(merged)?))
        }
    }
}

/// Recursively merges `overlay` into `base`.
///
/// Objects merge key by key, descending into nested objects; every other
/// value kind is replaced by the overlay.
pub fn merge_json(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_json(existing, value);
                    }
                    _ => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options_from(value: Value) -> BuildOptions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_default_selects_asar_defaults() {
        let resolved = compute_asar_options(&BuildOptions::default(), false).unwrap();
        assert_eq!(resolved, Some(AsarOptions::default()));
    }

    #[test]
    fn test_explicit_false_disables_asar() {
        let options = options_from(json!({ "asar": false }));
        assert_eq!(compute_asar_options(&options, false).unwrap(), None);
    }

    #[test]
    fn test_deprecated_key_is_hard_error_regardless_of_value() {
        for value in [json!(null), json!(true), json!(["dir"])] {
            let options = options_from(json!({ "asar-unpack": value }));
            let err = compute_asar_options(&options, false).unwrap_err();
            assert!(matches!(err, Error::Configuration { .. }));
            assert!(err.to_string().contains("asarUnpack"));
        }
        let options = options_from(json!({ "asar-unpack-dir": "x" }));
        assert!(compute_asar_options(&options, false).is_err());
    }

    #[test]
    fn test_deprecated_sub_key_is_hard_error() {
        let options = options_from(json!({ "asar": { "unpackDir": "native" } }));
        let err = compute_asar_options(&options, false).unwrap_err();
        assert!(err.to_string().contains("asar.unpackDir"));

        let options = options_from(json!({ "asar": { "unpack": "*.node" } }));
        assert!(compute_asar_options(&options, false).is_err());
    }

    #[test]
    fn test_object_merges_over_defaults() {
        let options = options_from(json!({ "asar": { "externalAllowed": true } }));
        let resolved = compute_asar_options(&options, false).unwrap().unwrap();
        assert!(resolved.external_allowed);
        // Untouched fields keep their defaults.
        assert!(resolved.smart_unpack);
    }

    #[test]
    fn test_merge_json_is_recursive() {
        let mut base = json!({ "a": { "b": 1, "c": 2 }, "d": 3 });
        merge_json(&mut base, &json!({ "a": { "b": 10 }, "e": 4 }));
        assert_eq!(base, json!({ "a": { "b": 10, "c": 2 }, "d": 3, "e": 4 }));
    }

    #[test]
    fn test_sign_options_env_fallback() {
        // SAFETY: test-local variable, no concurrent reader depends on it.
        unsafe { std::env::set_var("APP_PACKAGER_TEST_CSC", "/tmp/cert.p12") };
        let sign = SignOptions::default();
        assert_eq!(
            sign.certificate_with_env(&["APP_PACKAGER_TEST_CSC"]).as_deref(),
            Some("/tmp/cert.p12")
        );
        let explicit = SignOptions {
            certificate: Some("configured.p12".into()),
            ..Default::default()
        };
        assert_eq!(
            explicit.certificate_with_env(&["APP_PACKAGER_TEST_CSC"]).as_deref(),
            Some("configured.p12")
        );
    }

    #[test]
    fn test_compression_deserializes_lowercase() {
        let options = options_from(json!({ "compression": "maximum" }));
        assert_eq!(options.compression, CompressionLevel::Maximum);
    }
}
