//! Application metadata used throughout the pipeline.

/// Resolved application metadata for one packaging run.
///
/// Derived once from project metadata plus configuration overrides and
/// shared read-only with every component of the pipeline. The sanitized
/// [`product_filename`](Self::product_filename) is what lands on disk
/// (app bundle names, artifact names); the raw `product_name` is what the
/// user sees in installers and menus.
#[derive(Clone, Debug)]
pub struct AppInfo {
    /// Display name of the product (may contain spaces and punctuation).
    pub product_name: String,
    /// Internal package name (the manifest `name` field).
    pub name: String,
    /// Application version.
    pub version: String,
    /// Release channel. `None` means `latest`.
    pub channel: Option<String>,
    /// Entry file declared by the application manifest. `None` means the
    /// runtime default `index.js`.
    pub main: Option<String>,
}

impl AppInfo {
    /// Returns the product name sanitized for use in file names.
    ///
    /// Characters that are unsafe in file names on any supported platform
    /// are replaced with `-`.
    pub fn product_filename(&self) -> String {
        sanitize_filename(&self.product_name)
    }

    /// Returns the release channel, defaulting to `latest`.
    pub fn channel_or_default(&self) -> &str {
        self.channel.as_deref().unwrap_or("latest")
    }

    /// Returns the application entry file, defaulting to `index.js`.
    pub fn main_entry(&self) -> &str {
        self.main.as_deref().unwrap_or("index.js")
    }

    /// Looks up a metadata field by macro token name.
    ///
    /// Recognized names: `name`, `version`, `channel`, `productName` and
    /// `productFilename`.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "version" => Some(self.version.clone()),
            "channel" => Some(self.channel_or_default().to_string()),
            "productName" => Some(self.product_name.clone()),
            "productFilename" => Some(self.product_filename()),
            _ => None,
        }
    }
}

/// Replaces characters that are invalid in file names with `-`.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> AppInfo {
        AppInfo {
            product_name: "Test App/β".into(),
            name: "test-app".into(),
            version: "1.2.3".into(),
            channel: None,
            main: None,
        }
    }

    #[test]
    fn test_product_filename_sanitized() {
        assert_eq!(info().product_filename(), "Test App-β");
    }

    #[test]
    fn test_channel_defaults_to_latest() {
        assert_eq!(info().channel_or_default(), "latest");
    }

    #[test]
    fn test_field_lookup() {
        let info = info();
        assert_eq!(info.field("version").as_deref(), Some("1.2.3"));
        assert_eq!(info.field("channel").as_deref(), Some("latest"));
        assert_eq!(info.field("productFilename").as_deref(), Some("Test App-β"));
        assert_eq!(info.field("unknown"), None);
    }

    #[test]
    fn test_main_entry_default() {
        assert_eq!(info().main_entry(), "index.js");
    }
}
