//! CPU architecture types and utilities.

use std::fmt;

/// CPU architecture of a packaged application.
///
/// These are the architectures the base runtime ships prebuilt binaries for.
/// The canonical names (`x64`, `ia32`, `arm64`, `armv7l`) appear in artifact
/// file names and in `${arch}` macro expansion; package-manager-specific
/// spellings (amd64, x86_64, i386, ...) are derived per output format by
/// [`arch_classifier`](crate::macros::arch_classifier).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit). The default and implicit architecture.
    X64,
    /// x86 / i686 (32-bit).
    Ia32,
    /// AArch64 / ARM64 (64-bit).
    Arm64,
    /// ARM with hard-float (32-bit).
    Armv7l,
}

impl Arch {
    /// Returns the canonical display name used in artifact names and macros.
    pub fn name(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Ia32 => "ia32",
            Arch::Arm64 => "arm64",
            Arch::Armv7l => "armv7l",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_names() {
        assert_eq!(Arch::X64.name(), "x64");
        assert_eq!(Arch::Ia32.name(), "ia32");
        assert_eq!(Arch::Arm64.to_string(), "arm64");
    }
}
