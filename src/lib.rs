//! Packaging pipeline for desktop applications built on an embedded runtime
//!
//! This library turns an application directory plus a prebuilt runtime
//! distribution into distributable artifacts:
//! - resolves and copies the application file sets (glob matchers with
//!   cross-group exclusions, optional per-file transforms)
//! - assembles them as a plain tree or an asar archive container
//! - generates artifact names from `${token}` macro patterns
//! - sanity-checks, signs and hands the result to format targets
//!
//! Format-specific installer builders, configuration loading and the archive
//! codec itself are external collaborators behind the traits in [`asar`],
//! [`icons`] and [`targets`].

pub mod app_info;
pub mod arch;
pub mod asar;
pub mod error;
pub mod file_copier;
pub mod file_matcher;
pub mod icons;
pub mod macros;
pub mod options;
pub mod packager;
pub mod targets;
pub mod util;
pub mod wine;

use std::{future::Future, pin::Pin};

/// Boxed future used at the crate's dyn-trait seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// Re-export commonly used types
pub use app_info::AppInfo;
pub use arch::Arch;
pub use error::{Error, Result};
pub use options::BuildOptions;
pub use packager::{Hooks, PackContext, Packager, Platform, PlatformSupport};
