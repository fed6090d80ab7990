//! Inclusion/exclusion file matching for application file groups.
//!
//! Each logical file group (main application files, extra resources, extra
//! files, archive-unpack exceptions) is described by a [`FileMatcher`]:
//! a source root, a destination root and a list of glob patterns. Patterns
//! may contain `${token}` macros and `!`-prefixed negations.
//!
//! Matchers keep their patterns raw; [`FileMatcher::compile`] expands macros
//! and parses the globs immediately before use, after the exclusions of all
//! sibling groups have been merged in. One group's exclusions must suppress
//! matches in every other group's inclusion set, otherwise an excluded file
//! could still cross into the package through a sibling group.

use crate::{
    app_info::AppInfo,
    arch::Arch,
    error::Result,
    macros::expand_macro,
};
use glob::{MatchOptions, Pattern};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Per-build data a matcher needs to expand pattern macros.
#[derive(Clone)]
pub struct MatcherContext {
    /// Application metadata backing `${productName}` and friends.
    pub app_info: Arc<AppInfo>,
    /// Architecture backing `${arch}`.
    pub arch: Arch,
    /// Platform key backing `${os}`.
    pub os_name: String,
}

impl MatcherContext {
    fn expand(&self, pattern: &str) -> Result<String> {
        expand_macro(
            pattern,
            Some(self.arch.name()),
            &self.os_name,
            &self.app_info,
            &HashMap::new(),
            true,
        )
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One logical file group: source root, destination root, raw glob patterns.
#[derive(Clone, Debug)]
pub struct FileMatcher {
    /// Source root. Always inside the project or build-resources directory.
    pub from: PathBuf,
    /// Destination root. Always inside the computed output directory.
    pub to: PathBuf,
    patterns: Vec<String>,
    excludes: Vec<String>,
}

impl FileMatcher {
    /// Creates a matcher for a file group.
    ///
    /// An empty pattern list means "everything" (`**/*`).
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>, patterns: &[String]) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            patterns: patterns.to_vec(),
            excludes: Vec::new(),
        }
    }

    /// Returns the `!`-prefixed patterns of this group, without the prefix.
    pub fn exclusion_patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter_map(|p| p.strip_prefix('!').map(str::to_string))
            .collect()
    }

    /// Merges exclusion patterns inherited from sibling groups.
    ///
    /// Must be called before [`compile`](Self::compile); compiled state never
    /// changes afterwards.
    pub fn add_exclude_patterns(&mut self, patterns: &[String]) {
        self.excludes.extend_from_slice(patterns);
    }

    /// Appends an inclusion pattern.
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        self.patterns.push(pattern.into());
    }

    /// True when the matcher has no inclusion patterns at all.
    pub fn is_empty(&self) -> bool {
        self.patterns.iter().all(|p| p.starts_with('!'))
    }

    /// Expands macros and parses the glob patterns.
    pub fn compile(&self, ctx: &MatcherContext) -> Result<CompiledMatcher> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();

        if self.is_empty() {
            includes.push(Pattern::new("**/*")?);
        }
        for raw in &self.patterns {
            let (negated, raw) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let expanded = ctx.expand(raw)?;
            let bucket = if negated { &mut excludes } else { &mut includes };
            append_normalized(bucket, &expanded)?;
        }
        for raw in &self.excludes {
            let expanded = ctx.expand(raw)?;
            append_normalized(&mut excludes, &expanded)?;
        }

        Ok(CompiledMatcher { includes, excludes })
    }
}

/// Parses a pattern, treating a meta-character-free pattern as a directory
/// prefix (matching the path itself and everything below it).
fn append_normalized(bucket: &mut Vec<Pattern>, pattern: &str) -> Result<()> {
    bucket.push(Pattern::new(pattern)?);
    if !pattern.contains(['*', '?', '[']) {
        bucket.push(Pattern::new(&format!("{pattern}/**/*"))?);
    }
    Ok(())
}

/// Parsed matcher state, ready to test relative paths.
pub struct CompiledMatcher {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl CompiledMatcher {
    /// Tests a path relative to the matcher's source root.
    pub fn matches(&self, relative: &Path) -> bool {
        if self
            .excludes
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
        {
            return false;
        }
        self.includes
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
    }
}

/// Per-file content rewrite applied during copy (metadata injection and the
/// like). Returning `None` keeps the original contents.
pub type FileTransformer = Arc<dyn Fn(&Path, Vec<u8>) -> Option<Vec<u8>> + Send + Sync>;

/// One matched file: absolute source plus destination-relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute source path.
    pub source: PathBuf,
    /// Path relative to the file set's destination root.
    pub relative: PathBuf,
}

/// A matcher resolved against the filesystem.
#[derive(Clone)]
pub struct ResolvedFileSet {
    /// Source root the entries were matched under.
    pub from: PathBuf,
    /// Destination root the entries are copied under.
    pub to: PathBuf,
    /// Matched files, sorted by relative path.
    pub files: Vec<FileEntry>,
    /// Optional per-file content rewrite.
    pub transformer: Option<FileTransformer>,
}

impl std::fmt::Debug for ResolvedFileSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFileSet")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("files", &self.files.len())
            .field("transformer", &self.transformer.is_some())
            .finish()
    }
}

/// Resolves matchers against the filesystem.
///
/// Missing source roots resolve to zero files. Sets with zero matched files
/// are dropped, never handed to the copier.
pub async fn resolve_matchers(
    matchers: Vec<FileMatcher>,
    ctx: &MatcherContext,
    transformer: Option<FileTransformer>,
) -> Result<Vec<ResolvedFileSet>> {
    let mut sets = Vec::new();
    for matcher in matchers {
        let compiled = matcher.compile(ctx)?;
        let from = matcher.from.clone();
        let files = tokio::task::spawn_blocking(move || walk_matching(&from, &compiled))
            .await
            .map_err(|e| crate::error::Error::GenericError(format!("matcher walk panicked: {e}")))??;
        if files.is_empty() {
            log::debug!(
                "file group {} matched no files, dropping",
                matcher.from.display()
            );
            continue;
        }
        sets.push(ResolvedFileSet {
            from: matcher.from,
            to: matcher.to,
            files,
            transformer: transformer.clone(),
        });
    }
    Ok(sets)
}

fn walk_matching(root: &Path, matcher: &CompiledMatcher) -> Result<Vec<FileEntry>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?.to_path_buf();
        if matcher.matches(&relative) {
            files.push(FileEntry {
                source: entry.path().to_path_buf(),
                relative,
            });
        }
    }
    Ok(files)
}
