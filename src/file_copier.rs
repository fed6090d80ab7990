//! Copies resolved file sets into the package tree.
//!
//! Works on [`ResolvedFileSet`]s only — matchers with zero files never reach
//! this module. A set's transformer is applied per matched file; transformed
//! contents are rewritten, untouched files go through a plain copy that
//! preserves permissions.

use crate::{
    error::{ErrorExt, Result},
    file_matcher::{FileTransformer, ResolvedFileSet},
};
use std::path::Path;
use tokio::fs;

/// Copies each file set under its own destination root.
pub async fn copy_file_sets(sets: &[ResolvedFileSet]) -> Result<()> {
    for set in sets {
        log::debug!(
            "copying {} files from {} to {}",
            set.files.len(),
            set.from.display(),
            set.to.display()
        );
        for entry in &set.files {
            let dest = set.to.join(&entry.relative);
            copy_entry(&entry.source, &dest, set.transformer.as_ref()).await?;
        }
    }
    Ok(())
}

/// Copies each file set under `stage_root` instead of its destination root.
///
/// Used to assemble the input tree for the archive packager: the container
/// is built from the staged tree, so transforms must already be applied.
pub async fn stage_file_sets(sets: &[ResolvedFileSet], stage_root: &Path) -> Result<()> {
    for set in sets {
        for entry in &set.files {
            let dest = stage_root.join(&entry.relative);
            copy_entry(&entry.source, &dest, set.transformer.as_ref()).await?;
        }
    }
    Ok(())
}

async fn copy_entry(
    source: &Path,
    dest: &Path,
    transformer: Option<&FileTransformer>,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }

    let transformed = match transformer {
        Some(transform) => {
            let data = fs::read(source).await.fs_context("reading file", source)?;
            transform(source, data)
        }
        None => None,
    };

    match transformed {
        Some(data) => {
            fs::write(dest, data).await.fs_context("writing file", dest)?;
            copy_permissions(source, dest).await?;
        }
        None => {
            fs::copy(source, dest).await.fs_context("copying file", dest)?;
        }
    }
    Ok(())
}

/// Carries the source permissions over to a rewritten file (exec bits on
/// unix in particular).
async fn copy_permissions(source: &Path, dest: &Path) -> Result<()> {
    let metadata = fs::metadata(source)
        .await
        .fs_context("reading metadata", source)?;
    fs::set_permissions(dest, metadata.permissions())
        .await
        .fs_context("setting permissions", dest)?;
    Ok(())
}
