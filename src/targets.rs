//! Build targets and the two-phase dispatcher.
//!
//! Each target turns a packed, unpacked application directory into one
//! distributable artifact. Targets that declare async support are built
//! concurrently in a first phase; the rest run sequentially afterwards, in
//! declared order, so targets that shell out to stateful external tools
//! never overlap.

use crate::{
    error::{Context, Error, ErrorExt, Result},
    macros::ArtifactNaming,
    options::CompressionLevel,
    packager::PackContext,
    BoxFuture,
};
use futures_util::future::try_join_all;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A single distributable output format.
pub trait Target: Send + Sync {
    /// Short format name used in logs and artifact names, e.g. `"tar.gz"`.
    fn name(&self) -> &str;

    /// Directory the target writes its artifact into.
    fn out_dir(&self) -> &Path;

    /// Whether this target may run concurrently with other async targets.
    fn is_async_supported(&self) -> bool {
        false
    }

    /// Produces the artifact from the packed application directory.
    fn build<'a>(&'a self, context: &'a PackContext) -> BoxFuture<'a, Result<()>>;
}

/// Runs all targets for one pack: async-capable targets concurrently,
/// then the remaining targets one by one in declared order.
pub async fn dispatch_targets(targets: &[Box<dyn Target>], context: &PackContext) -> Result<()> {
    let (parallel, sequential): (Vec<_>, Vec<_>) = targets
        .iter()
        .partition(|target| target.is_async_supported());

    if !parallel.is_empty() {
        log::debug!("building {} targets concurrently", parallel.len());
        try_join_all(parallel.iter().map(|target| build_one(target.as_ref(), context))).await?;
    }
    for target in sequential {
        build_one(target.as_ref(), context).await?;
    }
    Ok(())
}

async fn build_one(target: &dyn Target, context: &PackContext) -> Result<()> {
    log::info!(
        "building target {} for {} {}",
        target.name(),
        context.electron_platform_name,
        context.arch
    );
    target
        .build(context)
        .await
        .with_context(|| format!("building target {}", target.name()))
}

/// Leaves the unpacked application directory as the artifact itself.
pub struct DirTarget;

impl Target for DirTarget {
    fn name(&self) -> &str {
        "dir"
    }

    fn out_dir(&self) -> &Path {
        Path::new("")
    }

    fn is_async_supported(&self) -> bool {
        true
    }

    fn build<'a>(&'a self, _context: &'a PackContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Archives the unpacked application directory as a compressed tarball.
pub struct TarGzTarget {
    out_dir: PathBuf,
    naming: ArtifactNaming,
    compression: CompressionLevel,
}

impl TarGzTarget {
    pub fn new(out_dir: PathBuf, naming: ArtifactNaming, compression: CompressionLevel) -> Self {
        Self {
            out_dir,
            naming,
            compression,
        }
    }
}

impl Target for TarGzTarget {
    fn name(&self) -> &str {
        "tar.gz"
    }

    fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn is_async_supported(&self) -> bool {
        true
    }

    fn build<'a>(&'a self, context: &'a PackContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let file_name = self.naming.resolve("tar.gz", context.arch, false)?;
            let artifact = self.out_dir.join(&file_name);
            tokio::fs::create_dir_all(&self.out_dir)
                .await
                .fs_context("creating target output directory", &self.out_dir)?;

            let app_dir = context.app_out_dir.clone();
            let destination = artifact.clone();
            let level = self.compression.to_flate2();
            let digest = tokio::task::spawn_blocking(move || -> Result<String> {
                write_tar_gz(&app_dir, &destination, level)?;
                sha256_file(&destination)
            })
            .await
            .map_err(|e| Error::GenericError(format!("tar.gz task panicked: {e}")))??;

            log::info!("built {file_name} (sha256 {digest})");
            Ok(())
        })
    }
}

fn write_tar_gz(app_dir: &Path, destination: &Path, level: flate2::Compression) -> Result<()> {
    let root = app_dir
        .file_name()
        .ok_or_else(|| Error::GenericError(format!("invalid app directory {}", app_dir.display())))?;
    let file = std::fs::File::create(destination)
        .fs_context("creating artifact", destination)?;
    let encoder = flate2::write::GzEncoder::new(file, level);
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all(root, app_dir)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

fn sha256_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).fs_context("opening artifact", path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
