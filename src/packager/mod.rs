//! Platform packager orchestration.
//!
//! [`Packager`] drives one packaging pipeline for a (platform, architecture)
//! pair: unpack the base runtime, assemble the application files (plain tree
//! or archive container), copy extra resources, sanity-check the result,
//! sign, and finally build the requested distributable targets. Per-platform
//! behavior lives behind the [`PlatformSupport`] trait.
//!
//! Pipelines for different (platform, architecture) pairs own disjoint
//! output directories, so multiple [`Packager::pack`] calls may run
//! concurrently without coordination.

pub mod linux;
pub mod macos;
pub mod windows;

pub use linux::LinuxSupport;
pub use macos::MacSupport;
pub use windows::WindowsSupport;

use crate::{
    app_info::AppInfo,
    arch::Arch,
    asar::{ArchivePackager, AsarTool, DEFAULT_ARCHIVE_NAME},
    error::{Error, ErrorExt, Result},
    file_copier::{copy_file_sets, stage_file_sets},
    file_matcher::{resolve_matchers, FileMatcher, FileTransformer, MatcherContext},
    icons::{IconInfo, IconResolver},
    macros::ArtifactNaming,
    options::{compute_asar_options, AsarOptions, BuildOptions, SignOptions},
    targets::{dispatch_targets, DirTarget, Target, TarGzTarget},
    util::fs::{copy_dir, copy_file, remove_dir_if_exists, remove_if_exists},
    BoxFuture,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{sync::OnceCell, task::JoinSet};
use tokio_util::sync::CancellationToken;

/// Target operating system of a packaging run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    Linux,
    Mac,
    Windows,
}

impl Platform {
    /// Short name used in logs and output paths.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::Windows => "windows",
        }
    }

    /// Platform key the runtime itself reports, used by `${os}` and hooks.
    pub fn electron_name(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mac => "darwin",
            Platform::Windows => "win32",
        }
    }

    /// Name of the unpacked output directory for `arch`.
    pub fn unpacked_dir_name(self, arch: Arch) -> String {
        match (self, arch) {
            (Platform::Linux, Arch::X64) => "linux-unpacked".into(),
            (Platform::Linux, arch) => format!("linux-{arch}-unpacked"),
            (Platform::Mac, Arch::X64) => "mac".into(),
            (Platform::Mac, arch) => format!("mac-{arch}"),
            (Platform::Windows, Arch::X64) => "win-unpacked".into(),
            (Platform::Windows, arch) => format!("win-{arch}-unpacked"),
        }
    }
}

/// Immutable description of one pipeline, handed to hooks and targets.
#[derive(Clone, Debug)]
pub struct PackContext {
    /// Root output directory shared by all targets of this build.
    pub out_dir: PathBuf,
    /// Unpacked application directory for this (platform, architecture).
    pub app_out_dir: PathBuf,
    /// Architecture being packaged.
    pub arch: Arch,
    /// Platform key as the runtime reports it (`linux`, `darwin`, `win32`).
    pub electron_platform_name: String,
}

/// User-supplied pipeline hook.
pub type PackHook =
    Arc<dyn Fn(PackContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Optional hooks invoked at fixed points of the pipeline.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Runs on the cleanup task set, concurrently with app-file copying.
    pub post_init: Option<PackHook>,
    /// Runs after the application files land, before extra files.
    pub before_extra_files: Option<PackHook>,
    /// Runs after all files are in place, before the sanity check.
    pub after_pack: Option<PackHook>,
    /// Runs after signing.
    pub after_sign: Option<PackHook>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("post_init", &self.post_init.is_some())
            .field("before_extra_files", &self.before_extra_files.is_some())
            .field("after_pack", &self.after_pack.is_some())
            .field("after_sign", &self.after_sign.is_some())
            .finish()
    }
}

/// Per-platform capability set behind which the shared orchestration calls
/// out at fixed extension points.
pub trait PlatformSupport: Send + Sync {
    fn platform(&self) -> Platform;

    /// Target built when the caller requests none.
    fn default_target(&self) -> &'static str;

    /// Icon format the platform's runtime consumes.
    fn icon_format(&self) -> &'static str;

    /// Resources directory, relative to the unpacked application directory.
    fn resources_relative_dir(&self, app_info: &AppInfo) -> PathBuf {
        let _ = app_info;
        PathBuf::from("resources")
    }

    /// Destination root for `extraFiles` groups.
    fn extra_files_root(&self, app_out_dir: &Path, app_info: &AppInfo) -> PathBuf {
        let _ = app_info;
        app_out_dir.to_path_buf()
    }

    /// Platform-specific adjustment of application metadata before packing.
    fn prepare_app_info(&self, app_info: Arc<AppInfo>) -> Arc<AppInfo> {
        app_info
    }

    /// Instantiates the targets named by the caller.
    fn create_targets(
        &self,
        names: &[String],
        out_dir: &Path,
        naming: &ArtifactNaming,
        options: &BuildOptions,
    ) -> Result<Vec<Box<dyn Target>>> {
        names
            .iter()
            .map(|name| built_in_target(name, out_dir, naming, options))
            .collect()
    }

    /// Signs the packed application. Returns `false` when the platform or
    /// configuration provides nothing to sign with.
    fn sign_app<'a>(
        &'a self,
        app_out_dir: &'a Path,
        app_info: &'a AppInfo,
        options: &'a SignOptions,
    ) -> BoxFuture<'a, Result<bool>>;
}

/// Instantiates one of the built-in targets by name.
pub fn built_in_target(
    name: &str,
    out_dir: &Path,
    naming: &ArtifactNaming,
    options: &BuildOptions,
) -> Result<Box<dyn Target>> {
    match name {
        "dir" => Ok(Box::new(DirTarget)),
        "tar.gz" => Ok(Box::new(TarGzTarget::new(
            out_dir.to_path_buf(),
            naming.clone(),
            options.compression,
        ))),
        other => Err(Error::configuration(format!(
            "unknown target \"{other}\""
        ))),
    }
}

/// Drives the packaging pipeline for one platform.
pub struct Packager {
    project_dir: PathBuf,
    build_resources_dir: PathBuf,
    out_dir: PathBuf,
    app_info: Arc<AppInfo>,
    options: BuildOptions,
    support: Box<dyn PlatformSupport>,
    hooks: Hooks,
    cancellation: CancellationToken,
    archiver: OnceCell<Arc<dyn ArchivePackager>>,
    transformer: Option<FileTransformer>,
}

impl Packager {
    pub fn new(
        project_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        app_info: AppInfo,
        options: BuildOptions,
        support: Box<dyn PlatformSupport>,
    ) -> Self {
        let project_dir = project_dir.into();
        let app_info = support.prepare_app_info(Arc::new(app_info));
        Self {
            build_resources_dir: project_dir.join("build"),
            project_dir,
            out_dir: out_dir.into(),
            app_info,
            options,
            support,
            hooks: Hooks::default(),
            cancellation: CancellationToken::new(),
            archiver: OnceCell::new(),
            transformer: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Overrides the build-resources directory (default `<project>/build`).
    pub fn with_build_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_resources_dir = dir.into();
        self
    }

    /// Overrides the archive container collaborator.
    pub fn with_archiver(mut self, archiver: Arc<dyn ArchivePackager>) -> Self {
        self.archiver = OnceCell::new_with(Some(archiver));
        self
    }

    /// Installs a per-file content rewrite applied to the main file set.
    pub fn with_transformer(mut self, transformer: FileTransformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn app_info(&self) -> &Arc<AppInfo> {
        &self.app_info
    }

    pub fn platform(&self) -> Platform {
        self.support.platform()
    }

    /// Artifact naming for this platform, from the configured pattern.
    pub fn artifact_naming(&self) -> ArtifactNaming {
        ArtifactNaming::new(
            self.app_info.clone(),
            self.platform().name(),
            self.options.artifact_name.clone(),
        )
    }

    /// Resolves the archive collaborator once per packager; the injected or
    /// environment-resolved instance is reused by every later call.
    async fn resolve_archiver(&self) -> Result<Arc<dyn ArchivePackager>> {
        self.archiver
            .get_or_try_init(|| async {
                Ok(Arc::new(AsarTool::from_env()?) as Arc<dyn ArchivePackager>)
            })
            .await
            .cloned()
    }

    /// Resolves this platform's application icons into `out_dir`.
    pub async fn resolve_icon(&self, out_dir: &Path) -> Result<Vec<IconInfo>> {
        let resolver = IconResolver::from_env(&self.build_resources_dir, &self.project_dir)?;
        resolver
            .resolve(
                self.options.icon.as_deref(),
                self.support.icon_format(),
                out_dir,
            )
            .await
    }

    /// Packs the application for `arch` and builds the requested targets.
    ///
    /// `prepackaged` skips the packing body entirely and builds targets from
    /// the given already-prepared application directory. With no target
    /// names, the platform's default target is built.
    pub async fn pack(
        &self,
        arch: Arch,
        target_names: &[String],
        prepackaged: Option<&Path>,
    ) -> Result<PackContext> {
        let app_out_dir = match prepackaged {
            Some(dir) => dir.to_path_buf(),
            None => self
                .out_dir
                .join(self.platform().unpacked_dir_name(arch)),
        };
        let context = PackContext {
            out_dir: self.out_dir.clone(),
            app_out_dir,
            arch,
            electron_platform_name: self.platform().electron_name().to_string(),
        };

        if prepackaged.is_some() {
            log::info!(
                "using prepackaged application at {}",
                context.app_out_dir.display()
            );
        } else if !self.do_pack(&context).await? {
            // cancelled at the checkpoint, files left in place
            return Ok(context);
        }

        let naming = self.artifact_naming();
        let default;
        let names = if target_names.is_empty() {
            default = [self.support.default_target().to_string()];
            &default[..]
        } else {
            target_names
        };
        let targets = self
            .support
            .create_targets(names, &self.out_dir, &naming, &self.options)?;
        dispatch_targets(&targets, &context).await?;
        Ok(context)
    }

    /// Runs the packing state machine. Returns `false` when the pipeline was
    /// cancelled at the checkpoint.
    async fn do_pack(&self, context: &PackContext) -> Result<bool> {
        let prebuilt_asar = self.project_dir.join(DEFAULT_ARCHIVE_NAME);
        let prebuilt_exists = tokio::fs::metadata(&prebuilt_asar)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        let asar_options = compute_asar_options(&self.options, prebuilt_exists)?;

        self.unpack_runtime(&context.app_out_dir).await?;
        let resources_dir = context
            .app_out_dir
            .join(self.support.resources_relative_dir(&self.app_info));
        tokio::fs::create_dir_all(&resources_dir)
            .await
            .fs_context("creating resources directory", &resources_dir)?;

        let mut cleanup = self.spawn_cleanup_tasks(context, &resources_dir);

        let matcher_ctx = MatcherContext {
            app_info: self.app_info.clone(),
            arch: context.arch,
            os_name: context.electron_platform_name.clone(),
        };
        let (main, extras) = self.build_matchers(context, &resources_dir);
        self.copy_app_files(
            context,
            &resources_dir,
            main,
            &matcher_ctx,
            asar_options.as_ref(),
            prebuilt_exists,
            &prebuilt_asar,
        )
        .await?;

        while let Some(joined) = cleanup.join_next().await {
            joined.map_err(|e| Error::GenericError(format!("cleanup task panicked: {e}")))??;
        }

        self.run_hook(&self.hooks.before_extra_files, context).await?;

        let extra_sets = resolve_matchers(extras, &matcher_ctx, None).await?;
        copy_file_sets(&extra_sets).await?;

        if self.cancellation.is_cancelled() {
            log::warn!(
                "packaging of {} cancelled, leaving copied files in place",
                context.app_out_dir.display()
            );
            return Ok(false);
        }

        self.run_hook(&self.hooks.after_pack, context).await?;
        self.sanity_check_package(context, &resources_dir, asar_options.is_some() || prebuilt_exists)
            .await?;

        let signed = self
            .support
            .sign_app(&context.app_out_dir, &self.app_info, &self.options.sign)
            .await?;
        if signed {
            log::info!("signed application at {}", context.app_out_dir.display());
        } else if self.options.force_code_signing {
            return Err(Error::configuration(
                "application was not signed but forceCodeSigning is set",
            ));
        }
        self.run_hook(&self.hooks.after_sign, context).await?;
        Ok(true)
    }

    /// Unpacks the configured base runtime into a fresh output directory.
    async fn unpack_runtime(&self, app_out_dir: &Path) -> Result<()> {
        remove_dir_if_exists(app_out_dir).await?;
        tokio::fs::create_dir_all(app_out_dir)
            .await
            .fs_context("creating output directory", app_out_dir)?;
        match &self.options.runtime_dist {
            Some(dist) => {
                log::info!(
                    "unpacking runtime dist {} into {}",
                    dist.display(),
                    app_out_dir.display()
                );
                copy_dir(dist, app_out_dir).await
            }
            None => {
                log::debug!("no runtime dist configured, starting from an empty directory");
                Ok(())
            }
        }
    }

    /// Queues the independent cleanup tasks. They run while the application
    /// files are copied and are joined before the pipeline proceeds.
    fn spawn_cleanup_tasks(
        &self,
        context: &PackContext,
        resources_dir: &Path,
    ) -> JoinSet<Result<()>> {
        let mut tasks = JoinSet::new();

        let stale_default = resources_dir.join("default_app.asar");
        tasks.spawn(async move { remove_if_exists(&stale_default).await });

        let version_marker = context.app_out_dir.join("version");
        tasks.spawn(async move { remove_if_exists(&version_marker).await });

        if let Some(hook) = self.hooks.post_init.clone() {
            let ctx = context.clone();
            tasks.spawn(async move { hook(ctx).await.map_err(Error::Hook) });
        }

        // Best-effort: the runtime's own license must not shadow the app's.
        let license = context.app_out_dir.join("LICENSE");
        let renamed = context.app_out_dir.join("LICENSE.runtime.txt");
        tasks.spawn(async move {
            if let Err(error) = tokio::fs::rename(&license, &renamed).await
                && error.kind() != std::io::ErrorKind::NotFound
            {
                log::warn!("cannot rename {}: {error}", license.display());
            }
            Ok(())
        });

        tasks
    }

    /// Builds the three matcher groups with every group's exclusions merged
    /// into the others, so one group's excludes suppress matches everywhere.
    fn build_matchers(
        &self,
        context: &PackContext,
        resources_dir: &Path,
    ) -> (FileMatcher, Vec<FileMatcher>) {
        let mut main = FileMatcher::new(
            &self.project_dir,
            resources_dir.join("app"),
            &self.options.files,
        );
        let mut extras = Vec::new();
        if !self.options.extra_resources.is_empty() {
            extras.push(FileMatcher::new(
                &self.project_dir,
                resources_dir,
                &self.options.extra_resources,
            ));
        }
        if !self.options.extra_files.is_empty() {
            extras.push(FileMatcher::new(
                &self.project_dir,
                self.support
                    .extra_files_root(&context.app_out_dir, &self.app_info),
                &self.options.extra_files,
            ));
        }

        let mut all_excludes = main.exclusion_patterns();
        for matcher in &extras {
            all_excludes.extend(matcher.exclusion_patterns());
        }
        main.add_exclude_patterns(&all_excludes);
        for matcher in &mut extras {
            matcher.add_exclude_patterns(&all_excludes);
        }
        (main, extras)
    }

    /// Assembles the application files inside the resources directory.
    ///
    /// Resolution order: a prebuilt container is copied as an opaque whole;
    /// with the container disabled the main set is copied as a plain tree;
    /// otherwise the main set is staged and packed into a container, with
    /// the unpack-exception globs left as loose files beside it.
    #[allow(clippy::too_many_arguments)]
    async fn copy_app_files(
        &self,
        context: &PackContext,
        resources_dir: &Path,
        main: FileMatcher,
        matcher_ctx: &MatcherContext,
        asar_options: Option<&AsarOptions>,
        prebuilt_exists: bool,
        prebuilt_asar: &Path,
    ) -> Result<()> {
        if prebuilt_exists {
            log::info!("copying prebuilt {}", prebuilt_asar.display());
            return copy_file(prebuilt_asar, &resources_dir.join(DEFAULT_ARCHIVE_NAME)).await;
        }

        let sets = resolve_matchers(vec![main], matcher_ctx, self.transformer.clone()).await?;
        match asar_options {
            None => copy_file_sets(&sets).await,
            Some(options) => {
                let stage = context
                    .out_dir
                    .join(format!("app-stage-{}", context.arch));
                remove_dir_if_exists(&stage).await?;
                stage_file_sets(&sets, &stage).await?;

                let archiver = self.resolve_archiver().await?;
                let destination = resources_dir.join(DEFAULT_ARCHIVE_NAME);
                let integrity = archiver
                    .pack(
                        &stage,
                        &destination,
                        options,
                        &self.options.asar_unpack,
                        self.options.compression,
                    )
                    .await?;
                log::debug!(
                    "packed {} ({} {})",
                    destination.display(),
                    integrity.algorithm,
                    integrity.hash
                );
                remove_dir_if_exists(&stage).await
            }
        }
    }

    /// Verifies the packed tree is usable before signing.
    ///
    /// The output directory must exist, and the application's entry file and
    /// manifest must both be locatable inside the package.
    async fn sanity_check_package(
        &self,
        context: &PackContext,
        resources_dir: &Path,
        archived: bool,
    ) -> Result<()> {
        match tokio::fs::metadata(&context.app_out_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::integrity(
                    "output is not a directory",
                    &context.app_out_dir,
                ))
            }
            Err(_) => {
                return Err(Error::integrity(
                    "output directory does not exist",
                    &context.app_out_dir,
                ))
            }
        }
        self.check_file_in_package(
            resources_dir,
            self.app_info.main_entry(),
            "application entry file",
            archived,
        )
            .await?;
        self.check_file_in_package(resources_dir, "package.json", "application manifest", archived)
            .await
    }

    /// Locates `relative` inside the packed application files.
    async fn check_file_in_package(
        &self,
        resources_dir: &Path,
        relative: &str,
        description: &str,
        archived: bool,
    ) -> Result<()> {
        if archived {
            let archive = resources_dir.join(DEFAULT_ARCHIVE_NAME);
            return self
                .check_file_in_archive(&archive, relative, description)
                .await;
        }

        let app_dir = resources_dir.join("app");
        // An entry path may traverse into a sub-archive even when the outer
        // package is a plain tree.
        if let Some((archive_rel, inner)) = split_nested_archive(relative) {
            let archive = app_dir.join(archive_rel);
            return self
                .check_file_in_archive(&archive, &inner, description)
                .await;
        }

        let full = app_dir.join(relative);
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(Error::integrity(
                format!("{description} is not a regular file"),
                &full,
            )),
            Err(_) => Err(Error::integrity(format!("{description} not found"), &full)),
        }
    }

    async fn check_file_in_archive(
        &self,
        archive: &Path,
        relative: &str,
        description: &str,
    ) -> Result<()> {
        let archiver = self.resolve_archiver().await?;
        let entry = archiver.stat(archive, relative).await?;
        if !entry.exists {
            return Err(Error::integrity(
                format!("{description} {relative} not found in archive"),
                archive,
            ));
        }
        if !entry.is_file {
            return Err(Error::integrity(
                format!("{description} {relative} is not a regular file in archive"),
                archive,
            ));
        }
        Ok(())
    }

    async fn run_hook(&self, hook: &Option<PackHook>, context: &PackContext) -> Result<()> {
        if let Some(hook) = hook {
            hook(context.clone()).await.map_err(Error::Hook)?;
        }
        Ok(())
    }
}

/// Splits a relative path at the first component ending in `.asar`.
///
/// Returns the sub-archive path and the remainder inside it, or `None` when
/// no component crosses an archive boundary.
fn split_nested_archive(relative: &str) -> Option<(PathBuf, String)> {
    let components: Vec<&str> = relative.split('/').collect();
    let boundary = components
        .iter()
        .position(|component| component.ends_with(".asar"))?;
    if boundary + 1 >= components.len() {
        return None;
    }
    let archive: PathBuf = components[..=boundary].iter().collect();
    Some((archive, components[boundary + 1..].join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asar::{ArchiveEntry, ArchiveIntegrity};
    use crate::options::CompressionLevel;

    struct StubArchiver;

    impl ArchivePackager for StubArchiver {
        fn pack<'a>(
            &'a self,
            _stage_dir: &'a Path,
            _destination: &'a Path,
            _options: &'a AsarOptions,
            _unpack_patterns: &'a [String],
            _compression: CompressionLevel,
        ) -> BoxFuture<'a, Result<ArchiveIntegrity>> {
            Box::pin(async {
                Ok(ArchiveIntegrity {
                    algorithm: "SHA256".into(),
                    hash: String::new(),
                })
            })
        }

        fn stat<'a>(
            &'a self,
            _archive: &'a Path,
            _path: &'a str,
        ) -> BoxFuture<'a, Result<ArchiveEntry>> {
            Box::pin(async {
                Ok(ArchiveEntry {
                    exists: true,
                    is_file: true,
                })
            })
        }
    }

    #[tokio::test]
    async fn test_resolve_archiver_reuses_injected_instance() {
        let dir = tempfile::tempdir().unwrap();
        let app_info = AppInfo {
            product_name: "Foo".into(),
            name: "foo".into(),
            version: "1.0.0".into(),
            channel: None,
            main: None,
        };
        let packager = Packager::new(
            dir.path(),
            dir.path().join("out"),
            app_info,
            BuildOptions::default(),
            Box::new(LinuxSupport),
        )
        .with_archiver(Arc::new(StubArchiver));

        let first = packager.resolve_archiver().await.unwrap();
        let second = packager.resolve_archiver().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_sanity_check_names_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app_info = AppInfo {
            product_name: "Foo".into(),
            name: "foo".into(),
            version: "1.0.0".into(),
            channel: None,
            main: None,
        };
        let packager = Packager::new(
            dir.path(),
            dir.path().join("out"),
            app_info,
            BuildOptions::default(),
            Box::new(LinuxSupport),
        );
        let missing = dir.path().join("out").join("linux-unpacked");
        let context = PackContext {
            out_dir: dir.path().join("out"),
            app_out_dir: missing.clone(),
            arch: Arch::X64,
            electron_platform_name: "linux".into(),
        };
        let err = packager
            .sanity_check_package(&context, &missing.join("resources"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Integrity { .. }));
        assert!(err.to_string().contains("linux-unpacked"));
    }

    #[test]
    fn test_split_nested_archive() {
        let (archive, inner) = split_nested_archive("node_modules/lib.asar/index.js").unwrap();
        assert_eq!(archive, PathBuf::from("node_modules/lib.asar"));
        assert_eq!(inner, "index.js");
    }

    #[test]
    fn test_split_nested_archive_plain_path() {
        assert!(split_nested_archive("src/index.js").is_none());
    }

    #[test]
    fn test_split_nested_archive_boundary_is_last() {
        assert!(split_nested_archive("resources/app.asar").is_none());
    }

    #[test]
    fn test_unpacked_dir_names() {
        assert_eq!(Platform::Linux.unpacked_dir_name(Arch::X64), "linux-unpacked");
        assert_eq!(
            Platform::Linux.unpacked_dir_name(Arch::Arm64),
            "linux-arm64-unpacked"
        );
        assert_eq!(Platform::Mac.unpacked_dir_name(Arch::Arm64), "mac-arm64");
        assert_eq!(Platform::Windows.unpacked_dir_name(Arch::X64), "win-unpacked");
    }
}
