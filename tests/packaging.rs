//! End-to-end pipeline tests over a temporary project.

use app_packager::{
    asar::{ArchiveEntry, ArchiveIntegrity, ArchivePackager},
    options::{AsarConfig, AsarOptions, CompressionLevel},
    packager::LinuxSupport,
    AppInfo, Arch, BoxFuture, BuildOptions, Error, Hooks, Packager, Result,
};
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tokio_util::sync::CancellationToken;

/// Archive collaborator that records its invocations and reports every
/// queried path as an existing regular file.
#[derive(Default)]
struct RecordingArchiver {
    packs: Mutex<Vec<(PathBuf, PathBuf)>>,
    stats: Mutex<Vec<(PathBuf, String)>>,
}

impl ArchivePackager for RecordingArchiver {
    fn pack<'a>(
        &'a self,
        stage_dir: &'a Path,
        destination: &'a Path,
        _options: &'a AsarOptions,
        _unpack_patterns: &'a [String],
        _compression: CompressionLevel,
    ) -> BoxFuture<'a, Result<ArchiveIntegrity>> {
        Box::pin(async move {
            std::fs::write(destination, b"container").unwrap();
            self.packs
                .lock()
                .unwrap()
                .push((stage_dir.to_path_buf(), destination.to_path_buf()));
            Ok(ArchiveIntegrity {
                algorithm: "SHA256".into(),
                hash: "00".into(),
            })
        })
    }

    fn stat<'a>(&'a self, archive: &'a Path, path: &'a str) -> BoxFuture<'a, Result<ArchiveEntry>> {
        Box::pin(async move {
            self.stats
                .lock()
                .unwrap()
                .push((archive.to_path_buf(), path.to_string()));
            Ok(ArchiveEntry {
                exists: true,
                is_file: true,
            })
        })
    }
}

fn app_info() -> AppInfo {
    AppInfo {
        product_name: "Test App".into(),
        name: "test-app".into(),
        version: "1.2.3".into(),
        channel: None,
        main: None,
    }
}

/// Project with an entry file and manifest, plus a runtime dist carrying a
/// license and a stale version marker.
fn scaffold(root: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let project = root.join("project");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join("index.js"), "require('./lib')\n").unwrap();
    std::fs::write(
        project.join("package.json"),
        r#"{"name":"test-app","version":"1.2.3","main":"index.js"}"#,
    )
    .unwrap();

    let dist = root.join("dist");
    std::fs::create_dir_all(&dist).unwrap();
    std::fs::write(dist.join("electron"), b"#!/bin/sh\n").unwrap();
    std::fs::write(dist.join("LICENSE"), "runtime license\n").unwrap();
    std::fs::write(dist.join("version"), "v99.0.0\n").unwrap();

    (project, dist)
}

fn options(dist: std::path::PathBuf) -> BuildOptions {
    BuildOptions {
        asar: Some(AsarConfig::Toggle(false)),
        runtime_dist: Some(dist),
        ..BuildOptions::default()
    }
}

#[tokio::test]
async fn test_pack_produces_unpacked_tree_and_tarball() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    let out_dir = dir.path().join("out");

    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options(dist),
        Box::new(LinuxSupport),
    );
    let context = packager
        .pack(Arch::X64, &["dir".into(), "tar.gz".into()], None)
        .await
        .unwrap();

    let app_out = out_dir.join("linux-unpacked");
    assert_eq!(context.app_out_dir, app_out);
    assert_eq!(context.electron_platform_name, "linux");

    // runtime unpacked, license renamed, stale marker removed
    assert!(app_out.join("electron").is_file());
    assert!(app_out.join("LICENSE.runtime.txt").is_file());
    assert!(!app_out.join("LICENSE").exists());
    assert!(!app_out.join("version").exists());

    // application files copied as a plain tree (asar disabled)
    let app = app_out.join("resources").join("app");
    assert!(app.join("index.js").is_file());
    assert!(app.join("package.json").is_file());

    assert!(out_dir.join("test-app-1.2.3-x64.tar.gz").is_file());
}

#[tokio::test]
async fn test_extra_resources_honor_cross_group_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    std::fs::create_dir_all(project.join("assets")).unwrap();
    std::fs::write(project.join("assets").join("logo.png"), b"png").unwrap();
    std::fs::write(project.join("assets").join("debug.map"), b"map").unwrap();
    let out_dir = dir.path().join("out");

    let mut options = options(dist);
    options.extra_resources = vec!["assets/**/*".into()];
    // the main group's exclusion must suppress matches in the extra group too
    options.files = vec!["**/*".into(), "!**/*.map".into()];

    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options,
        Box::new(LinuxSupport),
    );
    packager.pack(Arch::X64, &["dir".into()], None).await.unwrap();

    let resources = out_dir.join("linux-unpacked").join("resources");
    assert!(resources.join("assets").join("logo.png").is_file());
    assert!(!resources.join("assets").join("debug.map").exists());
    assert!(!resources.join("app").join("assets").join("debug.map").exists());
}

#[tokio::test]
async fn test_hooks_run_in_pipeline_order() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    let out_dir = dir.path().join("out");

    let after_pack_ran = Arc::new(AtomicBool::new(false));
    let after_sign_ran = Arc::new(AtomicBool::new(false));
    let pack_flag = after_pack_ran.clone();
    let sign_flag = after_sign_ran.clone();
    let sign_flag_read = after_sign_ran.clone();

    let hooks = Hooks {
        after_pack: Some(Arc::new(move |_ctx| {
            let pack_flag = pack_flag.clone();
            let sign_flag = sign_flag_read.clone();
            Box::pin(async move {
                assert!(!sign_flag.load(Ordering::SeqCst));
                pack_flag.store(true, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            })
        })),
        after_sign: Some(Arc::new(move |_ctx| {
            let sign_flag = sign_flag.clone();
            Box::pin(async move {
                sign_flag.store(true, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            })
        })),
        ..Hooks::default()
    };

    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options(dist),
        Box::new(LinuxSupport),
    )
    .with_hooks(hooks);
    packager.pack(Arch::X64, &["dir".into()], None).await.unwrap();

    assert!(after_pack_ran.load(Ordering::SeqCst));
    assert!(after_sign_ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_cancellation_stops_before_targets_without_rollback() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    let out_dir = dir.path().join("out");

    let token = CancellationToken::new();
    token.cancel();

    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options(dist),
        Box::new(LinuxSupport),
    )
    .with_cancellation(token);
    packager
        .pack(Arch::X64, &["tar.gz".into()], None)
        .await
        .unwrap();

    // copied files are left in place, but no artifact is built
    let app_out = out_dir.join("linux-unpacked");
    assert!(app_out.join("resources").join("app").join("index.js").is_file());
    assert!(!out_dir.join("test-app-1.2.3-x64.tar.gz").exists());
}

#[tokio::test]
async fn test_sanity_check_rejects_missing_entry_file() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    std::fs::remove_file(project.join("index.js")).unwrap();
    let out_dir = dir.path().join("out");

    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options(dist),
        Box::new(LinuxSupport),
    );
    let err = packager
        .pack(Arch::X64, &["dir".into()], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Integrity { .. }));
    assert!(err.to_string().contains("index.js"));
}

#[tokio::test]
async fn test_prepackaged_dir_skips_packing() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    let out_dir = dir.path().join("out");

    // a prepared tree from an earlier run
    let prepackaged = dir.path().join("prepackaged");
    std::fs::create_dir_all(prepackaged.join("resources").join("app")).unwrap();
    std::fs::write(prepackaged.join("binary"), b"x").unwrap();

    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options(dist),
        Box::new(LinuxSupport),
    );
    let context = packager
        .pack(Arch::X64, &["tar.gz".into()], Some(&prepackaged))
        .await
        .unwrap();

    assert_eq!(context.app_out_dir, prepackaged);
    // nothing was unpacked into the regular output location
    assert!(!out_dir.join("linux-unpacked").exists());
    // but the target still ran against the prepackaged tree
    assert!(out_dir.join("test-app-1.2.3-x64.tar.gz").is_file());
}

#[tokio::test]
async fn test_force_code_signing_fails_unsigned_build() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    let out_dir = dir.path().join("out");

    let mut options = options(dist);
    options.force_code_signing = true;

    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options,
        Box::new(LinuxSupport),
    );
    let err = packager
        .pack(Arch::X64, &["dir".into()], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_asar_enabled_pack_stages_container_and_checks_entries_inside() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    let out_dir = dir.path().join("out");

    let mut options = options(dist);
    options.asar = Some(AsarConfig::Toggle(true));

    let archiver = Arc::new(RecordingArchiver::default());
    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options,
        Box::new(LinuxSupport),
    )
    .with_archiver(archiver.clone());
    packager.pack(Arch::X64, &["dir".into()], None).await.unwrap();

    let resources = out_dir.join("linux-unpacked").join("resources");
    let container = resources.join("app.asar");
    assert!(container.is_file());
    // no loose application tree, and the staging directory was removed
    assert!(!resources.join("app").join("index.js").exists());
    assert!(!out_dir.join("app-stage-x64").exists());

    let packs = archiver.packs.lock().unwrap();
    assert_eq!(packs.len(), 1);
    assert_eq!(packs[0].0, out_dir.join("app-stage-x64"));
    assert_eq!(packs[0].1, container);

    // the sanity check located both files through the container, not on disk
    let stats = archiver.stats.lock().unwrap();
    let queried: Vec<&str> = stats.iter().map(|(_, path)| path.as_str()).collect();
    assert_eq!(queried, ["index.js", "package.json"]);
    assert!(stats.iter().all(|(archive, _)| archive == &container));
}

#[tokio::test]
async fn test_prebuilt_container_is_copied_opaquely() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    std::fs::write(project.join("app.asar"), b"prebuilt-bytes").unwrap();
    let out_dir = dir.path().join("out");

    let archiver = Arc::new(RecordingArchiver::default());
    let packager = Packager::new(
        &project,
        &out_dir,
        app_info(),
        options(dist),
        Box::new(LinuxSupport),
    )
    .with_archiver(archiver.clone());
    packager.pack(Arch::X64, &["dir".into()], None).await.unwrap();

    // copied byte for byte, never rebuilt from the file set
    let container = out_dir.join("linux-unpacked").join("resources").join("app.asar");
    assert_eq!(std::fs::read(&container).unwrap(), b"prebuilt-bytes");
    assert!(archiver.packs.lock().unwrap().is_empty());

    // the sanity check still runs against the copied container
    let stats = archiver.stats.lock().unwrap();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|(archive, _)| archive == &container));
}

#[tokio::test]
async fn test_entry_path_inside_nested_container_is_checked_through_it() {
    let dir = tempfile::tempdir().unwrap();
    let (project, dist) = scaffold(dir.path());
    std::fs::create_dir_all(project.join("node_modules")).unwrap();
    std::fs::write(project.join("node_modules").join("lib.asar"), b"inner").unwrap();
    let out_dir = dir.path().join("out");

    let mut app_info = app_info();
    app_info.main = Some("node_modules/lib.asar/dist/main.js".into());

    let archiver = Arc::new(RecordingArchiver::default());
    let packager = Packager::new(
        &project,
        &out_dir,
        app_info,
        options(dist),
        Box::new(LinuxSupport),
    )
    .with_archiver(archiver.clone());
    packager.pack(Arch::X64, &["dir".into()], None).await.unwrap();

    // the outer package is a plain tree, so only the nested container is
    // consulted and only for the portion of the path inside it
    assert!(archiver.packs.lock().unwrap().is_empty());
    let stats = archiver.stats.lock().unwrap();
    let app = out_dir.join("linux-unpacked").join("resources").join("app");
    assert_eq!(
        *stats,
        [(app.join("node_modules").join("lib.asar"), "dist/main.js".to_string())]
    );
}
