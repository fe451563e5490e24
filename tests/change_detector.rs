// tests/change_detector.rs

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use wind::config::WatchConfig;
use wind::errors::WindError;
use wind::fs::mock::MockFileSystem;
use wind::fs::RealFileSystem;
use wind::watch::ChangeDetector;
use wind_test_utils::builders::ProjectFixture;
use wind_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn sample_project() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("main.go");
    fs.add_file("internal/handlers/user.go");
    fs.add_file("web/templates/index.html");
    fs.add_file("web/static/site.css");
    fs.add_file("README.md");
    fs.add_file("vendor/github.com/lib/pq/conn.go");
    fs.add_file("node_modules/left-pad/index.js");
    fs.add_file("tmp/main");
    fs
}

fn detector_for(fs: &MockFileSystem) -> ChangeDetector {
    let config = WatchConfig::new(".", "go build -o ./tmp/main .");
    ChangeDetector::from_config(Arc::new(fs.clone()), &config)
}

#[test]
fn baseline_scan_tracks_only_eligible_files() -> TestResult {
    init_tracing();
    let fs = sample_project();
    let mut detector = detector_for(&fs);

    let tracked = detector.scan_files()?;

    assert_eq!(tracked, 4);
    assert_eq!(
        detector.index().paths(),
        vec![
            "internal/handlers/user.go",
            "main.go",
            "web/static/site.css",
            "web/templates/index.html",
        ]
    );
    Ok(())
}

#[test]
fn unchanged_tree_reports_no_change() -> TestResult {
    let fs = sample_project();
    let mut detector = detector_for(&fs);
    detector.scan_files()?;

    assert!(!detector.check_for_changes()?);
    assert!(!detector.check_for_changes()?);
    Ok(())
}

#[test]
fn modified_file_is_reported_once() -> TestResult {
    init_tracing();
    let fs = sample_project();
    let mut detector = detector_for(&fs);
    detector.scan_files()?;

    let before = detector.index().get("main.go");
    fs.touch("main.go").ok_or("main.go missing")?;

    assert!(detector.check_for_changes()?);
    assert!(detector.index().get("main.go") > before);
    // The index now holds the new time, so the next poll is quiet.
    assert!(!detector.check_for_changes()?);
    Ok(())
}

#[test]
fn older_modification_time_is_not_a_change() -> TestResult {
    let fs = sample_project();
    let mut detector = detector_for(&fs);
    detector.scan_files()?;

    let recorded = detector.index().get("main.go").ok_or("main.go not tracked")?;
    fs.set_modified("main.go", recorded - Duration::from_secs(60));

    assert!(!detector.check_for_changes()?);
    assert_eq!(detector.index().get("main.go"), Some(recorded));
    Ok(())
}

#[test]
fn new_file_is_tracked_but_not_a_change() -> TestResult {
    let fs = sample_project();
    let mut detector = detector_for(&fs);
    detector.scan_files()?;

    fs.add_file("internal/handlers/order.go");

    let report = detector.scan()?;
    assert!(!report.has_changes());
    assert_eq!(report.new_files, vec!["internal/handlers/order.go".to_string()]);
    assert!(detector.index().contains("internal/handlers/order.go"));

    // Modifying it afterwards is a change.
    fs.touch("internal/handlers/order.go");
    assert!(detector.check_for_changes()?);
    Ok(())
}

#[test]
fn changes_inside_excluded_dirs_are_never_seen() -> TestResult {
    let fs = sample_project();
    let mut detector = detector_for(&fs);
    detector.scan_files()?;

    fs.touch("vendor/github.com/lib/pq/conn.go");
    fs.add_file("tmp/build-errors.json");
    fs.touch("node_modules/left-pad/index.js");

    assert!(!detector.check_for_changes()?);
    assert!(detector.index().paths().iter().all(|p| !p.contains("vendor")));
    Ok(())
}

#[test]
fn excluded_dirs_are_not_read() -> TestResult {
    let fs = sample_project();
    // Reading vendor/ would fail the whole scan.
    fs.fail_read_dir("vendor");
    let mut detector = detector_for(&fs);

    assert_eq!(detector.scan_files()?, 4);
    Ok(())
}

#[test]
fn deleted_file_keeps_its_index_entry() -> TestResult {
    let fs = sample_project();
    let mut detector = detector_for(&fs);
    detector.scan_files()?;

    fs.remove("web/static/site.css");

    assert!(!detector.check_for_changes()?);
    assert!(detector.index().contains("web/static/site.css"));
    assert_eq!(detector.index().len(), 4);
    Ok(())
}

#[test]
fn failed_scan_leaves_index_untouched() -> TestResult {
    init_tracing();
    let fs = sample_project();
    let mut detector = detector_for(&fs);
    detector.scan_files()?;
    let snapshot = detector.index().clone();

    fs.touch("main.go");
    fs.add_file("web/templates/new.html");
    fs.fail_read_dir("web/templates");

    let err = detector.check_for_changes().unwrap_err();
    assert!(matches!(err, WindError::ScanError(_)), "got {err:?}");
    assert_eq!(detector.index().paths(), snapshot.paths());
    assert_eq!(detector.index().get("main.go"), snapshot.get("main.go"));

    // Once the directory is readable again the pending change shows up.
    fs.heal_read_dir("web/templates");
    assert!(detector.check_for_changes()?);
    assert!(detector.index().contains("web/templates/new.html"));
    Ok(())
}

#[test]
fn real_filesystem_scan_detects_mtime_changes() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    project.write("main.go", "package main\n");
    project.write("internal/db/db.go", "package db\n");
    project.write("vendor/x/x.go", "package x\n");
    project.write("README.md", "# app\n");

    let base = SystemTime::now() - Duration::from_secs(3600);
    project.set_mtime("main.go", base);
    project.set_mtime("internal/db/db.go", base);

    let config = WatchConfig::new(project.root(), "go build .");
    let mut detector = ChangeDetector::from_config(Arc::new(RealFileSystem), &config);

    assert_eq!(detector.scan_files()?, 2);
    assert!(!detector.check_for_changes()?);

    project.bump_mtime("internal/db/db.go", 10);
    assert!(detector.check_for_changes()?);
    assert!(!detector.check_for_changes()?);
    Ok(())
}

#[test]
fn real_filesystem_scan_fails_for_missing_root() {
    let project = ProjectFixture::new();
    let config = WatchConfig::new(project.path("does-not-exist"), "go build .");
    let mut detector = ChangeDetector::from_config(Arc::new(RealFileSystem), &config);

    assert!(matches!(detector.scan_files(), Err(WindError::ScanError(_))));
    assert!(detector.index().is_empty());
}

#[cfg(unix)]
#[test]
fn dangling_symlink_does_not_break_the_scan() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    project.write("main.go", "package main\n");
    project.set_mtime("main.go", SystemTime::now() - Duration::from_secs(3600));

    let config = WatchConfig::new(project.root(), "go build .");
    let mut detector = ChangeDetector::from_config(Arc::new(RealFileSystem), &config);
    detector.scan_files()?;

    // Emacs keeps a lock link like this while a buffer has unsaved edits.
    std::os::unix::fs::symlink("user@host.1234:1700000000", project.path(".#main.go"))?;
    project.bump_mtime("main.go", 10);

    assert!(detector.check_for_changes()?);
    assert!(detector.index().contains(".#main.go"));
    assert!(!detector.check_for_changes()?);
    Ok(())
}
