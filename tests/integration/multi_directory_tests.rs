use doppelganger::duplicates::{DuplicateFinder, FinderConfig};
use doppelganger::error::FailureKind;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn scan(roots: Vec<PathBuf>) -> doppelganger::duplicates::ScanReport {
    let config = FinderConfig::default().with_roots(roots).with_io_threads(2);
    DuplicateFinder::new(config).unwrap().scan().unwrap()
}

#[test]
fn test_duplicates_across_roots() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();
    fs::write(a.join("report.pdf"), b"quarterly numbers").unwrap();
    fs::write(b.join("report-copy.pdf"), b"quarterly numbers").unwrap();

    let report = scan(vec![a.clone(), b.clone()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.summary.roots.len(), 2);
    assert_eq!(report.summary.total_files, 2);
}

#[test]
fn test_nested_root_counts_files_once() {
    let dir = tempdir().unwrap();
    let inner = dir.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("a.txt"), b"same bytes").unwrap();
    fs::write(dir.path().join("b.txt"), b"same bytes").unwrap();

    let report = scan(vec![dir.path().to_path_buf(), inner.clone()]);

    // inner/a.txt is reachable from both roots but must not pair with itself
    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
}

#[test]
fn test_same_root_spelled_differently() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("only.txt"), b"lonely").unwrap();
    fs::write(dir.path().join("other.txt"), b"lonely").unwrap();

    let report = scan(vec![dir.path().to_path_buf(), sub.join("..")]);

    assert_eq!(report.summary.roots.len(), 1);
    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.groups[0].len(), 2);
}

#[test]
fn test_missing_root_is_reported_and_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"twin").unwrap();
    fs::write(dir.path().join("b"), b"twin").unwrap();
    let missing = dir.path().join("does-not-exist");

    let report = scan(vec![missing.clone(), dir.path().to_path_buf()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, FailureKind::FilesystemUnreachable);
    assert_eq!(report.issues[0].path, missing);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("real.txt"), b"real content").unwrap();

    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    symlink(target.join("real.txt"), root.join("link.txt")).unwrap();
    symlink(&target, root.join("linked-dir")).unwrap();
    symlink(&root, root.join("loop")).unwrap();
    fs::write(root.join("copy.txt"), b"real content").unwrap();

    let report = scan(vec![root]);

    assert_eq!(report.summary.total_files, 1);
    assert!(report.groups.is_empty());
}
