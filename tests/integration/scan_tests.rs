use doppelganger::duplicates::{DuplicateFinder, FinderConfig, FinderError, ScanEvent};
use doppelganger::scanner::ExtensionFilter;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn finder_for(roots: &[&Path], extensions: &[&str]) -> DuplicateFinder {
    let config = FinderConfig::default()
        .with_roots(roots.iter().map(|p| p.to_path_buf()).collect())
        .with_extensions(ExtensionFilter::new(extensions))
        .with_io_threads(2);
    DuplicateFinder::new(config).unwrap()
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let mut finder = finder_for(&[dir.path()], &[]);

    let report = finder.scan().unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert_eq!(report.stats.duplicate_groups, 0);
    assert!(report.issues.is_empty());
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"content a").unwrap();
    fs::write(dir.path().join("b.txt"), b"content bb").unwrap();
    fs::write(dir.path().join("c.txt"), b"content ccc").unwrap();

    let mut finder = finder_for(&[dir.path()], &[]);
    let report = finder.scan().unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.eliminated_by_size, 3);
    assert_eq!(report.summary.hashed, 0);
}

#[test]
fn test_same_size_different_content_is_not_a_duplicate() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"aaaa").unwrap();
    fs::write(dir.path().join("b.bin"), b"bbbb").unwrap();

    let mut finder = finder_for(&[dir.path()], &[]);
    let report = finder.scan().unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.candidates, 2);
    assert_eq!(report.summary.hashed, 2);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("a.txt"))
        .unwrap()
        .write_all(b"duplicate")
        .unwrap();
    File::create(dir.path().join("b.txt"))
        .unwrap()
        .write_all(b"duplicate")
        .unwrap();
    File::create(dir.path().join("c.txt"))
        .unwrap()
        .write_all(b"unique")
        .unwrap();

    let mut finder = finder_for(&[dir.path()], &[]);
    let report = finder.scan().unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.stats.redundant_files, 1);
    assert_eq!(report.stats.redundant_bytes, 9);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two").join("three");
    fs::create_dir_all(&deep).unwrap();
    fs::write(dir.path().join("top.dat"), b"nested content").unwrap();
    fs::write(deep.join("bottom.dat"), b"nested content").unwrap();

    let mut finder = finder_for(&[dir.path()], &[]);
    let report = finder.scan().unwrap();

    assert_eq!(report.groups.len(), 1);
    assert!(report.groups[0].contains(&canonical(&deep.join("bottom.dat"))));
}

#[test]
fn test_extension_filter_limits_scan() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();

    let photo = vec![7u8; 10_000_000];
    fs::write(a.join("x.jpg"), &photo).unwrap();
    fs::write(b.join("y.JPG"), &photo).unwrap();
    fs::write(b.join("z.png"), vec![1u8; 3_000_000]).unwrap();
    // Same content, excluded by extension
    fs::write(b.join("copy.bak"), &photo).unwrap();

    let mut finder = finder_for(&[&a, &b], &[".jpg"]);
    let report = finder.scan().unwrap();

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.size, 10_000_000);
    assert_eq!(
        group.paths,
        vec![canonical(&a.join("x.jpg")), canonical(&b.join("y.JPG"))]
    );
    assert_eq!(report.stats.redundant_bytes, 10_000_000);
    assert_eq!(report.summary.total_files, 2);
}

#[test]
fn test_empty_files_group_together() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty1"), b"").unwrap();
    fs::write(dir.path().join("empty2"), b"").unwrap();

    let mut finder = finder_for(&[dir.path()], &[]);
    let report = finder.scan().unwrap();
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size, 0);
    assert_eq!(report.stats.redundant_bytes, 0);

    let config = FinderConfig::default()
        .with_roots(vec![dir.path().to_path_buf()])
        .with_skip_empty(true);
    let mut finder = DuplicateFinder::new(config).unwrap();
    assert!(finder.scan().unwrap().groups.is_empty());
}

#[test]
fn test_groups_ordered_by_reclaimable_space() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("small1"), b"ab").unwrap();
    fs::write(dir.path().join("small2"), b"ab").unwrap();
    fs::write(dir.path().join("big1"), vec![3u8; 1000]).unwrap();
    fs::write(dir.path().join("big2"), vec![3u8; 1000]).unwrap();

    let mut finder = finder_for(&[dir.path()], &[]);
    let report = finder.scan().unwrap();

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].size, 1000);
    assert_eq!(report.groups[1].size, 2);
}

#[test]
fn test_scan_events_end_with_terminal_event() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();

    let mut finder = finder_for(&[dir.path()], &[]);
    let mut events = Vec::new();
    let report = finder.scan_with(|e| events.push(e.clone())).unwrap();

    assert!(matches!(
        events.first(),
        Some(ScanEvent::Walked { files: 2, candidates: 2 })
    ));
    match events.last() {
        Some(ScanEvent::Finished(last)) => assert_eq!(last.groups, report.groups),
        other => panic!("expected Finished, got {other:?}"),
    }
    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::Progress { completed, total } => Some((*completed, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.last(), Some(&(2, 2)));
}

#[test]
fn test_scan_without_roots_is_rejected() {
    let mut finder = DuplicateFinder::with_defaults().unwrap();
    assert!(matches!(finder.scan(), Err(FinderError::NoRoots)));
    assert!(finder.session().is_none());
}
