use doppelganger::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

fn populated_dir() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("f{i}")), [(i % 2) as u8; 64]).unwrap();
    }
    dir
}

#[test]
fn test_newer_scan_supersedes_older() {
    let dir = populated_dir();
    let config = FinderConfig::default()
        .with_roots(vec![dir.path().to_path_buf()])
        .with_io_threads(2);
    let mut finder = DuplicateFinder::new(config).unwrap();

    let first = finder.start_scan().unwrap();
    let second = finder.start_scan().unwrap();
    assert!(second.generation() > first.generation());

    // Whether the old scan noticed mid-flight or finished first, its
    // session can never become current.
    let stale = first
        .wait()
        .and_then(|session| finder.adopt(session).map(|_| ()));
    assert!(matches!(stale, Err(FinderError::Superseded)));

    let session = second.wait().unwrap();
    let current = finder.adopt(session).unwrap();
    assert_eq!(current.groups().len(), 2);
}

#[test]
fn test_shutdown_flag_interrupts_scan() {
    let dir = populated_dir();
    let flag = Arc::new(AtomicBool::new(false));
    let config = FinderConfig::default()
        .with_roots(vec![dir.path().to_path_buf()])
        .with_shutdown_flag(Arc::clone(&flag));
    let mut finder = DuplicateFinder::new(config).unwrap();

    flag.store(true, Ordering::SeqCst);
    let result = finder.scan();

    assert!(matches!(result, Err(FinderError::Interrupted)));
    assert!(finder.session().is_none());
}

#[test]
fn test_rescan_replaces_session() {
    let dir = populated_dir();
    let config = FinderConfig::default().with_roots(vec![dir.path().to_path_buf()]);
    let mut finder = DuplicateFinder::new(config).unwrap();

    let first = finder.scan().unwrap();
    fs::write(dir.path().join("extra"), [9u8; 64]).unwrap();
    fs::write(dir.path().join("extra2"), [9u8; 64]).unwrap();
    let second = finder.scan().unwrap();

    assert_eq!(first.groups.len(), 2);
    assert_eq!(second.groups.len(), 3);
    assert_eq!(finder.session().unwrap().groups().len(), 3);
}
