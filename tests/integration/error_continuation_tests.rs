use doppelganger::duplicates::{hash_all, HashOutcome, ScanSession};
use doppelganger::duplicates::{DuplicateFinder, FinderConfig};
use doppelganger::error::FailureKind;
use doppelganger::pool::{ScanTicket, WorkerPool};
use doppelganger::scanner::{FileEntry, Hasher};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_missing_candidate_is_excluded_not_fatal() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    let gone = dir.path().join("gone.bin");
    fs::write(&a, b"0123456789").unwrap();
    fs::write(&b, b"0123456789").unwrap();

    let candidates = vec![
        FileEntry::new(a.clone(), 10),
        FileEntry::new(b.clone(), 10),
        FileEntry::new(gone.clone(), 10),
    ];

    let mut session = ScanSession::new(1);
    session.begin_hashing(&candidates);

    let pool = WorkerPool::new(2).unwrap();
    let hasher = Arc::new(Hasher::new());
    let outcomes = hash_all(&pool, &hasher, candidates, &ScanTicket::detached());

    let mut failed = 0;
    for outcome in outcomes.iter().take(3) {
        if matches!(outcome, HashOutcome::Failed(_)) {
            failed += 1;
        }
        session.record(outcome);
    }

    assert_eq!(failed, 1);
    assert!(session.is_complete());
    let groups = session.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![a, b]);
    assert_eq!(session.issues().len(), 1);
    assert_eq!(session.issues()[0].kind, FailureKind::HashReadFailure);
    assert_eq!(session.issues()[0].path, gone);
    assert!(!session.is_tracked(&gone));
}

#[test]
fn test_every_candidate_reports_exactly_once() {
    let dir = tempdir().unwrap();
    let candidates: Vec<FileEntry> = (0..40)
        .map(|i| {
            let path = dir.path().join(format!("f{i}"));
            fs::write(&path, [(i % 4) as u8; 16]).unwrap();
            FileEntry::new(path, 16)
        })
        .collect();

    let pool = WorkerPool::new(4).unwrap();
    let hasher = Arc::new(Hasher::new());
    let outcomes: Vec<_> = hash_all(&pool, &hasher, candidates, &ScanTicket::detached())
        .iter()
        .collect();

    assert_eq!(outcomes.len(), 40);
    assert!(outcomes.iter().all(|o| matches!(o, HashOutcome::Hashed(_))));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_becomes_issue() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"identical").unwrap();
    fs::write(dir.path().join("b"), b"identical").unwrap();
    let locked = dir.path().join("c");
    fs::write(&locked, b"identical").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file anyway
    if fs::read(&locked).is_ok() {
        return;
    }

    let config = FinderConfig::default().with_roots(vec![dir.path().to_path_buf()]);
    let report = DuplicateFinder::new(config).unwrap().scan().unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.summary.failed, 1);
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == FailureKind::HashReadFailure));
}

#[cfg(unix)]
#[test]
fn test_unlistable_directory_becomes_issue() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"identical").unwrap();
    fs::write(dir.path().join("b"), b"identical").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c"), b"identical").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can list the directory anyway
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let config = FinderConfig::default().with_roots(vec![dir.path().to_path_buf()]);
    let report = DuplicateFinder::new(config).unwrap().scan().unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    let unreadable: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.kind == FailureKind::EntryUnreadable)
        .collect();
    assert_eq!(unreadable.len(), 1);
    assert!(unreadable[0].path.ends_with("locked"));
}
