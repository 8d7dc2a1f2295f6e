use doppelganger::actions::DeleteConfig;
use doppelganger::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use doppelganger::error::FailureKind;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn scanned_finder(root: &Path) -> DuplicateFinder {
    let config = FinderConfig::default()
        .with_roots(vec![root.to_path_buf()])
        .with_io_threads(2);
    let mut finder = DuplicateFinder::new(config).unwrap();
    finder.scan().unwrap();
    finder
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

#[test]
fn test_removing_one_of_two_dissolves_group() {
    let dir = tempdir().unwrap();
    let x = dir.path().join("x.jpg");
    let y = dir.path().join("y.jpg");
    fs::write(&x, b"photo bytes").unwrap();
    fs::write(&y, b"photo bytes").unwrap();

    let mut finder = scanned_finder(dir.path());
    let removal = finder
        .request_removal(&[canonical(&y)], &DeleteConfig::permanent())
        .unwrap();

    assert_eq!(removal.removed_count(), 1);
    assert_eq!(removal.dissolved_groups, 1);
    assert_eq!(removal.stats.duplicate_groups, 0);
    assert!(!y.exists());
    assert!(x.exists());

    let session = finder.session().unwrap();
    assert!(session.groups().is_empty());
    assert!(!session.is_tracked(&canonical(&x)));
}

#[test]
fn test_removing_one_of_three_keeps_group() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"triplet").unwrap();
    }

    let mut finder = scanned_finder(dir.path());
    let removal = finder
        .request_removal(&[dir.path().join("c")], &DeleteConfig::permanent())
        .unwrap();

    assert_eq!(removal.removed_count(), 1);
    assert_eq!(removal.dissolved_groups, 0);
    let groups = finder.session().unwrap().groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_untracked_path_is_refused_and_kept() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"pair").unwrap();
    fs::write(dir.path().join("b"), b"pair").unwrap();
    let bystander = dir.path().join("unique.txt");
    fs::write(&bystander, b"not a duplicate").unwrap();

    let mut finder = scanned_finder(dir.path());
    let removal = finder
        .request_removal(&[bystander.clone()], &DeleteConfig::permanent())
        .unwrap();

    assert_eq!(removal.removed_count(), 0);
    assert_eq!(removal.outcomes.len(), 1);
    let issue = removal.outcomes[0].result.as_ref().unwrap_err();
    assert_eq!(issue.kind, FailureKind::RemovalFailure);
    assert!(bystander.exists());
    assert_eq!(finder.session().unwrap().groups().len(), 1);
}

#[test]
fn test_same_size_unique_file_is_refused() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"pair").unwrap();
    fs::write(dir.path().join("b"), b"pair").unwrap();
    // Hashed because its size matches, but its content is unique
    let lookalike = dir.path().join("c");
    fs::write(&lookalike, b"diff").unwrap();

    let mut finder = scanned_finder(dir.path());
    let removal = finder
        .request_removal(&[lookalike.clone()], &DeleteConfig::permanent())
        .unwrap();

    assert_eq!(removal.removed_count(), 0);
    assert!(lookalike.exists());
}

#[test]
fn test_vanished_file_does_not_block_others() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"trio").unwrap();
    }
    let mut finder = scanned_finder(dir.path());

    let gone = canonical(&dir.path().join("b"));
    fs::remove_file(&gone).unwrap();
    let removal = finder
        .request_removal(
            &[gone.clone(), canonical(&dir.path().join("c"))],
            &DeleteConfig::permanent(),
        )
        .unwrap();

    assert_eq!(removal.removed_count(), 1);
    assert!(!removal.outcomes[0].is_removed());
    assert!(removal.outcomes[1].is_removed());
    // Failed removals are not retracted
    assert!(finder.session().unwrap().is_tracked(&gone));
    assert!(finder
        .session()
        .unwrap()
        .issues()
        .iter()
        .any(|i| i.kind == FailureKind::RemovalFailure));
}

#[test]
fn test_removal_without_scan() {
    let mut finder = DuplicateFinder::with_defaults().unwrap();
    let result = finder.request_removal(&[PathBuf::from("/tmp/x")], &DeleteConfig::permanent());
    assert!(matches!(result, Err(FinderError::NoSession)));
}

#[test]
fn test_repeated_path_gets_one_outcome_per_request() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"pair").unwrap();
    fs::write(&b, b"pair").unwrap();

    let mut finder = scanned_finder(dir.path());
    let removal = finder
        .request_removal(&[b.clone(), canonical(&b)], &DeleteConfig::permanent())
        .unwrap();

    assert_eq!(removal.outcomes.len(), 2);
    assert!(removal.outcomes[0].is_removed());
    assert_eq!(removal.outcomes[0], removal.outcomes[1]);
    assert_eq!(removal.dissolved_groups, 1);
    assert!(!b.exists());
    assert!(a.exists());
    assert!(finder.session().unwrap().issues().is_empty());
}
