//! End-to-end scan behavior through the library interface.

use std::fs;
use std::path::PathBuf;

use finddup::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use finddup::scanner::DigestAlgorithm;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn two_roots_identical_pair_is_one_group() {
    let data = TempDir::new().unwrap();
    fs::create_dir(data.path().join("a")).unwrap();
    fs::create_dir(data.path().join("b")).unwrap();
    let x = write_file(&data, "a/x.txt", b"0123456789");
    write_file(&data, "a/z.txt", b"abcdefghij");
    let y = write_file(&data, "b/y.txt", b"0123456789");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .find_duplicates(&[data.path().join("a"), data.path().join("b")])
        .unwrap();

    assert_eq!(groups.len(), 1);
    let paths = groups[0].paths();
    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&x.canonicalize().unwrap()));
    assert!(paths.contains(&y.canonicalize().unwrap()));

    // z.txt shares a size with the pair but not content
    assert!(!paths.iter().any(|p| p.ends_with("z.txt")));
    assert_eq!(summary.total_files, 3);
    assert!(summary.warnings.is_empty());
}

#[test]
fn equal_size_different_content_never_grouped() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.bin", b"prefix-AAAA");
    write_file(&dir, "b.bin", b"prefix-BBBB");
    write_file(&dir, "c.bin", b"prefix-CCCC");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn identical_triple_appears_in_exactly_one_group() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "one.txt", b"copied content");
    write_file(&dir, "two.txt", b"copied content");
    write_file(&dir, "sub/three.txt", b"copied content");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 2 * 14);
}

#[test]
fn zero_byte_files_never_grouped() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "empty1.txt", b"");
    write_file(&dir, "empty2.txt", b"");
    write_file(&dir, "empty3.txt", b"");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_empty, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn scans_are_idempotent_on_unchanged_tree() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.txt", b"pair one");
    write_file(&dir, "b.txt", b"pair one");
    write_file(&dir, "c.txt", b"pair two!");
    write_file(&dir, "d.txt", b"pair two!");
    write_file(&dir, "unique.txt", b"no partner anywhere");

    let finder = DuplicateFinder::with_defaults();
    let roots = [dir.path().to_path_buf()];

    let (first, _) = finder.find_duplicates(&roots).unwrap();
    let (second, _) = finder.find_duplicates(&roots).unwrap();

    let snapshot = |groups: &[finddup::duplicates::DuplicateGroup]| {
        groups
            .iter()
            .map(|g| (g.size, g.paths()))
            .collect::<Vec<_>>()
    };
    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn groups_sorted_and_members_sorted() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "big1.bin", b"a much longer duplicate body");
    write_file(&dir, "big2.bin", b"a much longer duplicate body");
    write_file(&dir, "small2.bin", b"tiny");
    write_file(&dir, "small1.bin", b"tiny");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 2);
    assert!(groups[0].size < groups[1].size, "groups ordered by size");
    for group in &groups {
        let mut sorted = group.paths();
        sorted.sort();
        assert_eq!(group.paths(), sorted, "members ordered by path");
    }
}

#[test]
fn digest_chain_confirms_with_both_algorithms() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.txt", b"chained");
    write_file(&dir, "b.txt", b"chained");

    let config = FinderConfig::default()
        .with_digests(vec![DigestAlgorithm::Blake3, DigestAlgorithm::Sha256]);
    let finder = DuplicateFinder::new(config);
    let (groups, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 1);
    let labels = groups[0].digest_labels();
    assert!(labels[0].starts_with("blake3:"));
    assert!(labels[1].starts_with("sha256:"));
}

#[test]
fn missing_root_is_a_configuration_error() {
    let finder = DuplicateFinder::with_defaults();
    let err = finder
        .find_duplicates(&[PathBuf::from("/no/such/dir/finddup-test")])
        .unwrap_err();
    assert!(matches!(err, FinderError::Config(_)));
}

#[test]
fn file_as_root_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "plain.txt", b"not a directory");

    let finder = DuplicateFinder::with_defaults();
    let err = finder.find_duplicates(&[file]).unwrap_err();
    assert!(matches!(err, FinderError::Config(_)));
}
