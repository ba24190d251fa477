// Tests for the per-file shred protocol
//
// Hard links are used to observe what happened to a file's data after its
// name is gone: the second link keeps the inode alive, so its content shows
// exactly what the overwrite passes left behind.

use super::*;
use crate::ErrorClass;
use std::fs;
use tempfile::TempDir;
use test_case::test_case;

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn dir_entries(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ==================== VALIDATION TESTS ====================

#[test]
fn test_missing_path_is_skipped_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let bystander = write_file(&dir, "keep.txt", b"keep me");

    let result = shred(&dir.path().join("ghost.txt"), DeletionMethod::DoD3);

    assert!(matches!(result, ShredResult::SkippedNotFound));
    assert_eq!(dir_entries(&dir), vec!["keep.txt"]);
    assert_eq!(fs::read(bystander).unwrap(), b"keep me");
}

#[test]
fn test_directory_is_rejected() {
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    match shred(&sub, DeletionMethod::ZeroFill) {
        ShredResult::Failed(e) => {
            assert!(matches!(e, ShredError::NotRegularFile { .. }));
            assert_eq!(e.class(), ErrorClass::InvalidInput);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(sub.is_dir(), "directory must be left alone");
}

// ==================== PROTOCOL TESTS ====================

#[test_case(DeletionMethod::ZeroFill ; "zerofill")]
#[test_case(DeletionMethod::DoD3 ; "dod3")]
#[test_case(DeletionMethod::DoD7 ; "dod7")]
#[test_case(DeletionMethod::Gutmann ; "gutmann")]
#[test_case(DeletionMethod::Random(2) ; "random2")]
#[test_case(DeletionMethod::Simple ; "simple")]
fn test_shred_removes_file_and_leaves_no_sibling(method: DeletionMethod) {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "secret.txt", b"the launch codes are 0000");

    let result = shred(&path, method);

    assert!(result.is_deleted(), "{:?}", result);
    assert!(!path.exists());
    assert!(dir_entries(&dir).is_empty(), "no renamed leftovers");
}

#[test]
fn test_zero_fill_overwrites_ten_bytes_before_unlink() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ten.bin", b"0123456789");
    let shredder = Shredder::new(DeletionMethod::ZeroFill);

    shredder.overwrite_in_place(&path).unwrap();

    // Intercepted pre-unlink content
    assert_eq!(fs::read(&path).unwrap(), vec![0u8; 10]);

    assert!(shredder.shred(&path).is_deleted());
    assert!(!path.exists());
}

#[test]
fn test_overwrite_keeps_file_length() {
    let dir = TempDir::new().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let path = write_file(&dir, "data.bin", &content);

    Shredder::new(DeletionMethod::Gutmann)
        .overwrite_in_place(&path)
        .unwrap();

    let after = fs::read(&path).unwrap();
    assert_eq!(after.len(), content.len());
    // Gutmann pass 35 reuses pattern 14 (0x88)
    assert!(after.iter().all(|&b| b == 0x88));
}

#[cfg(unix)]
#[test_case(DeletionMethod::DoD3, Some(0x00) ; "dod3 ends with zeros")]
#[test_case(DeletionMethod::DoD7, Some(0x00) ; "dod7 ends with zeros")]
#[test_case(DeletionMethod::ZeroFill, Some(0x00) ; "zerofill")]
#[test_case(DeletionMethod::Gutmann, Some(0x88) ; "gutmann last pass")]
#[test_case(DeletionMethod::Random(1), None ; "random")]
fn test_data_is_destroyed_in_place(method: DeletionMethod, last_byte: Option<u8>) {
    let dir = TempDir::new().unwrap();
    let original = vec![0x5Au8; 4096];
    let path = write_file(&dir, "victim.bin", &original);
    let witness = dir.path().join("witness.bin");
    fs::hard_link(&path, &witness).unwrap();

    assert!(shred(&path, method).is_deleted());

    let remains = fs::read(&witness).unwrap();
    assert_eq!(remains.len(), original.len());
    assert_ne!(remains, original, "pre-shred content survived");
    if let Some(byte) = last_byte {
        assert!(remains.iter().all(|&b| b == byte));
    }
    assert_eq!(dir_entries(&dir), vec!["witness.bin"]);
}

#[cfg(unix)]
#[test]
fn test_simple_delete_does_not_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "plain.txt", b"untouched bytes");
    let witness = dir.path().join("witness.txt");
    fs::hard_link(&path, &witness).unwrap();

    assert!(shred(&path, DeletionMethod::Simple).is_deleted());

    assert_eq!(fs::read(&witness).unwrap(), b"untouched bytes");
}

#[cfg(unix)]
#[test]
fn test_symlink_is_removed_but_target_kept() {
    let dir = TempDir::new().unwrap();
    let target = write_file(&dir, "target.txt", b"outside data");
    let link = dir.path().join("link.txt");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    assert!(shred(&link, DeletionMethod::DoD7).is_deleted());

    assert!(fs::symlink_metadata(&link).is_err());
    assert_eq!(fs::read(&target).unwrap(), b"outside data");
}

#[cfg(unix)]
#[test]
fn test_overwrite_refuses_symlink_at_open() {
    let dir = TempDir::new().unwrap();
    let target = write_file(&dir, "target.txt", b"outside data");
    let link = dir.path().join("link.txt");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let err = Shredder::new(DeletionMethod::ZeroFill)
        .overwrite_in_place(&link)
        .unwrap_err();

    assert!(matches!(err, ShredError::Io { stage: ShredStage::Open, .. }));
    assert_eq!(fs::read(&target).unwrap(), b"outside data");
}

#[test]
fn test_empty_file_is_deleted() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty", b"");

    assert!(shred(&path, DeletionMethod::DoD3).is_deleted());
    assert!(!path.exists());
}

// ==================== RENAME TESTS ====================

#[test]
fn test_rename_stays_in_parent_with_clamped_length() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.txt", b"x");

    let renamed = rename_to_obfuscated(&path).unwrap();

    assert_eq!(renamed.parent(), Some(dir.path()));
    let name = renamed.file_name().unwrap().to_str().unwrap();
    assert_eq!(name.len(), MIN_OBFUSCATED_LEN);
    assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(!path.exists());
    assert_eq!(fs::read(&renamed).unwrap(), b"x");
}

#[test]
fn test_rename_matches_original_name_length() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "quarterly-report-final.xlsx", b"x");

    let renamed = rename_to_obfuscated(&path).unwrap();

    assert_eq!(
        renamed.file_name().unwrap().len(),
        "quarterly-report-final.xlsx".len()
    );
}

#[test]
fn test_rename_of_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    assert!(rename_to_obfuscated(&dir.path().join("nope")).is_err());
}

fn failing_renamer(_: &Path) -> io::Result<PathBuf> {
    Err(io::Error::new(io::ErrorKind::PermissionDenied, "rename refused"))
}

#[test]
fn test_failed_rename_still_unlinks_original() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "stubborn.txt", b"rename will fail");
    let shredder = Shredder::new(DeletionMethod::DoD3).with_renamer(failing_renamer);

    let result = shredder.shred(&path);

    assert!(result.is_deleted(), "{:?}", result);
    assert!(!path.exists());
    assert!(dir_entries(&dir).is_empty());
}

#[cfg(unix)]
#[test]
fn test_failed_rename_still_overwrites_first() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "stubborn.bin", &[0x5A; 2048]);
    let witness = dir.path().join("witness.bin");
    fs::hard_link(&path, &witness).unwrap();

    let shredder = Shredder::new(DeletionMethod::ZeroFill).with_renamer(failing_renamer);
    assert!(shredder.shred(&path).is_deleted());

    assert_eq!(fs::read(&witness).unwrap(), vec![0u8; 2048]);
    assert_eq!(dir_entries(&dir), vec!["witness.bin"]);
}

#[test]
fn test_rename_never_replaces_existing_entry() {
    let dir = TempDir::new().unwrap();
    let from = write_file(&dir, "from.txt", b"moving");
    let to = write_file(&dir, "to.txt", b"bystander");

    let err = rename_no_replace(&from, &to).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    assert_eq!(fs::read(&from).unwrap(), b"moving");
    assert_eq!(fs::read(&to).unwrap(), b"bystander");
}

#[test]
fn test_rename_no_replace_moves_to_free_name() {
    let dir = TempDir::new().unwrap();
    let from = write_file(&dir, "from.txt", b"moving");
    let to = dir.path().join("free.txt");

    rename_no_replace(&from, &to).unwrap();

    assert!(!from.exists());
    assert_eq!(fs::read(&to).unwrap(), b"moving");
}
