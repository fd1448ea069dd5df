use netpilot_fs::io;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("loader.conf");

    io::write_atomic(&path, b"if_em_load=\"YES\"\n").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "if_em_load=\"YES\"\n");
}

#[test]
fn test_write_atomic_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("boot").join("loader.conf");

    io::write_atomic(&path, b"x").unwrap();

    assert!(path.exists());
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rc.conf");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rc.conf");

    io::write_atomic(&path, b"hostname=\"box\"\n").unwrap();

    assert!(!io::temp_path_for(&path).exists());
    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_read_text_nonexistent_file() {
    let result = io::read_text(std::path::Path::new("/nonexistent/netpilot/file.conf"));
    assert!(result.is_err());
}

#[test]
fn test_read_text_if_exists_missing_is_none() {
    let temp = TempDir::new().unwrap();
    let result = io::read_text_if_exists(&temp.path().join("missing.conf")).unwrap();
    assert_eq!(result, None);
}

#[test]
fn test_read_text_if_exists_returns_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("present.conf");
    fs::write(&path, "a=\"b\"\n").unwrap();

    let result = io::read_text_if_exists(&path).unwrap();
    assert_eq!(result.as_deref(), Some("a=\"b\"\n"));
}
