//! Integration tests for the JSON file key-value store.

use camino::Utf8PathBuf;
use registration::domain::ports::{KeyValueStore, KeyValueStoreError};
use registration::outbound::storage::JsonFileKeyValueStore;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const STORE_FILE: &str = "local-storage.json";

#[fixture]
fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

fn store_dir(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().join("nested").join("store"))
        .expect("temp path should be UTF-8")
}

#[rstest]
fn open_creates_missing_directories(temp_dir: TempDir) {
    let dir = store_dir(&temp_dir);

    let store = JsonFileKeyValueStore::open(&dir, STORE_FILE).expect("open store");

    assert!(dir.is_dir());
    assert_eq!(store.file().as_str(), STORE_FILE);
    assert_eq!(store.get_item("formData").expect("read"), None);
}

#[rstest]
fn values_survive_reopening(temp_dir: TempDir) {
    let dir = store_dir(&temp_dir);
    JsonFileKeyValueStore::open(&dir, STORE_FILE)
        .expect("open store")
        .set_item("formData", r#"{"town":"Paris"}"#)
        .expect("write");

    let reopened = JsonFileKeyValueStore::open(&dir, STORE_FILE).expect("reopen store");

    assert_eq!(
        reopened.get_item("formData").expect("read").as_deref(),
        Some(r#"{"town":"Paris"}"#)
    );
}

#[rstest]
fn writes_keep_unrelated_keys(temp_dir: TempDir) {
    let store = JsonFileKeyValueStore::open(&store_dir(&temp_dir), STORE_FILE).expect("open");
    store.set_item("theme", "dark").expect("write theme");
    store.set_item("formData", "{}").expect("write record");
    store.set_item("formData", "[]").expect("overwrite record");

    assert_eq!(store.get_item("theme").expect("read").as_deref(), Some("dark"));
    assert_eq!(store.get_item("formData").expect("read").as_deref(), Some("[]"));
}

#[rstest]
fn corrupt_file_is_reported(temp_dir: TempDir) {
    let dir = store_dir(&temp_dir);
    let store = JsonFileKeyValueStore::open(&dir, STORE_FILE).expect("open");
    std::fs::write(dir.join(STORE_FILE), "[1, 2, 3]").expect("seed corrupt file");

    let error = store.get_item("formData").expect_err("corrupt store");

    assert!(matches!(error, KeyValueStoreError::Corrupt { .. }));
}
