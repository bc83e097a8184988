use assis::storage::ConversationStore;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store() -> (ConversationStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("assis.db");
    let store =
        ConversationStore::new_with_path(db_path).expect("failed to create store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("assis.db");
    (tmp, db_path)
}
