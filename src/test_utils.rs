//! Test utilities for Assis
//!
//! Temporary store construction and assertion helpers shared by the
//! unit test modules.

use crate::error::{AssisError, Result};
use crate::storage::ConversationStore;
use tempfile::TempDir;

/// Create a store backed by a file in a fresh temporary directory
///
/// Returns the `TempDir` as well so the caller keeps it alive for the
/// duration of the test.
pub fn create_test_store() -> (ConversationStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let store = ConversationStore::new_with_path(dir.path().join("assis.db"))
        .expect("Failed to create conversation store");
    (store, dir)
}

/// Assert that a store call failed with an `AssisError` matching `check`
///
/// # Panics
///
/// Panics if the result is Ok, if the error is not an `AssisError`, or if
/// `check` returns false.
pub fn assert_store_error<T: std::fmt::Debug>(
    result: Result<T>,
    check: impl Fn(&AssisError) -> bool,
) {
    match result {
        Ok(value) => panic!("Expected an error but got Ok({:?})", value),
        Err(e) => match e.downcast_ref::<AssisError>() {
            Some(err) => assert!(check(err), "Unexpected error variant: {:?}", err),
            None => panic!("Error is not an AssisError: {:#}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_store() {
        let (store, dir) = create_test_store();
        assert!(store.db_path().starts_with(dir.path()));
        assert!(store.db_path().exists());
    }

    #[test]
    fn test_assert_store_error_matches() {
        let result: Result<()> = Err(AssisError::ConversationNotFound(1).into());
        assert_store_error(result, |e| matches!(e, AssisError::ConversationNotFound(1)));
    }

    #[test]
    #[should_panic(expected = "Expected an error")]
    fn test_assert_store_error_ok() {
        assert_store_error(Ok(5), |_| true);
    }

    #[test]
    #[should_panic(expected = "Unexpected error variant")]
    fn test_assert_store_error_wrong_variant() {
        let result: Result<()> = Err(AssisError::Storage("disk full".to_string()).into());
        assert_store_error(result, |e| matches!(e, AssisError::ConversationNotFound(_)));
    }
}
