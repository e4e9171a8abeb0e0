//! Test utilities and module declarations for storage tests.

use crate::Storage;
use msgpipe_core::{RowSet, Value};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_rowset(rows: &[(i64, &str, i64, i64)]) -> RowSet {
    RowSet::from_rows(
        vec!["id".to_owned(), "message".to_owned(), "related".to_owned(), "request".to_owned()],
        rows.iter()
            .map(|&(id, message, related, request)| {
                vec![
                    Value::Integer(id),
                    Value::from(message),
                    Value::Integer(related),
                    Value::Integer(request),
                ]
            })
            .collect(),
    )
    .unwrap()
}
