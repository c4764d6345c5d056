use std::collections::BTreeMap;

use genval_core::{FieldValue, RowId};

use crate::error::StorageError;

/// A column set prepared for a write: `Some` is sent verbatim, `None` is
/// omitted so the store may generate (insert) or keep (update) its own value.
pub type PreparedRow = BTreeMap<String, Option<FieldValue>>;

/// A full materialized row as the store holds it.
pub type StoredRow = BTreeMap<String, FieldValue>;

/// The physical store collaborator.
///
/// Both writes are atomic: they either fully succeed and return the complete
/// post-write row (including every generated or defaulted column), or fail
/// with no side effects.
pub trait Store {
    fn insert(&mut self, table: &str, key: RowId, row: &PreparedRow)
    -> Result<StoredRow, StorageError>;

    /// Omitted columns are left untouched; their stored value remains the
    /// store's value. Unknown `key` is `StorageError::NotFound`.
    fn update(&mut self, table: &str, key: RowId, row: &PreparedRow)
    -> Result<StoredRow, StorageError>;

    fn fetch(&self, table: &str, key: RowId) -> Result<Option<StoredRow>, StorageError>;
}
