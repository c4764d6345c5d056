use genval_core::SaveOperation;
use genval_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(
        "property '{property}' is store-generated; the application value would conflict on {operation}"
    )]
    ConflictingGeneratedValue {
        property: String,
        operation: SaveOperation,
    },

    #[error("unknown property: {0}")]
    UnknownProperty(String),

    #[error("row not found: {0}")]
    RowNotFound(String),
}
