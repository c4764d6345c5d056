use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("duplicate property: {0}")]
    DuplicateProperty(String),

    #[error("property '{0}' is never store-generated; before/after save behaviors must be Use")]
    InvalidSaveBehavior(String),
}
