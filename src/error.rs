use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("missing information: {0}")]
    Validation(String),
    #[error("a plant with the name \"{0}\" already exists")]
    DuplicateName(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
