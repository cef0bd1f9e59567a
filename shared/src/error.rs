use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by invitation code stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    /// The conditional redemption update was rejected: the code was
    /// deactivated or its last remaining use was consumed by a concurrent
    /// redemption.
    #[error("No uses remaining on invitation code")]
    UsesExhausted,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
