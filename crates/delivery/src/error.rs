use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("bag {0} is not deliverable after today")]
    FutureOnly(String),

    #[error("bag and basket do not match")]
    ScanMismatch,

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DeliveryError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DeliveryError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Surfaces unique-constraint violations as `DuplicateKey` instead of a
    /// generic database error.
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return DeliveryError::DuplicateKey(db.message().to_string());
            }
        }
        DeliveryError::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
