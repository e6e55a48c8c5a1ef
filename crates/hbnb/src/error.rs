use crate::model::EntityKind;
use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HbnbError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{kind} not found with ID: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Link already exists between listing {listing_id} and amenity {amenity_id}")]
    LinkExists {
        listing_id: String,
        amenity_id: String,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl HbnbError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        HbnbError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, HbnbError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HbnbError::NotFound { .. })
    }

    /// Duplicate links count as conflicts too.
    pub fn is_conflict(&self) -> bool {
        matches!(self, HbnbError::Conflict(_) | HbnbError::LinkExists { .. })
    }

    /// The aggregated violations, when this is a validation failure.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            HbnbError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for HbnbError {
    fn from(errors: ValidationErrors) -> Self {
        HbnbError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, HbnbError>;
