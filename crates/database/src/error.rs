use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Other(String),
}

impl DatabaseError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound(format!("{} with id {} not found", entity, id))
    }

    pub fn duplicate(entity: &str, field: &str) -> Self {
        Self::DuplicateEntry(format!("{} with {} already exists", entity, field))
    }

    /// Maps a unique-constraint violation to `DuplicateEntry`, keeps anything else
    pub fn on_unique(err: sqlx::Error, entity: &str, field: &str) -> Self {
        let unique = err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);

        if unique {
            Self::duplicate(entity, field)
        } else {
            Self::ConnectionError(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DatabaseError::not_found("Organisation", "42");
        assert_eq!(err.to_string(), "Entity not found: Organisation with id 42 not found");

        let err = DatabaseError::duplicate("User", "email");
        assert!(matches!(err, DatabaseError::DuplicateEntry(_)));
    }

    #[test]
    fn test_on_unique_passes_other_errors_through() {
        let err = DatabaseError::on_unique(sqlx::Error::RowNotFound, "User", "email");
        assert!(matches!(err, DatabaseError::ConnectionError(sqlx::Error::RowNotFound)));
    }
}
