//! Settings store error types.

use thiserror::Error;

/// Errors that can occur during settings store operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Database operation failed.
    #[error("database error: {reason}")]
    DatabaseError { reason: String },

    /// Stored value could not be read back in its declared kind.
    #[error("invalid stored value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl From<rusqlite::Error> for SettingsError {
    fn from(e: rusqlite::Error) -> Self {
        SettingsError::DatabaseError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_from_rusqlite() {
        let err: SettingsError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, SettingsError::DatabaseError { .. }));
    }

    #[test]
    fn test_display_includes_context() {
        let err = SettingsError::InvalidValue {
            name: "temperature".into(),
            reason: "not a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("temperature"));
        assert!(msg.contains("not a number"));
    }
}
