//! Error types for sqlshape

use thiserror::Error;

/// The main error type for sqlshape operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Driver error that did not originate in sqlx
    #[error("Driver error: {message}")]
    Driver { message: String },

    /// An argument did not match any accepted shape
    #[error("Invalid argument {position}: {message}")]
    Validation { position: u8, message: String },

    /// A required column, key or condition specification was empty
    #[error("Argument {position} must not be empty")]
    EmptyInput { position: u8 },

    /// Two clause fragments contributed the same placeholder
    #[error("Placeholder ':{name}' is bound twice")]
    PlaceholderCollision { name: String },

    /// A placeholder in the statement has no value in the bind map
    #[error("No value bound for placeholder ':{name}'")]
    MissingBind { name: String },

    /// The bind map carries a value no placeholder refers to
    #[error("Bound value '{name}' is not used by the statement")]
    UnusedBind { name: String },

    /// Positional binds do not match the number of `?` markers
    #[error("Statement expects {expected} positional values, got {found}")]
    BindCount { expected: usize, found: usize },

    /// A statement uses both `:name` and `?` markers
    #[error("Statement mixes named and positional placeholders")]
    MixedPlaceholders,

    /// A batch was requested while a transaction is already open
    #[error("Batch execution requires that no transaction is open")]
    NestedTransaction,

    /// Database does not exist on the server
    #[error("Database '{name}' does not exist")]
    UnknownDatabase { name: String },

    /// Reading a statement file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for sqlshape operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new validation error for the argument at `position` (1-based)
    pub fn validation(position: u8, message: impl Into<String>) -> Self {
        Self::Validation {
            position,
            message: message.into(),
        }
    }

    /// Create a new empty-input error
    pub fn empty_input(position: u8) -> Self {
        Self::EmptyInput { position }
    }

    /// Create a new driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a new placeholder collision error
    pub fn collision(name: impl Into<String>) -> Self {
        Self::PlaceholderCollision { name: name.into() }
    }

    /// Create a new unknown database error
    pub fn unknown_database(name: impl Into<String>) -> Self {
        Self::UnknownDatabase { name: name.into() }
    }

    /// Whether this error was raised before any SQL reached the driver
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::EmptyInput { .. } | Self::PlaceholderCollision { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = Error::validation(2, "keys must be a list of column names");
        assert!(matches!(err, Error::Validation { position: 2, .. }));
        assert_eq!(
            err.to_string(),
            "Invalid argument 2: keys must be a list of column names"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_empty_input_error() {
        let err = Error::empty_input(2);
        assert_eq!(err.to_string(), "Argument 2 must not be empty");
        assert!(err.is_validation());
    }

    #[test]
    fn test_collision_error() {
        let err = Error::collision("where_ID");
        assert_eq!(err.to_string(), "Placeholder ':where_ID' is bound twice");
    }

    #[test]
    fn test_driver_error_is_not_validation() {
        let err = Error::driver("Duplicate entry '1' for key 'PRIMARY'");
        assert!(!err.is_validation());
        assert_eq!(
            err.to_string(),
            "Driver error: Duplicate entry '1' for key 'PRIMARY'"
        );
    }

    #[test]
    fn test_unknown_database_error() {
        let err = Error::unknown_database("nope");
        assert_eq!(err.to_string(), "Database 'nope' does not exist");
    }
}
