pub use anyhow::bail;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;
use thiserror::Error;

/// Configuration rejected as a whole: every violated constraint is listed,
/// not just the first one encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    violations: Vec<String>,
}

impl ConfigError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "invalid configuration:")?;
        for v in &self.violations {
            write!(f, "\n  • {}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

#[derive(Error, Debug)]
pub enum DbdockError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Container runtime error: {0}")]
    Runtime(String),

    #[error("SQL error ({context}): {message}")]
    Sql { context: String, message: String },

    #[error("Database does not exist: {0}")]
    DatabaseNotFound(String),

    #[error("Database at {uri} did not become ready within {timeout:?}")]
    ReadinessTimeout { uri: String, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl DbdockError {
    /// True for the one classified SQL failure that drives the
    /// clone-from-template fallback decision.
    pub fn is_database_not_found(&self) -> bool {
        matches!(self, DbdockError::DatabaseNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, DbdockError>;
