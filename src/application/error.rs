//! Application-level errors (wraps domain errors)

use std::path::Path;

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The host could not answer a query needed for the document.
    #[error("host query failed: no {what} for {node}")]
    HostQuery { node: String, what: &'static str },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn host_query(node: impl Into<String>, what: &'static str) -> Self {
        Self::HostQuery {
            node: node.into(),
            what,
        }
    }

    /// Wrap an I/O failure on `path`.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(source),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
