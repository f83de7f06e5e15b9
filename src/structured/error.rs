//! Error type for structured input validation.

use std::fmt;

/// A single validation failure, optionally located by a JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// What went wrong
    pub message: String,
    /// JSON pointer to the offending value (e.g., "/location", "/items/0")
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }

    /// Create an error located at `path`. An empty path means the document root.
    pub fn with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            message: message.into(),
            path: if path.is_empty() { None } else { Some(path) },
        }
    }

    /// Create an error without path.
    pub fn without_path(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}
