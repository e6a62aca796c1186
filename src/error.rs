//! Error types for schema2xforms
//!
//! This module defines all error types used throughout the library.
//! Generation-aborting conditions (bad root element, instance mismatch,
//! unsupported type categories, internal invariant failures) surface as
//! distinct variants so callers can translate them into UI-level messages.

use std::fmt;
use thiserror::Error;

/// Result type alias using the schema2xforms Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for form generation
#[derive(Error, Debug)]
pub enum Error {
    /// XML Schema parsing/building error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The requested root element does not exist in the schema
    #[error("invalid root element tag name [{name}, targetNamespace={}]",
            .namespace.as_deref().unwrap_or("<none>"))]
    InvalidRootElement {
        /// Requested root element name
        name: String,
        /// Target namespace the lookup was performed against
        namespace: Option<String>,
    },

    /// A supplied instance document's root tag does not match the schema root
    #[error("instance document root tag name invalid: expected {expected}, got {actual}")]
    InstanceRootMismatch {
        /// Expected root tag name
        expected: String,
        /// Actual root tag name found in the instance document
        actual: String,
    },

    /// An element resolved to a type category the generator cannot render
    #[error("unsupported type [{type_name}] for node [{element}]")]
    UnsupportedType {
        /// Name of the offending type
        type_name: String,
        /// Name of the element declaration carrying the type
        element: String,
    },

    /// An internal generation invariant was violated; treated as a defect
    /// signal, not a normal operating condition
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// XML reading/writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invariant-violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Error::Invariant(message.into())
    }
}

/// XML Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema document
    pub location: Option<String>,
    /// Schema source snippet that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source snippet
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
