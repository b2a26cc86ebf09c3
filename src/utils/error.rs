//! Error handling for jresolve

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Resolution error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Type Graph Errors ====================

    #[error("Class circularity detected for \"{class}\"")]
    ClassCircularity { class: String, span: Option<Span> },

    #[error("Interface circularity detected for \"{class}\"")]
    InterfaceCircularity { class: String, span: Option<Span> },

    // ==================== Registry Errors ====================

    #[error("Duplicate type: {descriptor}")]
    DuplicateType {
        descriptor: String,
        span: Option<Span>,
    },

    #[error("Undefined type: {name}")]
    UnknownType { name: String, span: Option<Span> },

    #[error("Invalid descriptor: {descriptor}")]
    InvalidDescriptor { descriptor: String },

    // ==================== Member Errors ====================

    #[error("Synthetic field {field} of {class} redefined with a different type")]
    SyntheticFieldConflict { class: String, field: String },

    // ==================== Collaborator Errors ====================

    #[error("IO error: {0}")]
    Io(String),

    #[error("Class-path model error: {0}")]
    Model(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::ClassCircularity { span, .. } => *span,
            Self::InterfaceCircularity { span, .. } => *span,
            Self::DuplicateType { span, .. } => *span,
            Self::UnknownType { span, .. } => *span,
            Self::InvalidDescriptor { .. }
            | Self::SyntheticFieldConflict { .. }
            | Self::Io(_)
            | Self::Model(_) => None,
        }
    }

    /// Whether this error comes from a malformed supertype graph
    pub fn is_circularity(&self) -> bool {
        matches!(
            self,
            Self::ClassCircularity { .. } | Self::InterfaceCircularity { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Model(err.to_string())
    }
}
