//! Error handling for typemold
//!
//! Every failure the crate can report goes through [`Error`]. Build failures
//! are ordinary values here; nothing in the load path aborts the process.

use crate::types::{Kind, Origin};
use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The source unit is not valid declaration syntax
    MalformedInput,
    /// The declarations parsed but cannot be turned into a type graph
    Unresolvable,
    /// A capability that statically-derived descriptors do not implement
    Unimplemented,
    /// A capability called on a descriptor it does not apply to
    Usage,
    /// The source unit could not be read
    Io,
}

/// typemold error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Parser Errors ====================

    #[error("{span}: unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("{span}: unterminated {what} literal")]
    UnterminatedLiteral { what: &'static str, span: Span },

    #[error("{span}: invalid character {ch:?}")]
    InvalidCharacter { ch: char, span: Span },

    #[error("source unit is not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },

    #[error("source unit has no package clause")]
    MissingPackageClause,

    // ==================== Build Errors ====================

    #[error("{span}: unknown type: {name}")]
    UnknownType { name: String, span: Span },

    #[error("{span}: imported symbols not supported: {package}.{name}")]
    QualifiedReference {
        package: String,
        name: String,
        span: Span,
    },

    #[error("{span}: array length must be a literal integer, got {found}")]
    UnsupportedArrayLength { found: String, span: Span },

    #[error("{span}: invalid array length {literal}")]
    InvalidArrayLength { literal: String, span: Span },

    #[error("{span}: unexpected {found} in type expression")]
    UnexpectedSyntax { found: &'static str, span: Span },

    #[error("{span}: {name} redeclared in this unit")]
    DuplicateType { name: String, span: Span },

    #[error("invalid recursive type {name}: {}", .cycle.join(" -> "))]
    RecursiveValueType { name: String, cycle: Vec<String> },

    #[error("type {name} was registered but never populated")]
    Unpopulated { name: String },

    // ==================== Capability Errors ====================

    #[error("{method} is not supported on {origin} types")]
    Unsupported { method: &'static str, origin: Origin },

    #[error("{method} of non-applicable kind {kind}")]
    NotApplicable { method: &'static str, kind: Kind },

    #[error("index {index} out of range [0, {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::UnterminatedLiteral { span, .. } => Some(*span),
            Self::InvalidCharacter { span, .. } => Some(*span),
            Self::UnknownType { span, .. } => Some(*span),
            Self::QualifiedReference { span, .. } => Some(*span),
            Self::UnsupportedArrayLength { span, .. } => Some(*span),
            Self::InvalidArrayLength { span, .. } => Some(*span),
            Self::UnexpectedSyntax { span, .. } => Some(*span),
            Self::DuplicateType { span, .. } => Some(*span),
            Self::InvalidUtf8 { .. }
            | Self::MissingPackageClause
            | Self::RecursiveValueType { .. }
            | Self::Unpopulated { .. }
            | Self::Unsupported { .. }
            | Self::NotApplicable { .. }
            | Self::IndexOutOfRange { .. }
            | Self::Io(_) => None,
        }
    }

    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnexpectedToken { .. }
            | Self::UnterminatedLiteral { .. }
            | Self::InvalidCharacter { .. }
            | Self::InvalidUtf8 { .. }
            | Self::MissingPackageClause => ErrorClass::MalformedInput,
            Self::UnknownType { .. }
            | Self::QualifiedReference { .. }
            | Self::UnsupportedArrayLength { .. }
            | Self::InvalidArrayLength { .. }
            | Self::UnexpectedSyntax { .. }
            | Self::DuplicateType { .. }
            | Self::RecursiveValueType { .. }
            | Self::Unpopulated { .. } => ErrorClass::Unresolvable,
            Self::Unsupported { .. } => ErrorClass::Unimplemented,
            Self::NotApplicable { .. } | Self::IndexOutOfRange { .. } => ErrorClass::Usage,
            Self::Io(_) => ErrorClass::Io,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
