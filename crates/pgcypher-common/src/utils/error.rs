//! Error types shared by every pgcypher crate.
//!
//! Each phase of a translation (parsing, expression lowering, fragmentation,
//! statement assembly, formatting) reports failures through [`Error`]. The
//! first error raised at any depth aborts the whole call.

use std::fmt;

use thiserror::Error;

/// Result type alias for pgcypher operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Query text could not be parsed.
    #[error("{0}")]
    Query(QueryError),

    /// A phase met a node type it has no rule for.
    #[error("unsupported {node_type}: {context}")]
    UnsupportedConstruct {
        /// Node-type tag of the offending node.
        node_type: &'static str,
        /// What the phase was doing when it met the node.
        context: String,
    },

    /// A unary/binary expression slot was filled twice.
    #[error("expression {0} already assigned")]
    SlotAlreadyAssigned(Slot),

    /// A tree has a shape its consumer cannot accept.
    #[error("invalid expression shape: {0}")]
    InvalidExpressionShape(String),

    /// A reference names a binding that is not (yet) declared.
    #[error("missing binding: {0}")]
    MissingBinding(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates an [`Error::UnsupportedConstruct`].
    pub fn unsupported(node_type: &'static str, context: impl Into<String>) -> Self {
        Error::UnsupportedConstruct {
            node_type,
            context: context.into(),
        }
    }

    /// Creates an [`Error::InvalidExpressionShape`].
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Error::InvalidExpressionShape(message.into())
    }

    /// Creates an [`Error::MissingBinding`].
    pub fn missing_binding(message: impl Into<String>) -> Self {
        Error::MissingBinding(message.into())
    }

    /// Returns the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Query(_) => ErrorKind::Syntax,
            Error::UnsupportedConstruct { .. } => ErrorKind::UnsupportedConstruct,
            Error::SlotAlreadyAssigned(_) => ErrorKind::SlotAlreadyAssigned,
            Error::InvalidExpressionShape(_) => ErrorKind::InvalidExpressionShape,
            Error::MissingBinding(_) => ErrorKind::MissingBinding,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Error kinds, for callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Query text failed to parse.
    Syntax,
    /// No rule for a node type.
    UnsupportedConstruct,
    /// Expression slot written twice.
    SlotAlreadyAssigned,
    /// Malformed tree.
    InvalidExpressionShape,
    /// Unresolved binding.
    MissingBinding,
    /// Internal invariant violation.
    Internal,
}

/// A fillable slot of a unary or binary expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The operator slot.
    Operator,
    /// Either operand slot.
    Operand,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Operator => f.write_str("operator"),
            Slot::Operand => f.write_str("operand"),
        }
    }
}

/// Query error with source location information.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    /// Error kind.
    pub kind: QueryErrorKind,
    /// Error message.
    pub message: String,
    /// Location in the query text, if known.
    pub span: Option<SourceSpan>,
    /// The query text the span refers to.
    pub source_query: Option<String>,
}

impl QueryError {
    /// Creates a new query error.
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            source_query: None,
        }
    }

    /// Attaches a source span.
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Attaches the query text.
    pub fn with_source(mut self, source: String) -> Self {
        self.source_query = Some(source);
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(span) = &self.span {
            write!(f, " at {}:{}", span.line, span.column)?;
            if let Some(source) = &self.source_query {
                let end = span.end.min(source.len());
                let start = span.start.min(end);
                if let Some(text) = source.get(start..end) {
                    if !text.is_empty() {
                        write!(f, " near '{text}'")?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

/// Kinds of query-text errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Malformed token.
    Lexer,
    /// Unexpected token or structure.
    Syntax,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::Lexer => f.write_str("lexer error"),
            QueryErrorKind::Syntax => f.write_str("syntax error"),
        }
    }
}

/// Byte range plus line/column of a piece of query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl SourceSpan {
    /// Creates a new span.
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_messages() {
        assert_eq!(
            Error::SlotAlreadyAssigned(Slot::Operator).to_string(),
            "expression operator already assigned"
        );
        assert_eq!(
            Error::SlotAlreadyAssigned(Slot::Operand).to_string(),
            "expression operand already assigned"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::unsupported("FunctionCall", "formatting").kind(),
            ErrorKind::UnsupportedConstruct
        );
        assert_eq!(
            Error::invalid_shape("x").kind(),
            ErrorKind::InvalidExpressionShape
        );
        assert_eq!(Error::missing_binding("n").kind(), ErrorKind::MissingBinding);
        assert_eq!(Error::Internal("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_query_error_display_with_span() {
        let err = QueryError::new(QueryErrorKind::Syntax, "Expected RETURN")
            .with_span(SourceSpan::new(10, 15, 1, 11))
            .with_source("match (n) retrn n".to_string());
        assert_eq!(
            err.to_string(),
            "syntax error: Expected RETURN at 1:11 near 'retrn'"
        );
    }
}
