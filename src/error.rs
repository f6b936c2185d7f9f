//! Errors for the opt-in strict segment checks.
//!
//! Nothing on the default path fails: markers accept any value verbatim.
//! These errors come only from [`validate_segment`](crate::validate_segment),
//! [`Marker::try_child`](crate::Marker::try_child) and
//! [`Keyed::try_get`](crate::Keyed::try_get).

use thiserror::Error;

/// A path segment that would produce an ambiguous path or a malformed selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("empty path segment is not allowed")]
    Empty,

    /// The segment would split into several path segments.
    #[error("path segment '{segment}' contains the separator '{separator}'")]
    ContainsSeparator { segment: String, separator: char },

    /// The segment would terminate the quoted selector value early.
    #[error("path segment '{segment}' contains a quote character")]
    ContainsQuote { segment: String },

    #[error("path segment '{segment}' contains a bracket")]
    ContainsBracket { segment: String },
}
