// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integration errors.
//!
//! Validation failures are never reported here: they are data, surfaced through
//! [`Validation`](crate::Validation). These types cover mistakes made by the
//! code driving the form, such as malformed field paths or invalid patterns.

use thiserror::Error;

/// Result type for form operations.
pub type Result<T> = core::result::Result<T, FormError>;

/// Why a field path failed to parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathErrorKind {
    /// The path is empty.
    Empty,
    /// A segment between dots is empty, as in `a..b` or `a.`.
    EmptySegment,
    /// The path starts with an index instead of a name.
    LeadingIndex,
    /// A `[` has no matching `]`.
    UnclosedBracket,
    /// A `]` appears without a matching `[`.
    UnexpectedBracket,
    /// The text between brackets is not a non-negative integer no larger than
    /// [`MAX_INDEX`](crate::path::MAX_INDEX).
    InvalidIndex,
    /// Something other than `.` or `[` follows a closing bracket.
    TrailingCharacters,
}

impl PathErrorKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Empty => "path is empty",
            Self::EmptySegment => "empty segment",
            Self::LeadingIndex => "path must start with a name",
            Self::UnclosedBracket => "unclosed `[`",
            Self::UnexpectedBracket => "unexpected `]`",
            Self::InvalidIndex => "index is not an integer in `0..=65535`",
            Self::TrailingCharacters => "expected `.` or `[` after `]`",
        }
    }
}

/// A field path could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("malformed field path `{path}` at byte {offset}: {}", .kind.describe())]
pub struct PathError {
    /// The offending input.
    pub path: String,
    /// Byte offset at which parsing failed.
    pub offset: usize,
    /// What went wrong.
    pub kind: PathErrorKind,
}

/// Errors reported by form operations.
#[derive(Debug, Error)]
pub enum FormError {
    /// A field path is malformed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A pattern rule does not compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// The regex compiler's diagnosis.
        #[source]
        source: regex::Error,
    },

    /// An external value was pushed into a form that owns its value.
    #[error("form is uncontrolled; external values must go through `sync_field`")]
    NotControlled,

    /// Configuration could not be parsed.
    #[error("invalid form configuration: {0}")]
    Config(#[from] serde_json::Error),
}
