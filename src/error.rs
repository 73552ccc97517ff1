//! Error types for labelshaper
//!
//! Label shaping runs in tight per-tile loops, so almost every failure is
//! handled locally: a bad image section or a missing glyph is logged and
//! skipped rather than aborting the label. The types here exist for the
//! seams where a failure has to travel — image-section allocation inside
//! [`TaggedString`](crate::tagged_string::TaggedString), and the pluggable
//! bidi reordering engine, whose errors trigger the logical-order fallback.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.

use thiserror::Error;

/// Result type alias for labelshaper operations
pub type Result<T> = std::result::Result<T, TextError>;

/// Errors raised while building or mutating tagged label text
///
/// These are non-fatal by contract: callers log them via `log::warn!` and
/// drop the offending section, leaving the rest of the label intact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
  /// An image section was added with an empty name
  #[error("image section name is empty")]
  EmptyImageName,

  /// The private-use-area placeholder range ran out
  ///
  /// Each image section consumes one code point in U+E000..=U+F8FF, so a
  /// single label supports at most 6400 image sections.
  #[error("too many image sections in one label (maximum {max})")]
  ImageBudgetExhausted { max: usize },
}

/// Errors reported by a bidi reordering engine
///
/// Any error from the engine demotes the label to logical-order line
/// splitting; it never aborts shaping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BidiError {
  /// A requested line range crosses a paragraph boundary
  #[error("line range {start}..{end} does not lie within one paragraph")]
  ParagraphMismatch { start: usize, end: usize },

  /// A line-break offset did not land on a code-unit boundary
  #[error("line break offset {0} is not a character boundary")]
  InvalidBreakOffset(usize),

  /// Engine-specific failure
  #[error("reordering engine failed: {0}")]
  Engine(String),
}
