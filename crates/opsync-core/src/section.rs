//! Addressable text sections bounded by delimiter strings.
//!
//! A section is located once, then replaced with [`splice`]. Everything outside
//! the section's span is carried over byte-for-byte.

use std::ops::Range;
use thiserror::Error;

/// Errors that can occur while locating a section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("opening delimiter `{open}` not found")]
    Missing { open: String },

    #[error("opening delimiter `{open}` occurs {count} times, expected exactly one")]
    Ambiguous { open: String, count: usize },

    #[error("no closing delimiter `{close}` after `{open}`")]
    Unterminated { open: String, close: String },
}

/// Opening and closing delimiters of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters<'a> {
    pub open: &'a str,
    pub close: &'a str,
}

impl<'a> Delimiters<'a> {
    pub fn new(open: &'a str, close: &'a str) -> Self {
        Self { open, close }
    }
}

/// A located section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// From the first byte of the opening delimiter to the last byte of the closing one.
    pub span: Range<usize>,
    /// Content strictly between the delimiters.
    pub body: Range<usize>,
}

impl Section {
    /// Locate the single section bounded by `delimiters` in `text`.
    ///
    /// The opening delimiter must occur exactly once. The closing delimiter is
    /// the first occurrence after it.
    pub fn locate(text: &str, delimiters: &Delimiters<'_>) -> Result<Self, SectionError> {
        let starts: Vec<usize> = text.match_indices(delimiters.open).map(|(i, _)| i).collect();
        let start = match starts.as_slice() {
            [] => {
                return Err(SectionError::Missing {
                    open: delimiters.open.to_string(),
                });
            }
            [start] => *start,
            _ => {
                return Err(SectionError::Ambiguous {
                    open: delimiters.open.to_string(),
                    count: starts.len(),
                });
            }
        };
        Self::close_from(text, start, start + delimiters.open.len(), delimiters)
    }

    /// Build a section whose opening delimiter spans `start..body_start`, finding
    /// the first closing delimiter at or after `body_start`.
    fn close_from(
        text: &str,
        start: usize,
        body_start: usize,
        delimiters: &Delimiters<'_>,
    ) -> Result<Self, SectionError> {
        let body_end = text[body_start..]
            .find(delimiters.close)
            .map(|offset| body_start + offset)
            .ok_or_else(|| SectionError::Unterminated {
                open: delimiters.open.to_string(),
                close: delimiters.close.to_string(),
            })?;

        Ok(Self {
            span: start..body_end + delimiters.close.len(),
            body: body_start..body_end,
        })
    }

    /// The section's body text.
    pub fn body<'t>(&self, text: &'t str) -> &'t str {
        &text[self.body.clone()]
    }
}

/// Replace `section`'s span in `text` with `replacement`.
pub fn splice(text: &str, section: &Section, replacement: &str) -> String {
    let prefix = &text[..section.span.start];
    let suffix = &text[section.span.end..];

    let mut output = String::with_capacity(prefix.len() + replacement.len() + suffix.len());
    output.push_str(prefix);
    output.push_str(replacement);
    output.push_str(suffix);
    output
}
