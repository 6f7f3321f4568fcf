//! Parts: the smallest spans a container is built from.

use std::borrow::Cow;

use crate::line::LdifLine;
use crate::token::Token;

/// A fragment the parser could not fit into any line.
///
/// Produced by cleanup-line recovery and by the `other` fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPart {
    offset: usize,
    text: String,
}

impl InvalidPart {
    pub(crate) fn from_token(token: Token) -> Self {
        Self {
            offset: token.offset(),
            text: token.text().to_string(),
        }
    }

    /// Absolute offset of the fragment.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The fragment exactly as it appeared.
    pub fn raw(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Zero-length marker at the end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EofPart {
    offset: usize,
}

impl EofPart {
    pub(crate) fn new(offset: usize) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Borrowed view over any part of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdifPart<'a> {
    Line(&'a LdifLine),
    Invalid(&'a InvalidPart),
    Eof(&'a EofPart),
}

impl<'a> LdifPart<'a> {
    /// Absolute offset of the first byte.
    pub fn offset(&self) -> usize {
        match self {
            LdifPart::Line(line) => line.offset(),
            LdifPart::Invalid(part) => part.offset(),
            LdifPart::Eof(part) => part.offset(),
        }
    }

    /// Source text covered by the part.
    pub fn raw(&self) -> Cow<'a, str> {
        match self {
            LdifPart::Line(line) => Cow::Owned(line.raw()),
            LdifPart::Invalid(part) => Cow::Borrowed(part.raw()),
            LdifPart::Eof(_) => Cow::Borrowed(""),
        }
    }

    /// Length of the raw text in bytes.
    pub fn len(&self) -> usize {
        match self {
            LdifPart::Line(line) => line.len(),
            LdifPart::Invalid(part) => part.len(),
            LdifPart::Eof(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invalid parts are never valid; lines check their own grammar.
    pub fn is_valid(&self) -> bool {
        match self {
            LdifPart::Line(line) => line.is_valid(),
            LdifPart::Invalid(_) => false,
            LdifPart::Eof(_) => true,
        }
    }
}
