//! Top-level units of a document.

use std::fmt;

use crate::line::LdifLine;
use crate::part::{EofPart, InvalidPart, LdifPart};
use crate::record::LdifRecord;

/// What a container holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    /// `version: 1`, plus any garbage harvested from the same line.
    Version {
        line: LdifLine,
        invalid: Vec<InvalidPart>,
    },
    /// One blank line outside a record.
    Separator(LdifLine),
    /// A run of consecutive comment lines.
    Comment(Vec<LdifLine>),
    /// A line that fits nowhere.
    Invalid(InvalidPart),
    /// End of input. Always the last container.
    Eof(EofPart),
    Record(LdifRecord),
}

/// A container with its absolute offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdifContainer {
    offset: usize,
    kind: ContainerKind,
}

impl LdifContainer {
    pub(crate) fn new(kind: ContainerKind) -> Self {
        let offset = match &kind {
            ContainerKind::Version { line, .. } => line.offset(),
            ContainerKind::Separator(line) => line.offset(),
            ContainerKind::Comment(lines) => lines.first().map_or(0, LdifLine::offset),
            ContainerKind::Invalid(part) => part.offset(),
            ContainerKind::Eof(part) => part.offset(),
            ContainerKind::Record(record) => record.offset(),
        };
        Self { offset, kind }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> &ContainerKind {
        &self.kind
    }

    /// Short name of the container kind, for logs and tests.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            ContainerKind::Version { .. } => "version",
            ContainerKind::Separator(_) => "separator",
            ContainerKind::Comment(_) => "comment",
            ContainerKind::Invalid(_) => "invalid",
            ContainerKind::Eof(_) => "eof",
            ContainerKind::Record(_) => "record",
        }
    }

    /// Every part in source order.
    pub fn parts(&self) -> Vec<LdifPart<'_>> {
        match &self.kind {
            ContainerKind::Version { line, invalid } => {
                let mut parts = vec![LdifPart::Line(line)];
                parts.extend(invalid.iter().map(LdifPart::Invalid));
                parts.sort_by_key(LdifPart::offset);
                parts
            }
            ContainerKind::Separator(line) => vec![LdifPart::Line(line)],
            ContainerKind::Comment(lines) => lines.iter().map(LdifPart::Line).collect(),
            ContainerKind::Invalid(part) => vec![LdifPart::Invalid(part)],
            ContainerKind::Eof(part) => vec![LdifPart::Eof(part)],
            ContainerKind::Record(record) => record.parts(),
        }
    }

    /// Length of the covered source text in bytes.
    pub fn len(&self) -> usize {
        self.parts().iter().map(LdifPart::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset one past the last covered byte.
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }

    /// The covered source text.
    pub fn raw(&self) -> String {
        self.parts().iter().map(|part| part.raw()).collect()
    }

    pub fn is_valid(&self) -> bool {
        match &self.kind {
            ContainerKind::Version { line, invalid } => {
                invalid.is_empty() && line.is_valid() && line.version() == Some(1)
            }
            ContainerKind::Separator(_) | ContainerKind::Comment(_) | ContainerKind::Eof(_) => true,
            ContainerKind::Invalid(_) => false,
            ContainerKind::Record(record) => record.is_valid(),
        }
    }

    pub fn as_record(&self) -> Option<&LdifRecord> {
        match &self.kind {
            ContainerKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, ContainerKind::Record(_))
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, ContainerKind::Eof(_))
    }
}

impl fmt::Display for LdifContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in self.parts() {
            f.write_str(&part.raw())?;
        }
        Ok(())
    }
}
