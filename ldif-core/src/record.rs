//! Records: a dn line, its body, and the terminator that ended it.
//!
//! Records are accumulated in a [`RecordBuilder`] while the parser walks the
//! body. The builder can only be turned into an [`LdifRecord`] by handing it
//! the [`Terminator`] that closed the record, so a record without one can't
//! exist.

use crate::line::{LdifLine, ModType};
use crate::part::{EofPart, InvalidPart, LdifPart};

/// What ended a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// A blank line.
    Separator(LdifLine),
    /// End of input.
    Eof(EofPart),
}

impl Terminator {
    pub fn part(&self) -> LdifPart<'_> {
        match self {
            Terminator::Separator(line) => LdifPart::Line(line),
            Terminator::Eof(eof) => LdifPart::Eof(eof),
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Terminator::Eof(_))
    }
}

/// One `add:` / `delete:` / `replace:` / `increment:` block of a modify
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModSpec {
    type_line: LdifLine,
    attr_vals: Vec<LdifLine>,
    comments: Vec<LdifLine>,
    invalid: Vec<InvalidPart>,
    separator: Option<LdifLine>,
}

impl ModSpec {
    pub(crate) fn new(type_line: LdifLine) -> Self {
        Self {
            type_line,
            attr_vals: Vec::new(),
            comments: Vec::new(),
            invalid: Vec::new(),
            separator: None,
        }
    }

    pub(crate) fn push_attr_val(&mut self, line: LdifLine) {
        self.attr_vals.push(line);
    }

    pub(crate) fn push_comment(&mut self, line: LdifLine) {
        self.comments.push(line);
    }

    pub(crate) fn push_invalid(&mut self, part: InvalidPart) {
        self.invalid.push(part);
    }

    pub(crate) fn close(&mut self, separator: LdifLine) {
        self.separator = Some(separator);
    }

    /// The `add: attr` line opening the block.
    pub fn type_line(&self) -> &LdifLine {
        &self.type_line
    }

    pub fn mod_type(&self) -> Option<ModType> {
        self.type_line.mod_type()
    }

    /// Attribute named on the type line.
    pub fn attribute(&self) -> Option<String> {
        self.type_line.attribute_description()
    }

    pub fn attr_vals(&self) -> &[LdifLine] {
        &self.attr_vals
    }

    /// Unfolded values of every attr-val line.
    pub fn values(&self) -> Vec<String> {
        self.attr_vals
            .iter()
            .filter_map(LdifLine::unfolded_value)
            .collect()
    }

    pub fn comments(&self) -> &[LdifLine] {
        &self.comments
    }

    pub fn invalid_parts(&self) -> &[InvalidPart] {
        &self.invalid
    }

    /// The closing `-` line.
    pub fn separator(&self) -> Option<&LdifLine> {
        self.separator.as_ref()
    }

    pub fn parts(&self) -> Vec<LdifPart<'_>> {
        let mut parts = vec![LdifPart::Line(&self.type_line)];
        parts.extend(self.attr_vals.iter().map(LdifPart::Line));
        parts.extend(self.comments.iter().map(LdifPart::Line));
        parts.extend(self.invalid.iter().map(LdifPart::Invalid));
        parts.extend(self.separator.iter().map(LdifPart::Line));
        parts.sort_by_key(LdifPart::offset);
        parts
    }

    /// Closed by `-`, free of garbage, and every value belongs to the named
    /// attribute. `add` and `increment` need at least one value.
    pub fn is_valid(&self) -> bool {
        if !self.type_line.is_valid() || self.separator.is_none() || !self.invalid.is_empty() {
            return false;
        }
        let Some(attribute) = self.attribute() else {
            return false;
        };
        let values_match = self.attr_vals.iter().all(|line| {
            line.is_valid()
                && line
                    .attribute_description()
                    .map_or(false, |a| a.eq_ignore_ascii_case(&attribute))
        });
        let needs_value = matches!(self.mod_type(), Some(ModType::Add | ModType::Increment));
        values_match && !(needs_value && self.attr_vals.is_empty())
    }
}

/// Body of a record, by record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// Plain `attr: value` entry without a changetype.
    Content { attr_vals: Vec<LdifLine> },
    ChangeAdd { attr_vals: Vec<LdifLine> },
    ChangeDelete,
    ChangeModify { mod_specs: Vec<ModSpec> },
    ChangeModDn {
        newrdn: Option<LdifLine>,
        deloldrdn: Option<LdifLine>,
        newsuperior: Option<LdifLine>,
    },
    /// Controls or a changetype line were seen, but no usable change type.
    Change,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Content { .. } => "content",
            RecordKind::ChangeAdd { .. } => "change-add",
            RecordKind::ChangeDelete => "change-delete",
            RecordKind::ChangeModify { .. } => "change-modify",
            RecordKind::ChangeModDn { .. } => "change-moddn",
            RecordKind::Change => "change",
        }
    }
}

/// A finished record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdifRecord {
    dn: LdifLine,
    comments: Vec<LdifLine>,
    controls: Vec<LdifLine>,
    change_type: Option<LdifLine>,
    invalid: Vec<InvalidPart>,
    kind: RecordKind,
    terminator: Terminator,
}

impl LdifRecord {
    pub fn dn(&self) -> &LdifLine {
        &self.dn
    }

    /// The distinguished name with folds removed.
    pub fn dn_value(&self) -> Option<String> {
        self.dn.unfolded_value()
    }

    pub fn comments(&self) -> &[LdifLine] {
        &self.comments
    }

    pub fn controls(&self) -> &[LdifLine] {
        &self.controls
    }

    pub fn change_type(&self) -> Option<&LdifLine> {
        self.change_type.as_ref()
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    /// Fragments harvested by recovery, outside any mod-spec.
    pub fn invalid_parts(&self) -> &[InvalidPart] {
        &self.invalid
    }

    pub fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Attr-val lines of a content or add record; empty otherwise.
    pub fn attr_vals(&self) -> &[LdifLine] {
        match &self.kind {
            RecordKind::Content { attr_vals } | RecordKind::ChangeAdd { attr_vals } => attr_vals,
            _ => &[],
        }
    }

    pub fn mod_specs(&self) -> &[ModSpec] {
        match &self.kind {
            RecordKind::ChangeModify { mod_specs } => mod_specs,
            _ => &[],
        }
    }

    pub fn newrdn(&self) -> Option<&LdifLine> {
        match &self.kind {
            RecordKind::ChangeModDn { newrdn, .. } => newrdn.as_ref(),
            _ => None,
        }
    }

    pub fn deloldrdn(&self) -> Option<&LdifLine> {
        match &self.kind {
            RecordKind::ChangeModDn { deloldrdn, .. } => deloldrdn.as_ref(),
            _ => None,
        }
    }

    pub fn newsuperior(&self) -> Option<&LdifLine> {
        match &self.kind {
            RecordKind::ChangeModDn { newsuperior, .. } => newsuperior.as_ref(),
            _ => None,
        }
    }

    pub fn is_content_record(&self) -> bool {
        matches!(self.kind, RecordKind::Content { .. })
    }

    pub fn is_change_record(&self) -> bool {
        !self.is_content_record()
    }

    pub fn offset(&self) -> usize {
        self.dn.offset()
    }

    /// Every part of the record, sorted by offset.
    pub fn parts(&self) -> Vec<LdifPart<'_>> {
        let mut parts = vec![LdifPart::Line(&self.dn)];
        parts.extend(self.comments.iter().map(LdifPart::Line));
        parts.extend(self.controls.iter().map(LdifPart::Line));
        parts.extend(self.change_type.iter().map(LdifPart::Line));
        parts.extend(self.invalid.iter().map(LdifPart::Invalid));
        match &self.kind {
            RecordKind::Content { attr_vals } | RecordKind::ChangeAdd { attr_vals } => {
                parts.extend(attr_vals.iter().map(LdifPart::Line));
            }
            RecordKind::ChangeModify { mod_specs } => {
                for spec in mod_specs {
                    parts.extend(spec.parts());
                }
            }
            RecordKind::ChangeModDn {
                newrdn,
                deloldrdn,
                newsuperior,
            } => {
                parts.extend(newrdn.iter().map(LdifPart::Line));
                parts.extend(deloldrdn.iter().map(LdifPart::Line));
                parts.extend(newsuperior.iter().map(LdifPart::Line));
            }
            RecordKind::ChangeDelete | RecordKind::Change => {}
        }
        parts.push(self.terminator.part());
        parts.sort_by_key(LdifPart::offset);
        parts
    }

    pub fn is_valid(&self) -> bool {
        if !self.invalid.is_empty() || !self.dn.is_valid() {
            return false;
        }
        let header_ok = self.controls.iter().all(LdifLine::is_valid)
            && self.change_type.as_ref().map_or(true, LdifLine::is_valid);
        if !header_ok {
            return false;
        }
        match &self.kind {
            RecordKind::Content { attr_vals } | RecordKind::ChangeAdd { attr_vals } => {
                !attr_vals.is_empty() && attr_vals.iter().all(LdifLine::is_valid)
            }
            RecordKind::ChangeDelete => true,
            RecordKind::ChangeModify { mod_specs } => mod_specs.iter().all(ModSpec::is_valid),
            RecordKind::ChangeModDn {
                newrdn,
                deloldrdn,
                newsuperior,
            } => {
                newrdn.as_ref().map_or(false, LdifLine::is_valid)
                    && deloldrdn.as_ref().map_or(false, LdifLine::is_valid)
                    && newsuperior.as_ref().map_or(true, LdifLine::is_valid)
            }
            RecordKind::Change => false,
        }
    }
}

/// Accumulates the header of a record while its body is parsed.
///
/// The body itself is collected by the parser and handed over together
/// with the terminator in [`RecordBuilder::finish`].
#[derive(Debug)]
pub(crate) struct RecordBuilder {
    dn: LdifLine,
    comments: Vec<LdifLine>,
    controls: Vec<LdifLine>,
    change_type: Option<LdifLine>,
    invalid: Vec<InvalidPart>,
}

impl RecordBuilder {
    pub(crate) fn new(dn: LdifLine) -> Self {
        Self {
            dn,
            comments: Vec::new(),
            controls: Vec::new(),
            change_type: None,
            invalid: Vec::new(),
        }
    }

    pub(crate) fn push_comment(&mut self, line: LdifLine) {
        self.comments.push(line);
    }

    pub(crate) fn push_control(&mut self, line: LdifLine) {
        self.controls.push(line);
    }

    pub(crate) fn push_invalid(&mut self, part: InvalidPart) {
        self.invalid.push(part);
    }

    pub(crate) fn set_change_type(&mut self, line: LdifLine) {
        self.change_type = Some(line);
    }

    pub(crate) fn finish(self, kind: RecordKind, terminator: Terminator) -> LdifRecord {
        LdifRecord {
            dn: self.dn,
            comments: self.comments,
            controls: self.controls,
            change_type: self.change_type,
            invalid: self.invalid,
            kind,
            terminator,
        }
    }
}
