//! Record assembler.
//!
//! Drives the scanner through the LDIF grammar and turns tokens into
//! containers. Every step tries the constructs that may appear at the
//! current position in a fixed order and takes the first that matches:
//!
//! ```text
//!   record  = dn-line comments* ( control | changetype )? body terminator
//!   body    = content | add | delete | modify | moddn | generic
//!   step    = terminator | construct | comment | other
//! ```
//!
//! Malformed input never stops the parser. Three recoveries are used:
//!
//! - a missing token after a matched keyword leaves the rest of the line's
//!   tokens as `None`;
//! - a line without its line break is followed by a cleanup, which turns
//!   the remainder of the line into an [`InvalidPart`];
//! - when nothing matches, one `other` token is wrapped in an
//!   [`InvalidPart`] so the cursor always moves.
//!
//! The only failure is an I/O error from the reader, which the scanner
//! keeps until [`LdifParser::take_error`] is called.

use std::io::Read;

use crate::container::{ContainerKind, LdifContainer};
use crate::error::LdifError;
use crate::line::{ChangeKind, ControlLine, LdifLine, LineKind, ValueLine};
use crate::options::ScannerOptions;
use crate::part::{EofPart, InvalidPart};
use crate::record::{LdifRecord, ModSpec, RecordBuilder, RecordKind, Terminator};
use crate::scanner::LdifScanner;
use crate::token::{Token, TokenKind};

/// Matches the token after a value type.
type ValueMatcher<R> = fn(&mut LdifScanner<R>) -> Option<Token>;

/// Recursive-descent parser over one scanner.
#[derive(Debug)]
pub struct LdifParser<R> {
    scanner: LdifScanner<R>,
}

impl<R: Read> LdifParser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ScannerOptions::default())
    }

    pub fn with_options(reader: R, options: ScannerOptions) -> Self {
        Self {
            scanner: LdifScanner::with_options(reader, options),
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Take the reader failure, if one happened.
    pub fn take_error(&mut self) -> Option<LdifError> {
        self.scanner.take_error()
    }

    // ========================================================================
    // Document level
    // ========================================================================

    /// Blank lines and comment blocks outside records.
    ///
    /// Each blank line becomes a separator container, each run of
    /// consecutive comment lines one comment container.
    pub fn parse_comments(&mut self, out: &mut Vec<LdifContainer>) -> bool {
        let mut found = false;
        loop {
            if let Some(sep) = self.scanner.match_sep() {
                let line = LdifLine::new(LineKind::RecordSeparator { sep });
                out.push(LdifContainer::new(ContainerKind::Separator(line)));
                found = true;
                continue;
            }
            let lines = self.comment_lines();
            if lines.is_empty() {
                return found;
            }
            out.push(LdifContainer::new(ContainerKind::Comment(lines)));
            found = true;
        }
    }

    /// `version: 1`
    pub fn parse_version(&mut self, out: &mut Vec<LdifContainer>) -> bool {
        let Some(spec) = self.scanner.match_version_spec() else {
            return false;
        };
        let (line, junk) = self.value_line(spec, LdifScanner::match_number);
        out.push(LdifContainer::new(ContainerKind::Version {
            line: LdifLine::new(LineKind::Version(line)),
            invalid: junk.into_iter().collect(),
        }));
        true
    }

    /// One record starting with a dn line.
    pub fn parse_record(&mut self, out: &mut Vec<LdifContainer>) -> bool {
        match self.record() {
            Some(record) => {
                tracing::trace!(
                    offset = record.offset(),
                    kind = record.kind().name(),
                    "record"
                );
                out.push(LdifContainer::new(ContainerKind::Record(record)));
                true
            }
            None => false,
        }
    }

    /// One line that fits nowhere.
    pub fn parse_other(&mut self, out: &mut Vec<LdifContainer>) -> bool {
        match self.other_part() {
            Some(part) => {
                out.push(LdifContainer::new(ContainerKind::Invalid(part)));
                true
            }
            None => false,
        }
    }

    /// The end-of-input container.
    pub fn parse_eof(&mut self, out: &mut Vec<LdifContainer>) -> bool {
        match self.scanner.match_eof() {
            Some(eof) => {
                out.push(LdifContainer::new(ContainerKind::Eof(EofPart::new(eof.offset()))));
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Records
    // ========================================================================

    fn record(&mut self) -> Option<LdifRecord> {
        let spec = self.scanner.match_dn_spec()?;
        let (dn, junk) = self.value_line(spec, LdifScanner::match_value);
        let mut builder = RecordBuilder::new(LdifLine::new(LineKind::Dn(dn)));
        if let Some(junk) = junk {
            builder.push_invalid(junk);
        }

        let mut had_comments = self.record_comments(&mut builder);
        let mut had_control = self.control(&mut builder);
        let mut change_type = self.change_type_line();

        if !had_control && change_type.is_none() {
            let (attr_vals, terminator) = self.attr_val_body(&mut builder);
            return Some(builder.finish(RecordKind::Content { attr_vals }, terminator));
        }

        while change_type.is_none() && (had_comments || had_control) {
            had_comments = self.record_comments(&mut builder);
            had_control = self.control(&mut builder);
            change_type = self.change_type_line();
        }

        let change = match change_type {
            Some((line, junk)) => {
                let change = line.change_kind();
                builder.set_change_type(line);
                if let Some(junk) = junk {
                    builder.push_invalid(junk);
                }
                change
            }
            None => None,
        };

        let (kind, terminator) = match change {
            Some(ChangeKind::Add) => {
                let (attr_vals, terminator) = self.attr_val_body(&mut builder);
                (RecordKind::ChangeAdd { attr_vals }, terminator)
            }
            Some(ChangeKind::Delete) => (RecordKind::ChangeDelete, self.plain_body(&mut builder)),
            Some(ChangeKind::Modify) => self.modify_body(&mut builder),
            Some(ChangeKind::ModDn) => self.moddn_body(&mut builder),
            None => (RecordKind::Change, self.plain_body(&mut builder)),
        };
        Some(builder.finish(kind, terminator))
    }

    /// `attr: value` lines until the terminator.
    fn attr_val_body(&mut self, builder: &mut RecordBuilder) -> (Vec<LdifLine>, Terminator) {
        let mut attr_vals = Vec::new();
        loop {
            if let Some(terminator) = self.end_of_record() {
                return (attr_vals, terminator);
            }
            if let Some((line, junk)) = self.attr_val_line() {
                attr_vals.push(line);
                if let Some(junk) = junk {
                    builder.push_invalid(junk);
                }
            } else if !self.record_comment_or_other(builder) {
                return (attr_vals, self.eof_terminator());
            }
        }
    }

    /// Delete records and records without a usable change type: only
    /// comments are expected, anything else is invalid.
    fn plain_body(&mut self, builder: &mut RecordBuilder) -> Terminator {
        loop {
            if let Some(terminator) = self.end_of_record() {
                return terminator;
            }
            if !self.record_comment_or_other(builder) {
                return self.eof_terminator();
            }
        }
    }

    fn modify_body(&mut self, builder: &mut RecordBuilder) -> (RecordKind, Terminator) {
        let mut mod_specs = Vec::new();
        let terminator = loop {
            if let Some(terminator) = self.end_of_record() {
                break terminator;
            }
            match self.scanner.match_mod_type_spec() {
                Some(spec) => mod_specs.push(self.mod_spec(spec)),
                None => {
                    if !self.record_comment_or_other(builder) {
                        break self.eof_terminator();
                    }
                }
            }
        };
        (RecordKind::ChangeModify { mod_specs }, terminator)
    }

    fn mod_spec(&mut self, spec: Token) -> ModSpec {
        let (line, junk) = self.value_line(spec, LdifScanner::match_attribute_description);
        let mut mod_spec = ModSpec::new(LdifLine::new(LineKind::ModSpecType(line)));
        if let Some(junk) = junk {
            mod_spec.push_invalid(junk);
        }

        loop {
            if let Some((line, junk)) = self.attr_val_line() {
                mod_spec.push_attr_val(line);
                if let Some(junk) = junk {
                    mod_spec.push_invalid(junk);
                }
                continue;
            }
            let comments = self.comment_lines();
            if comments.is_empty() {
                break;
            }
            for comment in comments {
                mod_spec.push_comment(comment);
            }
        }

        if let Some(marker) = self.scanner.match_mod_sep() {
            let sep = self.scanner.match_sep();
            let unterminated = sep.is_none();
            mod_spec.close(LdifLine::new(LineKind::ModSpecSeparator { marker, sep }));
            if unterminated {
                if let Some(junk) = self.cleanup() {
                    mod_spec.push_invalid(junk);
                }
            }
        }
        mod_spec
    }

    /// `newrdn`, `deleteoldrdn` and `newsuperior`, each at most once and in
    /// any order.
    fn moddn_body(&mut self, builder: &mut RecordBuilder) -> (RecordKind, Terminator) {
        let mut newrdn = None;
        let mut deloldrdn = None;
        let mut newsuperior = None;

        let terminator = loop {
            if let Some(terminator) = self.end_of_record() {
                break terminator;
            }
            if self.record_comments(builder) {
                continue;
            }

            let mut spec = None;
            if newrdn.is_none() {
                spec = self.scanner.match_newrdn_spec();
            }
            if spec.is_none() && deloldrdn.is_none() {
                spec = self.scanner.match_deleteoldrdn_spec();
            }
            if spec.is_none() && newsuperior.is_none() {
                spec = self.scanner.match_newsuperior_spec();
            }

            let Some(spec) = spec else {
                if !self.record_comment_or_other(builder) {
                    break self.eof_terminator();
                }
                continue;
            };
            let kind = spec.kind();
            let (line, junk) = self.value_line(spec, LdifScanner::match_value);
            match kind {
                TokenKind::NewrdnSpec => newrdn = Some(LdifLine::new(LineKind::Newrdn(line))),
                TokenKind::DeleteoldrdnSpec => {
                    deloldrdn = Some(LdifLine::new(LineKind::Deloldrdn(line)))
                }
                _ => newsuperior = Some(LdifLine::new(LineKind::Newsuperior(line))),
            }
            if let Some(junk) = junk {
                builder.push_invalid(junk);
            }
        };

        let kind = RecordKind::ChangeModDn {
            newrdn,
            deloldrdn,
            newsuperior,
        };
        (kind, terminator)
    }

    // ========================================================================
    // Record helpers
    // ========================================================================

    /// A blank line or the end of input.
    fn end_of_record(&mut self) -> Option<Terminator> {
        if let Some(sep) = self.scanner.match_sep() {
            let line = LdifLine::new(LineKind::RecordSeparator { sep });
            return Some(Terminator::Separator(line));
        }
        self.scanner
            .match_eof()
            .map(|eof| Terminator::Eof(EofPart::new(eof.offset())))
    }

    /// Terminator for a body loop that found nothing at all, which only
    /// happens at the end of input.
    fn eof_terminator(&self) -> Terminator {
        Terminator::Eof(EofPart::new(self.scanner.position()))
    }

    fn record_comments(&mut self, builder: &mut RecordBuilder) -> bool {
        let lines = self.comment_lines();
        let found = !lines.is_empty();
        for line in lines {
            builder.push_comment(line);
        }
        found
    }

    fn record_comment_or_other(&mut self, builder: &mut RecordBuilder) -> bool {
        if self.record_comments(builder) {
            return true;
        }
        match self.other_part() {
            Some(part) => {
                builder.push_invalid(part);
                true
            }
            None => false,
        }
    }

    /// A control line, with cleanup if it is unterminated.
    fn control(&mut self, builder: &mut RecordBuilder) -> bool {
        let Some(spec) = self.scanner.match_control_spec() else {
            return false;
        };
        let value_type = self.scanner.match_value_type();
        let mut oid = None;
        let mut criticality = None;
        let mut control_value_type = None;
        let mut control_value = None;
        let mut sep = None;
        if value_type.is_some() {
            oid = self.scanner.match_oid();
            if oid.is_some() {
                criticality = self.scanner.match_criticality();
                control_value_type = self.scanner.match_value_type();
                if control_value_type.is_some() {
                    control_value = self.scanner.match_value();
                }
                sep = self.scanner.match_sep();
            }
        }
        let unterminated = sep.is_none();
        builder.push_control(LdifLine::new(LineKind::Control(ControlLine::new(
            spec,
            value_type,
            oid,
            criticality,
            control_value_type,
            control_value,
            sep,
        ))));
        if unterminated {
            if let Some(junk) = self.cleanup() {
                builder.push_invalid(junk);
            }
        }
        true
    }

    fn change_type_line(&mut self) -> Option<(LdifLine, Option<InvalidPart>)> {
        let spec = self.scanner.match_change_type_spec()?;
        let (line, junk) = self.value_line(spec, LdifScanner::match_change_type);
        Some((LdifLine::new(LineKind::ChangeType(line)), junk))
    }

    fn attr_val_line(&mut self) -> Option<(LdifLine, Option<InvalidPart>)> {
        let spec = self.scanner.match_attribute_description()?;
        let (line, junk) = self.value_line(spec, LdifScanner::match_value);
        Some((LdifLine::new(LineKind::AttrVal(line)), junk))
    }

    // ========================================================================
    // Lines
    // ========================================================================

    /// Finish a `spec: value` line: value type, value, line break. A missing
    /// piece leaves the rest `None`; a missing line break is followed by a
    /// cleanup of the rest of the line.
    fn value_line(
        &mut self,
        spec: Token,
        value: ValueMatcher<R>,
    ) -> (ValueLine, Option<InvalidPart>) {
        let value_type = self.scanner.match_value_type();
        let mut value_token = None;
        let mut sep = None;
        if value_type.is_some() {
            value_token = value(&mut self.scanner);
            if value_token.is_some() {
                sep = self.scanner.match_sep();
            }
        }
        let junk = if sep.is_none() { self.cleanup() } else { None };
        (ValueLine::new(spec, value_type, value_token, sep), junk)
    }

    /// Consecutive comment lines.
    fn comment_lines(&mut self) -> Vec<LdifLine> {
        let mut lines = Vec::new();
        while let Some(text) = self.scanner.match_comment() {
            let sep = self.scanner.match_sep();
            lines.push(LdifLine::new(LineKind::Comment { text, sep }));
        }
        lines
    }

    fn cleanup(&mut self) -> Option<InvalidPart> {
        let token = self.scanner.match_cleanup_line()?;
        tracing::trace!(offset = token.offset(), len = token.len(), "cleanup line");
        Some(InvalidPart::from_token(token))
    }

    fn other_part(&mut self) -> Option<InvalidPart> {
        let token = self.scanner.match_other()?;
        tracing::trace!(offset = token.offset(), len = token.len(), "unrecognized line");
        Some(InvalidPart::from_token(token))
    }
}
