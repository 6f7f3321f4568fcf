//! Pull-based incremental parsing.
//!
//! ```text
//!   Header ──▶ Body ──(nothing parsed)──▶ Footer ──▶ Done
//!               ▲  │
//!               └──┘ one comment block, record or invalid line per step
//! ```
//!
//! [`LdifEnumeration::has_next`] is the only place where parsing happens.
//! Each step runs one sub-attempt of the current phase and queues whatever
//! containers it produced; `next` pops them one at a time. The footer always
//! queues the EOF container, which is the last container handed out.

use std::collections::VecDeque;
use std::io::Read;
use std::iter::FusedIterator;

use crate::container::LdifContainer;
use crate::error::{LdifError, Result};
use crate::options::ScannerOptions;
use crate::parser::LdifParser;

/// Where the enumeration is in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Leading comments and the optional version line.
    Header,
    /// Records, comment blocks and invalid lines.
    Body,
    /// Trailing comments and the EOF container.
    Footer,
    /// Nothing left to parse.
    Done,
}

/// Lazily parsed sequence of containers.
#[derive(Debug)]
pub struct LdifEnumeration<R> {
    parser: LdifParser<R>,
    phase: Phase,
    pending: VecDeque<LdifContainer>,
}

impl<R: Read> LdifEnumeration<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ScannerOptions::default())
    }

    pub fn with_options(reader: R, options: ScannerOptions) -> Self {
        Self {
            parser: LdifParser::with_options(reader, options),
            phase: Phase::Header,
            pending: VecDeque::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check whether another container is available, parsing if needed.
    ///
    /// Repeated calls without `next` in between do not parse again. A
    /// reader failure is returned once; the enumeration is finished after
    /// it.
    pub fn has_next(&mut self) -> Result<bool> {
        while self.pending.is_empty() && self.phase != Phase::Done {
            self.step();
            if let Some(err) = self.parser.take_error() {
                tracing::debug!(offset = err.offset(), "stopping after read failure");
                self.pending.clear();
                self.phase = Phase::Done;
                return Err(err);
            }
        }
        Ok(!self.pending.is_empty())
    }

    /// Run one sub-attempt of the current phase.
    fn step(&mut self) {
        let mut out = Vec::new();
        match self.phase {
            Phase::Header => {
                self.parser.parse_comments(&mut out);
                self.parser.parse_version(&mut out);
                self.parser.parse_comments(&mut out);
                self.enter(Phase::Body);
            }
            Phase::Body => {
                let parsed = self.parser.parse_comments(&mut out)
                    || self.parser.parse_record(&mut out)
                    || self.parser.parse_other(&mut out);
                if !parsed {
                    self.enter(Phase::Footer);
                }
            }
            Phase::Footer => {
                self.parser.parse_comments(&mut out);
                self.parser.parse_eof(&mut out);
                self.enter(Phase::Done);
            }
            Phase::Done => {}
        }
        self.pending.extend(out);
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(
            from = ?self.phase,
            to = ?phase,
            offset = self.parser.position(),
            "phase"
        );
        self.phase = phase;
    }
}

impl<R: Read> Iterator for LdifEnumeration<R> {
    type Item = std::result::Result<LdifContainer, LdifError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => self.pending.pop_front().map(Ok),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<R: Read> FusedIterator for LdifEnumeration<R> {}
