//! Cursor-driven LDIF tokenizer.
//!
//! The scanner never builds structure. Each `match_*` method tries to
//! recognize one construct at the cursor: on success it returns the token
//! and advances past it, otherwise it returns `None` and leaves the cursor
//! where it was. Callers get ordered lookahead by trying alternatives one
//! after another; nothing already consumed is ever given back.
//!
//! # Buffering
//!
//! ```text
//!   reader ──read(chunk)──▶ buffer [base ......... pos ......... base+len]
//!                                   └─ discarded ─┘└─ lookahead ─┘
//! ```
//!
//! Bytes are pulled from the reader on demand. Lookahead never reaches
//! before `pos`, so once the consumed prefix grows past one chunk it is
//! dropped and `base` moves up. Offsets in tokens are always absolute.
//!
//! # Folding
//!
//! A line break followed by a single space continues the logical line.
//! Whenever a character is consumed, any folding sequences right after it
//! are consumed with it, so they end up inside the token text. A line
//! break at the very start of a match is never treated as a fold.

use std::io::{self, Read};

use memchr::memchr2;
use phf::phf_map;

use crate::error::LdifError;
use crate::options::ScannerOptions;
use crate::token::{unfold, Token, TokenKind};

/// Spec keywords that introduce a line, matched against a whole
/// attribute-character run.
static SPEC_KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "version" => TokenKind::VersionSpec,
    "dn" => TokenKind::DnSpec,
    "control" => TokenKind::ControlSpec,
    "changetype" => TokenKind::ChangeTypeSpec,
    "newrdn" => TokenKind::NewrdnSpec,
    "deleteoldrdn" => TokenKind::DeleteoldrdnSpec,
    "newsuperior" => TokenKind::NewsuperiorSpec,
};

/// Values accepted after `changetype:`.
static CHANGE_TYPES: phf::Map<&'static str, TokenKind> = phf_map! {
    "add" => TokenKind::ChangeTypeAdd,
    "delete" => TokenKind::ChangeTypeDelete,
    "modify" => TokenKind::ChangeTypeModify,
    "moddn" => TokenKind::ChangeTypeModDn,
    "modrdn" => TokenKind::ChangeTypeModDn,
};

/// Keywords opening a mod-spec inside a modify record.
static MOD_TYPES: phf::Map<&'static str, TokenKind> = phf_map! {
    "add" => TokenKind::ModTypeAdd,
    "delete" => TokenKind::ModTypeDelete,
    "replace" => TokenKind::ModTypeReplace,
    "increment" => TokenKind::ModTypeIncrement,
};

/// Characters allowed in an attribute description after the first one.
#[inline]
fn is_attr_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b';' || b == b'.'
}

/// Tokenizer over any byte source.
#[derive(Debug)]
pub struct LdifScanner<R> {
    reader: R,
    /// Input bytes starting at absolute offset `base`
    buffer: Vec<u8>,
    base: usize,
    /// Absolute cursor
    pos: usize,
    chunk_size: usize,
    /// The reader returned EOF or failed
    exhausted: bool,
    /// First read failure and the offset at which it happened
    error: Option<LdifError>,
}

impl<R: Read> LdifScanner<R> {
    /// Create a scanner with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ScannerOptions::default())
    }

    /// Create a scanner with the given options.
    pub fn with_options(reader: R, options: ScannerOptions) -> Self {
        let chunk_size = options.chunk_size.max(1);
        Self {
            reader,
            buffer: Vec::with_capacity(chunk_size),
            base: 0,
            pos: 0,
            chunk_size,
            exhausted: false,
            error: None,
        }
    }

    /// Absolute offset of the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take the read error, if the reader failed.
    ///
    /// After a failure the scanner behaves as if the input ended at the
    /// point of failure.
    pub fn take_error(&mut self) -> Option<LdifError> {
        self.error.take()
    }

    /// Check whether the cursor is at the end of input.
    pub fn is_at_eof(&mut self) -> bool {
        self.byte_at(self.pos).is_none()
    }

    // ========================================================================
    // Buffer management
    // ========================================================================

    /// Pull one chunk from the reader. Returns false when nothing was added.
    fn fill(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        let len = self.buffer.len();
        self.buffer.resize(len + self.chunk_size, 0);
        loop {
            match self.reader.read(&mut self.buffer[len..]) {
                Ok(0) => {
                    self.buffer.truncate(len);
                    self.exhausted = true;
                    return false;
                }
                Ok(n) => {
                    self.buffer.truncate(len + n);
                    return true;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.buffer.truncate(len);
                    self.exhausted = true;
                    let offset = self.base + len;
                    tracing::warn!(offset, error = %err, "reader failed, treating as end of input");
                    self.error = Some(LdifError::Io {
                        offset,
                        source: err,
                    });
                    return false;
                }
            }
        }
    }

    /// Byte at an absolute offset at or after the cursor.
    #[inline]
    fn byte_at(&mut self, at: usize) -> Option<u8> {
        while at >= self.base + self.buffer.len() {
            if !self.fill() {
                return None;
            }
        }
        Some(self.buffer[at - self.base])
    }

    /// Drop the consumed prefix once it exceeds one chunk.
    fn compact(&mut self) {
        let consumed = self.pos - self.base;
        if consumed >= self.chunk_size {
            self.buffer.drain(..consumed);
            self.base = self.pos;
        }
    }

    /// Copy `start..end` out of the buffer.
    fn text(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.buffer[start - self.base..end - self.base]).into_owned()
    }

    /// Emit a token from the cursor to `end` and advance.
    fn token(&mut self, kind: TokenKind, end: usize) -> Token {
        let token = Token::new(kind, self.pos, self.text(self.pos, end));
        self.pos = end;
        token
    }

    // ========================================================================
    // Character classes
    // ========================================================================

    /// Length of the line break at `at`: 2 for CRLF, 1 for LF or CR, else 0.
    fn line_break_len(&mut self, at: usize) -> usize {
        match self.byte_at(at) {
            Some(b'\r') if self.byte_at(at + 1) == Some(b'\n') => 2,
            Some(b'\n') if self.byte_at(at + 1) == Some(b'\r') => 2,
            Some(b'\r') | Some(b'\n') => 1,
            _ => 0,
        }
    }

    /// Total length of consecutive folding sequences starting at `at`.
    fn fold_len(&mut self, at: usize) -> usize {
        let mut p = at;
        loop {
            let brk = self.line_break_len(p);
            if brk == 0 || self.byte_at(p + brk) != Some(b' ') {
                return p - at;
            }
            p += brk + 1;
        }
    }

    /// Consume the character at `at` and any folds after it.
    #[inline]
    fn step(&mut self, at: usize) -> usize {
        at + 1 + self.fold_len(at + 1)
    }

    /// Offset of the line break ending the logical line that starts at
    /// `from` (or end of input). Folded breaks are skipped.
    fn line_end(&mut self, from: usize) -> usize {
        if self.line_break_len(from) > 0 {
            return from;
        }
        let mut p = from;
        loop {
            if self.byte_at(p).is_none() {
                return p;
            }
            match memchr2(b'\n', b'\r', &self.buffer[p - self.base..]) {
                Some(i) => {
                    let brk = p + i;
                    let fold = self.fold_len(brk);
                    if fold == 0 {
                        return brk;
                    }
                    p = brk + fold;
                }
                None => p = self.base + self.buffer.len(),
            }
        }
    }

    /// End of the attribute-character run starting at `from`.
    fn attr_run_end(&mut self, from: usize) -> usize {
        let mut p = from;
        while let Some(b) = self.byte_at(p) {
            if !is_attr_char(b) {
                break;
            }
            p = self.step(p);
        }
        p
    }

    /// Look up the word at the cursor in a keyword table.
    fn match_word(
        &mut self,
        table: &'static phf::Map<&'static str, TokenKind>,
    ) -> Option<(TokenKind, usize)> {
        self.compact();
        let first = self.byte_at(self.pos)?;
        if !first.is_ascii_alphabetic() {
            return None;
        }
        let end = self.attr_run_end(self.pos);
        let word = unfold(&self.text(self.pos, end)).to_ascii_lowercase();
        table.get(word.as_str()).map(|&kind| (kind, end))
    }

    fn match_spec(&mut self, kind: TokenKind) -> Option<Token> {
        match self.match_word(&SPEC_KEYWORDS) {
            Some((found, end)) if found == kind => Some(self.token(kind, end)),
            _ => None,
        }
    }

    fn match_digits(&mut self, kind: TokenKind, allow_dots: bool) -> Option<Token> {
        self.compact();
        if !self.byte_at(self.pos)?.is_ascii_digit() {
            return None;
        }
        let mut p = self.step(self.pos);
        while let Some(b) = self.byte_at(p) {
            if !(b.is_ascii_digit() || allow_dots && b == b'.') {
                break;
            }
            p = self.step(p);
        }
        Some(self.token(kind, p))
    }

    /// Rest of the logical line plus its line break.
    fn match_rest_of_line(&mut self) -> Option<Token> {
        self.compact();
        self.byte_at(self.pos)?;
        let end = self.line_end(self.pos);
        let end = end + self.line_break_len(end);
        Some(self.token(TokenKind::Unknown, end))
    }

    // ========================================================================
    // Spec keywords
    // ========================================================================

    /// `version`
    pub fn match_version_spec(&mut self) -> Option<Token> {
        self.match_spec(TokenKind::VersionSpec)
    }

    /// `dn`
    pub fn match_dn_spec(&mut self) -> Option<Token> {
        self.match_spec(TokenKind::DnSpec)
    }

    /// `control`
    pub fn match_control_spec(&mut self) -> Option<Token> {
        self.match_spec(TokenKind::ControlSpec)
    }

    /// `changetype`
    pub fn match_change_type_spec(&mut self) -> Option<Token> {
        self.match_spec(TokenKind::ChangeTypeSpec)
    }

    /// `newrdn`
    pub fn match_newrdn_spec(&mut self) -> Option<Token> {
        self.match_spec(TokenKind::NewrdnSpec)
    }

    /// `deleteoldrdn`
    pub fn match_deleteoldrdn_spec(&mut self) -> Option<Token> {
        self.match_spec(TokenKind::DeleteoldrdnSpec)
    }

    /// `newsuperior`
    pub fn match_newsuperior_spec(&mut self) -> Option<Token> {
        self.match_spec(TokenKind::NewsuperiorSpec)
    }

    /// One of `add`, `delete`, `modify`, `moddn`, `modrdn`.
    pub fn match_change_type(&mut self) -> Option<Token> {
        let (kind, end) = self.match_word(&CHANGE_TYPES)?;
        Some(self.token(kind, end))
    }

    /// One of `add`, `delete`, `replace`, `increment`.
    pub fn match_mod_type_spec(&mut self) -> Option<Token> {
        let (kind, end) = self.match_word(&MOD_TYPES)?;
        Some(self.token(kind, end))
    }

    /// The `-` closing a mod-spec.
    pub fn match_mod_sep(&mut self) -> Option<Token> {
        self.compact();
        if self.byte_at(self.pos)? != b'-' {
            return None;
        }
        let end = self.step(self.pos);
        Some(self.token(TokenKind::ModSep, end))
    }

    // ========================================================================
    // Line contents
    // ========================================================================

    /// Attribute description: `[A-Za-z0-9][A-Za-z0-9.;-]*`.
    pub fn match_attribute_description(&mut self) -> Option<Token> {
        self.compact();
        if !self.byte_at(self.pos)?.is_ascii_alphanumeric() {
            return None;
        }
        let end = self.attr_run_end(self.pos);
        Some(self.token(TokenKind::Attribute, end))
    }

    /// `:`, `::` or `:<`, followed by any fill spaces.
    pub fn match_value_type(&mut self) -> Option<Token> {
        self.compact();
        if self.byte_at(self.pos)? != b':' {
            return None;
        }
        let mut p = self.step(self.pos);
        let kind = match self.byte_at(p) {
            Some(b':') => {
                p = self.step(p);
                TokenKind::ValueTypeBase64
            }
            Some(b'<') => {
                p = self.step(p);
                TokenKind::ValueTypeUrl
            }
            _ => TokenKind::ValueTypeSafe,
        };
        while self.byte_at(p) == Some(b' ') {
            p = self.step(p);
        }
        Some(self.token(kind, p))
    }

    /// Everything up to the end of the logical line. May be empty.
    pub fn match_value(&mut self) -> Option<Token> {
        self.compact();
        let end = self.line_end(self.pos);
        Some(self.token(TokenKind::Value, end))
    }

    /// A version number.
    pub fn match_number(&mut self) -> Option<Token> {
        self.match_digits(TokenKind::Number, false)
    }

    /// A numeric OID such as `1.2.840.113556.1.4.805`.
    pub fn match_oid(&mut self) -> Option<Token> {
        self.match_digits(TokenKind::Oid, true)
    }

    /// One or more spaces followed by `true` or `false`.
    pub fn match_criticality(&mut self) -> Option<Token> {
        self.compact();
        let mut p = self.pos;
        while self.byte_at(p) == Some(b' ') {
            p = self.step(p);
        }
        if p == self.pos || !self.byte_at(p)?.is_ascii_alphabetic() {
            return None;
        }
        let end = self.attr_run_end(p);
        let word = unfold(&self.text(p, end)).to_ascii_lowercase();
        let kind = match word.as_str() {
            "true" => TokenKind::CriticalityTrue,
            "false" => TokenKind::CriticalityFalse,
            _ => return None,
        };
        Some(self.token(kind, end))
    }

    // ========================================================================
    // Line structure
    // ========================================================================

    /// A single line break.
    pub fn match_sep(&mut self) -> Option<Token> {
        self.compact();
        let len = self.line_break_len(self.pos);
        if len == 0 {
            return None;
        }
        let end = self.pos + len;
        Some(self.token(TokenKind::Sep, end))
    }

    /// `#` up to the end of the logical line (line break excluded).
    pub fn match_comment(&mut self) -> Option<Token> {
        self.compact();
        if self.byte_at(self.pos)? != b'#' {
            return None;
        }
        let after_hash = self.step(self.pos);
        let end = self.line_end(after_hash);
        Some(self.token(TokenKind::Comment, end))
    }

    /// Zero-length marker, only at end of input.
    pub fn match_eof(&mut self) -> Option<Token> {
        self.compact();
        if self.byte_at(self.pos).is_some() {
            return None;
        }
        Some(Token::new(TokenKind::Eof, self.pos, ""))
    }

    /// Catch-all: the rest of the current line including its line break.
    /// Matches anything except end of input.
    pub fn match_other(&mut self) -> Option<Token> {
        self.match_rest_of_line()
    }

    /// Harvest the remainder of a malformed line, including its line break.
    pub fn match_cleanup_line(&mut self) -> Option<Token> {
        self.match_rest_of_line()
    }
}

// ============================================================================
// Tests
// ============================================================================
