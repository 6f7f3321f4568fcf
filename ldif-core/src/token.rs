//! Tokens produced by the scanner.
//!
//! A token is the exact slice of input matched by one `match_*` call on
//! [`LdifScanner`](crate::scanner::LdifScanner), together with its absolute
//! byte offset. Token text is never normalized: fill spaces, folding
//! sequences and line breaks stay in place so the source can be rebuilt.

/// Kind of lexical construct a token was matched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// `version` spec keyword
    VersionSpec = 0,
    /// `dn` spec keyword
    DnSpec,
    /// `control` spec keyword
    ControlSpec,
    /// `changetype` spec keyword
    ChangeTypeSpec,
    /// `newrdn` spec keyword
    NewrdnSpec,
    /// `deleteoldrdn` spec keyword
    DeleteoldrdnSpec,
    /// `newsuperior` spec keyword
    NewsuperiorSpec,

    /// changetype value `add`
    ChangeTypeAdd,
    /// changetype value `delete`
    ChangeTypeDelete,
    /// changetype value `modify`
    ChangeTypeModify,
    /// changetype value `moddn` or `modrdn`
    ChangeTypeModDn,

    /// `add` mod-spec keyword
    ModTypeAdd,
    /// `delete` mod-spec keyword
    ModTypeDelete,
    /// `replace` mod-spec keyword
    ModTypeReplace,
    /// `increment` mod-spec keyword
    ModTypeIncrement,
    /// Bare `-` closing a mod-spec
    ModSep,

    /// Attribute description: `cn`, `userCertificate;binary`, `2.5.4.3`
    Attribute,
    /// `:` followed by fill spaces
    ValueTypeSafe,
    /// `::` followed by fill spaces
    ValueTypeBase64,
    /// `:<` followed by fill spaces
    ValueTypeUrl,
    /// Rest of a logical line after a value type
    Value,
    /// Version number
    Number,
    /// Control type OID
    Oid,
    /// Control criticality `true` (with leading spaces)
    CriticalityTrue,
    /// Control criticality `false` (with leading spaces)
    CriticalityFalse,

    /// Line break: CRLF, LF or CR
    Sep,
    /// `#` comment up to the end of the logical line
    Comment,
    /// Zero-length end of input marker
    Eof,
    /// Anything the scanner could not classify
    Unknown,
}

impl TokenKind {
    /// Short human-readable name, used in logs and test output.
    pub fn name(self) -> &'static str {
        match self {
            Self::VersionSpec => "version-spec",
            Self::DnSpec => "dn-spec",
            Self::ControlSpec => "control-spec",
            Self::ChangeTypeSpec => "changetype-spec",
            Self::NewrdnSpec => "newrdn-spec",
            Self::DeleteoldrdnSpec => "deleteoldrdn-spec",
            Self::NewsuperiorSpec => "newsuperior-spec",
            Self::ChangeTypeAdd => "changetype-add",
            Self::ChangeTypeDelete => "changetype-delete",
            Self::ChangeTypeModify => "changetype-modify",
            Self::ChangeTypeModDn => "changetype-moddn",
            Self::ModTypeAdd => "modtype-add",
            Self::ModTypeDelete => "modtype-delete",
            Self::ModTypeReplace => "modtype-replace",
            Self::ModTypeIncrement => "modtype-increment",
            Self::ModSep => "modspec-sep",
            Self::Attribute => "attribute",
            Self::ValueTypeSafe => "value-type-safe",
            Self::ValueTypeBase64 => "value-type-base64",
            Self::ValueTypeUrl => "value-type-url",
            Self::Value => "value",
            Self::Number => "number",
            Self::Oid => "oid",
            Self::CriticalityTrue => "criticality-true",
            Self::CriticalityFalse => "criticality-false",
            Self::Sep => "sep",
            Self::Comment => "comment",
            Self::Eof => "eof",
            Self::Unknown => "unknown",
        }
    }

    /// True for the three value-type markers.
    #[inline]
    pub fn is_value_type(self) -> bool {
        matches!(
            self,
            Self::ValueTypeSafe | Self::ValueTypeBase64 | Self::ValueTypeUrl
        )
    }
}

/// A matched piece of input, located by byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    offset: usize,
    text: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, offset: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            text: text.into(),
        }
    }

    /// What the token was matched as.
    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Absolute byte offset of the first byte of the token.
    ///
    /// This is a UTF-8 byte index into the input, not a character index:
    /// after non-ASCII text the two differ. Use `input[..offset]` to get the
    /// preceding text, or count its `chars()` for a character position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The exact text that was matched.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the token in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is zero-length (EOF markers, empty values).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset one past the last byte of the token.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Remove folding sequences (line break followed by one space) from raw text.
pub fn unfold(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let brk = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\n' if bytes.get(i + 1) == Some(&b'\r') => 2,
            b'\r' | b'\n' => 1,
            _ => 0,
        };
        if brk > 0 && bytes.get(i + brk) == Some(&b' ') {
            out.push_str(&raw[start..i]);
            i += brk + 1;
            start = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&raw[start..]);
    out
}
