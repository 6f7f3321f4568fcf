//! Lines of an LDIF document.
//!
//! A line keeps every token it was built from, so its raw text is just the
//! concatenation of those tokens. Tokens that were never matched are `None`;
//! because the scanner never skips input, the present tokens are always
//! contiguous.

use crate::token::{unfold, Token, TokenKind};

/// How a value is encoded after its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `attr: value`
    Safe,
    /// `attr:: base64`
    Base64,
    /// `attr:< url`
    Url,
}

impl ValueKind {
    fn from_token(token: &Token) -> Option<Self> {
        match token.kind() {
            TokenKind::ValueTypeSafe => Some(ValueKind::Safe),
            TokenKind::ValueTypeBase64 => Some(ValueKind::Base64),
            TokenKind::ValueTypeUrl => Some(ValueKind::Url),
            _ => None,
        }
    }
}

/// The operation named by a `changetype:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Delete,
    Modify,
    /// `moddn` and `modrdn`
    ModDn,
}

/// The operation of one mod-spec in a modify record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModType {
    Add,
    Delete,
    Replace,
    Increment,
}

/// A `keyword: value` line.
///
/// The leading token is the keyword (`dn`, `newrdn`, ...), the attribute
/// description of an attr-val line, or the mod type of a mod-spec line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueLine {
    spec: Token,
    value_type: Option<Token>,
    value: Option<Token>,
    sep: Option<Token>,
}

impl ValueLine {
    pub(crate) fn new(
        spec: Token,
        value_type: Option<Token>,
        value: Option<Token>,
        sep: Option<Token>,
    ) -> Self {
        Self {
            spec,
            value_type,
            value,
            sep,
        }
    }

    pub fn spec(&self) -> &Token {
        &self.spec
    }

    pub fn value_type(&self) -> Option<&Token> {
        self.value_type.as_ref()
    }

    pub fn value(&self) -> Option<&Token> {
        self.value.as_ref()
    }

    pub fn sep(&self) -> Option<&Token> {
        self.sep.as_ref()
    }

    pub fn value_kind(&self) -> Option<ValueKind> {
        self.value_type.as_ref().and_then(ValueKind::from_token)
    }

    /// The value with folding sequences removed.
    pub fn unfolded_value(&self) -> Option<String> {
        self.value.as_ref().map(|v| unfold(v.text()))
    }

    fn has_value(&self) -> bool {
        self.value_type.is_some() && self.value.is_some()
    }
}

/// A `control: oid [criticality] [value]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLine {
    spec: Token,
    value_type: Option<Token>,
    oid: Option<Token>,
    criticality: Option<Token>,
    control_value_type: Option<Token>,
    control_value: Option<Token>,
    sep: Option<Token>,
}

impl ControlLine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        spec: Token,
        value_type: Option<Token>,
        oid: Option<Token>,
        criticality: Option<Token>,
        control_value_type: Option<Token>,
        control_value: Option<Token>,
        sep: Option<Token>,
    ) -> Self {
        Self {
            spec,
            value_type,
            oid,
            criticality,
            control_value_type,
            control_value,
            sep,
        }
    }

    pub fn spec(&self) -> &Token {
        &self.spec
    }

    pub fn oid(&self) -> Option<&str> {
        self.oid.as_ref().map(Token::text)
    }

    pub fn criticality(&self) -> Option<&Token> {
        self.criticality.as_ref()
    }

    /// A missing criticality means `false`.
    pub fn is_critical(&self) -> bool {
        self.criticality
            .as_ref()
            .map_or(false, |c| c.kind() == TokenKind::CriticalityTrue)
    }

    pub fn control_value_kind(&self) -> Option<ValueKind> {
        self.control_value_type.as_ref().and_then(ValueKind::from_token)
    }

    pub fn unfolded_control_value(&self) -> Option<String> {
        self.control_value.as_ref().map(|v| unfold(v.text()))
    }

    pub fn sep(&self) -> Option<&Token> {
        self.sep.as_ref()
    }

    fn is_valid(&self) -> bool {
        self.value_type.is_some()
            && self.oid.is_some()
            && (self.control_value_type.is_none() || self.control_value.is_some())
    }
}

/// What a line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Dn(ValueLine),
    Version(ValueLine),
    ChangeType(ValueLine),
    Control(ControlLine),
    /// `add: attr`, `delete: attr`, `replace: attr`, `increment: attr`
    ModSpecType(ValueLine),
    AttrVal(ValueLine),
    Newrdn(ValueLine),
    Deloldrdn(ValueLine),
    Newsuperior(ValueLine),
    /// The `-` closing a mod-spec.
    ModSpecSeparator { marker: Token, sep: Option<Token> },
    /// A blank line.
    RecordSeparator { sep: Token },
    Comment { text: Token, sep: Option<Token> },
}

/// One logical line with its absolute offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdifLine {
    offset: usize,
    kind: LineKind,
}

impl LdifLine {
    pub(crate) fn new(kind: LineKind) -> Self {
        let offset = match &kind {
            LineKind::Dn(l)
            | LineKind::Version(l)
            | LineKind::ChangeType(l)
            | LineKind::ModSpecType(l)
            | LineKind::AttrVal(l)
            | LineKind::Newrdn(l)
            | LineKind::Deloldrdn(l)
            | LineKind::Newsuperior(l) => l.spec.offset(),
            LineKind::Control(c) => c.spec.offset(),
            LineKind::ModSpecSeparator { marker, .. } => marker.offset(),
            LineKind::RecordSeparator { sep } => sep.offset(),
            LineKind::Comment { text, .. } => text.offset(),
        };
        Self { offset, kind }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    /// All present tokens in source order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        let slots: [Option<&Token>; 7] = match &self.kind {
            LineKind::Dn(l)
            | LineKind::Version(l)
            | LineKind::ChangeType(l)
            | LineKind::ModSpecType(l)
            | LineKind::AttrVal(l)
            | LineKind::Newrdn(l)
            | LineKind::Deloldrdn(l)
            | LineKind::Newsuperior(l) => [
                Some(&l.spec),
                l.value_type.as_ref(),
                l.value.as_ref(),
                l.sep.as_ref(),
                None,
                None,
                None,
            ],
            LineKind::Control(c) => [
                Some(&c.spec),
                c.value_type.as_ref(),
                c.oid.as_ref(),
                c.criticality.as_ref(),
                c.control_value_type.as_ref(),
                c.control_value.as_ref(),
                c.sep.as_ref(),
            ],
            LineKind::ModSpecSeparator { marker, sep } => {
                [Some(marker), sep.as_ref(), None, None, None, None, None]
            }
            LineKind::RecordSeparator { sep } => [Some(sep), None, None, None, None, None, None],
            LineKind::Comment { text, sep } => {
                [Some(text), sep.as_ref(), None, None, None, None, None]
            }
        };
        slots.into_iter().flatten()
    }

    /// The line exactly as it appeared, line break included.
    pub fn raw(&self) -> String {
        self.tokens().map(Token::text).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens().map(Token::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every required token is present and the value fits the line.
    ///
    /// The trailing line break is never required: the last line of a file
    /// may end at EOF.
    pub fn is_valid(&self) -> bool {
        match &self.kind {
            LineKind::Dn(l)
            | LineKind::Version(l)
            | LineKind::ChangeType(l)
            | LineKind::ModSpecType(l)
            | LineKind::AttrVal(l)
            | LineKind::Newrdn(l)
            | LineKind::Newsuperior(l) => l.has_value(),
            LineKind::Deloldrdn(l) => {
                l.has_value()
                    && matches!(l.unfolded_value().as_deref().map(str::trim), Some("0" | "1"))
            }
            LineKind::Control(c) => c.is_valid(),
            LineKind::ModSpecSeparator { .. }
            | LineKind::RecordSeparator { .. }
            | LineKind::Comment { .. } => true,
        }
    }

    /// The shared `spec: value` shape, if this line has one.
    pub fn value_line(&self) -> Option<&ValueLine> {
        match &self.kind {
            LineKind::Dn(l)
            | LineKind::Version(l)
            | LineKind::ChangeType(l)
            | LineKind::ModSpecType(l)
            | LineKind::AttrVal(l)
            | LineKind::Newrdn(l)
            | LineKind::Deloldrdn(l)
            | LineKind::Newsuperior(l) => Some(l),
            _ => None,
        }
    }

    pub fn unfolded_value(&self) -> Option<String> {
        self.value_line().and_then(ValueLine::unfolded_value)
    }

    pub fn value_kind(&self) -> Option<ValueKind> {
        self.value_line().and_then(ValueLine::value_kind)
    }

    /// Attribute of an attr-val or mod-spec line, folds removed.
    pub fn attribute_description(&self) -> Option<String> {
        match &self.kind {
            LineKind::AttrVal(l) => Some(unfold(l.spec.text())),
            LineKind::ModSpecType(l) => l.unfolded_value(),
            _ => None,
        }
    }

    pub fn change_kind(&self) -> Option<ChangeKind> {
        let LineKind::ChangeType(l) = &self.kind else {
            return None;
        };
        match l.value.as_ref()?.kind() {
            TokenKind::ChangeTypeAdd => Some(ChangeKind::Add),
            TokenKind::ChangeTypeDelete => Some(ChangeKind::Delete),
            TokenKind::ChangeTypeModify => Some(ChangeKind::Modify),
            TokenKind::ChangeTypeModDn => Some(ChangeKind::ModDn),
            _ => None,
        }
    }

    pub fn mod_type(&self) -> Option<ModType> {
        let LineKind::ModSpecType(l) = &self.kind else {
            return None;
        };
        match l.spec.kind() {
            TokenKind::ModTypeAdd => Some(ModType::Add),
            TokenKind::ModTypeDelete => Some(ModType::Delete),
            TokenKind::ModTypeReplace => Some(ModType::Replace),
            TokenKind::ModTypeIncrement => Some(ModType::Increment),
            _ => None,
        }
    }

    /// `deleteoldrdn: 1`
    pub fn is_delete_old_rdn(&self) -> bool {
        match &self.kind {
            LineKind::Deloldrdn(l) => l.unfolded_value().as_deref().map(str::trim) == Some("1"),
            _ => false,
        }
    }

    /// Version number of a `version:` line.
    pub fn version(&self) -> Option<u32> {
        match &self.kind {
            LineKind::Version(l) => l.unfolded_value()?.parse().ok(),
            _ => None,
        }
    }

    pub fn oid(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Control(c) => c.oid(),
            _ => None,
        }
    }

    pub fn is_critical(&self) -> bool {
        match &self.kind {
            LineKind::Control(c) => c.is_critical(),
            _ => false,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, LineKind::Comment { .. })
    }
}
