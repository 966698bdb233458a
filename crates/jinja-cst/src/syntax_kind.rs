//! Syntax node and token kinds for the Jinja CST.

use crate::lexer::TokenKind;

/// The kind of a syntax element (node or token).
///
/// Tokens are terminal elements (leaves), while nodes are non-terminal
/// (contain children). The distinction is made by value: tokens have
/// lower values than `__LAST_TOKEN`.
///
/// The SCREAMING_CASE naming convention is used to match rowan/rust-analyzer
/// conventions for syntax kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
#[allow(clippy::manual_non_exhaustive)] // __LAST_TOKEN is used for token/node distinction
pub enum SyntaxKind {
    // ========== TOKENS (terminals) ==========
    /// A run of template text outside any construct
    TEXT = 0,
    /// `{# ... #}`
    COMMENT,
    /// `{%` or `{%-`
    L_TAG,
    /// `%}` or `-%}`
    R_TAG,
    /// `{{` or `{{-`
    L_VAR,
    /// `}}` or `-}}`
    R_VAR,
    /// Identifier or keyword
    IDENT,
    /// Number literal
    NUMBER,
    /// String literal
    STRING,
    /// `.`
    DOT,
    /// `|`
    PIPE,
    /// `,`
    COMMA,
    /// `:`
    COLON,
    /// `(`
    L_PAREN,
    /// `)`
    R_PAREN,
    /// `[`
    L_BRACKET,
    /// `]`
    R_BRACKET,
    /// Any other operator
    OP,
    /// Whitespace inside a construct
    WHITESPACE,
    /// Lexer/parser error
    ERROR,
    /// End of file
    EOF,

    // Marker for end of tokens
    #[doc(hidden)]
    __LAST_TOKEN,

    // ========== NODES (non-terminals) ==========
    /// Root template node
    ROOT,
    /// A `{% ... %}` tag construct
    TAG,
    /// A `{{ ... }}` interpolation construct
    INTERPOLATION,
    /// The name of a tag (first identifier after `{%`)
    TAG_NAME,
    /// A variable reference
    VARIABLE_NAME,
    /// The property part of a member access
    PROPERTY_NAME,
    /// A filter name (identifier after `|`)
    FILTER_NAME,
    /// A member access `a.b`
    MEMBER_EXPR,
    /// A call `f(...)`
    CALL_EXPR,
    /// A subscript `a[...]`
    SUBSCRIPT_EXPR,
    /// A parenthesized expression `( ... )`
    PAREN_EXPR,
    /// A list literal `[ ... ]`
    LIST_EXPR,
}

impl SyntaxKind {
    /// Whether this is a token (terminal) kind.
    pub fn is_token(self) -> bool {
        (self as u16) < (Self::__LAST_TOKEN as u16)
    }

    /// Whether this is a node (non-terminal) kind.
    pub fn is_node(self) -> bool {
        (self as u16) > (Self::__LAST_TOKEN as u16)
    }

    /// Whether this is trivia (whitespace).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE)
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Text => Self::TEXT,
            TokenKind::Comment => Self::COMMENT,
            TokenKind::LTag => Self::L_TAG,
            TokenKind::RTag => Self::R_TAG,
            TokenKind::LVar => Self::L_VAR,
            TokenKind::RVar => Self::R_VAR,
            TokenKind::Ident => Self::IDENT,
            TokenKind::Number => Self::NUMBER,
            TokenKind::String => Self::STRING,
            TokenKind::Dot => Self::DOT,
            TokenKind::Pipe => Self::PIPE,
            TokenKind::Comma => Self::COMMA,
            TokenKind::Colon => Self::COLON,
            TokenKind::LParen => Self::L_PAREN,
            TokenKind::RParen => Self::R_PAREN,
            TokenKind::LBracket => Self::L_BRACKET,
            TokenKind::RBracket => Self::R_BRACKET,
            TokenKind::Op => Self::OP,
            TokenKind::Whitespace => Self::WHITESPACE,
            TokenKind::Eof => Self::EOF,
            TokenKind::Error => Self::ERROR,
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Language definition for Jinja, used by rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JinjaLanguage {}

impl rowan::Language for JinjaLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        Self::Kind::from_raw(raw.0).expect("invalid SyntaxKind value from rowan")
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

impl SyntaxKind {
    /// Convert from a raw u16 value to SyntaxKind.
    /// Returns None if the value is out of range or corresponds to __LAST_TOKEN.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::TEXT),
            1 => Some(Self::COMMENT),
            2 => Some(Self::L_TAG),
            3 => Some(Self::R_TAG),
            4 => Some(Self::L_VAR),
            5 => Some(Self::R_VAR),
            6 => Some(Self::IDENT),
            7 => Some(Self::NUMBER),
            8 => Some(Self::STRING),
            9 => Some(Self::DOT),
            10 => Some(Self::PIPE),
            11 => Some(Self::COMMA),
            12 => Some(Self::COLON),
            13 => Some(Self::L_PAREN),
            14 => Some(Self::R_PAREN),
            15 => Some(Self::L_BRACKET),
            16 => Some(Self::R_BRACKET),
            17 => Some(Self::OP),
            18 => Some(Self::WHITESPACE),
            19 => Some(Self::ERROR),
            20 => Some(Self::EOF),
            // 21 is __LAST_TOKEN - skip it
            22 => Some(Self::ROOT),
            23 => Some(Self::TAG),
            24 => Some(Self::INTERPOLATION),
            25 => Some(Self::TAG_NAME),
            26 => Some(Self::VARIABLE_NAME),
            27 => Some(Self::PROPERTY_NAME),
            28 => Some(Self::FILTER_NAME),
            29 => Some(Self::MEMBER_EXPR),
            30 => Some(Self::CALL_EXPR),
            31 => Some(Self::SUBSCRIPT_EXPR),
            32 => Some(Self::PAREN_EXPR),
            33 => Some(Self::LIST_EXPR),
            _ => None,
        }
    }
}

/// A syntax node in the Jinja CST.
pub type SyntaxNode = rowan::SyntaxNode<JinjaLanguage>;

/// A syntax token in the Jinja CST.
pub type SyntaxToken = rowan::SyntaxToken<JinjaLanguage>;

/// A syntax element (either node or token) in the Jinja CST.
pub type SyntaxElement = rowan::SyntaxElement<JinjaLanguage>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_vs_node() {
        assert!(SyntaxKind::TEXT.is_token());
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::ERROR.is_token());

        assert!(SyntaxKind::ROOT.is_node());
        assert!(SyntaxKind::TAG.is_node());
        assert!(SyntaxKind::MEMBER_EXPR.is_node());
    }

    #[test]
    fn trivia() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());

        assert!(!SyntaxKind::COMMENT.is_trivia());
        assert!(!SyntaxKind::TEXT.is_trivia());
    }

    #[test]
    fn token_kind_conversion() {
        assert_eq!(SyntaxKind::from(TokenKind::LTag), SyntaxKind::L_TAG);
        assert_eq!(SyntaxKind::from(TokenKind::Ident), SyntaxKind::IDENT);
        assert_eq!(SyntaxKind::from(TokenKind::Pipe), SyntaxKind::PIPE);
    }

    #[test]
    fn rowan_roundtrip() {
        let kind = SyntaxKind::INTERPOLATION;
        let raw = JinjaLanguage::kind_to_raw(kind);
        let back = JinjaLanguage::kind_from_raw(raw);
        assert_eq!(kind, back);
    }
}
