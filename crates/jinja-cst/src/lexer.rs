//! Lexer for Jinja template source.
//!
//! Template text and the inside of `{% %}` / `{{ }}` constructs use
//! different token sets, so the lexer is mode-based: in text mode it
//! produces whole text runs and construct openers, inside a construct
//! it produces expression tokens until the matching closer.

use tracing::trace;

/// A span representing a range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the start (inclusive)
    pub start: u32,
    /// Byte offset of the end (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Get the source text for this span.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start as usize..self.end as usize]
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Text-mode tokens
    /// A run of template text outside any construct.
    Text,
    /// A comment: `{# ... #}`.
    Comment,
    /// `{%` or `{%-`, opens a tag.
    LTag,
    /// `%}` or `-%}`, closes a tag.
    RTag,
    /// `{{` or `{{-`, opens an interpolation.
    LVar,
    /// `}}` or `-}}`, closes an interpolation.
    RVar,

    // Construct-mode tokens
    /// An identifier or keyword.
    Ident,
    /// A number literal: `42`, `3.14`.
    Number,
    /// A string literal: `'...'` or `"..."`.
    String,
    /// `.`
    Dot,
    /// `|`
    Pipe,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// Any other operator: `=`, `==`, `<`, `+`, `~`, ...
    Op,
    /// Whitespace inside a construct (spaces, tabs, newlines).
    Whitespace,

    // Special tokens
    /// End of file
    Eof,
    /// Lexer error (unrecognized input)
    Error,
}

impl TokenKind {
    /// Whether this token is trivia.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }
}

/// A token with its kind, span, and source text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in the source text.
    pub span: Span,
    /// The source text of this token.
    pub text: &'src str,
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Self { kind, span, text }
    }
}

/// Lexer mode: template text vs. the inside of a construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Construct,
}

/// A lexer that produces tokens from Jinja template source.
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
    /// Current mode.
    mode: Mode,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
            mode: Mode::Text,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Peek at the nth character (0-indexed) without consuming.
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: u32) -> Token<'src> {
        let span = Span::new(start, self.pos);
        let text = &self.source[start as usize..self.pos as usize];
        trace!("Token {:?} at {:?}: {:?}", kind, span, text);
        Token::new(kind, span, text)
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        if self.is_eof() {
            return self.token(TokenKind::Eof, self.pos);
        }
        match self.mode {
            Mode::Text => self.lex_text(),
            Mode::Construct => self.lex_construct(),
        }
    }

    /// Whether the remaining text starts a template construct.
    fn at_construct_start(&self) -> bool {
        self.starts_with("{{") || self.starts_with("{%") || self.starts_with("{#")
    }

    /// Lex a construct opener: `{{`, `{%`, optionally with a trim dash.
    fn lex_opener(&mut self, kind: TokenKind) -> Token<'src> {
        let start = self.pos;
        self.advance_by(2);
        if self.peek() == Some('-') {
            self.advance();
        }
        self.mode = Mode::Construct;
        self.token(kind, start)
    }

    /// Lex in text mode: comments, construct openers, or a text run.
    fn lex_text(&mut self) -> Token<'src> {
        if self.starts_with("{#") {
            return self.lex_comment();
        }
        if self.starts_with("{{") {
            return self.lex_opener(TokenKind::LVar);
        }
        if self.starts_with("{%") {
            return self.lex_opener(TokenKind::LTag);
        }

        // A run of plain text, up to the next construct. A lone `{` is text.
        let start = self.pos;
        self.advance();
        while !self.is_eof() && !self.at_construct_start() {
            self.advance();
        }
        self.token(TokenKind::Text, start)
    }

    /// Lex a comment `{# ... #}`, running to EOF when unterminated.
    fn lex_comment(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance_by(2);
        match self.remaining.find("#}") {
            Some(i) => self.advance_by(i + 2),
            None => self.advance_by(self.remaining.len()),
        }
        self.token(TokenKind::Comment, start)
    }

    /// Lex inside a `{% %}` or `{{ }}` construct.
    fn lex_construct(&mut self) -> Token<'src> {
        let start = self.pos;

        // Closers, with optional trim dash.
        for (closer, kind) in [
            ("-%}", TokenKind::RTag),
            ("-}}", TokenKind::RVar),
            ("%}", TokenKind::RTag),
            ("}}", TokenKind::RVar),
        ] {
            if self.starts_with(closer) {
                self.advance_by(closer.len());
                self.mode = Mode::Text;
                return self.token(kind, start);
            }
        }

        // A new construct opened before the current one was closed.
        if self.starts_with("{{") {
            return self.lex_opener(TokenKind::LVar);
        }
        if self.starts_with("{%") {
            return self.lex_opener(TokenKind::LTag);
        }

        let c = match self.peek() {
            Some(c) => c,
            None => return self.token(TokenKind::Eof, start),
        };

        match c {
            ' ' | '\t' | '\n' | '\r' => self.lex_whitespace(),
            '\'' | '"' => self.lex_string(c),
            '.' => {
                self.advance();
                self.token(TokenKind::Dot, start)
            }
            '|' => {
                self.advance();
                self.token(TokenKind::Pipe, start)
            }
            ',' => {
                self.advance();
                self.token(TokenKind::Comma, start)
            }
            ':' => {
                self.advance();
                self.token(TokenKind::Colon, start)
            }
            '(' => {
                self.advance();
                self.token(TokenKind::LParen, start)
            }
            ')' => {
                self.advance();
                self.token(TokenKind::RParen, start)
            }
            '[' => {
                self.advance();
                self.token(TokenKind::LBracket, start)
            }
            ']' => {
                self.advance();
                self.token(TokenKind::RBracket, start)
            }
            _ if c.is_ascii_digit() => self.lex_number(),
            _ if is_ident_start(c) => self.lex_ident(),
            '=' | '<' | '>' | '!' | '+' | '-' | '*' | '/' | '%' | '~' | '^' | '&' | '{' | '}' => {
                self.lex_op()
            }
            _ => {
                self.advance();
                self.token(TokenKind::Error, start)
            }
        }
    }

    /// Lex whitespace inside a construct (spaces, tabs, newlines).
    fn lex_whitespace(&mut self) -> Token<'src> {
        let start = self.pos;
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.advance();
        }
        self.token(TokenKind::Whitespace, start)
    }

    /// Lex a string literal, running to EOF when unterminated.
    fn lex_string(&mut self, quote: char) -> Token<'src> {
        let start = self.pos;
        self.advance();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.advance();
                self.advance();
            } else if c == quote {
                self.advance();
                break;
            } else {
                self.advance();
            }
        }
        self.token(TokenKind::String, start)
    }

    /// Lex a number literal: digits with an optional fraction.
    fn lex_number(&mut self) -> Token<'src> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_nth(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        self.token(TokenKind::Number, start)
    }

    /// Lex an identifier.
    fn lex_ident(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance();
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.advance();
        }
        self.token(TokenKind::Ident, start)
    }

    /// Lex an operator, preferring the two-character forms.
    fn lex_op(&mut self) -> Token<'src> {
        let start = self.pos;
        for op in ["==", "!=", "<=", ">=", "//", "**"] {
            if self.starts_with(op) {
                self.advance_by(2);
                return self.token(TokenKind::Op, start);
            }
        }
        self.advance();
        self.token(TokenKind::Op, start)
    }
}

/// Whether a character can start an identifier.
///
/// Matches the word-character class completion uses: ASCII letters,
/// underscore, and everything from U+00C0 up.
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || c as u32 >= 0xC0
}

/// Whether a character can continue an identifier.
pub fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
