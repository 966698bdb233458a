//! CST parser for Jinja templates using rowan's GreenNodeBuilder.
//!
//! The parser produces a lossless concrete syntax tree that preserves
//! all whitespace and exact source representation. It is tolerant of
//! incomplete input: an unclosed construct records an error but still
//! yields a well-formed tree covering everything typed so far, which
//! is what editor tooling needs while the user is mid-edit.

use rowan::GreenNode;
use tracing::trace;

use crate::lexer::{Lexer, Token, TokenKind};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// A parsed Jinja template.
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Get the root syntax node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Get parse errors.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Check if parsing succeeded without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert to Result, returning errors if any.
    pub fn ok(self) -> Result<SyntaxNode, Vec<ParseError>> {
        if self.errors.is_empty() {
            Ok(self.syntax())
        } else {
            Err(self.errors)
        }
    }

    /// Get the green node (for testing/debugging).
    pub fn green(&self) -> &GreenNode {
        &self.green
    }
}

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte offset where the error occurred.
    pub offset: u32,
    /// Error message.
    pub message: String,
}

impl ParseError {
    fn new(offset: u32, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Parse Jinja template source into a CST.
pub fn parse(source: &str) -> Parse {
    let parser = CstParser::new(source);
    parser.parse()
}

/// CST parser that builds a green tree using rowan.
struct CstParser<'src> {
    lexer: std::iter::Peekable<TokenIter<'src>>,
    builder: rowan::GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

/// Iterator adapter for the lexer that includes EOF.
struct TokenIter<'src> {
    lexer: Lexer<'src>,
    done: bool,
}

impl<'src> Iterator for TokenIter<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.lexer.next_token();
        if token.kind == TokenKind::Eof {
            self.done = true;
        }
        Some(token)
    }
}

impl<'src> CstParser<'src> {
    fn new(source: &'src str) -> Self {
        let lexer = Lexer::new(source);
        Self {
            lexer: TokenIter { lexer, done: false }.peekable(),
            builder: rowan::GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> Parse {
        self.builder.start_node(SyntaxKind::ROOT.into());
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Text | TokenKind::Comment => self.bump(),
                TokenKind::LTag => self.parse_construct(SyntaxKind::TAG, TokenKind::RTag),
                TokenKind::LVar => {
                    self.parse_construct(SyntaxKind::INTERPOLATION, TokenKind::RVar)
                }
                kind => {
                    // The lexer only hands out construct-mode tokens after an
                    // opener, so anything else here is a stray.
                    let pos = self.current_pos();
                    self.errors
                        .push(ParseError::new(pos, format!("unexpected token: {:?}", kind)));
                    self.bump();
                }
            }
        }
        self.builder.finish_node();

        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    /// Peek at the current token kind.
    fn peek(&mut self) -> TokenKind {
        self.lexer.peek().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    /// Get the current token's start position, if any.
    fn current_pos(&mut self) -> u32 {
        self.lexer.peek().map(|t| t.span.start).unwrap_or(0)
    }

    /// Consume and add the current token to the tree.
    fn bump(&mut self) {
        if let Some(token) = self.lexer.next() {
            self.builder
                .token(SyntaxKind::from(token.kind).into(), token.text);
        }
    }

    /// Skip whitespace, adding it to the tree.
    fn skip_ws(&mut self) {
        while self.peek() == TokenKind::Whitespace {
            self.bump();
        }
    }

    /// Consume an identifier wrapped in the given node kind.
    fn wrap_ident(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
        self.bump();
        self.builder.finish_node();
    }

    /// Whether the current token starts an expression.
    fn at_expr_start(&mut self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Ident
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::LParen
                | TokenKind::LBracket
        )
    }

    /// Whether the current token ends the enclosing construct: a closer
    /// (either flavor), the opener of a new construct, or EOF.
    fn at_construct_end(&mut self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Eof
                | TokenKind::LTag
                | TokenKind::LVar
                | TokenKind::RTag
                | TokenKind::RVar
        )
    }

    /// Parse a `{% ... %}` or `{{ ... }}` construct.
    fn parse_construct(&mut self, kind: SyntaxKind, closer: TokenKind) {
        trace!("Parsing construct: {:?}", kind);
        self.builder.start_node(kind.into());

        // Consume the opener.
        self.bump();

        // The first identifier in a tag is the tag name.
        if kind == SyntaxKind::TAG {
            self.skip_ws();
            if self.peek() == TokenKind::Ident {
                self.wrap_ident(SyntaxKind::TAG_NAME);
            }
        }

        self.parse_body();

        if self.peek() == closer {
            self.bump();
        } else if matches!(self.peek(), TokenKind::RTag | TokenKind::RVar) {
            // Mismatched closer, keep it inside this construct.
            let pos = self.current_pos();
            self.errors
                .push(ParseError::new(pos, "mismatched closing delimiter"));
            self.bump();
        } else {
            let pos = self.current_pos();
            let delim = if closer == TokenKind::RTag { "%}" } else { "}}" };
            self.errors.push(ParseError::new(
                pos,
                format!("unclosed construct, expected `{}`", delim),
            ));
        }

        self.builder.finish_node();
    }

    /// Parse the loose body of a construct: expressions, filters, and
    /// whatever operators appear between them.
    fn parse_body(&mut self) {
        loop {
            self.skip_ws();
            if self.at_construct_end() {
                break;
            }
            if self.peek() == TokenKind::Pipe {
                self.parse_filter_segment();
            } else if self.at_expr_start() {
                self.parse_expr();
            } else {
                // Operators, commas, colons, stray dots, error tokens.
                self.bump();
            }
        }
    }

    /// Consume a `|` and wrap the filter name that follows it.
    fn parse_filter_segment(&mut self) {
        self.bump();
        self.skip_ws();
        if self.peek() == TokenKind::Ident {
            self.wrap_ident(SyntaxKind::FILTER_NAME);
        }
    }

    /// Parse an expression: a primary followed by postfix member access,
    /// calls, and subscripts. Member chains left-nest, so `a.b.c` becomes
    /// `MEMBER_EXPR(MEMBER_EXPR(a, b), c)`.
    fn parse_expr(&mut self) {
        let cp = self.builder.checkpoint();
        self.parse_primary();
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.builder
                        .start_node_at(cp, SyntaxKind::MEMBER_EXPR.into());
                    self.bump();
                    self.skip_ws();
                    if self.peek() == TokenKind::Ident {
                        self.wrap_ident(SyntaxKind::PROPERTY_NAME);
                    }
                    self.builder.finish_node();
                }
                TokenKind::LParen => {
                    self.builder.start_node_at(cp, SyntaxKind::CALL_EXPR.into());
                    self.bump();
                    self.parse_delimited(TokenKind::RParen);
                    self.builder.finish_node();
                }
                TokenKind::LBracket => {
                    self.builder
                        .start_node_at(cp, SyntaxKind::SUBSCRIPT_EXPR.into());
                    self.bump();
                    self.parse_delimited(TokenKind::RBracket);
                    self.builder.finish_node();
                }
                _ => break,
            }
        }
    }

    /// Parse a primary expression.
    fn parse_primary(&mut self) {
        match self.peek() {
            TokenKind::Ident => self.wrap_ident(SyntaxKind::VARIABLE_NAME),
            TokenKind::String | TokenKind::Number => self.bump(),
            TokenKind::LParen => {
                self.builder.start_node(SyntaxKind::PAREN_EXPR.into());
                self.bump();
                self.parse_delimited(TokenKind::RParen);
                self.builder.finish_node();
            }
            TokenKind::LBracket => {
                self.builder.start_node(SyntaxKind::LIST_EXPR.into());
                self.bump();
                self.parse_delimited(TokenKind::RBracket);
                self.builder.finish_node();
            }
            kind => {
                let pos = self.current_pos();
                self.errors
                    .push(ParseError::new(pos, format!("unexpected token: {:?}", kind)));
                self.bump();
            }
        }
    }

    /// Parse the inside of a bracketed group up to `close`. Stops without
    /// consuming anything at a construct boundary, leaving the group open.
    fn parse_delimited(&mut self, close: TokenKind) {
        loop {
            self.skip_ws();
            if self.peek() == close {
                self.bump();
                return;
            }
            if self.at_construct_end() {
                let pos = self.current_pos();
                self.errors
                    .push(ParseError::new(pos, "unclosed bracketed group"));
                return;
            }
            if self.peek() == TokenKind::Pipe {
                self.parse_filter_segment();
            } else if self.at_expr_start() {
                self.parse_expr();
            } else {
                self.bump();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> SyntaxNode {
        let parse = parse(source);
        assert!(parse.is_ok(), "parse errors: {:?}", parse.errors());
        parse.syntax()
    }

    /// Find the first descendant node of the given kind.
    fn find(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
        node.descendants().find(|n| n.kind() == kind)
    }

    #[test]
    fn empty_document() {
        let node = parse_ok("");
        assert_eq!(node.kind(), SyntaxKind::ROOT);
        assert_eq!(node.children().count(), 0);
    }

    #[test]
    fn plain_text() {
        let node = parse_ok("<p>hello</p>");
        assert_eq!(node.kind(), SyntaxKind::ROOT);
        assert_eq!(node.to_string(), "<p>hello</p>");
    }

    #[test]
    fn tag_name() {
        let node = parse_ok("{% include 'a.html' %}");
        let tag = find(&node, SyntaxKind::TAG).unwrap();
        let name = find(&tag, SyntaxKind::TAG_NAME).unwrap();
        assert_eq!(name.text(), "include");
    }

    #[test]
    fn interpolation_with_variable() {
        let node = parse_ok("{{ user }}");
        let interp = find(&node, SyntaxKind::INTERPOLATION).unwrap();
        let var = find(&interp, SyntaxKind::VARIABLE_NAME).unwrap();
        assert_eq!(var.text(), "user");
    }

    #[test]
    fn member_chain_left_nests() {
        let node = parse_ok("{{ a.b.c }}");
        let outer = find(&node, SyntaxKind::MEMBER_EXPR).unwrap();
        assert_eq!(outer.text(), "a.b.c");

        let inner = outer
            .children()
            .find(|n| n.kind() == SyntaxKind::MEMBER_EXPR)
            .unwrap();
        assert_eq!(inner.text(), "a.b");

        let props: Vec<_> = outer
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::PROPERTY_NAME)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(props, ["b", "c"]);
    }

    #[test]
    fn dangling_dot_stays_in_member() {
        let parse = parse("{{ a. }}");
        let member = find(&parse.syntax(), SyntaxKind::MEMBER_EXPR).unwrap();
        assert_eq!(member.text(), "a. ");
        assert!(
            member
                .children_with_tokens()
                .any(|el| el.kind() == SyntaxKind::DOT)
        );
    }

    #[test]
    fn filter_name() {
        let node = parse_ok("{{ items | join(', ') }}");
        let filter = find(&node, SyntaxKind::FILTER_NAME).unwrap();
        assert_eq!(filter.text(), "join");
    }

    #[test]
    fn filter_inside_parens() {
        let node = parse_ok("{{ (a | upper) }}");
        let filter = find(&node, SyntaxKind::FILTER_NAME).unwrap();
        assert_eq!(filter.text(), "upper");
    }

    #[test]
    fn unclosed_tag_records_error() {
        let parse = parse("{% inc");
        assert!(!parse.is_ok());
        let tag = find(&parse.syntax(), SyntaxKind::TAG).unwrap();
        let name = find(&tag, SyntaxKind::TAG_NAME).unwrap();
        assert_eq!(name.text(), "inc");
    }

    #[test]
    fn unclosed_interpolation_before_new_construct() {
        let parse = parse("{{ a {% if x %}");
        assert!(!parse.is_ok());
        let root = parse.syntax();
        assert!(find(&root, SyntaxKind::INTERPOLATION).is_some());
        assert!(find(&root, SyntaxKind::TAG).is_some());
        assert_eq!(root.to_string(), "{{ a {% if x %}");
    }

    #[test]
    fn roundtrip() {
        let sources = [
            "",
            "plain text",
            "{{ user.name }}",
            "{% for x in items %}{{ x }}{% endfor %}",
            "{# a comment #}",
            "a {{ b }} c {% d %} e",
            "{%- if x -%}y{%- endif -%}",
            "{{ items | batch(3) | list }}",
            "{{ 'quoted %}' }}",
            "{{ a.b.c",
            "{% ",
        ];

        for source in sources {
            let parse = parse(source);
            let reconstructed = parse.syntax().to_string();
            assert_eq!(source, reconstructed, "roundtrip failed for: {}", source);
        }
    }

    #[test]
    fn subscript() {
        let node = parse_ok("{{ a[0] }}");
        let sub = find(&node, SyntaxKind::SUBSCRIPT_EXPR).unwrap();
        assert_eq!(sub.text(), "a[0]");
    }

    #[test]
    fn call_then_member() {
        let node = parse_ok("{{ f().x }}");
        let member = find(&node, SyntaxKind::MEMBER_EXPR).unwrap();
        let object = member.children().next().unwrap();
        assert_eq!(object.kind(), SyntaxKind::CALL_EXPR);
    }

    #[test]
    fn comment_is_single_token() {
        let node = parse_ok("{# anything {{ x }} #}");
        let comment = node
            .children_with_tokens()
            .find(|el| el.kind() == SyntaxKind::COMMENT)
            .unwrap();
        assert_eq!(u32::from(comment.text_range().len()), 22);
    }
}
