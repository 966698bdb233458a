//! Cursor context classification.
//!
//! Given a cursor position in a parsed template, work out what kind of
//! completion applies there: a filter name, a tag name, a property of a
//! member access, a general expression, or nothing at all. The tree may
//! describe a document mid-edit, so classification leans on node kinds
//! where the parser produced them and falls back to matching the word
//! under the cursor where it did not.

use std::sync::LazyLock;

use jinja_cst::ast::{AstNode, MemberExpr};
use jinja_cst::{SyntaxElement, SyntaxKind, SyntaxNode, TextSize};
use regex::Regex;
use tracing::trace;

/// Word characters: ASCII word characters plus everything from U+00C0 up,
/// anchored to end at the cursor.
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\u{00C0}-\u{FFFF}]+$").expect("word regex"));

/// Pattern describing input that keeps a completion result valid.
static VALID_FOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\u{00C0}-\u{FFFF}]*$").expect("valid-for regex"));

/// The word-run pattern a host can use to filter a result client-side
/// while the user keeps typing.
pub fn valid_for_pattern() -> &'static Regex {
    LazyLock::force(&VALID_FOR)
}

/// A completion request: the document, its syntax tree, the cursor
/// position, and whether the user explicitly asked for completions.
///
/// The tree reference is only valid for the duration of one request;
/// the host re-parses on edit and builds a fresh context.
pub struct CompletionContext<'a> {
    source: &'a str,
    root: SyntaxNode,
    pos: u32,
    explicit: bool,
}

/// A regex match ending at the cursor, found by
/// [`CompletionContext::match_before`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedText<'a> {
    /// Byte offset where the match starts.
    pub from: u32,
    /// Byte offset where the match ends (the cursor).
    pub to: u32,
    /// The matched text.
    pub text: &'a str,
}

impl<'a> CompletionContext<'a> {
    /// Create a context for one completion request.
    ///
    /// `pos` is clamped into the document and onto a character boundary,
    /// so any cursor value yields a usable context.
    pub fn new(source: &'a str, root: SyntaxNode, pos: u32, explicit: bool) -> Self {
        let mut pos = (pos as usize).min(source.len());
        while !source.is_char_boundary(pos) {
            pos -= 1;
        }
        Self {
            source,
            root,
            pos: pos as u32,
            explicit,
        }
    }

    /// The document text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The root of the syntax tree.
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// The cursor position (byte offset).
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Whether the user explicitly requested completion.
    pub fn explicit(&self) -> bool {
        self.explicit
    }

    /// Slice the document text.
    pub fn slice(&self, from: u32, to: u32) -> &'a str {
        &self.source[from as usize..to as usize]
    }

    /// Match a regex against the current line, requiring the match to end
    /// exactly at the cursor. The pattern should be `$`-anchored.
    pub fn match_before(&self, re: &Regex) -> Option<MatchedText<'a>> {
        let cursor = self.pos as usize;
        let line_start = self.source[..cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let m = re.find(&self.source[line_start..cursor])?;
        if line_start + m.end() != cursor {
            return None;
        }
        Some(MatchedText {
            from: (line_start + m.start()) as u32,
            to: cursor as u32,
            text: m.as_str(),
        })
    }
}

/// What kind of completion applies at the cursor.
///
/// `Filter` and `Tag` carry the partially typed name node when there is
/// one. `Property` carries the member expression whose property is being
/// completed. `Expression` may carry an explicit replacement start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CursorContext {
    Filter { anchor: Option<SyntaxNode> },
    Tag { anchor: Option<SyntaxNode> },
    Property { anchor: Option<SyntaxNode>, target: SyntaxNode },
    Expression { from: Option<u32> },
}

/// Name-wrapper kinds: a token inside one of these speaks through it.
fn is_name_wrapper(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::TAG_NAME
            | SyntaxKind::FILTER_NAME
            | SyntaxKind::PROPERTY_NAME
            | SyntaxKind::VARIABLE_NAME
    )
}

/// The last non-trivia child element of `node` ending at or before `pos`.
fn child_before(node: &SyntaxNode, pos: TextSize) -> Option<SyntaxElement> {
    node.children_with_tokens()
        .filter(|el| el.text_range().end() <= pos)
        .filter(|el| !el.as_token().is_some_and(|t| t.kind().is_trivia()))
        .last()
}

/// Whether this element opens a filter position: a `|`, or the `filter`
/// tag keyword.
fn opens_filter(el: &SyntaxElement) -> bool {
    match el {
        SyntaxElement::Token(t) => t.kind() == SyntaxKind::PIPE,
        SyntaxElement::Node(n) => n.kind() == SyntaxKind::TAG_NAME && n.text() == "filter",
    }
}

/// Classify the cursor's situation, or `None` when no completion applies.
///
/// The rules run in priority order: node-kind matches first (the parser's
/// classification of already-typed names is more reliable than raw text),
/// then the word-under-cursor fallback, then the explicit-request catch-all.
pub(crate) fn classify(cx: &CompletionContext) -> Option<CursorContext> {
    let pos = TextSize::from(cx.pos());
    let root = cx.root();

    let tok = if root.text_range().is_empty() {
        None
    } else {
        root.token_at_offset(pos).left_biased()
    };

    // The current element: a non-trivia token speaks through its name
    // wrapper when it has one, otherwise for itself; trivia resolves to
    // the enclosing node, the way whitespace-skipping grammars resolve a
    // cursor that follows blank space.
    let (current, node) = match &tok {
        Some(t) => {
            let parent = t.parent().unwrap_or_else(|| root.clone());
            if t.kind().is_trivia() || is_name_wrapper(parent.kind()) {
                (parent.kind(), parent)
            } else {
                (t.kind(), parent)
            }
        }
        None => (SyntaxKind::ROOT, root.clone()),
    };
    trace!(?current, pos = cx.pos(), explicit = cx.explicit(), "classifying");

    let before = child_before(&node, pos);
    let before_kind = before.as_ref().map(|el| el.kind());

    if current == SyntaxKind::FILTER_NAME {
        return Some(CursorContext::Filter { anchor: Some(node) });
    }
    if cx.explicit() && before.as_ref().is_some_and(opens_filter) {
        return Some(CursorContext::Filter { anchor: None });
    }
    if current == SyntaxKind::TAG_NAME {
        return Some(CursorContext::Tag { anchor: Some(node) });
    }
    if cx.explicit() && before_kind == Some(SyntaxKind::L_TAG) {
        return Some(CursorContext::Tag { anchor: None });
    }
    if current == SyntaxKind::PROPERTY_NAME
        && let Some(parent) = node.parent()
        && parent.kind() == SyntaxKind::MEMBER_EXPR
    {
        return Some(CursorContext::Property {
            anchor: Some(node),
            target: parent,
        });
    }
    if current == SyntaxKind::DOT && node.kind() == SyntaxKind::MEMBER_EXPR {
        return Some(CursorContext::Property {
            anchor: None,
            target: node,
        });
    }
    if current == SyntaxKind::MEMBER_EXPR && before_kind == Some(SyntaxKind::DOT) {
        return Some(CursorContext::Property {
            anchor: None,
            target: node,
        });
    }
    if current == SyntaxKind::VARIABLE_NAME {
        return Some(CursorContext::Expression {
            from: Some(node.text_range().start().into()),
        });
    }
    if let Some(word) = cx.match_before(&WORD) {
        return Some(CursorContext::Expression {
            from: Some(word.from),
        });
    }
    if cx.explicit()
        && !matches!(
            current,
            SyntaxKind::COMMENT | SyntaxKind::STRING | SyntaxKind::NUMBER
        )
    {
        return Some(CursorContext::Expression { from: None });
    }
    None
}

/// Maximum member-chain depth the path walk will follow. The tree is
/// acyclic so the walk terminates anyway; the bound caps the cost on
/// degenerate input.
const MAX_PATH_DEPTH: usize = 64;

/// Reconstruct the dotted path of identifiers leading to a member access,
/// outermost object first. `a.b.c` with the cursor on `c` yields
/// `["a", "b"]`. Returns an empty path when the chain does not bottom out
/// in a plain variable, which callers treat as "offer nothing".
pub(crate) fn property_path<'a>(source: &'a str, target: &SyntaxNode) -> Vec<&'a str> {
    let Some(mut member) = MemberExpr::cast(target.clone()) else {
        return Vec::new();
    };
    let mut path = Vec::new();
    for _ in 0..MAX_PATH_DEPTH {
        let Some(object) = member.object() else {
            return Vec::new();
        };
        if object.kind() == SyntaxKind::VARIABLE_NAME {
            path.insert(0, node_text(source, &object));
            return path;
        }
        match MemberExpr::cast(object) {
            Some(inner) => {
                if let Some(name) = inner.property_name() {
                    path.insert(0, node_text(source, &name));
                }
                member = inner;
            }
            None => return Vec::new(),
        }
    }
    Vec::new()
}

/// Slice the source text covered by a node.
fn node_text<'a>(source: &'a str, node: &SyntaxNode) -> &'a str {
    let range = node.text_range();
    &source[usize::from(range.start())..usize::from(range.end())]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split a document with an `@` cursor marker into text and position.
    fn cursor(doc: &str) -> (String, u32) {
        let cur = doc.find('@').expect("cursor marker");
        let mut text = String::from(&doc[..cur]);
        text.push_str(&doc[cur + 1..]);
        (text, cur as u32)
    }

    fn classify_at(doc: &str, explicit: bool) -> Option<CursorContext> {
        let (text, pos) = cursor(doc);
        let parse = jinja_cst::parse(&text);
        let cx = CompletionContext::new(&text, parse.syntax(), pos, explicit);
        classify(&cx)
    }

    #[test]
    fn filter_name_anchored() {
        let Some(CursorContext::Filter { anchor: Some(node) }) =
            classify_at("{{a | gr@ }}", false)
        else {
            panic!("expected anchored filter context");
        };
        assert_eq!(node.text(), "gr");
    }

    #[test]
    fn filter_after_bar_explicit_only() {
        assert!(matches!(
            classify_at("{{a | @ }}", true),
            Some(CursorContext::Filter { anchor: None })
        ));
        // Implicitly, a bare bar position falls through to nothing.
        assert_eq!(classify_at("{{a | @ }}", false), None);
    }

    #[test]
    fn filter_statement_keyword() {
        assert!(matches!(
            classify_at("{% filter @ %}", true),
            Some(CursorContext::Filter { anchor: None })
        ));
    }

    #[test]
    fn tag_name_anchored() {
        let Some(CursorContext::Tag { anchor: Some(node) }) = classify_at("{% inc@", false)
        else {
            panic!("expected anchored tag context");
        };
        assert_eq!(node.text(), "inc");
    }

    #[test]
    fn tag_after_open_delimiter() {
        assert!(matches!(
            classify_at("{% @", true),
            Some(CursorContext::Tag { anchor: None })
        ));
        assert_eq!(classify_at("{% @", false), None);
    }

    #[test]
    fn property_on_name() {
        let Some(CursorContext::Property {
            anchor: Some(anchor),
            target,
        }) = classify_at("{{ a.b.c@ }}", false)
        else {
            panic!("expected property context");
        };
        assert_eq!(anchor.text(), "c");
        assert_eq!(target.text(), "a.b.c");
    }

    #[test]
    fn property_after_dot() {
        let Some(CursorContext::Property {
            anchor: None,
            target,
        }) = classify_at("{{ a.@ }}", false)
        else {
            panic!("expected property context after dot");
        };
        assert_eq!(property_path("{{ a. }}", &target), ["a"]);
    }

    #[test]
    fn property_after_dot_and_space() {
        // Cursor sits in whitespace inside the member expression; the
        // preceding dot still marks this as a property position.
        assert!(matches!(
            classify_at("{{ a. @ }}", true),
            Some(CursorContext::Property { anchor: None, .. })
        ));
    }

    #[test]
    fn expression_in_variable() {
        assert!(matches!(
            classify_at("{{ tr@ }}", false),
            Some(CursorContext::Expression { from: Some(3) })
        ));
    }

    #[test]
    fn expression_word_fallback_in_text() {
        assert!(matches!(
            classify_at("plain wor@d", false),
            Some(CursorContext::Expression { from: Some(6) })
        ));
    }

    #[test]
    fn explicit_expression_in_empty_interpolation() {
        assert!(matches!(
            classify_at("{{ @ }}", true),
            Some(CursorContext::Expression { from: None })
        ));
        assert_eq!(classify_at("{{ @ }}", false), None);
    }

    #[test]
    fn nothing_in_comments() {
        assert_eq!(classify_at("{# @ #}", true), None);
        assert_eq!(classify_at("{# @ #}", false), None);
    }

    #[test]
    fn nothing_in_strings() {
        assert_eq!(classify_at("{{ '-@-' }}", true), None);
        assert_eq!(classify_at("{{ '-@-' }}", false), None);
    }

    #[test]
    fn nothing_in_numbers() {
        // Right after the decimal point there is no word to match, so the
        // number-literal gate applies even for explicit requests.
        assert_eq!(classify_at("{{ 1.@5 }}", true), None);
    }

    #[test]
    fn word_fallback_wins_over_literal_gate() {
        // Mid-digits there is a word ending at the cursor, and the word
        // rule ranks above the literal gate.
        assert!(matches!(
            classify_at("{{ 12@34 }}", false),
            Some(CursorContext::Expression { from: Some(3) })
        ));
    }

    #[test]
    fn empty_document() {
        assert!(matches!(
            classify_at("@", true),
            Some(CursorContext::Expression { from: None })
        ));
        assert_eq!(classify_at("@", false), None);
    }

    #[test]
    fn path_for_deep_chain() {
        let source = "{{ a.b.c.d }}";
        let parse = jinja_cst::parse(source);
        let outer = parse
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::MEMBER_EXPR)
            .max_by_key(|n| u32::from(n.text_range().len()))
            .unwrap();
        assert_eq!(property_path(source, &outer), ["a", "b", "c"]);
    }

    #[test]
    fn path_aborts_on_non_variable_root() {
        let source = "{{ f().x }}";
        let parse = jinja_cst::parse(source);
        let member = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MEMBER_EXPR)
            .unwrap();
        assert_eq!(property_path(source, &member), Vec::<&str>::new());
    }

    #[test]
    fn match_before_stays_on_line() {
        let source = "abc\ndef";
        let parse = jinja_cst::parse(source);
        let cx = CompletionContext::new(source, parse.syntax(), 7, false);
        let m = cx.match_before(&WORD).unwrap();
        assert_eq!((m.from, m.to, m.text), (4, 7, "def"));
    }

    #[test]
    fn pos_clamped_to_document() {
        let source = "{{ a }}";
        let parse = jinja_cst::parse(source);
        let cx = CompletionContext::new(source, parse.syntax(), 999, true);
        assert_eq!(cx.pos(), source.len() as u32);
        assert!(classify(&cx).is_some());
    }
}
