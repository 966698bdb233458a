//! Typed AST wrappers over CST nodes.
//!
//! These provide a more ergonomic API for navigating the syntax tree
//! while still preserving access to the underlying CST for source locations.

use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// Trait for AST nodes that wrap CST nodes.
pub trait AstNode: Sized {
    /// Try to cast a syntax node to this AST type.
    fn cast(node: SyntaxNode) -> Option<Self>;

    /// Get the underlying syntax node.
    fn syntax(&self) -> &SyntaxNode;

    /// Get the source text of this node.
    fn text(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.syntax().to_string())
    }
}

/// Macro for defining simple AST node wrappers.
macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == $kind {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(
    /// The root template node.
    Template,
    SyntaxKind::ROOT
);

ast_node!(
    /// A `{% ... %}` tag construct.
    Tag,
    SyntaxKind::TAG
);

ast_node!(
    /// A `{{ ... }}` interpolation construct.
    Interpolation,
    SyntaxKind::INTERPOLATION
);

ast_node!(
    /// A member access expression `a.b`.
    MemberExpr,
    SyntaxKind::MEMBER_EXPR
);

// === Template ===

impl Template {
    /// Iterate over top-level `{% %}` tags.
    pub fn tags(&self) -> impl Iterator<Item = Tag> {
        self.0.children().filter_map(Tag::cast)
    }

    /// Iterate over top-level `{{ }}` interpolations.
    pub fn interpolations(&self) -> impl Iterator<Item = Interpolation> {
        self.0.children().filter_map(Interpolation::cast)
    }
}

// === Tag ===

impl Tag {
    /// Get the tag name node, if the tag has one.
    pub fn name(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::TAG_NAME)
    }

    /// Get the tag name as text.
    pub fn name_text(&self) -> Option<String> {
        self.name().map(|n| n.text().to_string())
    }
}

// === MemberExpr ===

impl MemberExpr {
    /// The object sub-expression being accessed (`a` in `a.b`).
    ///
    /// This is the first non-property child node; a member expression
    /// produced by the parser always carries one.
    pub fn object(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() != SyntaxKind::PROPERTY_NAME)
    }

    /// The property name node (`b` in `a.b`), absent after a dangling dot.
    pub fn property_name(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::PROPERTY_NAME)
    }
}
