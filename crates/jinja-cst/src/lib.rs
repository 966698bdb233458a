//! Lossless Concrete Syntax Tree for Jinja templates.
//!
//! This crate provides a CST (Concrete Syntax Tree) representation of Jinja
//! template documents using the [rowan](https://docs.rs/rowan) library. Unlike
//! an AST, the CST preserves all source information including whitespace and
//! exact token positions, making it ideal for editor tooling like completion
//! engines and highlighters.
//!
//! # Features
//!
//! - **Lossless representation**: Source text can be exactly reconstructed from the CST
//! - **Cheap cloning**: Syntax nodes use reference counting internally
//! - **Parent pointers**: Navigate up and down the tree
//! - **Typed AST layer**: Ergonomic wrappers over raw CST nodes
//! - **Error tolerance**: Incomplete constructs still produce a usable tree,
//!   which editor features rely on while a document is mid-edit
//!
//! # Example
//!
//! ```
//! use jinja_cst::{parse, SyntaxKind, ast::{AstNode, Template}};
//!
//! let source = "{% if user %}Hi {{ user.name }}{% endif %}";
//!
//! let parsed = parse(source);
//! assert!(parsed.is_ok());
//!
//! let template = Template::cast(parsed.syntax()).unwrap();
//! let names: Vec<_> = template.tags().filter_map(|t| t.name_text()).collect();
//! assert_eq!(names, ["if", "endif"]);
//!
//! // Roundtrip: source can be exactly reconstructed
//! assert_eq!(parsed.syntax().to_string(), source);
//! ```
//!
//! # Incomplete input
//!
//! ```
//! use jinja_cst::parse;
//!
//! let parsed = parse("{% inc"); // user is still typing
//! assert!(!parsed.is_ok());
//! assert_eq!(parsed.syntax().to_string(), "{% inc");
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{Parse, ParseError, parse};
pub use syntax_kind::{JinjaLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

// Re-export rowan types for convenience
pub use rowan::{TextRange, TextSize};
