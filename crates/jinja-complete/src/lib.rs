//! Context-aware autocomplete for Jinja templates.
//!
//! Given a parsed template from [`jinja_cst`] and a cursor position, a
//! [`CompletionSource`] works out which completion domain applies there
//! (tag name, filter name, object property, or general expression) and
//! produces the matching options together with the replacement span.
//! Because the document is usually mid-edit, classification is built to
//! cope with partial parses: every cursor position in every document
//! yields a result or a clean `None`, never a failure.
//!
//! # Example
//!
//! ```
//! use jinja_complete::{CompletionConfig, CompletionContext, CompletionSource};
//!
//! let doc = "{% inc";
//! let parsed = jinja_cst::parse(doc);
//! let source = CompletionSource::new(CompletionConfig::default());
//!
//! let cx = CompletionContext::new(doc, parsed.syntax(), doc.len() as u32, false);
//! let result = source.complete(&cx).unwrap();
//!
//! // The replacement span covers the partial tag name `inc`.
//! assert_eq!(result.from, 3);
//! assert!(result.options.iter().any(|c| c.label == "include"));
//! ```
//!
//! # Property completion
//!
//! Object properties are not known statically, so they come from a
//! callback that receives the dotted path leading up to the cursor:
//!
//! ```
//! use jinja_complete::{
//!     Completion, CompletionConfig, CompletionContext, CompletionKind, CompletionSource,
//! };
//!
//! let config = CompletionConfig::default().with_properties(|path, _cx| {
//!     if path == ["user"] {
//!         vec![Completion::new("email", CompletionKind::Property)]
//!     } else {
//!         Vec::new()
//!     }
//! });
//! let source = CompletionSource::new(config);
//!
//! let doc = "{{ user.em }}";
//! let parsed = jinja_cst::parse(doc);
//! let cx = CompletionContext::new(doc, parsed.syntax(), 10, false);
//! let result = source.complete(&cx).unwrap();
//! assert_eq!(result.options[0].label, "email");
//! assert_eq!(result.from, 8);
//! ```

mod catalog;
mod context;
mod source;

pub use context::{CompletionContext, MatchedText};
pub use source::{
    Completion, CompletionConfig, CompletionKind, CompletionResult, CompletionSource, PropertiesFn,
};
