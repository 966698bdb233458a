//! The completion source: turns a classified cursor position into a
//! completion result.

use std::borrow::Cow;
use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::catalog;
use crate::context::{CompletionContext, CursorContext, classify, property_path, valid_for_pattern};

/// A single completion option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The label the completion is shown with, also the inserted text.
    pub label: Cow<'static, str>,
    /// The kind of item this completes to.
    pub kind: CompletionKind,
}

impl Completion {
    /// Create a completion.
    pub fn new(label: impl Into<Cow<'static, str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

/// A kind of item that can be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// A function, filter, or test.
    Function,
    /// A keyword (tag names, `true`, ...).
    Keyword,
    /// A variable.
    Variable,
    /// An object property.
    Property,
}

/// The outcome of a completion request: the options, the offset the
/// replacement starts at, and a pattern describing further input that
/// keeps the result valid for client-side filtering.
#[derive(Debug, Clone)]
pub struct CompletionResult {
    /// Replacement start offset (byte position, at or before the cursor).
    pub from: u32,
    /// The completion options, extension items before built-ins.
    pub options: Vec<Completion>,
    /// Input that matches this pattern keeps the result valid without
    /// re-querying the source.
    pub valid_for: &'static Regex,
}

/// Callback producing completions for the properties reachable under a
/// dotted path. Completing `user.address.` passes `["user", "address"]`.
pub type PropertiesFn =
    Box<dyn Fn(&[&str], &CompletionContext<'_>) -> Vec<Completion> + Send + Sync>;

/// Configuration for a [`CompletionSource`]. All parts are optional.
#[derive(Default)]
pub struct CompletionConfig {
    /// Additional completions offered in tag-name position, ahead of the
    /// built-in tags.
    pub tags: Vec<Completion>,
    /// Additional global variables offered in expression position, ahead
    /// of the built-in expression catalog.
    pub variables: Vec<Completion>,
    /// Provides completions for properties under a given path. Without
    /// it, property positions complete to nothing.
    pub properties: Option<PropertiesFn>,
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("tags", &self.tags)
            .field("variables", &self.variables)
            .field("properties", &self.properties.as_ref().map(|_| ".."))
            .finish()
    }
}

impl CompletionConfig {
    /// Add extra tag completions.
    pub fn with_tags(mut self, tags: Vec<Completion>) -> Self {
        self.tags = tags;
        self
    }

    /// Add extra global variable completions.
    pub fn with_variables(mut self, variables: Vec<Completion>) -> Self {
        self.variables = variables;
        self
    }

    /// Set the property completion callback.
    pub fn with_properties(
        mut self,
        properties: impl Fn(&[&str], &CompletionContext<'_>) -> Vec<Completion>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.properties = Some(Box::new(properties));
        self
    }
}

/// A completion source for Jinja templates.
///
/// Construction merges any configured extension items with the built-in
/// catalogs once; each [`complete`](Self::complete) call is then a pure
/// read of the request's document and tree.
pub struct CompletionSource {
    tags: Vec<Completion>,
    expressions: Vec<Completion>,
    properties: Option<PropertiesFn>,
}

impl CompletionSource {
    /// Build a source from a configuration.
    pub fn new(config: CompletionConfig) -> Self {
        let mut tags = config.tags;
        tags.extend(catalog::TAGS.iter().cloned());
        let mut expressions = config.variables;
        expressions.extend(catalog::EXPRESSIONS.iter().cloned());
        Self {
            tags,
            expressions,
            properties: config.properties,
        }
    }

    /// Compute completions for one request, or `None` when the position
    /// offers nothing to complete.
    pub fn complete(&self, cx: &CompletionContext<'_>) -> Option<CompletionResult> {
        let resolved = classify(cx)?;

        let anchor = match &resolved {
            CursorContext::Filter { anchor }
            | CursorContext::Tag { anchor }
            | CursorContext::Property { anchor, .. } => anchor.clone(),
            CursorContext::Expression { .. } => None,
        };
        let from = match &resolved {
            CursorContext::Expression { from: Some(from) } => *from,
            _ => anchor
                .map(|node| node.text_range().start().into())
                .unwrap_or_else(|| cx.pos()),
        };

        let options = match &resolved {
            CursorContext::Filter { .. } => catalog::FILTERS.clone(),
            CursorContext::Tag { .. } => self.tags.clone(),
            CursorContext::Expression { .. } => self.expressions.clone(),
            CursorContext::Property { target, .. } => match &self.properties {
                Some(properties) => {
                    let path = property_path(cx.source(), target);
                    if path.is_empty() {
                        Vec::new()
                    } else {
                        properties(&path, cx)
                    }
                }
                None => Vec::new(),
            },
        };

        if options.is_empty() {
            return None;
        }
        debug!(from, options = options.len(), "completion ready");
        Some(CompletionResult {
            from,
            options,
            valid_for: valid_for_pattern(),
        })
    }
}
