//! Built-in completion catalogs: filter, test, global, and tag names.
//!
//! Catalogs are constructed once on first use and shared across all
//! completion requests; individual requests only ever read them.

use std::sync::LazyLock;

use crate::source::{Completion, CompletionKind};

const FILTER_NAMES: &str = "abs attr batch capitalize center default dictsort escape \
    filesizeformat first float forceescape format groupby indent int items join last \
    length list lower map max min pprint random reject rejectattr replace reverse round \
    safe select selectattr slice sort string striptags sum title tojson trim truncate \
    unique upper urlencode urlize wordcount wordwrap xmlattr";

const TEST_NAMES: &str = "boolean callable defined divisibleby eq escaped even filter \
    float ge gt in integer iterable le lower lt mapping ne none number odd sameas \
    sequence string test undefined upper range lipsum dict joiner namespace";

const GLOBAL_NAMES: &str = "loop super self true false varargs kwargs caller name \
    arguments catch_kwargs catch_varargs caller";

const TAG_NAMES: &str = "raw endraw filter endfilter trans pluralize endtrans with \
    endwith autoescape endautoescape if elif else endif for endfor call endcall block \
    endblock set endset macro endmacro import include break continue debug do extends";

fn completions(words: &'static str, kind: CompletionKind) -> Vec<Completion> {
    words
        .split_whitespace()
        .map(|label| Completion::new(label, kind))
        .collect()
}

/// Built-in filter names, offered after a `|`.
pub static FILTERS: LazyLock<Vec<Completion>> =
    LazyLock::new(|| completions(FILTER_NAMES, CompletionKind::Function));

/// Built-in expression completions: tests and functions, then globals.
pub static EXPRESSIONS: LazyLock<Vec<Completion>> = LazyLock::new(|| {
    let mut items = completions(TEST_NAMES, CompletionKind::Function);
    items.extend(completions(GLOBAL_NAMES, CompletionKind::Keyword));
    items
});

/// Built-in tag names, offered after `{%`.
pub static TAGS: LazyLock<Vec<Completion>> =
    LazyLock::new(|| completions(TAG_NAMES, CompletionKind::Keyword));

#[cfg(test)]
mod tests {
    use super::*;

    fn has(items: &[Completion], label: &str) -> bool {
        items.iter().any(|c| c.label == label)
    }

    #[test]
    fn filters() {
        assert!(has(&FILTERS, "groupby"));
        assert!(has(&FILTERS, "urlencode"));
        assert!(FILTERS.iter().all(|c| c.kind == CompletionKind::Function));
    }

    #[test]
    fn expressions_merge_tests_and_globals() {
        assert!(has(&EXPRESSIONS, "upper"));
        assert!(has(&EXPRESSIONS, "none"));
        assert!(has(&EXPRESSIONS, "true"));
        assert!(has(&EXPRESSIONS, "loop"));
    }

    #[test]
    fn tags() {
        assert!(has(&TAGS, "include"));
        assert!(has(&TAGS, "if"));
        assert!(has(&TAGS, "endfor"));
        assert!(!has(&TAGS, "groupby"));
    }
}
