//! Best-effort extraction of authors and title from a BibTeX entry.
//!
//! This is not a BibTeX parser. Each field is found with a single pattern
//! over the whole text; nested braces, multiple entries and escapes are not
//! handled. When a field occurs more than once the last occurrence wins.

use std::sync::LazyLock;

use regex::Regex;

static AUTHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^.*author\s*=\s*["{]([^"{}]*)["}].*$"#).expect("author pattern")
});

static TITLE_PATTERN_QUOTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^.*title\s*=\s*"([^"]*)".*$"#).expect("quoted title pattern")
});

static TITLE_PATTERN_BRACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^.*title\s*=\s*\{([^}]*)\}.*$"#).expect("braced title pattern")
});

/// Authors and title found in a BibTeX entry. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibtexFields {
    pub authors: Option<String>,
    pub title: Option<String>,
}

/// Whether `text` looks like a BibTeX entry, i.e. starts with `@` once trimmed.
pub fn is_likely_bibtex(text: &str) -> bool {
    text.trim().starts_with('@')
}

/// Runs both extractors over `text`.
pub fn extract(text: &str) -> BibtexFields {
    BibtexFields {
        authors: extract_authors(text),
        title: extract_title(text),
    }
}

/// Extracts the title.
///
/// The quoted form `title = "..."` is tried first and has its `{`/`}`
/// case-protection braces removed. Otherwise the brace form
/// `title = {...}` is used as is, apart from trimming.
pub fn extract_title(text: &str) -> Option<String> {
    if let Some(caps) = TITLE_PATTERN_QUOTES.captures(text) {
        let title = caps[1].trim().replace(['{', '}'], "");
        return Some(title);
    }
    TITLE_PATTERN_BRACES
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// Extracts the author list as `"Given Surname, Given Surname"`.
///
/// Authors are separated by splitting on the plain substring `and`, so a
/// name containing those letters is split as well.
pub fn extract_authors(text: &str) -> Option<String> {
    let caps = AUTHOR_PATTERN.captures(text)?;
    let mut segments: Vec<&str> = caps[1].split("and").collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    let names: Vec<String> = segments.into_iter().map(normalize_author).collect();
    Some(names.join(", "))
}

/// `"Surname, Given"` becomes `"Given Surname"`; anything else is trimmed.
fn normalize_author(segment: &str) -> String {
    match segment.split_once(',') {
        Some((surname, given)) => format!("{} {}", given.trim(), surname.trim()),
        None => segment.trim().to_string(),
    }
}
