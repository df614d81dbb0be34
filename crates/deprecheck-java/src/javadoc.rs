//! Deprecation markers on declarations
//!
//! A declaration is deprecated when it carries `@Deprecated` (optionally
//! qualified as `@java.lang.Deprecated`) or its doc comment has an
//! `@deprecated` block tag.

use regex::Regex;
use std::sync::OnceLock;

/// An annotation as written on a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Name as written, possibly qualified
    pub name: String,

    /// Raw text between the parentheses, empty when there are none
    pub arguments: String,
}

impl Annotation {
    pub fn is_deprecated(&self) -> bool {
        self.name == "Deprecated" || self.name == "java.lang.Deprecated"
    }
}

/// Deprecation details gathered from annotations and doc comments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deprecation {
    /// Symbol to use instead, e.g. `navigate()` or `Tab.close()`
    pub replacement: Option<String>,

    /// `@Deprecated(forRemoval = true)`
    pub for_removal: bool,

    /// `@Deprecated(since = "...")`
    pub since: Option<String>,
}

fn for_removal_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\bforRemoval\s*=\s*true\b").unwrap())
}

fn since_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"\bsince\s*=\s*"([^"]*)""#).unwrap())
}

fn link_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{@link(?:plain)?\s+([^}\s]+)[^}]*\}").unwrap())
}

fn use_instead_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)\buse\s+`?([A-Za-z_$][\w$.#]*(?:\([^)]*\))?)`?\s+instead\b").unwrap()
    })
}

/// Strip `/**`, `*/` and leading `*` decoration from a doc comment
pub fn doc_text(doc: &str) -> String {
    let inner = doc
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    inner
        .lines()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix('*').unwrap_or(line).trim()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Text of the `@deprecated` block tag, up to the next block tag
pub fn deprecated_tag(doc: &str) -> Option<String> {
    let text = doc_text(doc);
    let mut lines = text.lines();
    let mut tag = None::<Vec<&str>>;

    for line in lines.by_ref() {
        if let Some(rest) = line.strip_prefix("@deprecated") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                tag = Some(vec![rest.trim()]);
                break;
            }
        }
    }

    let mut tag = tag?;
    for line in lines {
        if line.starts_with('@') {
            break;
        }
        tag.push(line);
    }

    Some(tag.join(" ").trim().to_string())
}

/// Replacement named by deprecation text
///
/// Prefers the first `{@link ...}` target; falls back to "use X instead".
pub fn replacement_hint(text: &str) -> Option<String> {
    let target = link_regex()
        .captures(text)
        .or_else(|| use_instead_regex().captures(text))?
        .get(1)?
        .as_str();

    let target = target.strip_prefix('#').unwrap_or(target).replace('#', ".");
    (!target.is_empty()).then_some(target)
}

/// Deprecation status of a declaration, `None` if it is not deprecated
pub fn deprecation(annotations: &[Annotation], doc: Option<&str>) -> Option<Deprecation> {
    let annotation = annotations.iter().find(|a| a.is_deprecated());
    let tag = doc.and_then(deprecated_tag);

    if annotation.is_none() && tag.is_none() {
        return None;
    }

    let arguments = annotation.map(|a| a.arguments.as_str()).unwrap_or_default();

    Some(Deprecation {
        replacement: tag.as_deref().and_then(replacement_hint),
        for_removal: for_removal_regex().is_match(arguments),
        since: since_regex()
            .captures(arguments)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
    })
}
