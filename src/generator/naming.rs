//! Naming utilities: case conversion, collision-safe identifiers and file stems.
//!
//! Every function here is total: any input string produces a usable result.

use crate::config::{CaseStyle, NamingRule};
use crate::spec::Operation;
use convert_case::{Case, Casing};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Words a generated identifier must never be on its own
pub const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "return", "super", "switch", "this", "throw", "try", "typeof", "var",
    "void", "while", "with", "yield", "let", "static", "enum", "await", "implements", "package",
    "protected", "interface", "private", "public", "null", "true", "false", "undefined", "NaN",
    "Infinity", "arguments", "eval", "get", "set", "then", "object",
];

/// Module-level names every generated file defines or imports
pub const FILE_SCOPE_NAMES: &[&str] = &["path", "request"];

/// Names every generated function body uses besides its path parameters
pub const FUNCTION_SCOPE_NAMES: &[&str] = &["path", "request", "params", "data", "url"];

/// Name used when an operation has neither `operationId` nor `summary`
pub const PLACEHOLDER_FUNCTION_NAME: &str = "apiFunction";

/// Stem used for a tag that sanitizes to nothing
pub const UNTAGGED_STEM: &str = "untagged";

static VERB_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:using(?:get|post|put|delete|patch|head|options|trace))?(?:_\d+)?$")
        .expect("operationId suffix regex should be valid")
});

/// Join separated words as camelCase.
///
/// Only `_`, `-`, whitespace and other identifier-illegal characters split
/// words; existing inner capitals are kept, so `getPetByID` and `uploadURL`
/// pass through unchanged. A leading acronym is lower-cased (`URLPath` to
/// `urlPath`).
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in separated_words(s).enumerate() {
        if i == 0 {
            out.push_str(&lower_leading(word));
        } else {
            out.push_str(&upper_first(word));
        }
    }
    out
}

/// Join separated words as PascalCase, keeping inner capitals.
pub fn to_pascal_case(s: &str) -> String {
    separated_words(s).map(upper_first).collect()
}

pub fn to_snake_case(s: &str) -> String {
    words(s).to_case(Case::Snake)
}

pub fn to_kebab_case(s: &str) -> String {
    words(s).to_case(Case::Kebab)
}

fn separated_words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c == '_' || !is_ident_char(c))
        .filter(|w| !w.is_empty())
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_leading(word: &str) -> String {
    let len = word.chars().count();
    let upper_run = word.chars().take_while(|c| c.is_uppercase()).count();
    // In `URLPath` the last capital of the run starts the next word.
    let lower = if upper_run == len || upper_run <= 1 {
        upper_run
    } else {
        upper_run - 1
    };
    let mut out = String::with_capacity(word.len());
    for (i, c) in word.chars().enumerate() {
        if i < lower {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Identifier-illegal characters act as word separators.
fn words(s: &str) -> String {
    s.chars()
        .map(|c| if is_ident_char(c) { c } else { ' ' })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Convert `s` to `style`.
pub fn apply_case(style: CaseStyle, s: &str) -> String {
    match style {
        CaseStyle::Camel => to_camel_case(s),
        CaseStyle::Pascal => to_pascal_case(s),
        CaseStyle::Snake => to_snake_case(s),
        CaseStyle::Kebab => to_kebab_case(s),
        CaseStyle::Preserve => s.to_string(),
    }
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

/// `true` if `s` can be written as a bare identifier (and object key)
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}

/// Replace characters a JavaScript identifier cannot hold.
///
/// Illegal characters become `_`; a leading digit gets a `_` prefix; the
/// empty string becomes `_`. `kebab-case` output therefore ends up with
/// underscores.
pub fn to_identifier(s: &str) -> String {
    let mut ident: String = s
        .chars()
        .map(|c| if is_ident_char(c) { c } else { '_' })
        .collect();
    if !ident.chars().next().is_some_and(is_ident_start) {
        ident.insert(0, '_');
    }
    ident
}

/// Collision-safe identifier.
///
/// A reserved word gets `Api` appended; a name already in `used` gets the
/// first free numeric suffix (`getPet1`, `getPet2`, ...). The result is
/// registered in `used`.
pub fn safe_identifier(raw: &str, used: &mut HashSet<String>) -> String {
    let mut base = to_identifier(raw);
    if RESERVED_WORDS.contains(&base.as_str()) {
        base.push_str("Api");
    }
    if used.insert(base.clone()) {
        return base;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Make a tag safe as a file-name stem.
///
/// Filesystem-illegal characters, whitespace and control characters become
/// `_`; other Unicode is kept. Leading and trailing dots are dropped so a stem
/// can never address a parent or hidden file.
pub fn sanitize_tag_name(tag: &str) -> String {
    let replaced: String = tag
        .trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = replaced.trim_matches('.');
    if stem.is_empty() {
        UNTAGGED_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// Base function name for an operation, before the naming rule.
///
/// From `operationId` with a trailing `Using<VERB>` and `_<digits>` removed
/// and the first character lower-cased; else from `summary` with whitespace
/// removed and each following character upper-cased; else
/// [`PLACEHOLDER_FUNCTION_NAME`].
pub fn function_base_name(operation: &Operation) -> String {
    if let Some(id) = operation.operation_id.as_deref() {
        let stripped = VERB_SUFFIX.replace(id.trim(), "");
        let mut chars = stripped.chars();
        if let Some(first) = chars.next() {
            return first.to_lowercase().chain(chars).collect();
        }
    }
    if let Some(summary) = operation.summary.as_deref() {
        let name = join_words(summary);
        if !name.is_empty() {
            return name;
        }
    }
    PLACEHOLDER_FUNCTION_NAME.to_string()
}

fn join_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut upper_next = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Function name under the configured rule, not yet collision-checked.
///
/// A custom rule receives `(operationId, method, path)`; with no
/// `operationId` it receives the derived base name instead.
pub fn format_function_name(
    rule: &NamingRule,
    operation: &Operation,
    method: &str,
    path: &str,
) -> String {
    let base = function_base_name(operation);
    let formatted = match rule {
        NamingRule::Style(style) => apply_case(*style, &base),
        NamingRule::Custom(format) => {
            let id = operation.operation_id.as_deref().unwrap_or(&base);
            format(id, method, path)
        }
    };
    if formatted.trim().is_empty() {
        base
    } else {
        formatted
    }
}

/// Parameter name under the configured rule, not yet collision-checked
pub fn format_parameter_name(rule: &NamingRule, name: &str, method: &str, path: &str) -> String {
    let formatted = match rule {
        NamingRule::Style(style) => apply_case(*style, name),
        NamingRule::Custom(format) => format(name, method, path),
    };
    if formatted.trim().is_empty() {
        name.to_string()
    } else {
        formatted
    }
}

/// A used-names set pre-seeded with `seeds`
pub fn scope(seeds: &[&str]) -> HashSet<String> {
    seeds.iter().map(|s| (*s).to_string()).collect()
}
