//! Best-effort HTML to markdown-ish text.
//!
//! This is an ordered list of text substitutions, not an HTML parser: tags are
//! never balanced or nested, and markup outside the common PR/work item subset
//! (paragraphs, line breaks, lists, tables) simply has its tags stripped.

use once_cell::sync::Lazy;
use regex::Regex;

// Something that opens or closes an element, e.g. `<div>`, `</p>`, `<br/>`.
// A bare `<` in prose ("a < b") does not match.
static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?[a-z][a-z0-9]*[\s>/]").unwrap());
static RE_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());
static RE_CLOSE_P: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</\s*p\s*>").unwrap());
static RE_CLOSE_DIV: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</\s*div\s*>").unwrap());
static RE_CLOSE_LI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</\s*li\s*>").unwrap());
static RE_CLOSE_TR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</\s*tr\s*>").unwrap());
static RE_CLOSE_TH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</\s*th\s*>").unwrap());
static RE_CLOSE_TD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</\s*td\s*>").unwrap());
static RE_ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_MANY_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalizes comment or description text. Plain text is only trimmed.
pub fn normalize_content(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    if !looks_like_html(content) {
        return content.trim().to_string();
    }

    html_to_markdownish(content)
}

pub fn looks_like_html(content: &str) -> bool {
    RE_HTML_TAG.is_match(content)
}

fn html_to_markdownish(input: &str) -> String {
    let mut result = RE_BR.replace_all(input, "\n").into_owned();
    result = RE_CLOSE_P.replace_all(&result, "\n").into_owned();
    result = RE_CLOSE_DIV.replace_all(&result, "\n").into_owned();
    result = RE_CLOSE_LI.replace_all(&result, "\n- ").into_owned();
    result = RE_CLOSE_TR.replace_all(&result, "\n").into_owned();
    result = RE_CLOSE_TH.replace_all(&result, ": ").into_owned();
    result = RE_CLOSE_TD.replace_all(&result, " ").into_owned();

    result = RE_ANY_TAG.replace_all(&result, "").into_owned();
    result = html_escape::decode_html_entities(&result).into_owned();
    // Decoded text must not read as markup again, or a second pass strips it.
    result = RE_HTML_TAG
        .replace_all(&result, |caps: &regex::Captures| format!("&lt;{}", &caps[0][1..]))
        .into_owned();

    let lines: Vec<&str> = result
        .split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect();
    result = lines.join("\n");
    result = RE_MANY_NEWLINES.replace_all(&result, "\n\n").into_owned();

    result.trim().to_string()
}
