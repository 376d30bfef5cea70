use regex::Regex;
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("numeric pattern"));

// Words that keep their trailing "s" in the singular
const SINGULAR_EXCEPTIONS: [&str; 5] = ["status", "analysis", "chassis", "bus", "news"];

pub fn is_numeric(value: &str) -> bool {
    NUMERIC.is_match(value)
}

/// Lowercased tokens of a prompt, keeping underscores inside identifiers.
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercased words of a prompt, with underscores treated as separators.
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when `phrase` appears in `text` delimited by non-word characters.
pub fn contains_word(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(offset) = text[start..].find(phrase) {
        let at = start + offset;
        let end = at + phrase.len();
        let before_ok = text[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        let after_ok = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        if before_ok && after_ok {
            return true;
        }
        start = at + phrase.chars().next().map_or(1, char::len_utf8);
    }
    false
}

pub fn make_singular(word: &str) -> String {
    let lower = word.to_lowercase();
    if SINGULAR_EXCEPTIONS.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    if word.ends_with("sses") || word.ends_with("xes") || word.ends_with("ches") {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

pub fn make_plural(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }
    if word.ends_with('s') || word.ends_with('x') || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

pub fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('\'') && trimmed.ends_with('\''))
            || (trimmed.starts_with('"') && trimmed.ends_with('"')));
    if quoted {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Formats a comparison value: numbers and booleans bare, everything else quoted.
pub fn format_value(raw: &str) -> String {
    let value = strip_quotes(raw);
    if is_numeric(value) {
        return value.to_string();
    }
    let lower = value.to_lowercase();
    if lower == "true" || lower == "false" {
        return lower;
    }
    quote_literal(value)
}

/// Formats a LIKE pattern, wrapping with `%` unless the caller already placed wildcards.
pub fn format_like_value(raw: &str) -> String {
    let value = strip_quotes(raw);
    if value.contains('%') {
        quote_literal(value)
    } else {
        quote_literal(&format!("%{}%", value))
    }
}

/// Splits on commas that sit outside single or double quotes.
fn split_list(raw: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (at, c) in raw.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, ',') => {
                items.push(&raw[start..at]);
                start = at + 1;
            }
            _ => {}
        }
    }
    items.push(&raw[start..]);
    items
}

pub fn format_in_list(raw: &str) -> String {
    let items: Vec<String> = split_list(raw)
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(format_value)
        .collect();
    format!("({})", items.join(", "))
}
