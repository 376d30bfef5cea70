use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::LanguageProfile;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Rewrites a prompt into the canonical form the later stages match against:
/// explicit mentions become `TABLE:`/`COLUMN:` markers, idioms become SQL-ish
/// operators and verbs. Anything not recognized passes through untouched.
pub fn normalize(prompt: &str, profile: &LanguageProfile) -> String {
    let text = collapse_whitespace(prompt);

    let (head, tail) = match profile.filter_words.find(&text) {
        Some(filter) => text.split_at(filter.start()),
        None => (text.as_str(), ""),
    };

    let head = profile
        .column_mention
        .replace_all(head, |caps: &regex::Captures| {
            profile
                .column_separator
                .split(&caps[1])
                .filter(|name| !name.trim().is_empty())
                .map(|name| format!("COLUMN:{}", name.trim()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .into_owned();
    let tail = profile.column_filler.replace_all(tail, "").into_owned();

    let mut text = profile
        .table_mention
        .replace_all(&format!("{}{}", head, tail), |caps: &regex::Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            format!("TABLE:{}", name)
        })
        .into_owned();

    for rewrite in &profile.rewrites {
        text = rewrite.apply(&text);
    }

    collapse_whitespace(&text)
}

fn first_number(patterns: &[Regex], text: &str) -> Option<u32> {
    patterns
        .iter()
        .filter_map(|pattern| pattern.captures(text))
        .find_map(|caps| caps[1].parse::<u32>().ok())
}

/// Explicit row limit, offset or page number found in a normalized prompt.
pub fn extract_limit(normalized: &str, profile: &LanguageProfile) -> Option<Pagination> {
    let limit = first_number(&profile.limit_patterns, normalized)
        .map(|limit| limit.clamp(1, MAX_LIMIT));
    let offset = first_number(&profile.offset_patterns, normalized);
    let page = profile
        .page_pattern
        .captures(normalized)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(|page| page.max(1));

    match (limit, offset, page) {
        (None, None, None) => None,
        (limit, None, Some(page)) => {
            let size = limit.unwrap_or(DEFAULT_LIMIT);
            Some(Pagination {
                limit: Some(size),
                offset: Some(size.saturating_mul(page - 1)),
            })
        }
        (limit, offset, _) => Some(Pagination { limit, offset }),
    }
}

/// Limit implied by vague wording ("a few", "alguns"), if any.
pub fn vocabulary_limit(normalized: &str, profile: &LanguageProfile) -> Option<u32> {
    let words = crate::util::text::words(normalized);
    let mentions = |vocabulary: &[&str]| words.iter().any(|w| vocabulary.contains(&w.as_str()));

    if mentions(profile.limit_words.few) {
        Some(10)
    } else if mentions(profile.limit_words.some) {
        Some(50)
    } else if mentions(profile.limit_words.all) {
        Some(MAX_LIMIT)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn en(prompt: &str) -> String {
        normalize(prompt, Language::English.profile())
    }

    fn pt(prompt: &str) -> String {
        normalize(prompt, Language::Portuguese.profile())
    }

    #[test]
    fn portuguese_column_and_table_mentions_become_markers() {
        assert_eq!(
            pt("selecione a coluna rfam_id da tabela family onde a coluna rfam_acc é igual a 3"),
            "select COLUMN:rfam_id TABLE:family onde rfam_acc = 3"
        );
        assert_eq!(
            pt("selecione a coluna rfam_id da tabela family onde a coluna rfam_acc for menor ou igual a 100"),
            "select COLUMN:rfam_id TABLE:family onde rfam_acc <= 100"
        );
    }

    #[test]
    fn column_lists_expand_to_one_marker_each() {
        assert_eq!(
            en("show the columns name, email and age from the users table"),
            "select COLUMN:name COLUMN:email COLUMN:age TABLE:users"
        );
        assert_eq!(
            pt("mostre as colunas nome e email da tabela clientes"),
            "select COLUMN:nome COLUMN:email TABLE:clientes"
        );
    }

    #[test]
    fn english_idioms_are_canonicalized() {
        assert_eq!(
            en("Show me all orders along with customer information"),
            "select all orders join customer information"
        );
        assert_eq!(
            en("How many products have a price greater than 100"),
            "count products have a price > 100"
        );
        assert_eq!(en("users whose age is at least 18"), "users whose age >= 18");
        assert_eq!(
            en("customers whose name starts with Jo"),
            "customers whose name LIKE 'Jo%'"
        );
        assert_eq!(
            en("orders whose status is in (open, paid)"),
            "orders whose status IN (open, paid)"
        );
        assert_eq!(en("users whose email is null"), "users whose email IS NULL");
        assert_eq!(en("users whose email is not null"), "users whose email IS NOT NULL");
    }

    #[test]
    fn relative_dates_become_date_expressions() {
        assert_eq!(
            en("users created in the last 7 days"),
            "users created >= DATE_SUB(CURRENT_DATE(), INTERVAL 7 DAY)"
        );
        assert_eq!(en("orders placed today"), "orders placed = CURRENT_DATE()");
        assert_eq!(en("sales in march"), "sales ON_MONTH(3)");
        assert_eq!(pt("vendas nos últimos 3 meses"), "vendas >= DATE_SUB(CURRENT_DATE(), INTERVAL 3 MONTH)");
        assert_eq!(pt("pedidos de ontem"), "pedidos = DATE_SUB(CURRENT_DATE(), INTERVAL 1 DAY)");
    }

    #[test]
    fn grouping_and_ordering_idioms() {
        assert_eq!(en("count orders per status"), "count orders group by status");
        assert_eq!(en("list users sorted by name descending"), "select users order by name desc");
        assert_eq!(en("count orders by month"), "count orders group by month");
    }

    #[test]
    fn unmatched_text_keeps_its_case() {
        assert_eq!(en("  Frobnicate   the WIDGETS "), "Frobnicate the WIDGETS");
    }

    #[test]
    fn limits_offsets_and_pages() {
        let profile = Language::English.profile();
        assert_eq!(
            extract_limit("select top 5 users", profile),
            Some(Pagination { limit: Some(5), offset: None })
        );
        assert_eq!(
            extract_limit("select users limit 5000", profile),
            Some(Pagination { limit: Some(MAX_LIMIT), offset: None })
        );
        assert_eq!(
            extract_limit("select users page 3", profile),
            Some(Pagination { limit: Some(100), offset: Some(200) })
        );
        assert_eq!(
            extract_limit("select 20 rows from users skip 40", profile),
            Some(Pagination { limit: Some(20), offset: Some(40) })
        );
        assert_eq!(extract_limit("select users", profile), None);

        let profile = Language::Portuguese.profile();
        assert_eq!(
            extract_limit("select os primeiros 10 clientes", profile),
            Some(Pagination { limit: Some(10), offset: None })
        );
    }

    #[test]
    fn vague_quantities_map_to_limits() {
        let profile = Language::English.profile();
        assert_eq!(vocabulary_limit("select a few users", profile), Some(10));
        assert_eq!(vocabulary_limit("select users", profile), None);
    }
}
