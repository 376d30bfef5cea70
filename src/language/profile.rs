use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::Language;
use crate::classifier::Operation;
use crate::util::text::{quote_literal, strip_quotes};

// A comparison value as it appears in a prompt: quoted text, a number or a bare word
pub const VALUE: &str = r#"('[^']*'|"[^"]*"|-?\d+(?:\.\d+)?|[\w@.\-]+)"#;

pub type Expand = fn(&Captures) -> String;

pub enum Replacement {
    Text(&'static str),
    Expand(Expand),
}

/// One normalization step: every match of `pattern` is replaced.
pub struct Rewrite {
    pattern: Regex,
    replacement: Replacement,
}

impl Rewrite {
    fn text(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: compile(pattern),
            replacement: Replacement::Text(replacement),
        }
    }

    fn expand(pattern: &str, expand: Expand) -> Self {
        Self {
            pattern: compile(pattern),
            replacement: Replacement::Expand(expand),
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match &self.replacement {
            Replacement::Text(text) => self.pattern.replace_all(input, *text).into_owned(),
            Replacement::Expand(expand) => self
                .pattern
                .replace_all(input, |caps: &Captures| expand(caps))
                .into_owned(),
        }
    }
}

/// Localized guard texts. `{table}` and `{statement}` are substituted by the caller.
pub struct GuardMessages {
    pub no_table: &'static str,
    pub no_write_table: &'static str,
    pub no_insert_columns: &'static str,
    pub unsafe_update: &'static str,
    pub unsafe_delete: &'static str,
    pub missing_from: &'static str,
}

pub struct LimitWords {
    pub few: &'static [&'static str],
    pub some: &'static [&'static str],
    pub all: &'static [&'static str],
}

pub struct LanguageProfile {
    pub language: Language,
    pub common_words: &'static [&'static str],

    // explicit mentions
    pub filter_words: Regex,
    pub column_mention: Regex,
    pub column_separator: Regex,
    pub column_filler: Regex,
    pub table_mention: Regex,

    pub rewrites: Vec<Rewrite>,

    // classification
    pub operation_patterns: Vec<(Operation, Regex)>,
    pub operation_keywords: &'static [(Operation, &'static [&'static str])],

    // conditions
    pub equality: Regex,
    pub named: Regex,
    pub assignment: Regex,
    pub disjunction: Regex,
    /// Comparison phrases whose "or" is not a disjunction.
    pub inclusive_comparison: Regex,

    // pagination
    pub limit_patterns: Vec<Regex>,
    pub offset_patterns: Vec<Regex>,
    pub page_pattern: Regex,
    pub limit_words: LimitWords,

    // builder vocabulary
    pub aggregations: &'static [(&'static str, &'static str)],
    pub granularities: &'static [(&'static str, &'static str)],
    pub identifier_terms: &'static [&'static str],
    pub descriptive_terms: &'static [&'static str],
    pub temporal_terms: &'static [&'static str],
    pub distinct_terms: &'static [&'static str],
    pub descending_terms: &'static [&'static str],
    pub ascending_terms: &'static [&'static str],
    pub join_kinds: Vec<(Regex, &'static str)>,
    pub group_by: Regex,
    pub order_by: Regex,
    pub having: Regex,

    pub messages: GuardMessages,
}

impl LanguageProfile {
    pub fn for_language(language: Language) -> &'static LanguageProfile {
        match language {
            Language::English => &ENGLISH,
            Language::Portuguese => &PORTUGUESE,
        }
    }

    pub fn is_common_word(&self, word: &str) -> bool {
        self.common_words.contains(&word)
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in language pattern")
}

fn with_value(pattern: &str) -> String {
    pattern.replace("{VALUE}", VALUE)
}

// Vocabulary lookups shared by both profiles

fn sql_unit(word: &str) -> &'static str {
    let word = word.to_lowercase();
    if word.starts_with("day") || word.starts_with("dia") {
        "DAY"
    } else if word.starts_with("week") || word.starts_with("semana") {
        "WEEK"
    } else if word.starts_with("month") || word.starts_with("mês") || word.starts_with("mes") {
        "MONTH"
    } else {
        "YEAR"
    }
}

fn month_number(word: &str) -> usize {
    const EN: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    const PT: [&str; 12] = [
        "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
        "outubro", "novembro", "dezembro",
    ];
    let word = word.to_lowercase().replace("marco", "março");
    EN.iter()
        .position(|m| *m == word)
        .or_else(|| PT.iter().position(|m| *m == word))
        .map_or(1, |index| index + 1)
}

// Sunday is 1, matching DAYOFWEEK
fn weekday_number(word: &str) -> usize {
    let word = word.to_lowercase();
    const DAYS: [(&str, &str); 7] = [
        ("sunday", "domingo"),
        ("monday", "segunda"),
        ("tuesday", "ter"),
        ("wednesday", "quarta"),
        ("thursday", "quinta"),
        ("friday", "sexta"),
        ("saturday", "s"),
    ];
    DAYS.iter()
        .position(|(en, pt)| word.starts_with(en) || word.starts_with(pt))
        .map_or(1, |index| index + 1)
}

fn ordinal(word: &str) -> usize {
    match word.to_lowercase().as_str() {
        "second" | "2nd" | "segundo" | "2º" | "2" => 2,
        "third" | "3rd" | "terceiro" | "3º" | "3" => 3,
        "fourth" | "4th" | "quarto" | "4º" | "4" => 4,
        _ => 1,
    }
}

fn since_units(caps: &Captures) -> String {
    format!(
        ">= DATE_SUB(CURRENT_DATE(), INTERVAL {} {})",
        &caps[1],
        sql_unit(&caps[2])
    )
}

fn previous_period(caps: &Captures) -> String {
    let unit = sql_unit(&caps[1]);
    let lower = unit.to_lowercase();
    format!(
        "BETWEEN DATE_SUB(DATE_TRUNC('{lower}', CURRENT_DATE()), INTERVAL 1 {unit}) AND DATE_TRUNC('{lower}', CURRENT_DATE())"
    )
}

fn current_period(caps: &Captures) -> String {
    let unit = sql_unit(&caps[1]).to_lowercase();
    format!(">= DATE_TRUNC('{unit}', CURRENT_DATE())")
}

fn next_period(caps: &Captures) -> String {
    let unit = sql_unit(&caps[1]);
    let lower = unit.to_lowercase();
    format!(
        "BETWEEN DATE_ADD(DATE_TRUNC('{lower}', CURRENT_DATE()), INTERVAL 1 {unit}) AND DATE_ADD(DATE_TRUNC('{lower}', CURRENT_DATE()), INTERVAL 2 {unit})"
    )
}

fn within_units(caps: &Captures) -> String {
    format!(
        "BETWEEN CURRENT_DATE() AND DATE_ADD(CURRENT_DATE(), INTERVAL {} {})",
        &caps[1],
        sql_unit(&caps[2])
    )
}

fn on_month(caps: &Captures) -> String {
    format!("ON_MONTH({})", month_number(&caps[1]))
}

fn on_weekday(caps: &Captures) -> String {
    format!("ON_WEEKDAY({})", weekday_number(&caps[1]))
}

fn on_quarter(caps: &Captures) -> String {
    format!("ON_QUARTER({})", ordinal(&caps[1]))
}

fn on_semester(caps: &Captures) -> String {
    format!("ON_SEMESTER({})", ordinal(&caps[1]))
}

fn like_prefix(caps: &Captures) -> String {
    format!("LIKE {}", quote_literal(&format!("{}%", strip_quotes(&caps[1]))))
}

fn like_suffix(caps: &Captures) -> String {
    format!("LIKE {}", quote_literal(&format!("%{}", strip_quotes(&caps[1]))))
}

fn like_contains(caps: &Captures) -> String {
    let value = strip_quotes(&caps[1]);
    if value.contains('%') {
        format!("LIKE {}", quote_literal(value))
    } else {
        format!("LIKE {}", quote_literal(&format!("%{}%", value)))
    }
}

fn between(caps: &Captures) -> String {
    format!("BETWEEN {} AND {}", &caps[1], &caps[2])
}

fn in_list(caps: &Captures) -> String {
    format!("IN ({})", caps[1].trim())
}

fn missing_value(caps: &Captures) -> String {
    format!("{} IS NULL", &caps[1])
}

const ORDERING_WORDS: [&str; 10] = [
    "order", "sort", "sorted", "ordered", "arranged", "ranked", "group", "grouped", "ordene",
    "ordenar",
];

// "<word> by month" becomes "<word> group by month" unless the word already orders or groups
fn group_hint(caps: &Captures) -> String {
    let previous = caps.get(1).map_or("", |m| m.as_str());
    if ORDERING_WORDS.contains(&previous.trim().to_lowercase().as_str()) {
        return caps[0].to_string();
    }
    format!("{}group by {}", previous, &caps[2])
}

static ENGLISH: LazyLock<LanguageProfile> = LazyLock::new(|| LanguageProfile {
    language: Language::English,
    common_words: &[
        "the", "a", "an", "and", "but", "or", "for", "nor", "on", "at", "to", "from", "by",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "under", "over", "of", "in", "out", "off", "up", "down", "all", "any",
        "each", "every", "some", "such", "that", "this", "these", "those", "which", "who",
        "whom", "whose", "what", "whatever", "when", "where", "why", "how", "because", "so",
        "very", "too", "not", "no", "only", "just", "more", "most", "less", "least", "as", "if",
        "then", "else", "get", "select", "find", "show", "tell", "give", "list", "me", "us",
        "you", "he", "his", "she", "her", "they", "them", "their", "it", "its", "table",
        "column", "row", "value", "field", "record", "records", "database", "data", "sql",
        "query", "having", "join", "left", "right", "inner", "outer", "full", "count", "sum",
        "avg", "min", "max", "like", "group", "order", "limit", "offset", "can", "could",
        "would", "should", "may", "might", "have", "has", "had", "is", "are", "was", "were",
        "be", "been", "do", "does", "did", "delete", "update", "insert", "please", "want",
        "need", "information", "info", "details", "desc", "asc", "many", "much", "new",
        "specified", "condition", "null", "true", "false", "first", "last", "top",
    ],

    filter_words: compile(r"(?i)\b(?:where|whose)\b"),
    column_mention: compile(
        r"(?i)\b(?:the\s+)?(?:columns?|fields?)\s+(\w+(?:\s*,\s*\w+)*(?:\s*,?\s+and\s+\w+)?)",
    ),
    column_separator: compile(r"(?i)\s*,\s*and\s+|\s*,\s*|\s+and\s+"),
    column_filler: compile(r"(?i)\b(?:the\s+)?(?:column|field)\s+"),
    table_mention: compile(
        r"(?i)\b(?:(?:from|in|of|on)\s+)?(?:the\s+)?(?:table\s+(\w+)|(\w+)\s+table\b)",
    ),

    rewrites: vec![
        // substring, range, list and null idioms
        Rewrite::expand(
            &with_value(r"(?i)\b(?:starts|begins|starting|beginning)\s+with\s+{VALUE}"),
            like_prefix,
        ),
        Rewrite::expand(&with_value(r"(?i)\b(?:ends|ending)\s+with\s+{VALUE}"), like_suffix),
        Rewrite::expand(
            &with_value(r"(?i)\b(?:contains|containing|includes|like)\s+{VALUE}"),
            like_contains,
        ),
        Rewrite::expand(
            &with_value(r"(?i)\b(?:is\s+|are\s+)?between\s+{VALUE}\s+and\s+{VALUE}"),
            between,
        ),
        Rewrite::expand(r"(?i)\b(?:is\s+|are\s+)?(?:in|one of|among)\s*\(([^)]*)\)", in_list),
        Rewrite::text(
            r"(?i)\b(?:is|are)\s+not\s+(?:null|empty|missing|blank)\b|\b(?:is|are)\s+(?:present|set)\b",
            "IS NOT NULL",
        ),
        Rewrite::text(r"(?i)\b(?:is|are)\s+(?:null|empty|missing|blank)\b", "IS NULL"),
        Rewrite::expand(r"(?i)\b(?:has|have)\s+no\s+(\w+)", missing_value),
        // relative dates
        Rewrite::expand(
            r"(?i)\b(?:(?:in|during|within|from|over|for)\s+)?(?:the\s+)?(?:last|past|previous)\s+(\d+)\s+(days?|weeks?|months?|years?)\b",
            since_units,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:in|during|from|on)\s+)?(?:the\s+)?(?:last|previous|past)\s+(week|month|year)\b",
            previous_period,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:in|during|from|on)\s+)?this\s+(week|month|year)\b",
            current_period,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:in|during|within|over)\s+)?(?:the\s+)?next\s+(\d+)\s+(days?|weeks?|months?|years?)\b",
            within_units,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:in|during|for)\s+)?(?:the\s+)?next\s+(week|month|year)\b",
            next_period,
        ),
        Rewrite::text(
            r"(?i)\b(?:(?:on|for)\s+)?tomorrow\b",
            "= DATE_ADD(CURRENT_DATE(), INTERVAL 1 DAY)",
        ),
        Rewrite::text(r"(?i)\b(?:(?:on|from|for)\s+)?today\b", "= CURRENT_DATE()"),
        Rewrite::text(
            r"(?i)\b(?:(?:on|from|for)\s+)?yesterday\b",
            "= DATE_SUB(CURRENT_DATE(), INTERVAL 1 DAY)",
        ),
        Rewrite::expand(
            r"(?i)\b(?:in|during)\s+(january|february|march|april|may|june|july|august|september|october|november|december)\b",
            on_month,
        ),
        Rewrite::expand(
            r"(?i)\bon\s+(sunday|monday|tuesday|wednesday|thursday|friday|saturday)s?\b",
            on_weekday,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:in|during)\s+)?(?:the\s+)?(first|second|third|fourth|1st|2nd|3rd|4th)\s+quarter\b",
            on_quarter,
        ),
        Rewrite::expand(r"(?i)\bq([1-4])\b", on_quarter),
        Rewrite::expand(
            r"(?i)\b(?:(?:in|during)\s+)?(?:the\s+)?(first|second|1st|2nd)\s+(?:semester|half)\b",
            on_semester,
        ),
        // comparisons
        Rewrite::text(
            r"(?i)\b(?:greater than or equal to|greater than or equal|at least|no less than|not less than)\b",
            ">=",
        ),
        Rewrite::text(
            r"(?i)\b(?:less than or equal to|less than or equal|at most|no more than|not more than)\b",
            "<=",
        ),
        Rewrite::text(r"(?i)\b(?:not equal to|not equals|different from|other than)\b", "!="),
        Rewrite::text(r"\b(?:is not|isn't|are not|aren't)\b", "!="),
        Rewrite::text(
            r"(?i)\b(?:greater than|more than|bigger than|higher than|larger than|above|exceeds|exceeding)\b",
            ">",
        ),
        Rewrite::text(
            r"(?i)\b(?:less than|fewer than|smaller than|lower than|below)\b",
            "<",
        ),
        Rewrite::text(r"(?i)\b(?:is equal to|equal to|equals|equal)\b", "="),
        Rewrite::text(r"(\w+)\s+(?:is|are|was|were|be)\s+(>=|<=|!=|=|>|<)", "${1} ${2}"),
        // operations
        Rewrite::text(r"(?i)\bhow many\b", "count"),
        Rewrite::text(
            r"(?i)\b(?:show me|give me|find all|get all|list all|show|display|list|find|fetch|retrieve|get|view)\b",
            "select",
        ),
        Rewrite::text(r"(?i)\b(?:remove|erase|drop)\b", "delete"),
        Rewrite::text(r"(?i)\b(?:modify|change|edit|alter)\b", "update"),
        Rewrite::text(
            r"(?i)\b(?:add|create|register|insert)(?:\s+(?:a|an))?\s+new\b|\b(?:add|create|register)\b",
            "insert",
        ),
        // joins, grouping, ordering
        Rewrite::text(
            r"(?i)\b(?:along with|together with|combined with|joined with|paired with)\b",
            "join",
        ),
        Rewrite::text(
            r"(?i)\b(?:sorted by|ordered by|sort by|order by|arranged by|ranked by)\b",
            "order by",
        ),
        Rewrite::text(
            r"(?i)\b(?:grouped by|group by|broken down by|aggregated by)\b",
            "group by",
        ),
        Rewrite::text(r"(?i)\b(?:for each|per)\s+(\w+)", "group by ${1}"),
        Rewrite::expand(
            r"(?i)\b(\w+\s+)?by\s+(year|month|day|week|quarter|category|type|status|region|country|department|state|city|gender|level|class)\b",
            group_hint,
        ),
        Rewrite::text(
            r"(?i)\b(?:in descending order|descending|newest first|latest first|most recent first)\b",
            "desc",
        ),
        Rewrite::text(r"(?i)\b(?:in ascending order|ascending|oldest first)\b", "asc"),
    ],

    operation_patterns: vec![
        (Operation::Select, compile(r"(?i)\bselect\b")),
        (Operation::Count, compile(r"(?i)\bcount\b|\bnumber of\b|\btotal number\b")),
        (Operation::Insert, compile(r"(?i)\binsert\b")),
        (Operation::Update, compile(r"(?i)\bupdate\b")),
        (Operation::Delete, compile(r"(?i)\bdelete\b")),
        (Operation::Join, compile(r"(?i)\bjoin\b")),
        (Operation::Join, compile(r"(?i)\b(?:and|with)\s+(?:their|its)\b")),
        (Operation::Group, compile(r"(?i)\bgroup by\b")),
        (Operation::Order, compile(r"(?i)\border by\b")),
        (Operation::Order, compile(r"(?i)\b(?:newest|oldest|latest|highest|lowest|desc|asc)\b")),
        (Operation::Limit, compile(r"(?i)\b(?:top|first|last|limit|only)\s+\d+\b")),
        (Operation::Limit, compile(r"(?i)\b\d+\s+(?:results|records|rows|entries)\b")),
        (Operation::Distinct, compile(r"(?i)\b(?:distinct|unique|different)\b")),
    ],
    operation_keywords: &[
        (Operation::Select, &["select", "show", "list", "find", "display", "view"]),
        (Operation::Count, &["how many", "count", "number of", "total"]),
        (Operation::Insert, &["insert", "new", "add", "create"]),
        (Operation::Update, &["update", "change", "modify", "edit", "set"]),
        (Operation::Delete, &["delete", "remove", "exclude"]),
        (Operation::Join, &["join", "combine", "with", "related"]),
        (Operation::Group, &["group", "categorize", "cluster", "by category", "by type"]),
        (Operation::Order, &["order", "sort", "arrange", "rank"]),
        (Operation::Limit, &["limit", "top", "first"]),
        (Operation::Distinct, &["distinct", "unique"]),
    ],

    equality: compile(&with_value(r"\b(\w+)\s+(?:is|equals)\s+{VALUE}")),
    named: compile(&with_value(r"(?i)\b(?:named|called|titled)\s+{VALUE}")),
    assignment: compile(&with_value(r"(?i)\b(?:set\s+)?(\w+)\s+(?:to|=)\s+{VALUE}")),
    disjunction: compile(r"(?i)\b(?:or|either)\b"),
    inclusive_comparison: compile(
        r"(?i)\b(?:(?:greater|less|more|fewer|higher|lower)\s+than\s+or\s+equal(?:\s+to)?|equal\s+to\s+or\s+(?:greater|less|more|higher|lower)(?:\s+than)?|or\s+(?:more|less|fewer|above|below|higher|lower|later|earlier))\b",
    ),

    limit_patterns: vec![
        compile(r"(?i)\b(?:limit(?:ed)?(?:\s+to)?|top|first|last|only|just)\s+(\d+)\b"),
        compile(r"(?i)\b(\d+)\s+(?:results|records|rows|entries|items)\b"),
    ],
    offset_patterns: vec![compile(r"(?i)\b(?:offset|skip|skipping|after the first)\s+(\d+)\b")],
    page_pattern: compile(r"(?i)\bpage\s+(\d+)\b"),
    limit_words: LimitWords {
        few: &["few", "couple", "handful"],
        some: &["some", "several"],
        all: &["all", "every", "complete", "entire"],
    },

    aggregations: &[
        ("average", "AVG"),
        ("mean", "AVG"),
        ("sum", "SUM"),
        ("total", "SUM"),
        ("maximum", "MAX"),
        ("highest", "MAX"),
        ("max", "MAX"),
        ("minimum", "MIN"),
        ("lowest", "MIN"),
        ("min", "MIN"),
    ],
    granularities: &[
        ("year", "YEAR"),
        ("month", "MONTH"),
        ("day", "DAY"),
        ("week", "WEEK"),
        ("quarter", "QUARTER"),
    ],
    identifier_terms: &["id", "ids", "identifier", "identifiers", "key"],
    descriptive_terms: &[
        "name", "names", "title", "titles", "description", "label", "details", "information",
    ],
    temporal_terms: &[
        "date", "time", "when", "today", "yesterday", "created", "updated", "recent", "day",
        "week", "month", "year", "current_date", "on_month", "on_weekday", "on_quarter",
        "on_semester",
    ],
    distinct_terms: &["distinct", "unique", "different"],
    descending_terms: &["desc", "newest", "latest", "highest", "most", "largest", "biggest", "recent"],
    ascending_terms: &["asc", "oldest", "lowest", "smallest", "least", "earliest"],
    join_kinds: vec![
        (
            compile(r"(?i)\bleft (?:outer )?join\b|\beven (?:those )?without\b|\bincluding those without\b"),
            "LEFT JOIN",
        ),
        (compile(r"(?i)\bright (?:outer )?join\b"), "RIGHT JOIN"),
        (compile(r"(?i)\bfull (?:outer )?join\b"), "FULL JOIN"),
        (compile(r"(?i)\binner join\b|\bonly (?:those|the ones) with\b"), "INNER JOIN"),
    ],
    group_by: compile(r"(?i)\bgroup by\s+(\w+)"),
    order_by: compile(r"(?i)\border by\s+(\w+)(?:\s+(asc|desc))?"),
    having: compile(
        r"(?i)\b(?:having|with)\s+(?:(?:a\s+)?(?:count|total|sum|number)\s+(?:of\s+)?)?(>=|<=|!=|=|>|<)?\s*(\d+(?:\.\d+)?)\b",
    ),

    messages: GuardMessages {
        no_table: "Unable to determine which table to query. Please specify the table in your query.",
        no_write_table: "Unable to identify the table for {statement}. Please specify the table in your query.",
        no_insert_columns: "Table {table} has no columns available for INSERT.",
        unsafe_update: "UPDATE on {table} requires a WHERE condition. Please specify which records to update.",
        unsafe_delete: "DELETE on {table} requires a WHERE condition. Please specify which records to delete.",
        missing_from: "Incomplete SELECT query. Missing table specification (FROM).",
    },
});

static PORTUGUESE: LazyLock<LanguageProfile> = LazyLock::new(|| LanguageProfile {
    language: Language::Portuguese,
    common_words: &[
        "o", "a", "os", "as", "um", "uma", "uns", "umas", "de", "do", "da", "dos", "das", "no",
        "na", "nos", "nas", "ao", "aos", "à", "às", "pelo", "pela", "pelos", "pelas", "num",
        "numa", "com", "sem", "para", "por", "em", "sobre", "sob", "após", "até", "desde",
        "entre", "contra", "e", "mas", "ou", "que", "porque", "pois", "porém", "quando", "como",
        "onde", "se", "eu", "tu", "ele", "ela", "nós", "eles", "elas", "vocês", "meu", "minha",
        "meus", "minhas", "seu", "sua", "seus", "suas", "nosso", "nossa", "este", "esta",
        "estes", "estas", "esse", "essa", "esses", "essas", "aquele", "aquela", "isto", "isso",
        "já", "ainda", "sempre", "nunca", "agora", "depois", "antes", "sim", "não", "muito",
        "pouco", "mais", "menos", "quanto", "quanta", "quantos", "quantas", "todo", "toda",
        "todos", "todas", "algum", "alguma", "alguns", "algumas", "nenhum", "nenhuma",
        "qualquer", "me", "te", "lhe", "tabela", "coluna", "linha", "valor", "campo",
        "registro", "registros", "banco", "dados", "dado", "quero", "mostre", "exiba", "liste",
        "selecione", "busque", "encontre", "obtenha", "traga", "consulte", "select", "count",
        "insert", "update", "delete", "join", "group", "order", "by", "desc", "asc", "é", "são",
        "têm", "tem", "informações", "informação", "qual", "quais", "novo", "nova",
    ],

    filter_words: compile(r"(?i)\b(?:onde|cujo|cuja|cujos|cujas|em que)\b"),
    column_mention: compile(
        r"(?i)\b(?:(?:a|as|o|os)\s+)?(?:colunas?|campos?)\s+(\w+(?:\s*,\s*\w+)*(?:\s+e\s+\w+)?)",
    ),
    column_separator: compile(r"(?i)\s*,\s*e\s+|\s*,\s*|\s+e\s+"),
    column_filler: compile(r"(?i)\b(?:(?:a|o)\s+)?(?:coluna|campo)\s+"),
    table_mention: compile(r"(?i)\b(?:(?:da|de|na|do|das|nas|a)\s+)?tabela\s+(\w+)"),

    rewrites: vec![
        // substring, range, list and null idioms
        Rewrite::expand(
            &with_value(
                r"(?i)\b(?:começa|começam|começando|comece|inicia|iniciam|iniciando)\s+(?:com|por)\s+{VALUE}",
            ),
            like_prefix,
        ),
        Rewrite::expand(
            &with_value(r"(?i)\b(?:termina|terminam|terminando|termine)\s+(?:com|em)\s+{VALUE}"),
            like_suffix,
        ),
        Rewrite::expand(
            &with_value(r"(?i)\b(?:contém|contem|contendo|contenha|contenham|parecido com)\s+{VALUE}"),
            like_contains,
        ),
        Rewrite::expand(
            &with_value(r"(?i)\b(?:(?:está|estão|esteja)\s+)?entre\s+{VALUE}\s+e\s+{VALUE}"),
            between,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:está|estão|esteja)\s+)?(?:em|entre os valores|um dos)\s*\(([^)]*)\)",
            in_list,
        ),
        Rewrite::text(
            r"(?i)\bnão\s+(?:é|está|for|seja|estiver)\s+(?:nul[oa]|vazi[oa])\b|\b(?:tem valor|preenchid[oa])\b",
            "IS NOT NULL",
        ),
        Rewrite::text(
            r"(?i)\b(?:é|está|for|seja|estiver)\s+(?:nul[oa]|vazi[oa]|em branco)\b|\bsem valor\b",
            "IS NULL",
        ),
        Rewrite::expand(r"(?i)\bsem\s+(\w+)", missing_value),
        // relative dates
        Rewrite::expand(
            r"(?i)\b(?:(?:nos|nas|dos|das|durante\s+os|durante\s+as)\s+)?(?:últimos|últimas|ultimos|ultimas|passados|passadas)\s+(\d+)\s+(dias?|semanas?|meses|mês|mes|anos?)\b",
            since_units,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:na|no|da|do)\s+)?(semana|mês|mes|ano)\s+passad[oa]\b",
            previous_period,
        ),
        Rewrite::expand(
            r"(?i)\b(?:nesta|neste|desta|deste|esta|este)\s+(semana|mês|mes|ano)\b",
            current_period,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:n|d)?[oa]s\s+)?pr[óo]xim[oa]s\s+(\d+)\s+(dias?|semanas?|meses|mês|anos?)\b",
            within_units,
        ),
        Rewrite::expand(
            r"(?i)\b(?:(?:na|no|da|do)\s+)?pr[óo]xim[oa]\s+(semana|mês|mes|ano)\b",
            next_period,
        ),
        Rewrite::text(
            r"(?i)\b(?:de\s+)?amanh[ãa]\b",
            "= DATE_ADD(CURRENT_DATE(), INTERVAL 1 DAY)",
        ),
        Rewrite::text(r"(?i)\b(?:de\s+)?hoje\b", "= CURRENT_DATE()"),
        Rewrite::text(
            r"(?i)\b(?:de\s+)?ontem\b",
            "= DATE_SUB(CURRENT_DATE(), INTERVAL 1 DAY)",
        ),
        Rewrite::expand(
            r"(?i)\b(?:no mês de|no mes de|em|de|durante)\s+(janeiro|fevereiro|março|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\b",
            on_month,
        ),
        Rewrite::expand(
            r"(?i)\b(?:na|nas|às|aos|em)\s+(domingo|segunda|terça|terca|quarta|quinta|sexta|sábado|sabado)s?(?:-feiras?)?\b",
            on_weekday,
        ),
        Rewrite::expand(
            r"(?i)\b(?:no\s+)?(primeiro|segundo|terceiro|quarto|1º|2º|3º|4º)\s+trimestre\b",
            on_quarter,
        ),
        Rewrite::expand(r"(?i)\b(?:no\s+)?(primeiro|segundo|1º|2º)\s+semestre\b", on_semester),
        // comparisons
        Rewrite::text(
            r"(?i)\b(?:maior ou igual a|maior ou igual que|pelo menos|no mínimo|no minimo)\b",
            ">=",
        ),
        Rewrite::text(
            r"(?i)\b(?:menor ou igual a|menor ou igual que|no máximo|no maximo)\b",
            "<=",
        ),
        Rewrite::text(r"(?i)\b(?:diferente de|não é igual a|não igual a|não é|não for)\b", "!="),
        Rewrite::text(
            r"(?i)\b(?:maior que|maior do que|acima de|superior a|mais que|mais do que|mais de)\b",
            ">",
        ),
        Rewrite::text(
            r"(?i)\b(?:menor que|menor do que|abaixo de|inferior a|menos que|menos do que|menos de)\b",
            "<",
        ),
        Rewrite::text(r"(?i)\b(?:é igual a|igual a|igual)\b", "="),
        Rewrite::text(
            r"(\w+)\s+(?:for|forem|é|são|seja|sejam|está|estão|estiver|tiver|tem|têm)\s+(>=|<=|!=|=|>|<)",
            "${1} ${2}",
        ),
        // operations
        Rewrite::text(
            r"(?i)\b(?:quantos|quantas|qual a quantidade de|qual o número de|qual o numero de|contar|conte|contagem de)\b",
            "count",
        ),
        Rewrite::text(
            r"(?i)\b(?:me mostre|me mostra|me dê|me de|quero ver|quais são|selecione|selecionar|seleciona|mostre|mostrar|mostra|exiba|exibir|liste|listar|busque|buscar|encontre|encontrar|traga|trazer|obtenha|obter|consulte|consultar|visualizar|quais)\b",
            "select",
        ),
        Rewrite::text(
            r"(?i)\b(?:exclua|excluir|exclui|deletar|delete|remova|remover|apague|apagar|elimine|eliminar)\b",
            "delete",
        ),
        Rewrite::text(
            r"(?i)\b(?:atualize|atualizar|atualiza|altere|alterar|modifique|modificar|edite|editar|mude|mudar|corrija|corrigir)\b",
            "update",
        ),
        Rewrite::text(
            r"(?i)\b(?:insira|inserir|adicione|adicionar|crie|criar|cadastre|cadastrar|registre|registrar)\b(?:\s+(?:um|uma)\s+nov[oa]\b)?",
            "insert",
        ),
        // joins, grouping, ordering
        Rewrite::text(
            r"(?i)\b(?:junto com|juntamente com|combinado com|combinados com|relacionad[oa]s? (?:com|a)|com (?:seus|suas|os seus|as suas))\b",
            "join",
        ),
        Rewrite::text(
            r"(?i)\b(?:ordenad[oa]s? por|ordenar por|ordene por|ordenando por|classificad[oa]s? por|em ordem de)\b",
            "order by",
        ),
        Rewrite::text(
            r"(?i)\b(?:agrupad[oa]s? por|agrupar por|agrupe por|agrupando por)\b",
            "group by",
        ),
        Rewrite::text(r"(?i)\b(?:para cada|por cada)\s+(\w+)", "group by ${1}"),
        Rewrite::expand(
            r"(?i)\b(\w+\s+)?por\s+(ano|mês|mes|dia|semana|trimestre|categoria|tipo|status|região|regiao|país|pais|estado|cidade|departamento|grupo|classe|nível|nivel)\b",
            group_hint,
        ),
        Rewrite::text(
            r"(?i)\b(?:em ordem decrescente|decrescente|mais recentes primeiro|do maior para o menor)\b",
            "desc",
        ),
        Rewrite::text(
            r"(?i)\b(?:em ordem crescente|crescente|mais antigos primeiro|do menor para o maior)\b",
            "asc",
        ),
    ],

    operation_patterns: vec![
        (Operation::Select, compile(r"(?i)\bselect\b")),
        (Operation::Count, compile(r"(?i)\bcount\b|\bnúmero de\b|\bquantidade de\b")),
        (Operation::Insert, compile(r"(?i)\binsert\b")),
        (Operation::Update, compile(r"(?i)\bupdate\b")),
        (Operation::Delete, compile(r"(?i)\bdelete\b")),
        (Operation::Join, compile(r"(?i)\bjoin\b")),
        (Operation::Join, compile(r"(?i)\bcom\s+(?:seus|suas|os|as)\b")),
        (Operation::Group, compile(r"(?i)\bgroup by\b")),
        (Operation::Order, compile(r"(?i)\border by\b")),
        (
            Operation::Order,
            compile(r"(?i)\b(?:mais recentes|mais antigos|maiores|menores|desc|asc)\b"),
        ),
        (
            Operation::Limit,
            compile(r"(?i)\b(?:primeiros|primeiras|últimos|últimas|apenas|somente|limite)\s+\d+\b"),
        ),
        (Operation::Limit, compile(r"(?i)\b\d+\s+(?:resultados|registros|linhas)\b")),
        (
            Operation::Distinct,
            compile(r"(?i)\b(?:distintos|distintas|únicos|únicas|diferentes)\b"),
        ),
    ],
    operation_keywords: &[
        (
            Operation::Select,
            &["select", "mostrar", "listar", "encontrar", "exibir", "visualizar"],
        ),
        (Operation::Count, &["count", "quantos", "quantas", "contar", "total"]),
        (
            Operation::Insert,
            &["insert", "inserir", "adicionar", "criar", "novo", "nova", "cadastrar"],
        ),
        (
            Operation::Update,
            &["update", "alterar", "modificar", "editar", "atualizar", "mudar"],
        ),
        (
            Operation::Delete,
            &["delete", "remover", "deletar", "excluir", "apagar", "eliminar"],
        ),
        (
            Operation::Join,
            &["join", "junto", "juntar", "com", "relacionado", "relacionar", "unir"],
        ),
        (
            Operation::Group,
            &["group", "agrupar", "categorizar", "por categoria", "por grupo", "por tipo"],
        ),
        (Operation::Order, &["order", "ordenar", "classificar", "organizar", "em ordem"]),
        (Operation::Limit, &["limite", "primeiros", "primeiras"]),
        (Operation::Distinct, &["distintos", "únicos", "distinct"]),
    ],

    equality: compile(&with_value(r"\b(\w+)\s+(?:é|seja|for|igual)\s+{VALUE}")),
    named: compile(&with_value(r"(?i)\b(?:chamad[oa]s?|de nome|com nome|intitulad[oa])\s+{VALUE}")),
    assignment: compile(&with_value(
        r"(?i)\b(?:(?:defina|definir|coloque|colocar)\s+)?(\w+)\s+(?:para|como|=)\s+{VALUE}",
    )),
    disjunction: compile(r"(?i)\b(?:ou|um dos)\b"),
    inclusive_comparison: compile(
        r"(?i)\b(?:(?:maior|menor|superior|inferior)\s+ou\s+igual(?:\s+(?:a|que))?|igual\s+ou\s+(?:maior|menor|superior|inferior)(?:\s+(?:a|que))?|ou\s+(?:mais|menos))\b",
    ),

    limit_patterns: vec![
        compile(
            r"(?i)\b(?:limite(?:\s+de)?|limitado a|primeiros|primeiras|últimos|últimas|ultimos|ultimas|apenas|somente|só)\s+(\d+)\b",
        ),
        compile(r"(?i)\b(\d+)\s+(?:resultados|registros|linhas|itens)\b"),
    ],
    offset_patterns: vec![compile(r"(?i)\b(?:pular|pulando|ignorando|ignorar|a partir do)\s+(\d+)\b")],
    page_pattern: compile(r"(?i)\bp[áa]gina\s+(\d+)\b"),
    limit_words: LimitWords {
        few: &["poucos", "poucas"],
        some: &["alguns", "algumas", "vários", "várias"],
        all: &["todos", "todas", "completo", "completa", "inteiro", "inteira"],
    },

    aggregations: &[
        ("média", "AVG"),
        ("media", "AVG"),
        ("soma", "SUM"),
        ("total", "SUM"),
        ("máximo", "MAX"),
        ("maximo", "MAX"),
        ("maior", "MAX"),
        ("mínimo", "MIN"),
        ("minimo", "MIN"),
        ("menor", "MIN"),
    ],
    granularities: &[
        ("ano", "YEAR"),
        ("mês", "MONTH"),
        ("mes", "MONTH"),
        ("dia", "DAY"),
        ("semana", "WEEK"),
        ("trimestre", "QUARTER"),
    ],
    identifier_terms: &["id", "ids", "identificador", "identificadores", "código", "codigo", "chave"],
    descriptive_terms: &[
        "nome", "nomes", "título", "titulo", "descrição", "descricao", "rótulo", "detalhes",
        "informações",
    ],
    temporal_terms: &[
        "data", "hora", "quando", "período", "periodo", "criado", "criada", "atualizado",
        "recente", "recentes", "dia", "mês", "ano", "semana", "current_date", "on_month",
        "on_weekday", "on_quarter", "on_semester",
    ],
    distinct_terms: &[
        "distintos", "distintas", "distinto", "distinta", "únicos", "únicas", "único", "única",
        "diferentes",
    ],
    descending_terms: &["desc", "maiores", "recentes", "últimos", "últimas"],
    ascending_terms: &["asc", "menores", "antigos", "primeiros"],
    join_kinds: vec![
        (
            compile(r"(?i)\bleft join\b|\bmesmo sem\b|\bincluindo os sem\b|\bmesmo os que não têm\b"),
            "LEFT JOIN",
        ),
        (compile(r"(?i)\bright join\b"), "RIGHT JOIN"),
        (compile(r"(?i)\bfull join\b|\bjunção completa\b"), "FULL JOIN"),
        (compile(r"(?i)\binner join\b|\bapenas os que têm\b|\bsomente os que têm\b"), "INNER JOIN"),
    ],
    group_by: compile(r"(?i)\bgroup by\s+(\w+)"),
    order_by: compile(r"(?i)\border by\s+(\w+)(?:\s+(asc|desc))?"),
    having: compile(
        r"(?i)\b(?:tendo|com|que tenham|que possuem)\s+(?:(?:contagem|total|soma|quantidade)\s+(?:de\s+)?)?(>=|<=|!=|=|>|<)?\s*(\d+(?:\.\d+)?)\b",
    ),

    messages: GuardMessages {
        no_table: "Não foi possível determinar qual tabela consultar. Por favor, especifique a tabela em sua consulta.",
        no_write_table: "Não foi possível identificar a tabela para o {statement}. Por favor, especifique a tabela em sua consulta.",
        no_insert_columns: "A tabela {table} não possui colunas disponíveis para INSERT.",
        unsafe_update: "UPDATE em {table} requer uma condição WHERE. Especifique quais registros deseja atualizar.",
        unsafe_delete: "DELETE em {table} requer uma condição WHERE. Especifique quais registros deseja excluir.",
        missing_from: "Consulta SELECT incompleta. Falta especificar a tabela (FROM).",
    },
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_selected_by_language() {
        assert_eq!(LanguageProfile::for_language(Language::English).language, Language::English);
        assert_eq!(
            LanguageProfile::for_language(Language::Portuguese).language,
            Language::Portuguese
        );
    }

    #[test]
    fn date_vocabulary_maps_to_numbers() {
        assert_eq!(month_number("March"), 3);
        assert_eq!(month_number("marco"), 3);
        assert_eq!(month_number("dezembro"), 12);
        assert_eq!(weekday_number("monday"), 2);
        assert_eq!(weekday_number("sábado"), 7);
        assert_eq!(weekday_number("terça"), 3);
        assert_eq!(sql_unit("meses"), "MONTH");
        assert_eq!(sql_unit("days"), "DAY");
    }

    #[test]
    fn common_words_are_per_language() {
        let en = LanguageProfile::for_language(Language::English);
        let pt = LanguageProfile::for_language(Language::Portuguese);
        assert!(en.is_common_word("the"));
        assert!(!en.is_common_word("tabela"));
        assert!(pt.is_common_word("tabela"));
    }
}
