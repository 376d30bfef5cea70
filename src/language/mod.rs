// Language detection and the per-language vocabulary the rest of the pipeline runs on.
// Every later stage takes a `&LanguageProfile` instead of branching on the language itself.
pub mod normalizer;
pub mod profile;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::text::words;

pub use normalizer::{extract_limit, normalize, Pagination};
pub use profile::LanguageProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pt")]
    Portuguese,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt",
        }
    }

    pub fn profile(&self) -> &'static LanguageProfile {
        LanguageProfile::for_language(*self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

const ENGLISH_KEYWORDS: &[&str] = &[
    "show", "get", "find", "what", "which", "how", "many", "where", "when", "list", "select",
    "the", "all", "with", "from", "table", "column", "delete", "update", "insert", "count",
    "me", "give", "and", "by", "of", "whose", "than", "greater", "less", "equal", "remove",
];

const PORTUGUESE_KEYWORDS: &[&str] = &[
    "mostrar", "mostre", "obter", "encontrar", "encontre", "qual", "quais", "como", "quantos",
    "quantas", "onde", "quando", "listar", "liste", "selecionar", "selecione", "tabela",
    "coluna", "colunas", "da", "do", "dos", "das", "com", "todos", "todas", "os", "é", "igual",
    "maior", "menor", "exclua", "excluir", "atualize", "atualizar", "por", "que", "para",
    "um", "uma", "cujo", "cuja", "registros", "exiba",
];

/// Picks the language with more keyword hits. Portuguese must win outright; ties go to English.
pub fn detect(prompt: &str) -> Language {
    let tokens = words(prompt);
    let count = |keywords: &[&str]| {
        tokens
            .iter()
            .filter(|token| keywords.contains(&token.as_str()))
            .count()
    };

    let english = count(ENGLISH_KEYWORDS);
    let portuguese = count(PORTUGUESE_KEYWORDS);

    if portuguese > english {
        Language::Portuguese
    } else {
        Language::English
    }
}
