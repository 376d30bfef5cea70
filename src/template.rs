use minijinja::{Environment, UndefinedBehavior, Value};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern"));

#[derive(Debug)]
pub enum TemplateError {
    MissingVariable(String),
    Render(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::MissingVariable(name) => {
                write!(f, "No value bound for placeholder '{}'", name)
            }
            TemplateError::Render(msg) => write!(f, "Template render error: {}", msg),
        }
    }
}

impl Error for TemplateError {}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        TemplateError::Render(err.to_string())
    }
}

/// Binds the placeholder `{{ name }}` to the row field `field`.
#[derive(Debug, Clone, Deserialize)]
pub struct Variable {
    pub field: String,
    pub name: String,
}

pub type Row = serde_json::Map<String, serde_json::Value>;

/// Renders `query` once per row and joins the results with newlines.
/// With `minify` every newline, including those inside the query, becomes a space.
pub fn bind_rows(
    query: &str,
    rows: &[Row],
    variables: &[Variable],
    minify: bool,
) -> Result<String, TemplateError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    let template = env.template_from_str(query)?;

    let placeholders: Vec<&str> = PLACEHOLDER
        .captures_iter(query)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    let mut rendered = Vec::with_capacity(rows.len());
    for row in rows {
        let mut context: BTreeMap<&str, Value> = BTreeMap::new();
        for variable in variables {
            if let Some(value) = row.get(&variable.field) {
                context.insert(variable.name.as_str(), Value::from_serialize(value));
            }
        }

        if let Some(missing) = placeholders.iter().find(|name| !context.contains_key(*name)) {
            return Err(TemplateError::MissingVariable(missing.to_string()));
        }
        rendered.push(template.render(&context)?);
    }

    let output = rendered.join("\n");
    Ok(if minify { output.replace('\n', " ") } else { output })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        let data = json!([
            {"id": 1, "name": "Ann"},
            {"id": 2, "name": "Bob"}
        ]);
        serde_json::from_value(data).unwrap()
    }

    fn variables() -> Vec<Variable> {
        vec![
            Variable {
                field: "id".into(),
                name: "user_id".into(),
            },
            Variable {
                field: "name".into(),
                name: "user_name".into(),
            },
        ]
    }

    #[test]
    fn renders_one_statement_per_row() {
        let sql = bind_rows(
            "UPDATE users SET name = '{{ user_name }}' WHERE id = {{ user_id }};",
            &rows(),
            &variables(),
            false,
        )
        .unwrap();
        assert_eq!(
            sql,
            "UPDATE users SET name = 'Ann' WHERE id = 1;\nUPDATE users SET name = 'Bob' WHERE id = 2;"
        );
    }

    #[test]
    fn minify_joins_on_one_line() {
        let sql = bind_rows(
            "DELETE FROM users\nWHERE id = {{ user_id }};",
            &rows(),
            &variables(),
            true,
        )
        .unwrap();
        assert_eq!(sql, "DELETE FROM users WHERE id = 1; DELETE FROM users WHERE id = 2;");
    }

    #[test]
    fn unbound_placeholders_are_errors() {
        let result = bind_rows("SELECT {{ missing }}", &rows(), &variables(), false);
        match result {
            Err(TemplateError::MissingVariable(name)) => assert_eq!(name, "missing"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn no_rows_render_nothing() {
        assert_eq!(bind_rows("SELECT 1", &[], &variables(), false).unwrap(), "");
    }
}
