pub mod dialect;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::util::text::make_plural;

pub use dialect::{Dialect, LimitSyntax};

/// Coarse classification of a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Decimal,
    Text,
    Boolean,
    Date,
    Timestamp,
    Other,
}

impl ColumnKind {
    pub fn from_type(data_type: &str) -> Self {
        let t = data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or("").trim();
        match base {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" | "mediumint" | "serial"
            | "bigserial" | "smallserial" | "int2" | "int4" | "int8" | "hugeint" | "ubigint"
            | "uinteger" => ColumnKind::Integer,
            "decimal" | "numeric" | "float" | "double" | "real" | "double precision" | "money"
            | "float4" | "float8" => ColumnKind::Decimal,
            "char" | "varchar" | "text" | "string" | "nvarchar" | "nchar" | "ntext"
            | "character varying" | "character" | "tinytext" | "mediumtext" | "longtext"
            | "clob" | "uuid" | "enum" => ColumnKind::Text,
            "bool" | "boolean" | "bit" => ColumnKind::Boolean,
            "date" => ColumnKind::Date,
            "datetime" | "timestamp" | "timestamptz" | "datetime2" | "smalldatetime"
            | "timestamp with time zone" | "timestamp without time zone" | "time" => {
                ColumnKind::Timestamp
            }
            _ => ColumnKind::Other,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Decimal)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnKind::Date | ColumnKind::Timestamp)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnKind::Text)
    }
}

// `nullable` arrives either as a JSON bool or as the information_schema strings "YES"/"NO"
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Text(text)) => matches!(text.to_uppercase().as_str(), "YES" | "Y" | "TRUE" | "1"),
        None => true,
    })
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub nullable: bool,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub extra: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sample_values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            key: None,
            default: None,
            extra: None,
            is_primary: false,
            is_unique: false,
            description: None,
            sample_values: Vec::new(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.nullable = false;
        self
    }

    pub fn kind(&self) -> ColumnKind {
        ColumnKind::from_type(&self.data_type)
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary || self.key.as_deref().is_some_and(|k| k.eq_ignore_ascii_case("PRI"))
    }

    pub fn is_auto_increment(&self) -> bool {
        let extra = self.extra.as_deref().unwrap_or("").to_lowercase();
        let data_type = self.data_type.to_lowercase();
        extra.contains("auto_increment")
            || extra.contains("identity")
            || data_type == "serial"
            || data_type == "bigserial"
            || self
                .default
                .as_ref()
                .and_then(|d| d.as_str())
                .is_some_and(|d| d.starts_with("nextval("))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
    #[serde(default)]
    pub constraint_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_rows: Option<u64>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            foreign_keys: Vec::new(),
            description: None,
            estimated_rows: None,
        }
    }

    pub fn with_foreign_key(mut self, column: &str, table: &str, referenced: &str) -> Self {
        self.foreign_keys.push(ForeignKey {
            column_name: column.to_string(),
            referenced_table: table.to_string(),
            referenced_column: referenced.to_string(),
            constraint_name: None,
        });
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The declared primary key, else a column literally named `id`.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.is_primary_key())
            .or_else(|| self.column("id"))
    }

    pub fn foreign_key_to(&self, table: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.referenced_table.eq_ignore_ascii_case(table))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub db_type: Option<String>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            tables,
            db_type: None,
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// Adds foreign keys implied by `<table>_id` column naming where none is declared.
    /// Returns the number of keys added.
    pub fn infer_foreign_keys(&mut self) -> usize {
        let mut inferred = Vec::new();

        for (index, table) in self.tables.iter().enumerate() {
            for column in &table.columns {
                let Some(stem) = column.name.to_lowercase().strip_suffix("_id").map(str::to_string)
                else {
                    continue;
                };
                if stem.is_empty()
                    || table
                        .foreign_keys
                        .iter()
                        .any(|fk| fk.column_name.eq_ignore_ascii_case(&column.name))
                {
                    continue;
                }

                let target = self.tables.iter().find(|other| {
                    let name = other.name.to_lowercase();
                    (name == stem || name == make_plural(&stem)) && other.has_column("id")
                });

                if let Some(target) = target {
                    if target.name.eq_ignore_ascii_case(&table.name) {
                        continue;
                    }
                    inferred.push((
                        index,
                        ForeignKey {
                            column_name: column.name.clone(),
                            referenced_table: target.name.clone(),
                            referenced_column: "id".to_string(),
                            constraint_name: Some(format!(
                                "fk_{}_{}_{}",
                                table.name, column.name, target.name
                            )),
                        },
                    ));
                }
            }
        }

        let count = inferred.len();
        for (index, fk) in inferred {
            debug!(
                "Inferred foreign key {}.{} -> {}.{}",
                self.tables[index].name, fk.column_name, fk.referenced_table, fk.referenced_column
            );
            self.tables[index].foreign_keys.push(fk);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ingestion_payload() {
        let schema = Schema::from_json(
            r#"{
                "tables": [{
                    "name": "users",
                    "columns": [
                        {"name": "id", "type": "int", "nullable": "NO", "key": "PRI", "extra": "auto_increment"},
                        {"name": "email", "type": "varchar(255)", "nullable": true}
                    ],
                    "foreignKeys": []
                }],
                "dbType": "mysql"
            }"#,
        )
        .unwrap();

        let users = schema.table("USERS").unwrap();
        let id = users.column("id").unwrap();
        assert!(id.is_primary_key());
        assert!(id.is_auto_increment());
        assert!(!id.nullable);
        assert_eq!(users.column("email").unwrap().kind(), ColumnKind::Text);
        assert_eq!(schema.db_type.as_deref(), Some("mysql"));
    }

    #[test]
    fn classifies_column_types() {
        assert_eq!(ColumnKind::from_type("DECIMAL(10,2)"), ColumnKind::Decimal);
        assert_eq!(ColumnKind::from_type("TIMESTAMP WITH TIME ZONE"), ColumnKind::Timestamp);
        assert_eq!(ColumnKind::from_type("date"), ColumnKind::Date);
        assert_eq!(ColumnKind::from_type("BIGINT"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_type("blob"), ColumnKind::Other);
    }

    #[test]
    fn primary_key_falls_back_to_id_column() {
        let table = Table::new("t", vec![Column::new("id", "int"), Column::new("x", "int")]);
        assert_eq!(table.primary_key().map(|c| c.name.as_str()), Some("id"));
    }

    #[test]
    fn infers_foreign_keys_from_naming() {
        let mut schema = Schema::new(vec![
            Table::new("users", vec![Column::new("id", "int").primary()]),
            Table::new(
                "orders",
                vec![Column::new("id", "int").primary(), Column::new("user_id", "int")],
            ),
        ]);

        assert_eq!(schema.infer_foreign_keys(), 1);
        let fk = schema.table("orders").unwrap().foreign_key_to("users").unwrap();
        assert_eq!(fk.column_name, "user_id");
        assert_eq!(fk.referenced_column, "id");

        // declared keys are not duplicated
        assert_eq!(schema.infer_foreign_keys(), 0);
    }
}
