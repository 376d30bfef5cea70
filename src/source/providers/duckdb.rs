use ::duckdb::Connection;
use async_trait::async_trait;
use r2d2::Pool;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::db::db_pool::{build_pool, DuckDBConnectionManager};
use crate::schema::{Column, ForeignKey, Schema, Table};
use crate::source::{LoadedSchema, SchemaSource, SourceError};

// DuckDB lists a foreign key on both sides; the text names the referencing column
static FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)FOREIGN KEY\s*\(\s*"?(\w+)"?[^)]*\)\s*REFERENCES\s+"?(\w+)"?\s*\(\s*"?(\w+)"?"#)
        .expect("foreign key pattern")
});

const TABLES_QUERY: &str = "SELECT table_name, estimated_size FROM duckdb_tables() \
     WHERE schema_name = 'main' AND NOT internal ORDER BY table_name";
const COLUMNS_QUERY: &str = "SELECT table_name, column_name, data_type, is_nullable, column_default \
     FROM information_schema.columns WHERE table_schema = 'main' \
     ORDER BY table_name, ordinal_position";
const CONSTRAINTS_QUERY: &str = "SELECT table_name, constraint_type, \
     array_to_string(constraint_column_names, ','), constraint_text \
     FROM duckdb_constraints() WHERE schema_name = 'main'";

/// Introspects a DuckDB database file.
pub struct DuckDbSource {
    pool: Pool<DuckDBConnectionManager>,
    path: String,
}

impl DuckDbSource {
    pub fn new(path: &str, pool_size: usize) -> Result<Self, SourceError> {
        if !Path::new(path).exists() {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("database file not found: {}", path),
            )));
        }
        let pool = build_pool(DuckDBConnectionManager::read_only(path), pool_size)?;
        Ok(Self {
            pool,
            path: path.to_string(),
        })
    }
}

struct ConstraintRow {
    table: String,
    kind: String,
    columns: String,
    text: String,
}

fn scan(conn: &Connection) -> Result<Schema, SourceError> {
    let mut tables: Vec<Table> = Vec::new();
    let mut stmt = conn.prepare(TABLES_QUERY)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
    })?;
    for row in rows {
        let (name, estimated) = row?;
        let mut table = Table::new(name, Vec::new());
        table.estimated_rows = estimated.and_then(|n| u64::try_from(n).ok());
        tables.push(table);
    }

    let mut stmt = conn.prepare(COLUMNS_QUERY)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;
    for row in rows {
        let (table_name, name, data_type, nullable, default) = row?;
        let Some(table) = tables.iter_mut().find(|t| t.name == table_name) else {
            continue;
        };
        let mut column = Column::new(name, data_type);
        column.nullable = nullable.eq_ignore_ascii_case("YES");
        if let Some(default) = default {
            if default.starts_with("nextval(") {
                column.extra = Some("auto_increment".to_string());
            }
            column.default = Some(serde_json::Value::String(default));
        }
        table.columns.push(column);
    }

    let mut stmt = conn.prepare(CONSTRAINTS_QUERY)?;
    let rows = stmt.query_map([], |row| {
        Ok(ConstraintRow {
            table: row.get(0)?,
            kind: row.get(1)?,
            columns: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    })?;
    let mut by_table: HashMap<String, Vec<ConstraintRow>> = HashMap::new();
    for row in rows {
        let row = row?;
        by_table.entry(row.table.clone()).or_default().push(row);
    }

    for table in &mut tables {
        for constraint in by_table.remove(&table.name).unwrap_or_default() {
            apply_constraint(table, &constraint);
        }
    }

    Ok(Schema {
        tables,
        db_type: Some("duckdb".to_string()),
    })
}

fn apply_constraint(table: &mut Table, constraint: &ConstraintRow) {
    let columns: Vec<&str> = constraint
        .columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    match constraint.kind.as_str() {
        "PRIMARY KEY" => {
            for name in &columns {
                if let Some(column) = table.columns.iter_mut().find(|c| c.name == *name) {
                    column.is_primary = true;
                    column.key = Some("PRI".to_string());
                }
            }
        }
        "UNIQUE" => {
            if let [name] = columns.as_slice() {
                if let Some(column) = table.columns.iter_mut().find(|c| c.name == *name) {
                    column.is_unique = true;
                }
            }
        }
        "FOREIGN KEY" => {
            let Some(caps) = FOREIGN_KEY.captures(&constraint.text) else {
                warn!("Unreadable foreign key on {}: {}", table.name, constraint.text);
                return;
            };
            let Some(column) = table.column(&caps[1]).map(|c| c.name.clone()) else {
                return;
            };
            if table.foreign_keys.iter().any(|fk| fk.column_name == column) {
                return;
            }
            table.foreign_keys.push(ForeignKey {
                column_name: column,
                referenced_table: caps[2].to_string(),
                referenced_column: caps[3].to_string(),
                constraint_name: None,
            });
        }
        _ => {}
    }
}

#[async_trait]
impl SchemaSource for DuckDbSource {
    async fn load(&self) -> Result<LoadedSchema, SourceError> {
        let pool = self.pool.clone();
        let schema = tokio::task::spawn_blocking(move || -> Result<Schema, SourceError> {
            let conn = pool.get()?;
            scan(&conn)
        })
        .await??;

        debug!("Scanned {} tables from {}", schema.tables.len(), self.path);
        Ok(LoadedSchema {
            db_type: schema.db_type.clone(),
            schema,
            origin: self.path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("shop.duckdb")).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR UNIQUE, name VARCHAR NOT NULL);
             CREATE TABLE orders (
                 id INTEGER PRIMARY KEY,
                 user_id INTEGER REFERENCES users(id),
                 total DECIMAL(10, 2)
             );
             INSERT INTO users VALUES (1, 'a@b.com', 'Ann');",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn introspects_tables_columns_and_keys() {
        let dir = database();
        let path = dir.path().join("shop.duckdb");
        let source = DuckDbSource::new(path.to_str().unwrap(), 1).unwrap();
        let loaded = source.load().await.unwrap();

        assert_eq!(loaded.db_type.as_deref(), Some("duckdb"));
        let names: Vec<&str> = loaded.schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "users"]);

        let users = loaded.schema.table("users").unwrap();
        assert!(users.column("id").unwrap().is_primary_key());
        assert!(users.column("email").unwrap().is_unique);
        assert!(!users.column("name").unwrap().nullable);

        let orders = loaded.schema.table("orders").unwrap();
        let fk = orders.foreign_key_to("users").unwrap();
        assert_eq!(fk.column_name, "user_id");
        assert_eq!(fk.referenced_column, "id");
        assert!(orders.column("total").unwrap().kind().is_numeric());
    }

    #[test]
    fn missing_database_files_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.duckdb");
        assert!(matches!(
            DuckDbSource::new(path.to_str().unwrap(), 1),
            Err(SourceError::Io(_))
        ));
    }
}
