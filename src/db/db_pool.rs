use duckdb::{AccessMode, Config, Connection};
use r2d2::{ManageConnection, Pool};

/// r2d2 manager for DuckDB database files that are only ever introspected.
/// Connections are read-only; opening fails if the file does not exist.
pub struct DuckDBConnectionManager {
    path: String,
}

impl DuckDBConnectionManager {
    pub fn read_only(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl ManageConnection for DuckDBConnectionManager {
    type Connection = Connection;
    type Error = duckdb::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        Connection::open_with_flags(&self.path, config)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.execute("SELECT 1", [])?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

pub fn build_pool(
    manager: DuckDBConnectionManager,
    size: usize,
) -> Result<Pool<DuckDBConnectionManager>, r2d2::Error> {
    Pool::builder().max_size(size.max(1) as u32).build(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_connections_are_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.duckdb");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE users (id INTEGER)")
            .unwrap();

        let pool = build_pool(DuckDBConnectionManager::read_only(path.to_str().unwrap()), 1).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert!(conn.execute("INSERT INTO users VALUES (1)", []).is_err());
    }
}
