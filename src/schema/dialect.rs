use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LimitSyntax {
    /// `LIMIT n OFFSET m`
    LimitOffset,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`, which needs an ORDER BY
    OffsetFetch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialect {
    pub name: &'static str,
    pub limit_syntax: LimitSyntax,
    pub supports_cte: bool,
    pub supports_window_functions: bool,
}

impl Dialect {
    pub fn for_db_type(db_type: Option<&str>) -> Self {
        let db_type = db_type.unwrap_or("").trim().to_lowercase();
        let (name, limit_syntax, modern) = match db_type.as_str() {
            "mysql" => ("MySQL", LimitSyntax::LimitOffset, true),
            "postgres" | "postgresql" => ("PostgreSQL", LimitSyntax::LimitOffset, true),
            "sqlite" => ("SQLite", LimitSyntax::LimitOffset, true),
            "duckdb" => ("DuckDB", LimitSyntax::LimitOffset, true),
            "mssql" | "sqlserver" => ("SQL Server", LimitSyntax::OffsetFetch, true),
            "oracle" => ("Oracle", LimitSyntax::OffsetFetch, true),
            _ => ("Generic SQL", LimitSyntax::LimitOffset, false),
        };

        Self {
            name,
            limit_syntax,
            supports_cte: modern,
            supports_window_functions: modern,
        }
    }

    pub fn requires_order_for_pagination(&self) -> bool {
        self.limit_syntax == LimitSyntax::OffsetFetch
    }

    /// Pagination clause with its leading space.
    pub fn pagination(&self, limit: u32, offset: Option<u32>) -> String {
        match self.limit_syntax {
            LimitSyntax::LimitOffset => match offset {
                Some(offset) if offset > 0 => format!(" LIMIT {} OFFSET {}", limit, offset),
                _ => format!(" LIMIT {}", limit),
            },
            LimitSyntax::OffsetFetch => format!(
                " OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                offset.unwrap_or(0),
                limit
            ),
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::for_db_type(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_dialect_from_db_type() {
        assert_eq!(Dialect::for_db_type(Some("PostgreSQL")).name, "PostgreSQL");
        assert_eq!(
            Dialect::for_db_type(Some("sqlserver")).limit_syntax,
            LimitSyntax::OffsetFetch
        );
        let generic = Dialect::for_db_type(Some("informix"));
        assert_eq!(generic.name, "Generic SQL");
        assert!(!generic.supports_cte);
        assert!(!Dialect::default().supports_window_functions);
    }

    #[test]
    fn renders_pagination() {
        let mysql = Dialect::for_db_type(Some("mysql"));
        assert_eq!(mysql.pagination(10, None), " LIMIT 10");
        assert_eq!(mysql.pagination(10, Some(20)), " LIMIT 10 OFFSET 20");

        let mssql = Dialect::for_db_type(Some("mssql"));
        assert!(mssql.requires_order_for_pagination());
        assert_eq!(mssql.pagination(10, None), " OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY");
    }
}
