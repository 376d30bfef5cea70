pub mod duckdb;
pub mod json;
