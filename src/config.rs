use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Which history entries a piece of execution feedback is applied to.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCorrelation {
    #[default]
    MostRecent,
    FirstMatch,
    AllMatches,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum confidence for a table or column candidate to be kept.
    pub confidence_threshold: f64,
    /// Minimum normalized similarity for a fuzzy name match.
    pub fuzzy_threshold: f64,
    pub feedback_correlation: FeedbackCorrelation,
    pub max_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            fuzzy_threshold: 0.8,
            feedback_correlation: FeedbackCorrelation::MostRecent,
            max_history: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchemaConfig {
    pub backend: String, // "none", "json" or "duckdb"
    pub path: Option<String>,
    pub db_type: Option<String>,
    pub pool_size: usize,
    pub infer_foreign_keys: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            backend: "none".to_string(),
            path: None,
            db_type: None,
            pool_size: 4,
            infer_foreign_keys: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub web: WebConfig,
    pub engine: EngineConfig,
    pub schema: SchemaConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Schema JSON file to load at startup
    #[arg(long, value_name = "FILE", conflicts_with = "duckdb")]
    pub schema: Option<PathBuf>,

    /// DuckDB database file to introspect at startup
    #[arg(long, value_name = "FILE")]
    pub duckdb: Option<PathBuf>,

    /// Database type used to pick the SQL dialect (mysql, postgres, sqlserver, ...)
    #[arg(long)]
    pub db_type: Option<String>,

    /// Translate a single prompt, print the result and exit
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder();

        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            let default_locations = [
                "config.toml",
                "config/config.toml",
                "/etc/nl-sql/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // NLSQL__ENGINE__FUZZY_THRESHOLD=0.9 and friends
        config_builder = config_builder.add_source(
            Environment::with_prefix("NLSQL")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(path) = &args.schema {
            config.schema.backend = "json".to_string();
            config.schema.path = Some(path.display().to_string());
        }
        if let Some(path) = &args.duckdb {
            config.schema.backend = "duckdb".to_string();
            config.schema.path = Some(path.display().to_string());
        }
        if let Some(db_type) = &args.db_type {
            config.schema.db_type = Some(db_type.clone());
        }

        Ok(config)
    }
}
