//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory,
//! overridden by `APP_` prefixed environment variables
//! (`APP_SERVER__PORT=8080`). See `settings.toml` for an example.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the SQLite file, created if missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u64,
    #[serde(default = "max_page_limit")]
    pub max_page_limit: u64,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_page_limit() -> u64 {
    50
}

fn max_page_limit() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    5
}

fn idle_timeout_secs() -> u64 {
    300
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn server_section_is_optional() {
        let settings = parse("[app]\nlevel = \"debug\"\n");
        assert_eq!(settings.app.level, "debug");
        assert!(settings.server.is_none());
    }

    #[test]
    fn server_defaults_are_filled_in() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = { sqlite = "freightbook.db" }
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(server.port, 3000);
        assert_eq!(server.database, Database::Sqlite("freightbook.db".to_string()));
        assert_eq!(server.default_page_limit, 50);
        assert_eq!(server.max_page_limit, 500);
        assert_eq!(server.connect_timeout_secs, 5);
    }

    #[test]
    fn memory_database_is_a_plain_string() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            max_page_limit = 100
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.database, Database::Memory);
        assert_eq!(server.max_page_limit, 100);
    }
}
