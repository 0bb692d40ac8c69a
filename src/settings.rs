use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Settings {
    /// Defaults, then `trivia.toml` if present, then `TRIVIA__*` variables.
    /// `DB_PATH` wins over everything for the database file.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::builder(File::with_name("trivia").required(false), "TRIVIA")?
            .set_override_option("database.path", dotenv::var("DB_PATH").ok())?
            .build()?
            .try_deserialize()
    }

    fn builder(
        file: File<config::FileSourceFile, config::FileFormat>,
        env_prefix: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "trivia.db")?
            .set_default("database.max_connections", 5)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            ))
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn load_from(file: File<config::FileSourceFile, config::FileFormat>) -> Settings {
        Settings::builder(file, "TRIVIA_CONFIG_TEST")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply_without_file() {
        let settings = load_from(File::with_name("does-not-exist").required(false));
        assert_eq!(settings.server.address(), "0.0.0.0:8080");
        assert_eq!(settings.database.path, PathBuf::from("trivia.db"));
        assert_eq!(settings.database.max_connections, 5);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 5000\n\n[database]\npath = \"/tmp/quiz.db\"").unwrap();

        let settings = load_from(File::from(file.path()));
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database.path, PathBuf::from("/tmp/quiz.db"));
    }
}
