use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

const DEFAULT_CONFIG_FILE: &str = "configuration.toml";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub questions: QuestionSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Built frontend to serve under `/static`.
    pub static_dir: Option<PathBuf>,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: String,
    pub create_if_missing: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct QuestionSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub per_page: usize,
}

/// Defaults, then `configuration.toml` (or `$TRIVIA_CONFIG`), then `TRIVIA__*` variables.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    let file = std::env::var("TRIVIA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());
    load(&file)
}

fn load(file: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 8080)?
        .set_default("database.path", "trivia.db")?
        .set_default("database.create_if_missing", true)?
        .set_default("questions.per_page", 10)?
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    if settings.questions.per_page == 0 {
        return Err(ConfigError::Message(
            "questions.per_page must be greater than zero".to_owned(),
        ));
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_file() {
        std::env::set_var("TRIVIA_CONFIG", "does-not-exist.toml");
        let settings = get_configuration().unwrap();
        assert!(settings.questions.per_page > 0);
        assert!(!settings.database.path.is_empty());
        assert!(settings.application.address().contains(':'));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("configuration.toml");
        std::fs::write(&file, "[questions]\nper_page = 0\n").unwrap();

        let err = load(file.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("per_page"), "{err}");

        std::fs::write(&file, "[questions]\nper_page = 25\n").unwrap();
        assert_eq!(load(file.to_str().unwrap()).unwrap().questions.per_page, 25);
    }
}
