use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Elasticsearch connection settings, environment-supplied.
#[derive(Debug, Clone)]
pub struct ElasticSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub index: String,
    /// Certificate verification is off by default, matching the development
    /// clusters this assistant is pointed at. Set `ELASTIC_VERIFY_CERTS=true`
    /// for anything real.
    pub verify_certs: bool,
}

impl ElasticSettings {
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub elastic: ElasticSettings,
    pub llm: LlmSettings,
    pub port: u16,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Loads settings from the process environment. `.env` files are read by
    /// the binaries before this is called.
    pub fn from_env() -> Result<Self, ConfigError> {
        let elastic = ElasticSettings {
            host: require("ELASTIC_HOST")?,
            port: parse_var("ELASTIC_PORT", require("ELASTIC_PORT")?)?,
            username: require("ELASTIC_USERNAME")?,
            password: require("ELASTIC_PASSWORD")?,
            index: require("ELASTIC_INDEX")?,
            verify_certs: flag("ELASTIC_VERIFY_CERTS"),
        };

        let llm = LlmSettings {
            api_key: require("OPENAI_API_KEY")?,
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(8000);

        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        Ok(Settings {
            elastic,
            llm,
            port,
            log_dir,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|val| matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
