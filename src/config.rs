use dotenvy::dotenv;
use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TARGET_URL: &str = "https://www.bizevdeyokuz.com/roma-ne-nerede-yenir";
pub const DEFAULT_ENDPOINT_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "tr,en-US;q=0.7,en;q=0.3";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-16k";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 15_000;
pub const DEFAULT_MAX_TOKENS: u32 = 4_000;
pub const DEFAULT_CITY: &str = "Rome";
pub const DEFAULT_OUTPUT_PATH: &str = "food_guide.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Everything one pipeline run needs. Built by the caller; the library never
/// reads the environment on its own.
#[derive(Debug, Clone)]
pub struct Config {
    pub target_url: String,
    pub endpoint_url: String,
    pub credential: String,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
    pub accept_language: String,
    /// Page fetch timeout.
    pub timeout: Duration,
    pub completion_timeout: Duration,
    pub max_input_chars: usize,
    pub model: String,
    pub max_tokens: u32,
    pub city: String,
    /// Overrides the page `<title>` in the result record.
    pub title: Option<String>,
    pub output_path: PathBuf,
}

impl Config {
    pub fn new(target_url: impl Into<String>, credential: impl Into<String>) -> Config {
        Config {
            target_url: target_url.into(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            credential: credential.into(),
            proxy: None,
            user_agent: None,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            completion_timeout: Duration::from_secs(DEFAULT_COMPLETION_TIMEOUT_SECS),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            city: DEFAULT_CITY.to_string(),
            title: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }

    /// Loads `.env` if present, then reads `FORAGE_*` variables.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source. Only `FORAGE_API_KEY` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let credential = get("FORAGE_API_KEY").ok_or(ConfigError::Missing("FORAGE_API_KEY"))?;
        let target_url = get("FORAGE_TARGET_URL").unwrap_or_else(|| DEFAULT_TARGET_URL.to_string());

        let mut config = Config::new(target_url, credential);
        if let Some(endpoint) = get("FORAGE_ENDPOINT_URL") {
            config.endpoint_url = endpoint;
        }
        config.proxy = get("FORAGE_PROXY");
        config.user_agent = get("FORAGE_USER_AGENT");
        if let Some(lang) = get("FORAGE_ACCEPT_LANGUAGE") {
            config.accept_language = lang;
        }
        if let Some(secs) = get("FORAGE_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number("FORAGE_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = get("FORAGE_COMPLETION_TIMEOUT_SECS") {
            config.completion_timeout =
                Duration::from_secs(parse_number("FORAGE_COMPLETION_TIMEOUT_SECS", &secs)?);
        }
        if let Some(chars) = get("FORAGE_MAX_INPUT_CHARS") {
            config.max_input_chars = parse_number("FORAGE_MAX_INPUT_CHARS", &chars)?;
        }
        if let Some(model) = get("FORAGE_MODEL") {
            config.model = model;
        }
        if let Some(tokens) = get("FORAGE_MAX_TOKENS") {
            config.max_tokens = parse_number("FORAGE_MAX_TOKENS", &tokens)?;
        }
        if let Some(city) = get("FORAGE_CITY") {
            config.city = city;
        }
        config.title = get("FORAGE_TITLE");
        if let Some(path) = get("FORAGE_OUTPUT_PATH") {
            config.output_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url("target_url", &self.target_url)?;
        check_http_url("endpoint_url", &self.endpoint_url)?;
        if let Some(proxy) = &self.proxy {
            Url::parse(proxy).map_err(|e| ConfigError::Invalid {
                key: "proxy",
                reason: e.to_string(),
            })?;
        }
        if self.credential.trim().is_empty() {
            return Err(ConfigError::Missing("credential"));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.completion_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "completion_timeout",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_input_chars == 0 {
            return Err(ConfigError::Invalid {
                key: "max_input_chars",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                key: "max_tokens",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

fn check_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        reason: format!("{raw:?} is not a number"),
    })
}
