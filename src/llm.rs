use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::Receiver;

use crate::{
    APP_DATA_DIR, LLM_BASE_URL_DEFAULT, LLM_CHAT_TEMPERATURE_DEFAULT, LLM_MODEL_DEFAULT,
    error::{StartvalError, StartvalResult},
    llm::provider::{ChatProvider, open_ai::OpenAiProvider},
};

pub mod provider;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "OPENAI_MODEL";

/// Keys accepted by `llm config -O <key>:<value>`.
pub const CONFIG_OPTION_KEYS: &[&str] = &["base_url", "api_key", "model"];

#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Protocol {
    #[default]
    OpenAI,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub protocol: Protocol,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug)]
pub enum ChatCompletionEvent {
    Content(String),
    ReasoningContent(String),
    Error(StartvalError),
}

pub struct ChatCompletionOptions {
    pub temperature: f64,
}

pub struct ChatCompletionStream {
    receiver: Receiver<ChatCompletionEvent>,
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub reasoning: Option<String>,
}

#[allow(dead_code)]
#[derive(strum::Display, strum::EnumString, Copy, Clone, Debug, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    Bot,
    User,
    System,
}

pub async fn chat_completion_stream(
    config: &Config,
    messages: &[ChatMessage],
    options: &ChatCompletionOptions,
) -> StartvalResult<ChatCompletionStream> {
    match config.protocol {
        Protocol::OpenAI => {
            config
                .open_ai_provider()
                .chat_completion_stream(messages, options)
                .await
        }
    }
}

/// Result of `config_chat`: what was stored and what the environment will
/// still override at load time.
#[derive(Debug)]
pub struct ConfigOutcome {
    pub path: PathBuf,
    pub stored: Config,
    pub env_overrides: Vec<&'static str>,
}

pub async fn config_chat(
    protocol: &str,
    options: &HashMap<String, String>,
) -> StartvalResult<ConfigOutcome> {
    let mut cfg: Config = if CHAT_CONFIG_PATH.exists() {
        confy::load_path(&*CHAT_CONFIG_PATH).unwrap_or_else(|err| {
            warn!("Replacing unreadable LLM config: {err}");
            Config::default()
        })
    } else {
        Config::default()
    };

    cfg.apply_options(protocol, options)?;

    let lookup = |name: &str| std::env::var(name).ok();
    let mut effective = cfg.clone();
    effective.apply_env(lookup);
    effective.validate()?;

    confy::store_path(&*CHAT_CONFIG_PATH, &cfg)?;

    Ok(ConfigOutcome {
        path: CHAT_CONFIG_PATH.clone(),
        stored: cfg,
        env_overrides: env_overrides(lookup),
    })
}

/// Environment variables that take precedence over the stored configuration.
fn env_overrides(lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    [ENV_API_KEY, ENV_BASE_URL, ENV_MODEL]
        .into_iter()
        .filter(|name| lookup(name).is_some_and(|v| !v.trim().is_empty()))
        .collect()
}

static CHAT_CONFIG_PATH: LazyLock<PathBuf> = LazyLock::new(|| APP_DATA_DIR.join("llm-chat.toml"));

impl Config {
    /// Stored configuration overlaid with `OPENAI_*` environment variables.
    ///
    /// Fails when no API key is available from either source.
    pub fn load() -> StartvalResult<Self> {
        Self::load_from(&CHAT_CONFIG_PATH, |name| std::env::var(name).ok())
    }

    fn load_from(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> StartvalResult<Self> {
        let mut cfg: Config = if path.exists() {
            confy::load_path(path)?
        } else {
            Config::default()
        };

        cfg.apply_env(lookup);
        cfg.fill_defaults();
        cfg.validate()?;
        debug!(
            "[LLM Config] protocol={} base_url={} model={}",
            cfg.protocol, cfg.base_url, cfg.model
        );

        Ok(cfg)
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }

        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{visible}", "*".repeat(chars.len() - 4))
    }

    pub fn open_ai_provider(&self) -> OpenAiProvider {
        OpenAiProvider::new(&self.base_url, &self.api_key, &self.model)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.api_key = api_key.trim().to_string();
        }

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url.trim().to_string();
        }

        if let Some(model) = lookup(ENV_MODEL) {
            self.model = model.trim().to_string();
        }
    }

    fn apply_options(
        &mut self,
        protocol: &str,
        options: &HashMap<String, String>,
    ) -> StartvalResult<()> {
        if let Some(key) = options
            .keys()
            .find(|key| !CONFIG_OPTION_KEYS.contains(&key.as_str()))
        {
            return Err(StartvalError::Invalid(
                "UNKNOWN_OPTION",
                format!(
                    "Unknown option '{key}', available options: {}",
                    CONFIG_OPTION_KEYS.join("/")
                ),
            ));
        }

        self.protocol = Protocol::from_str(protocol).map_err(|_| {
            StartvalError::Invalid(
                "INVALID_PROTOCOL",
                format!(
                    "Invalid protocol '{protocol}', available values: {}",
                    Protocol::iter()
                        .map(|p| p.to_string().to_lowercase())
                        .collect::<Vec<_>>()
                        .join("/")
                ),
            )
        })?;

        if let Some(base_url) = options.get("base_url") {
            self.base_url = base_url.trim().to_string();
        }

        if let Some(api_key) = options.get("api_key") {
            self.api_key = api_key.trim().to_string();
        }

        if let Some(model) = options.get("model") {
            self.model = model.trim().to_string();
        }

        self.fill_defaults();
        url::Url::parse(&self.base_url)?;

        Ok(())
    }

    fn fill_defaults(&mut self) {
        if self.base_url.is_empty() {
            self.base_url = LLM_BASE_URL_DEFAULT.to_string();
        }

        if self.model.is_empty() {
            self.model = LLM_MODEL_DEFAULT.to_string();
        }
    }

    fn validate(&self) -> StartvalResult<()> {
        if self.api_key.is_empty() {
            return Err(StartvalError::Required(
                "API_KEY_REQUIRED",
                format!(
                    "OpenAI API key not found, set {ENV_API_KEY} in the environment or the .env file"
                ),
            ));
        }

        Ok(())
    }
}

impl Default for ChatCompletionOptions {
    fn default() -> Self {
        Self {
            temperature: LLM_CHAT_TEMPERATURE_DEFAULT,
        }
    }
}

impl ChatCompletionOptions {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

impl ChatCompletionStream {
    pub fn new(receiver: Receiver<ChatCompletionEvent>) -> Self {
        Self { receiver }
    }

    pub async fn next(&mut self) -> Option<ChatCompletionEvent> {
        self.receiver.recv().await
    }
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            reasoning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_env_overrides_file() {
        let mut cfg = Config {
            api_key: "sk-file".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            ..Default::default()
        };

        cfg.apply_env(env(&[(ENV_API_KEY, " sk-env "), (ENV_MODEL, "")]));
        cfg.fill_defaults();

        assert_eq!(cfg.api_key, "sk-env");
        assert_eq!(cfg.model, "gpt-3.5-turbo");
        assert_eq!(cfg.base_url, LLM_BASE_URL_DEFAULT);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_apply_options() {
        let mut cfg = Config {
            api_key: "sk-stored".to_string(),
            ..Default::default()
        };
        let options = HashMap::from([
            ("model".to_string(), " gpt-4o ".to_string()),
            ("base_url".to_string(), "http://localhost:8080/v1".to_string()),
        ]);

        cfg.apply_options("openai", &options).unwrap();

        assert_eq!(cfg.protocol, Protocol::OpenAI);
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.api_key, "sk-stored");
    }

    #[test]
    fn test_config_apply_options_rejects_invalid_input() {
        let mut cfg = Config::default();

        let options = HashMap::from([("modle".to_string(), "gpt-4".to_string())]);
        match cfg.apply_options("openai", &options) {
            Err(StartvalError::Invalid(code, msg)) => {
                assert_eq!(code, "UNKNOWN_OPTION");
                assert!(msg.contains("modle"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        match cfg.apply_options("anthropic", &HashMap::new()) {
            Err(StartvalError::Invalid(code, msg)) => {
                assert_eq!(code, "INVALID_PROTOCOL");
                assert!(msg.contains("openai"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let options = HashMap::from([("base_url".to_string(), "localhost".to_string())]);
        assert!(matches!(
            cfg.apply_options("openai", &options),
            Err(StartvalError::UrlError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let overrides = env_overrides(env(&[
            (ENV_MODEL, "gpt-4o"),
            (ENV_BASE_URL, "  "),
            ("OTHER", "x"),
        ]));
        assert_eq!(overrides, vec![ENV_MODEL]);
        assert!(env_overrides(env(&[])).is_empty());
    }

    #[test]
    fn test_masked_api_key() {
        let mut cfg = Config {
            api_key: "sk-abcdef1234".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.masked_api_key(), "*********1234");

        cfg.api_key = "abc".to_string();
        assert_eq!(cfg.masked_api_key(), "***");
    }

    #[test]
    fn test_config_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-chat.toml");
        std::fs::write(&path, "base_url = [unterminated").unwrap();

        let result = Config::load_from(&path, env(&[(ENV_API_KEY, "sk-env")]));

        assert!(matches!(result, Err(StartvalError::ConfigError(_))));
    }

    #[test]
    fn test_config_missing_api_key() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[]));
        cfg.fill_defaults();

        assert_eq!(cfg.model, LLM_MODEL_DEFAULT);
        match cfg.validate() {
            Err(StartvalError::Required(code, _)) => assert_eq!(code, "API_KEY_REQUIRED"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
