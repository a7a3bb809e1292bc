//! # startval lib

use std::{collections::HashMap, path::PathBuf, sync::LazyLock};

use directories::ProjectDirs;
use log::warn;

pub mod api;
pub mod error;
pub mod utils;

/// Options that each item is String in <key>:<value> format
pub struct VecOptions<'a>(pub &'a [String]);

pub async fn init() {
    // Loaded before the logger so that LOG may come from .env as well
    let dotenv_result = dotenvy::dotenv();

    env_logger::Builder::new()
        .parse_filters(std::env::var("LOG").as_deref().unwrap_or("off"))
        .init();

    if let Err(err) = dotenv_result {
        if !is_env_file_missing(&err) {
            warn!("Could not load .env file: {err}");
        }
    }
}

fn is_env_file_missing(err: &dotenvy::Error) -> bool {
    matches!(err, dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
}

static APP_DATA_DIR: LazyLock<PathBuf> =
    LazyLock::new(|| match ProjectDirs::from("", "", env!("CARGO_PKG_NAME")) {
        Some(proj_dirs) => proj_dirs.data_dir().to_path_buf(),
        None => std::env::current_dir()
            .expect("Unable to get current directory!")
            .join("data"),
    });

static CHANNEL_BUFFER_DEFAULT: usize = 64;
static LLM_BASE_URL_DEFAULT: &str = "https://api.openai.com/v1";
static LLM_CHAT_TEMPERATURE_DEFAULT: f64 = 0.6;
static LLM_MODEL_DEFAULT: &str = "gpt-4";
static LLM_TIMEOUT_SECS_DEFAULT: u64 = 15;
static SEARCH_TIMEOUT_SECS_DEFAULT: u64 = 10;
static SEARCH_URL_DEFAULT: &str = "https://www.google.com/search";
static SEARCH_USER_AGENT: &str = "Mozilla/5.0";

mod category;
mod evaluator;
mod llm;
mod record;
mod report;
mod score;
mod search;

impl VecOptions<'_> {
    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(option_text) = self.0.iter().find(|s| {
            s.to_lowercase()
                .starts_with(&format!("{}:", name.to_lowercase()))
        }) {
            let parts: Vec<_> = option_text.splitn(2, ':').collect();
            parts.get(1).map(|s| s.trim().to_string())
        } else {
            None
        }
    }

    pub fn into_map(self) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = HashMap::new();

        for option_text in self.0 {
            let parts: Vec<_> = option_text.splitn(2, ':').collect();
            if parts.len() == 2 {
                map.insert(parts[0].trim().to_string(), parts[1].trim().to_string());
            }
        }

        map
    }
}
