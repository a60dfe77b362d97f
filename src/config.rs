use std::path::PathBuf;
use std::time::Duration;

use crate::services::progress::{DEFAULT_DAILY_GOAL, MAX_DAILY_GOAL};

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_USER_ID: &str = "1";
const APP_DIR_NAME: &str = "lingua-progress";
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub storage_dir: PathBuf,
    pub user_id: String,
    pub daily_goal: u32,
    pub speech_language: String,
    pub log_level: String,
    /// Directory for the daily rolling log file. `None` keeps logging on stdout only.
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            storage_dir: default_storage_dir(),
            user_id: DEFAULT_USER_ID.to_string(),
            daily_goal: DEFAULT_DAILY_GOAL,
            speech_language: "en-US".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Reads `.env` if present, then the process environment. Bad values fall back to defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_base_url = get("LEARNING_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let api_timeout = get("LEARNING_API_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.api_timeout);

        let storage_dir = get("LEARNING_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);

        let daily_goal = get("LEARNING_DAILY_GOAL")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|g| (1..=MAX_DAILY_GOAL).contains(g))
            .map(|g| g as u32)
            .unwrap_or(defaults.daily_goal);

        let file_logs = get("ENABLE_FILE_LOGS").is_some_and(|v| v == "true" || v == "1");
        let log_dir = file_logs.then(|| {
            get("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
        });

        Self {
            api_base_url,
            api_timeout,
            storage_dir,
            user_id: get("LEARNING_USER_ID").unwrap_or(defaults.user_id),
            daily_goal,
            speech_language: get("SPEECH_LANGUAGE").unwrap_or(defaults.speech_language),
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir,
        }
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./data"))
}
