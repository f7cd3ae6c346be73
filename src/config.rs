//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Settings read from the environment; command line flags override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Assessment CSV (default: "JnKDataset.csv").
    pub store_path: PathBuf,

    /// Program that runs the local model (default: "ollama").
    pub model_program: String,

    /// Model name passed to `<program> run` (default: "gemma3:1b").
    pub model: String,

    /// Upper bound on one chat reply (default: 60 seconds).
    pub chat_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_path: std::env::var("MINDCARE_STORE")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            model_program: std::env::var("MINDCARE_MODEL_PROGRAM")
                .unwrap_or(defaults.model_program),
            model: std::env::var("MINDCARE_MODEL").unwrap_or(defaults.model),
            chat_timeout: std::env::var("MINDCARE_CHAT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.chat_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("JnKDataset.csv"),
            model_program: "ollama".into(),
            model: "gemma3:1b".into(),
            chat_timeout: Duration::from_secs(60),
        }
    }
}
