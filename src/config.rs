use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// Falls back to the GEMINI_API_KEY environment variable when unset.
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini: GeminiConfig {
                api_key: None,
                model: default_model(),
                base_url: default_base_url(),
            },
            window: WindowConfig {
                width: 900,
                height: 720,
            },
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => eprintln!("Error parsing config.toml: {}. Using defaults.", e),
                },
                Err(e) => eprintln!("Error reading config.toml: {}. Using defaults.", e),
            }
        } else if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        Config::default()
    }

    /// Resolved API key: config file first, environment second.
    pub fn api_key(&self) -> Option<String> {
        self.gemini
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_config_dir() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/smartshop")
        } else {
            PathBuf::from(".")
        }
    }

    pub fn history_path() -> PathBuf {
        Self::get_config_dir().join("history.json")
    }
}
