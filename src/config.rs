//! Configuration management

use clap::Parser;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "movies_on_the_tip", version, about = "Movie catalog viewer")]
pub struct Args {
    /// Base URL of the movies REST backend
    #[arg(long, env = "MOVIES_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to open at startup, e.g. /favourites or /movies-coming/3
    #[arg(long)]
    pub path: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Args {
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Persisted preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    // Unset leaves the HTTP transport's own timeouts in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    // Restored when no --path is given
    #[serde(default)]
    pub last_path: String,
}

fn default_true() -> bool { true }
fn default_font_size() -> u32 { 14 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            dark_mode: true,
            font_size: 14,
            request_timeout_secs: None,
            last_path: String::new(),
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("movies_on_the_tip");
        path.push("config.json");
        path
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Missing or unreadable files give the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                warn!("Cannot read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        self.save_to(&Self::config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok();
        }
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    warn!("Cannot save config {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("Cannot serialize config: {}", e),
        }
    }

    /// CLI/env beats the config file, which beats the built-in default
    pub fn effective_base_url(&self, args: &Args) -> String {
        args.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| Some(self.base_url.as_str()).filter(|url| !url.trim().is_empty()))
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    /// `--timeout` beats the config file; neither means no override
    pub fn request_timeout(&self, args: &Args) -> Option<Duration> {
        args.timeout
            .or(self.request_timeout_secs)
            .map(|secs| Duration::from_secs(secs.max(1)))
    }

    pub fn start_path(&self, args: &Args) -> String {
        match &args.path {
            Some(path) => path.clone(),
            None => self.last_path.clone(),
        }
    }
}
