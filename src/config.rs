use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.json";
pub const DEFAULT_DATABASE_PATH: &str = "data/feed.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Hosted project (auth + REST row store).
    Supabase { url: String, anon_key: String },
    /// SQLite file standing in for the hosted project.
    Local { database_path: String },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Local {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub messages_table: String,
    pub users_table: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            messages_table: "messages".to_string(),
            users_table: "users".to_string(),
        }
    }
}

/// Read the feed client config; a missing or unreadable file means defaults.
pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::info!(
                "No feed config at {} ({err}); using the local backend at {DEFAULT_DATABASE_PATH}",
                path.display()
            );
            return AppConfig::default();
        }
    };

    serde_json::from_str::<AppConfig>(&content).unwrap_or_else(|err| {
        log::warn!(
            "Ignoring malformed feed config {}: {err}; run `init-config` to regenerate it",
            path.display()
        );
        AppConfig::default()
    })
}

/// Write `config` as pretty JSON, creating the config directory if needed.
pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    let path = Path::new(path);
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)
}

/// Environment overrides: `SUPABASE_URL` + `SUPABASE_ANON_KEY` select the
/// hosted backend, `FEED_DATABASE_PATH` moves the local database.
pub fn apply_env_overrides(mut config: AppConfig, lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_ANON_KEY")) {
        (Some(url), Some(anon_key)) => {
            config.backend = BackendConfig::Supabase { url, anon_key };
        }
        (Some(_), None) | (None, Some(_)) => {
            log::warn!("SUPABASE_URL and SUPABASE_ANON_KEY must be set together; ignoring");
        }
        (None, None) => {}
    }

    if let Some(path) = non_empty("FEED_DATABASE_PATH") {
        if let BackendConfig::Local { database_path } = &mut config.backend {
            *database_path = path;
        }
    }

    config
}
