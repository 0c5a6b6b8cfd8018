// Aora - A short-video sharing client
// Copyright (C) 2025 Aora Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Runtime configuration
//!
//! Loaded once at start-up from a TOML file, then overridden by `AORA_*`
//! environment variables. The resulting values are passed explicitly to the
//! components that need them and never change afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "AORA_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub appwrite: AppwriteConfig,
    pub ipc: IpcConfig,
    pub logging: LoggingConfig,
}

/// Appwrite project identity and data-access tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppwriteConfig {
    /// API endpoint, including the `/v1` prefix
    pub endpoint: String,
    /// Platform id registered for the app in the Appwrite console
    pub platform: String,
    pub project_id: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub video_collection_id: String,
    /// Storage bucket for thumbnails and videos
    pub storage_id: String,
    /// How many posts `latest posts` returns
    pub latest_posts_limit: u32,
    /// Page size for `all posts`
    pub all_posts_page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            platform: "com.personal.react_native".to_string(),
            project_id: "66331367003b197a552c".to_string(),
            database_id: "663315650038ffa91f6b".to_string(),
            user_collection_id: "663316160005c9c607f4".to_string(),
            video_collection_id: "6633164f0036b07423c1".to_string(),
            storage_id: "66331855003760d0f188".to_string(),
            latest_posts_limit: 7,
            all_posts_page_size: 7,
            request_timeout_secs: 30,
        }
    }
}

/// IPC endpoint the UI host connects to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Unix socket path, or pipe name on Windows
    pub socket_path: String,
}

impl Default for IpcConfig {
    fn default() -> Self {
        #[cfg(windows)]
        let socket_path = r"\\.\pipe\aora_ipc".to_string();
        #[cfg(not(windows))]
        let socket_path = "/tmp/aora_ipc.sock".to_string();

        Self { socket_path }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    pub console_output: bool,
    pub file_output: bool,
    /// Defaults to `<data_local_dir>/Aora/logs`
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: true,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Result<Level> {
        self.level
            .parse()
            .with_context(|| format!("Invalid log level: {}", self.level))
    }
}

impl AppConfig {
    /// Load configuration from the default locations and the environment
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `AORA_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let aw = &mut self.appwrite;
        let strings: [(&str, &mut String); 8] = [
            ("AORA_ENDPOINT", &mut aw.endpoint),
            ("AORA_PLATFORM", &mut aw.platform),
            ("AORA_PROJECT_ID", &mut aw.project_id),
            ("AORA_DATABASE_ID", &mut aw.database_id),
            ("AORA_USER_COLLECTION_ID", &mut aw.user_collection_id),
            ("AORA_VIDEO_COLLECTION_ID", &mut aw.video_collection_id),
            ("AORA_STORAGE_ID", &mut aw.storage_id),
            ("AORA_IPC_SOCKET", &mut self.ipc.socket_path),
        ];
        for (key, slot) in strings {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }

        if let Some(value) = lookup("AORA_LATEST_POSTS_LIMIT") {
            aw.latest_posts_limit = value
                .parse()
                .with_context(|| format!("AORA_LATEST_POSTS_LIMIT: {}", value))?;
        }
        if let Some(value) = lookup("AORA_ALL_POSTS_PAGE_SIZE") {
            aw.all_posts_page_size = value
                .parse()
                .with_context(|| format!("AORA_ALL_POSTS_PAGE_SIZE: {}", value))?;
        }
        if let Some(value) = lookup("AORA_LOG_LEVEL") {
            self.logging.level = value;
        }

        Ok(())
    }
}

/// Explicit `$AORA_CONFIG`, else `<data_local_dir>/Aora/config.toml` if present
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::data_local_dir()
        .map(|dir| dir.join("Aora").join("config.toml"))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_hosted_project() {
        let config = AppConfig::default();
        assert_eq!(config.appwrite.endpoint, "https://cloud.appwrite.io/v1");
        assert_eq!(config.appwrite.latest_posts_limit, 7);
        assert_eq!(config.appwrite.all_posts_page_size, 7);
        assert_eq!(config.logging.level().unwrap(), Level::INFO);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [appwrite]
            endpoint = "http://localhost/v1"
            all_posts_page_size = 25

            [logging]
            level = "debug"
            file_output = false
            "#,
        )
        .unwrap();

        assert_eq!(config.appwrite.endpoint, "http://localhost/v1");
        assert_eq!(config.appwrite.all_posts_page_size, 25);
        assert_eq!(config.appwrite.latest_posts_limit, 7);
        assert_eq!(config.appwrite.storage_id, "66331855003760d0f188");
        assert!(!config.logging.file_output);
        assert_eq!(config.logging.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AORA_PROJECT_ID", "other-project"),
            ("AORA_LATEST_POSTS_LIMIT", "12"),
            ("AORA_STORAGE_ID", ""),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.appwrite.project_id, "other-project");
        assert_eq!(config.appwrite.latest_posts_limit, 12);
        assert_eq!(config.appwrite.storage_id, "66331855003760d0f188");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|key| (key == "AORA_ALL_POSTS_PAGE_SIZE").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("AORA_ALL_POSTS_PAGE_SIZE"));
    }

    #[test]
    fn unknown_level_is_an_error() {
        let logging = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(logging.level().is_err());
    }
}
