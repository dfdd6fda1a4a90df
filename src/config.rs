//! Optional `.copy-chat/config.json`, looked up from the working directory
//! towards the filesystem root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extractor::DEFAULT_ASSISTANT_LABEL;
use crate::patterns::{CompiledPatterns, PatternConfig};

pub const CONFIG_DIR: &str = ".copy-chat";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default = "default_assistant_label")]
    pub assistant_label: String,
    /// Initial state of the Markdown checkbox.
    #[serde(default)]
    pub format_as_markdown: bool,
    /// 0 disables the timeout.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Where this config was read from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

fn default_assistant_label() -> String {
    DEFAULT_ASSISTANT_LABEL.into()
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            patterns: PatternConfig::default(),
            assistant_label: default_assistant_label(),
            format_as_markdown: false,
            fetch_timeout_secs: default_fetch_timeout(),
            source: None,
        }
    }
}

impl AppConfig {
    /// Loads the nearest config file above `base`, or the defaults.
    pub fn load_from(base: &Path) -> Self {
        let Some(path) = find_config_file(base) else {
            return Self::default();
        };
        let mut config = match std::fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|text| serde_json::from_str::<AppConfig>(&text).map_err(|err| err.to_string()))
        {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), "ignoring config: {}", err);
                return Self::default();
            }
        };
        if let Err(err) = CompiledPatterns::compile(&config.patterns) {
            warn!(path = %path.display(), "{}; using default patterns", err);
            config.patterns = PatternConfig::default();
        }
        info!(path = %path.display(), "loaded config");
        config.source = Some(path);
        config
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let config_dir = dir.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join(CONFIG_FILE);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn found_in_ancestor_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = write_config(root.path(), r#"{"assistant_label": "Assistant"}"#);
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(path.clone()));
        let config = AppConfig::load_from(&nested);
        assert_eq!(config.assistant_label, "Assistant");
        assert_eq!(config.patterns, PatternConfig::default());
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.source, Some(path));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let root = tempfile::tempdir().unwrap();
        write_config(root.path(), "{ not json");
        assert_eq!(AppConfig::load_from(root.path()), AppConfig::default());
    }

    #[test]
    fn invalid_selector_falls_back_to_default_patterns() {
        let root = tempfile::tempdir().unwrap();
        write_config(
            root.path(),
            r#"{"patterns": {"assistant": "div[["}, "format_as_markdown": true}"#,
        );
        let config = AppConfig::load_from(root.path());
        assert_eq!(config.patterns, PatternConfig::default());
        assert!(config.format_as_markdown);
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = AppConfig {
            fetch_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.fetch_timeout(), None);
        assert_eq!(
            AppConfig::default().fetch_timeout(),
            Some(Duration::from_secs(30))
        );
    }
}
