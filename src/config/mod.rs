pub mod schema;

pub use schema::ConciergeConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "concierge.toml";

/// Default concierge home directory (~/.concierge).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".concierge"))
        .unwrap_or_else(|| PathBuf::from(".concierge"))
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<ConciergeConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read concierge config file")?;
        let config: ConciergeConfig =
            toml::from_str(&contents).context("Failed to parse concierge config (TOML)")?;
        Ok(config)
    } else {
        Ok(ConciergeConfig::default())
    }
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &ConciergeConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}

/// Overlay values from the environment (and `.env`, if present).
pub fn apply_env_overrides(config: &mut ConciergeConfig) {
    let _ = dotenvy::dotenv();
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

fn apply_overrides_from(config: &mut ConciergeConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty("OPENAI_API_KEY") {
        config.api_key = key;
    }
    if let Some(id) = non_empty("CONCIERGE_ASSISTANT_ID") {
        config.assistant_id = Some(id);
    }
    if let Some(id) = non_empty("CONCIERGE_THREAD_ID") {
        config.thread_id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RunStrategy;
    use crate::tools::ToolSet;
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.strategy, RunStrategy::Poll);
        assert_eq!(config.tool_set, ToolSet::Business);
        assert_eq!(config.run_settings().timeout, None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = ConciergeConfig::default();
        config.strategy = RunStrategy::Stream;
        config.vector_store_ids = vec!["vs_1".into()];
        config.thread_id = Some("thread_1".into());
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.strategy, RunStrategy::Stream);
        assert_eq!(loaded.vector_store_ids, vec!["vs_1".to_string()]);
        assert_eq!(loaded.thread_id.as_deref(), Some("thread_1"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "strategy = \"stream\"\ntool_set = \"weather\"\nrun_timeout_secs = 90\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.tool_set, ToolSet::Weather);
        assert_eq!(config.poll_interval_ms, 1000);

        let settings = config.run_settings();
        assert_eq!(settings.strategy, RunStrategy::Stream);
        assert_eq!(settings.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_invalid_strategy_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "strategy = \"carrier-pigeon\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-env"),
            ("CONCIERGE_ASSISTANT_ID", "asst_env"),
            ("CONCIERGE_THREAD_ID", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = ConciergeConfig::default();
        apply_overrides_from(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.assistant_id.as_deref(), Some("asst_env"));
        assert_eq!(config.thread_id, None);
    }

    #[test]
    fn test_assistant_spec_from_config() {
        let mut config = ConciergeConfig::default();
        config.code_interpreter = true;
        let spec = config.assistant_spec(Vec::new());
        assert_eq!(spec.name, "Customer Assistant");
        assert!(spec.code_interpreter);
        assert!(!spec.file_search);
    }
}
