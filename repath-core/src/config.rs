//! On-disk defaults for `repath-cli`, loaded from `.repath/config.toml`
//! (grounded on the teacher's `Config::load`/`save` pair, same directory
//! convention, different field set).

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::parser::Structure;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default input layout when `--paragraphs`/`--pairs`/`--rows` are absent.
    #[serde(default)]
    pub structure: Structure,

    /// Default indentation width passed to user-supplied hook code.
    #[serde(default = "default_indent")]
    pub indent: usize,

    #[serde(default = "default_seq_start")]
    pub seq_start: i64,

    #[serde(default = "default_seq_step")]
    pub seq_step: i64,

    /// Pager program invoked for long previews (`less` absent entirely
    /// disables paging).
    #[serde(default)]
    pub pager: Option<String>,

    /// Suppress the diagnostic tracing subscriber.
    #[serde(default)]
    pub nolog: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            structure: Structure::default(),
            indent: default_indent(),
            seq_start: default_seq_start(),
            seq_step: default_seq_step(),
            pager: None,
            nolog: false,
        }
    }
}

fn default_indent() -> usize {
    4
}

fn default_seq_start() -> i64 {
    1
}

fn default_seq_step() -> i64 {
    1
}

impl Config {
    /// Loads `.repath/config.toml` relative to the current directory, or
    /// the default config if it doesn't exist.
    pub fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(".repath").join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let config_dir = cwd.join(".repath");
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }
        self.save_to_path(&config_dir.join("config.toml"))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.defaults.structure, Structure::Flat);
        assert_eq!(config.defaults.indent, 4);
        assert_eq!(config.defaults.seq_start, 1);
        assert_eq!(config.defaults.seq_step, 1);
        assert_eq!(config.defaults.pager, None);
        assert!(!config.defaults.nolog);
    }

    #[test]
    fn load_save_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.structure = Structure::Pairs;
        config.defaults.seq_start = 100;
        config.defaults.pager = Some("less".to_string());

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.defaults.structure, Structure::Pairs);
        assert_eq!(loaded.defaults.seq_start, 100);
        assert_eq!(loaded.defaults.pager.as_deref(), Some("less"));
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let toml_content = r#"
[defaults]
seq_start = 0
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.defaults.seq_start, 0);
        assert_eq!(config.defaults.indent, 4);
        assert_eq!(config.defaults.structure, Structure::Flat);
    }
}
