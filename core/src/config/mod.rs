use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SKILLBOX_DIR: &str = ".skillbox";
const LOAD_RECORD_FILE: &str = "loaded_skills.json";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// The two relative path families searched under the working directory and
/// the home directory. Universal paths always outrank standard ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SkillDirs {
    pub universal: String,
    pub standard: String,
}

impl Default for SkillDirs {
    fn default() -> Self {
        Self {
            universal: ".agent/skills".to_string(),
            standard: ".claude/skills".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecConfig {
    pub timeout_secs: u64,
    pub shell: Option<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            shell: None,
        }
    }
}

impl ExecConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub skills_dir: Option<String>,
    pub require_description: bool,
    pub dirs: SkillDirs,
    pub exec: ExecConfig,
}

pub fn get_skillbox_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(SKILLBOX_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_skillbox_dir().join("config.toml")
}

pub fn get_load_record_path() -> PathBuf {
    get_skillbox_dir().join(LOAD_RECORD_FILE)
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let path = get_config_path();
        if path.exists() {
            load_config(&path)
        } else {
            Ok(Config::default())
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}
