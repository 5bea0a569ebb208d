use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use crossterm::event::KeyCode;
use serde::Deserialize;

use crate::request::keys::parse_key_name;

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    pub config_path: Option<PathBuf>,

    pub default_llm: String,
    pub agent_name: Option<String>,
    pub llm: HashMap<String, LLMConfig>,

    #[serde(default)]
    pub repl: ReplConfig,
}

/// LLM configuration for each provider defined under `[llm.*]`.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LLMConfig {
    OpenAI(LLMOpenAIConfig),
    // Future LLM providers can be added here.
}

impl LLMConfig {
    pub fn system_prompt(&self) -> Option<&str> {
        match self {
            LLMConfig::OpenAI(cfg) => cfg.system_prompt.as_deref(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct LLMOpenAIConfig {
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub base_url_env: Option<String>,
    pub model: Option<String>,
    pub reasoning_effort: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Hard ceiling on a single request. Abandoned requests keep running
    /// in the background until this elapses.
    pub timeout_secs: Option<u64>,
}

impl LLMOpenAIConfig {
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            Some(key.clone())
        } else if let Some(ref env_var) = self.api_key_env {
            std::env::var(env_var).ok()
        } else {
            None
        }
    }

    pub fn get_base_url(&self) -> Option<String> {
        if let Some(ref url) = self.base_url {
            Some(url.clone())
        } else if let Some(ref env_var) = self.base_url_env {
            std::env::var(env_var).ok()
        } else {
            None
        }
    }
}

/// Interactive-loop settings under `[repl]`.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ReplConfig {
    /// Delay between successive completion/cancellation checks while a
    /// request is outstanding. Also bounds how long a cancel keystroke
    /// takes to be noticed.
    pub poll_interval_ms: u64,

    /// Key that aborts an in-flight request ("esc", "enter", "tab", or a
    /// single character).
    pub cancel_key: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            cancel_key: "esc".to_string(),
        }
    }
}

impl ReplConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn cancel_key(&self) -> Result<KeyCode> {
        parse_key_name(&self.cancel_key)
            .ok_or_else(|| anyhow!("unrecognized cancel key '{}'", self.cancel_key))
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.llm.contains_key(&self.default_llm) {
            anyhow::bail!(
                "Default LLM '{}' is not defined in the configuration",
                self.default_llm
            );
        }
        self.repl.cancel_key()?;
        Ok(())
    }
}

pub fn load_from_file(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read error: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .map_err(|err| anyhow!("parse error in {}: {}", path.display(), err))?;

    config.validate()?;
    Ok(config)
}

pub fn load_from_file_list(paths: &Vec<PathBuf>) -> Result<Config> {
    for path in paths {
        match load_from_file(path) {
            Ok(mut config) => {
                config.config_path = Some(path.clone());
                return Ok(config);
            }
            Err(e) => {
                tracing::warn!(
                    "could not load config from {}: {}; trying next path",
                    path.display(),
                    e
                );
            }
        }
    }
    anyhow::bail!("No valid configuration file found in the provided paths.");
}
