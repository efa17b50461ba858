//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/topicswipe/topicswipe.toml`
//! 3. Local config: `<dir>/.topicswipe.toml` (working directory unless overridden)
//! 4. Environment variables: `TOPICSWIPE_*` prefix (`OPENAI_API_KEY` as key fallback)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, DEFAULT_TOPIC};

/// Environment variable consulted when no key is configured otherwise.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<SecretString>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per completion before giving up
    pub max_retries: u32,
    /// Lower bound of subtopics asked for
    pub min_children: usize,
    /// Upper bound of subtopics asked for and kept
    pub max_children: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4".into(),
            api_key: None,
            timeout_secs: 60,
            max_retries: 3,
            min_children: 2,
            max_children: 3,
        }
    }
}

/// Raw completion settings for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLlmSettings {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<SecretString>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub min_children: Option<usize>,
    pub max_children: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub seed_file: Option<PathBuf>,
    pub default_topic: Option<String>,
    pub article_dir: Option<PathBuf>,
    pub debug_log: Option<bool>,
    #[serde(default)]
    pub llm: RawLlmSettings,
}

impl LlmSettings {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawLlmSettings) -> Self {
        Self {
            base_url: overlay
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            model: overlay.model.clone().unwrap_or_else(|| self.model.clone()),
            api_key: overlay.api_key.clone().or_else(|| self.api_key.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            max_retries: overlay.max_retries.unwrap_or(self.max_retries),
            min_children: overlay.min_children.unwrap_or(self.min_children),
            max_children: overlay.max_children.unwrap_or(self.max_children),
        }
    }

    /// Keep the children bounds usable: at least one, min not above max.
    fn normalize(&mut self) {
        self.max_children = self.max_children.max(1);
        self.min_children = self.min_children.clamp(1, self.max_children);
    }
}

/// Unified configuration for topicswipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON file with the initial topic forest
    pub seed_file: Option<PathBuf>,
    /// Prompt of the fallback root when no usable seed exists
    pub default_topic: String,
    /// Directory where generated articles are saved (not saved if unset)
    pub article_dir: Option<PathBuf>,
    /// Print the session's debug log after each command
    pub debug_log: bool,
    /// Completion service settings
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed_file: None,
            default_topic: DEFAULT_TOPIC.into(),
            article_dir: None,
            debug_log: false,
            llm: LlmSettings::default(),
        }
    }
}

/// Get the XDG config directory for topicswipe.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "topicswipe").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("topicswipe.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".topicswipe.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.seed_file = self
            .seed_file
            .take()
            .map(|p| PathBuf::from(expand_env_vars(p.to_string_lossy().as_ref())));
        self.article_dir = self
            .article_dir
            .take()
            .map(|p| PathBuf::from(expand_env_vars(p.to_string_lossy().as_ref())));
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            seed_file: overlay.seed_file.clone().or_else(|| self.seed_file.clone()),
            default_topic: overlay
                .default_topic
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| self.default_topic.clone()),
            article_dir: overlay
                .article_dir
                .clone()
                .or_else(|| self.article_dir.clone()),
            debug_log: overlay.debug_log.unwrap_or(self.debug_log),
            llm: self.llm.merge(&overlay.llm),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.topicswipe.toml` (None: skip local config)
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/topicswipe/topicswipe.toml`
    /// 3. Local config: `<local_dir>/.topicswipe.toml`
    /// 4. Environment variables: `TOPICSWIPE_*`, then `OPENAI_API_KEY` if no key yet
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.llm.normalize();

        Ok(current)
    }

    /// Apply TOPICSWIPE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("TOPICSWIPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("seed_file") {
            settings.seed_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("default_topic") {
            if !val.trim().is_empty() {
                settings.default_topic = val;
            }
        }
        if let Ok(val) = config.get_string("article_dir") {
            settings.article_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("debug_log") {
            settings.debug_log = val;
        }
        if let Ok(val) = config.get_string("llm.base_url") {
            settings.llm.base_url = val;
        }
        if let Ok(val) = config.get_string("llm.model") {
            settings.llm.model = val;
        }
        if let Ok(val) = config.get_string("llm.api_key") {
            settings.llm.api_key = Some(SecretString::from(val));
        }
        if let Ok(val) = config.get_int("llm.timeout_secs") {
            settings.llm.timeout_secs = u64::try_from(val).map_err(|e| ApplicationError::Config {
                message: format!("llm.timeout_secs: {e}"),
            })?;
        }
        if let Ok(val) = config.get_int("llm.max_retries") {
            settings.llm.max_retries = u32::try_from(val).map_err(|e| ApplicationError::Config {
                message: format!("llm.max_retries: {e}"),
            })?;
        }
        if let Ok(val) = config.get_int("llm.min_children") {
            settings.llm.min_children =
                usize::try_from(val).map_err(|e| ApplicationError::Config {
                    message: format!("llm.min_children: {e}"),
                })?;
        }
        if let Ok(val) = config.get_int("llm.max_children") {
            settings.llm.max_children =
                usize::try_from(val).map_err(|e| ApplicationError::Config {
                    message: format!("llm.max_children: {e}"),
                })?;
        }

        if settings.llm.api_key.is_none() {
            if let Ok(key) = std::env::var(OPENAI_API_KEY_VAR) {
                if !key.trim().is_empty() {
                    settings.llm.api_key = Some(SecretString::from(key));
                }
            }
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML (the API key is omitted).
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# topicswipe configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/topicswipe/topicswipe.toml
#   Local:  ./.topicswipe.toml
#   Env:    TOPICSWIPE_* environment variables (e.g. TOPICSWIPE_LLM__MODEL)
#           OPENAI_API_KEY is used when no api_key is configured

# JSON file with the initial topics: [{"prompt": "...", "children": [...]}]
# seed_file = "~/topics.json"

# Root topic used when no seed is available
# default_topic = "Explore"

# Save generated articles here (markdown)
# article_dir = "~/topicswipe/articles"

# Print the session debug log after every command
# debug_log = false

[llm]
# base_url = "https://api.openai.com/v1"
# model = "gpt-4"
# api_key = "sk-..."
# timeout_secs = 60
# max_retries = 3
# min_children = 2
# max_children = 3
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
