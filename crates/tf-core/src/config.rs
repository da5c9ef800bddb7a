//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::registry::StepRegistry;
use crate::Error;

/// Environment variable consulted when `classifier.api_key` is unset.
pub const API_KEY_ENV: &str = "LLM_API_KEY";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub steps: StepsConfig,
    pub classifier: ClassifierConfig,
    pub executor: ExecutorConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| Error::Config(format!("parse error: {e}")))
    }

    /// Load configuration from a file path, returning an error if the file
    /// cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, missing, or unparseable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.executor.max_parallel == 0 {
            warnings.push("executor.max_parallel is 0; parallel runs will use 1 worker".into());
        }

        let registry = StepRegistry::builtin();
        for name in self.steps.overrides.keys() {
            if !registry.contains(name) {
                warnings.push(format!("steps.overrides names unknown step '{name}'"));
            }
        }

        if let Some(ref dir) = self.steps.bin_dir {
            if !dir.is_dir() {
                warnings.push(format!("steps.bin_dir {} is not a directory", dir.display()));
            }
        }

        if self.classifier.enabled {
            if self.classifier.resolved_api_key().is_none() {
                warnings.push(format!(
                    "classifier is enabled but no api_key is set and {API_KEY_ENV} is empty; \
                     heuristic selection will be used"
                ));
            }
            if self.classifier.api_url.is_empty() {
                warnings.push("classifier.api_url is empty".into());
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

/// How step names are turned into runnable processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Run a local executable named after the step.
    #[default]
    Process,
    /// Run `<image_prefix>/<step>` through `docker run`.
    Docker,
}

/// Step launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StepsConfig {
    pub launcher: LaunchMode,
    /// Directory searched for step executables before `PATH`.
    pub bin_dir: Option<PathBuf>,
    /// Image namespace used in docker mode.
    pub image_prefix: String,
    /// Explicit executable path per step name.
    pub overrides: HashMap<String, PathBuf>,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            launcher: LaunchMode::Process,
            bin_dir: None,
            image_prefix: "textflow".into(),
            overrides: HashMap::new(),
        }
    }
}

/// External classifier settings for model-backed step selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub enabled: bool,
    /// OpenAI-compatible chat completions endpoint.
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

fn default_classifier_timeout() -> u64 {
    10
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.groq.com/openai/v1/chat/completions".into(),
            model: "mixtral-8x7b-32768".into(),
            api_key: None,
            timeout_secs: default_classifier_timeout(),
        }
    }
}

impl ClassifierConfig {
    /// The configured API key, or the value of [`API_KEY_ENV`].
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Pipeline executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound on concurrently running steps in parallel mode.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
    /// Optional wall-clock limit per step. Unset means steps may run forever.
    pub step_timeout_secs: Option<u64>,
}

fn default_max_parallel() -> usize {
    5
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            step_timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.steps.launcher, LaunchMode::Process);
        assert_eq!(cfg.steps.image_prefix, "textflow");
        assert!(!cfg.classifier.enabled);
        assert_eq!(cfg.classifier.timeout_secs, 10);
        assert_eq!(cfg.executor.max_parallel, 5);
        assert!(cfg.executor.step_timeout_secs.is_none());
    }

    #[test]
    fn default_config_no_warnings() {
        let warnings = Config::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.executor.max_parallel, 5);
    }

    #[test]
    fn parse_docker_launcher() {
        let json = r#"{"steps": {"launcher": "docker", "image_prefix": "acme"}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.steps.launcher, LaunchMode::Docker);
        assert_eq!(cfg.steps.image_prefix, "acme");
    }

    #[test]
    fn parse_invalid_json_is_config_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_override_warns() {
        let mut cfg = Config::default();
        cfg.steps
            .overrides
            .insert("translate".into(), PathBuf::from("/usr/bin/true"));
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("translate")));
    }

    #[test]
    fn enabled_classifier_without_url_warns() {
        let mut cfg = Config::default();
        cfg.classifier.enabled = true;
        cfg.classifier.api_key = Some("key".into());
        cfg.classifier.api_url = String::new();
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("api_url")));
    }

    #[test]
    fn explicit_api_key_wins() {
        let mut cfg = ClassifierConfig::default();
        cfg.api_key = Some("from-config".into());
        assert_eq!(cfg.resolved_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/textflow.json")));
        assert_eq!(cfg.server.port, 5000);
    }
}
