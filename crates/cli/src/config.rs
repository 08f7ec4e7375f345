//! `specaudit.toml`

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use specaudit_oracle::{OpenAiConfig, RetryPolicy, DEFAULT_BASE_URL};
use specaudit_search::DEFAULT_SELECTION_RETRIES;
use specaudit_syntax::Dialect;
use specaudit_verify::{FindingStore, DEFAULT_MAX_TURNS};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "specaudit.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Names the findings file: `inconsistencies_<protocol>.json`
    pub protocol: String,

    /// Root of the code base to index
    pub project_path: PathBuf,

    /// Preferred locality for symbol resolution, and the directory the
    /// summary tree mirrors. Defaults to `project_path`.
    #[serde(default)]
    pub prefer_path: Option<String>,

    #[serde(default)]
    pub spec_input: Option<PathBuf>,

    #[serde(default)]
    pub spec_cleaned_output: Option<PathBuf>,

    #[serde(default = "default_summary_json")]
    pub summary_json: PathBuf,

    #[serde(default = "default_findings_dir")]
    pub findings_dir: PathBuf,

    /// Dialect for `.h` headers: `c` or `cpp`
    #[serde(default = "default_language")]
    pub language: String,

    /// Send all log output here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub model: String,
    pub base_url: String,
    /// Falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub retry_min_secs: u64,
    pub retry_max_secs: u64,
    pub max_attempts: u32,
    pub request_timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            temperature: Some(0.0),
            retry_min_secs: 1,
            retry_max_secs: 60,
            max_attempts: 6,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub selection_retries: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            selection_retries: DEFAULT_SELECTION_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub max_turns: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

fn default_summary_json() -> PathBuf {
    PathBuf::from("summary.json")
}

fn default_findings_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_language() -> String {
    "c".to_string()
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.protocol.trim().is_empty() {
            bail!("project.protocol must not be empty");
        }
        if Dialect::from_name(&self.project.language).is_none() {
            bail!(
                "project.language must be `c` or `cpp`, got `{}`",
                self.project.language
            );
        }
        if self.oracle.retry_min_secs > self.oracle.retry_max_secs {
            bail!(
                "oracle.retry_min_secs ({}) exceeds oracle.retry_max_secs ({})",
                self.oracle.retry_min_secs,
                self.oracle.retry_max_secs
            );
        }
        if self.oracle.max_attempts == 0 {
            bail!("oracle.max_attempts must be at least 1");
        }
        if self.verify.max_turns == 0 {
            bail!("verify.max_turns must be at least 1");
        }
        Ok(())
    }

    pub fn header_dialect(&self) -> Dialect {
        Dialect::from_name(&self.project.language).unwrap_or_default()
    }

    pub fn prefer_path(&self) -> String {
        self.project
            .prefer_path
            .clone()
            .unwrap_or_else(|| self.project.project_path.to_string_lossy().into_owned())
    }

    pub fn findings_path(&self) -> PathBuf {
        self.project
            .findings_dir
            .join(FindingStore::file_name(&self.project.protocol))
    }

    pub fn spec_input(&self) -> Result<&Path> {
        self.project
            .spec_input
            .as_deref()
            .context("project.spec_input is not set")
    }
}

impl OracleConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            min_delay: Duration::from_secs(self.retry_min_secs),
            max_delay: Duration::from_secs(self.retry_max_secs),
            max_attempts: self.max_attempts,
        }
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            base_url: self.base_url.clone(),
            api_key: self
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok()),
            model: self.model.clone(),
            temperature: self.temperature,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
