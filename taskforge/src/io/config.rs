//! Runner configuration (TOML).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Service configuration.
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values; a missing file is
/// equivalent to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForgeConfig {
    /// Model identifier sent with every synthesis request.
    pub model: String,

    /// Chat-completions endpoint of the generative service.
    pub endpoint: String,

    /// Environment variable holding the API credential. The value is read
    /// once at gateway construction, never at call sites.
    pub api_key_env: String,

    /// Root directory served by the read interface.
    pub data_root: PathBuf,

    /// Repair attempts after the initial execution (total executions is
    /// `max_repairs + 1`).
    pub max_repairs: u32,

    /// Timeout for one model call, in seconds.
    pub gateway_timeout_secs: u64,

    /// Timeout for one sandboxed script run, in seconds.
    pub exec_timeout_secs: u64,

    /// Truncate captured script stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,

    /// Base directory for per-request scratch directories. Defaults to the
    /// system temp directory when unset.
    pub scratch_dir: Option<PathBuf>,

    /// Keep scratch directories after terminal states (for diagnosis).
    pub keep_scratch: bool,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://aiproxy.sanand.workers.dev/openai/v1/chat/completions".to_string(),
            api_key_env: "AIPROXY_TOKEN".to_string(),
            data_root: PathBuf::from("/data"),
            max_repairs: 3,
            gateway_timeout_secs: 20,
            exec_timeout_secs: 120,
            output_limit_bytes: 100_000,
            scratch_dir: None,
            keep_scratch: false,
        }
    }
}

impl ForgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model must be non-empty"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(anyhow!("endpoint must be non-empty"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(anyhow!("api_key_env must be non-empty"));
        }
        if self.gateway_timeout_secs == 0 {
            return Err(anyhow!("gateway_timeout_secs must be > 0"));
        }
        if self.exec_timeout_secs == 0 {
            return Err(anyhow!("exec_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    /// Resolve the API credential from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        env::var(&self.api_key_env)
            .with_context(|| format!("read credential from ${}", self.api_key_env))
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    /// Base directory under which per-request scratch directories are made.
    pub fn scratch_base(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("taskforge"))
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ForgeConfig::default()`.
pub fn load_config(path: &Path) -> Result<ForgeConfig> {
    if !path.exists() {
        let cfg = ForgeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ForgeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ForgeConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
