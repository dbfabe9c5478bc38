use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured API token
pub const TOKEN_ENV: &str = "JOBSERVE_API_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// API host name, without scheme
  #[serde(default = "default_host")]
  pub host: String,
  /// Use https instead of http
  #[serde(default)]
  pub secure: bool,
  /// Sent as Accept-Language; controls the language of descriptive text
  #[serde(default = "default_language")]
  pub language: String,
  /// API token issued by JobServe. Prefer the environment variable.
  pub token: Option<String>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      host: default_host(),
      secure: false,
      language: default_language(),
      token: None,
    }
  }
}

fn default_host() -> String {
  "services.jobserve.com".to_string()
}

fn default_language() -> String {
  "en-GB".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Filter used when RUST_LOG is not set (e.g. "info", "jobserve=debug")
  #[serde(default = "default_level")]
  pub level: String,
  /// Log to this file instead of stderr
  pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_level(),
      file: None,
    }
  }
}

fn default_level() -> String {
  "warn".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./jobserve.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jobserve/config.yaml
  ///
  /// Without any file the defaults are used; the token can then come from
  /// the environment alone.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("jobserve.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jobserve").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Get the API token, from JOBSERVE_API_TOKEN or else the config file.
  pub fn api_token(&self) -> Result<String> {
    Self::resolve_token(std::env::var(TOKEN_ENV).ok(), self.api.token.as_deref())
  }

  fn resolve_token(env: Option<String>, file: Option<&str>) -> Result<String> {
    env
      .filter(|t| !t.trim().is_empty())
      .or_else(|| file.map(str::to_string).filter(|t| !t.trim().is_empty()))
      .map(|t| t.trim().to_string())
      .ok_or_else(|| {
        eyre!(
          "JobServe API token not found. Set {} or api.token in the config file.",
          TOKEN_ENV
        )
      })
  }
}
