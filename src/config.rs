//! # 配置与凭据
//!
//! 读取可选的 `.matagg.toml` 配置文件，并在启动时一次性解析出不可变的
//! `Settings`（API 密钥、端点、超时），之后按引用传递给各组件。
//!
//! ## 凭据优先级
//! 1. `--api-key` / `MATERIALS_PROJECT_API_KEY` 环境变量
//! 2. `MP_API_KEY` 环境变量
//! 3. `--config` 指定的文件
//! 4. 当前目录 `.matagg.toml`
//! 5. 用户主目录 `~/.matagg.toml`
//! 6. `.env` 文件中的 `MATERIALS_PROJECT_API_KEY`（当前目录，其次主目录）
//!
//! ## 依赖关系
//! - 被 `main.rs` 和 `commands/` 使用
//! - 使用 `toml`, `serde`, `dirs`

use crate::error::{MatAggError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = ".matagg.toml";

/// 凭据环境变量（同时是 `.env` 中查找的键）
pub const PRIMARY_KEY_ENV: &str = "MATERIALS_PROJECT_API_KEY";

/// 备用凭据环境变量
pub const FALLBACK_KEY_ENV: &str = "MP_API_KEY";

/// dotenv 文件名
pub const DOTENV_FILE_NAME: &str = ".env";

/// 配置文件根结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[api]` 段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Materials Project API 密钥
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.materialsproject.org".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// `[defaults]` 段：子命令参数默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// `stable` 的默认 energy above hull 上限 (eV/atom)
    #[serde(default = "default_hull")]
    pub hull: f64,

    #[serde(default = "default_trend_limit")]
    pub trend_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            hull: default_hull(),
            trend_limit: default_trend_limit(),
        }
    }
}

fn default_limit() -> usize {
    10
}

fn default_hull() -> f64 {
    0.05
}

fn default_trend_limit() -> usize {
    50
}

impl Config {
    /// 从文件加载配置
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MatAggError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| {
            MatAggError::Configuration(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e.message()
            ))
        })
    }

    /// 查找配置文件：显式路径（必须存在）> 当前目录 > 主目录
    pub fn discover(explicit: Option<&Path>) -> Result<Option<(Self, PathBuf)>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(MatAggError::Configuration(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
            return Ok(Some((Self::load(path)?, path.to_path_buf())));
        }

        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(CONFIG_FILE_NAME));
        }

        for path in candidates {
            if path.is_file() {
                return Ok(Some((Self::load(&path)?, path)));
            }
        }
        Ok(None)
    }
}

/// 在 `./.env`、`~/.env` 中查找凭据；使用第一个存在的文件
pub fn discover_dotenv_key() -> Result<Option<String>> {
    let mut candidates = vec![PathBuf::from(DOTENV_FILE_NAME)];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(DOTENV_FILE_NAME));
    }

    match candidates.into_iter().find(|p| p.is_file()) {
        Some(path) => {
            let key = read_dotenv_key(&path)?;
            if key.is_some() {
                debug!("Loaded API key from {}", path.display());
            }
            Ok(key)
        }
        None => Ok(None),
    }
}

/// 读取 dotenv 文件中 `MATERIALS_PROJECT_API_KEY` 的值
///
/// 支持 `KEY=value`、`export KEY=value`、引号包裹的值以及 `#` 注释行。
pub fn read_dotenv_key(path: &Path) -> Result<Option<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| MatAggError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let value = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            (key.trim() == PRIMARY_KEY_ENV).then(|| unquote(value.trim()).to_string())
        })
        .last();
    Ok(value)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// API 密钥；`Debug`/`Display` 不泄露内容
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// 空白密钥视为无效
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MatAggError::Configuration(
                "API key is empty".to_string(),
            ));
        }
        Ok(ApiKey(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// 进程启动时解析得到的不可变设置
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: ApiKey,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Settings {
    /// 按优先级解析凭据与配置。
    ///
    /// `cli_key` 来自 `--api-key` 或 `MATERIALS_PROJECT_API_KEY`，
    /// `env_fallback` 来自 `MP_API_KEY`，`dotenv_key` 来自 `.env` 文件。
    pub fn resolve(
        cli_key: Option<&str>,
        env_fallback: Option<&str>,
        config: Option<&Config>,
        dotenv_key: Option<&str>,
    ) -> Result<Self> {
        let config = config.cloned().unwrap_or_default();

        let raw_key = cli_key
            .or(env_fallback)
            .or(config.api.key.as_deref())
            .or(dotenv_key)
            .ok_or_else(|| {
                MatAggError::Configuration(format!(
                    "no API key found; set {} or {}, add `key` under [api] in {}, or put {}=<key> in {}",
                    PRIMARY_KEY_ENV, FALLBACK_KEY_ENV, CONFIG_FILE_NAME, PRIMARY_KEY_ENV, DOTENV_FILE_NAME
                ))
            })?;
        let api_key = ApiKey::new(raw_key)?;

        let endpoint = config.api.endpoint.trim_end_matches('/').to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(MatAggError::Configuration(format!(
                "API endpoint '{}' must be an http(s) URL",
                config.api.endpoint
            )));
        }
        if config.api.timeout_seconds == 0 {
            return Err(MatAggError::Configuration(
                "timeout_seconds must be positive".to_string(),
            ));
        }

        debug!("Using endpoint {}", endpoint);

        Ok(Settings {
            api_key,
            endpoint,
            timeout: Duration::from_secs(config.api.timeout_seconds),
        })
    }
}
