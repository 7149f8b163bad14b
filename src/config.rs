use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{PostbenchError, Result};

/// 配置文件名
const CONFIG_FILE: &str = "postbench.toml";

pub const ENV_BIND: &str = "POSTBENCH_BIND";
pub const ENV_JWT_SECRET: &str = "POSTBENCH_JWT_SECRET";
pub const ENV_HISTORY_DIR: &str = "POSTBENCH_HISTORY_DIR";

const DEFAULT_JWT_SECRET: &str = "change-me";

/// 完整配置，所有字段都有默认值，缺少配置文件也能启动
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub executor: ExecutorSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// 允许跨域访问的前端来源，为空时允许任意来源
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3001)),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 密钥，用于校验外部签发的 Bearer token
    pub jwt_secret: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// 单次外呼的总超时 (连接 + 发送 + 读取完整响应体)
    pub timeout_secs: u64,
    /// 自动跟随重定向的最大次数，0 表示不跟随
    pub max_redirects: usize,
    pub max_body_bytes: usize,
    /// 拒绝回环 / 内网 / 链路本地地址
    pub block_private_targets: bool,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 10,
            max_body_bytes: 1024 * 1024,
            block_private_targets: false,
        }
    }
}

impl ExecutorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub dir: PathBuf,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// 压缩时每个用户保留的最新记录条数
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".postbench"),
            default_page_size: 10,
            max_page_size: 100,
            max_entries: 10_000,
        }
    }
}

impl HistorySettings {
    pub fn file_path(&self) -> PathBuf {
        self.dir.join("history.jsonl")
    }
}

impl Settings {
    /// 加载配置
    ///
    /// 指定了路径时只读该文件；否则按以下顺序查找：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/postbench/
    ///
    /// 最后应用环境变量覆盖。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::load_from_path(p)?,
            None => Self::find_and_load()?.unwrap_or_default(),
        };
        settings.apply_env_overrides()?;

        if settings.auth.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("Using the default JWT secret; set {} in production", ENV_JWT_SECRET);
        }
        Ok(settings)
    }

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PostbenchError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PostbenchError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    fn find_and_load() -> Result<Option<Self>> {
        if let Some(path) = Self::find_in_current_dir().or_else(Self::find_in_user_dir) {
            debug!("Loading config from {}", path.display());
            return Self::load_from_path(&path).map(Some);
        }
        Ok(None)
    }

    fn find_in_current_dir() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let candidate = dirs::home_dir()?
            .join(".config")
            .join("postbench")
            .join(CONFIG_FILE);
        candidate.exists().then_some(candidate)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(bind) = std::env::var(ENV_BIND) {
            self.server.bind = bind
                .parse()
                .map_err(|e| PostbenchError::ConfigError(format!("{}={}: {}", ENV_BIND, bind, e)))?;
        }
        if let Ok(secret) = std::env::var(ENV_JWT_SECRET) {
            self.auth.jwt_secret = secret;
        }
        if let Ok(dir) = std::env::var(ENV_HISTORY_DIR) {
            self.history.dir = PathBuf::from(dir);
        }
        Ok(())
    }
}
