use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostbenchError {
    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("不支持的 HTTP 方法: {0}")]
    InvalidMethod(String),

    #[error("无效的请求头: {0}")]
    InvalidHeader(String),

    #[error("请求体过大: {size} 字节 (上限 {limit} 字节)")]
    BodyTooLarge { size: usize, limit: usize },

    #[error("禁止访问的目标地址: {0}")]
    ForbiddenTarget(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("网络错误: {0}")]
    NetworkError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("后台任务失败: {0}")]
    TaskFailed(String),

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}

/// 错误分类，决定调用方如何呈现错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 本地校验失败，请求从未发出
    Validation,
    /// 无法到达目标 (DNS / 连接 / TLS / 超时)
    Transport,
    /// 历史记录读写失败
    Persistence,
    /// 身份缺失或无效
    Authorization,
    Internal,
}

impl PostbenchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PostbenchError::InvalidUrl(_)
            | PostbenchError::InvalidMethod(_)
            | PostbenchError::InvalidHeader(_)
            | PostbenchError::BodyTooLarge { .. }
            | PostbenchError::ForbiddenTarget(_) => ErrorKind::Validation,
            PostbenchError::Timeout(_) | PostbenchError::NetworkError(_) => ErrorKind::Transport,
            PostbenchError::IoError(_)
            | PostbenchError::JsonError(_)
            | PostbenchError::TaskFailed(_) => ErrorKind::Persistence,
            PostbenchError::Unauthorized(_) => ErrorKind::Authorization,
            PostbenchError::ConfigError(_) | PostbenchError::Other(_) => ErrorKind::Internal,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<url::ParseError> for PostbenchError {
    fn from(err: url::ParseError) -> Self {
        PostbenchError::InvalidUrl(err.to_string())
    }
}

impl From<tokio::task::JoinError> for PostbenchError {
    fn from(err: tokio::task::JoinError) -> Self {
        PostbenchError::TaskFailed(err.to_string())
    }
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for PostbenchError {
    fn from(err: anyhow::Error) -> Self {
        PostbenchError::Other(err.to_string())
    }
}

/// Result type for postbench crate
pub type Result<T> = std::result::Result<T, PostbenchError>;
