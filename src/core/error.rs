use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("网络请求错误: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("YAML配置错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("配置加载错误: {0}")]
    SettingsError(#[from] config::ConfigError),

    #[error("API错误: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("速率限制: {0}")]
    RateLimitError(String, Option<u64>),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("K线数据不足: 需要 {required} 根, 实际 {available} 根")]
    InsufficientData { required: usize, available: usize },

    #[error("预测器错误: {0}")]
    PredictorError(String),

    #[error("数据解析错误: {0}")]
    ParseError(String),

    #[error("超时错误: 操作 '{operation}' 超时 ({timeout_ms}毫秒)")]
    TimeoutError { operation: String, timeout_ms: u64 },
}

impl BotError {
    /// 判断错误是否可以重试
    pub fn is_retryable(&self) -> bool {
        match self {
            BotError::NetworkError(_) => true,
            BotError::TimeoutError { .. } => true,
            BotError::RateLimitError(_, _) => true,
            BotError::ApiError { code, .. } => {
                // HTTP 5xx 错误通常可以重试
                *code >= 500 && *code < 600
            }
            _ => false,
        }
    }

    /// 服务端要求的等待时间(秒)，仅速率限制携带
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            BotError::RateLimitError(_, retry_after) => *retry_after,
            _ => None,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BotError::NetworkError(_) => ErrorSeverity::Warning,
            BotError::TimeoutError { .. } => ErrorSeverity::Warning,
            BotError::RateLimitError(_, _) => ErrorSeverity::Warning,
            BotError::InsufficientData { .. } => ErrorSeverity::Warning,
            BotError::AuthError(_) => ErrorSeverity::Critical,
            BotError::ConfigError(_) => ErrorSeverity::Critical,
            BotError::SettingsError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,  // 警告性错误，可能影响性能但可以重试
    Error,    // 一般错误，需要用户处理
    Critical, // 严重错误，需要立即处理
}
