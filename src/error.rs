//! 错误类型
//!
//! 所有网络 / 任务失败最终都会折叠成会话上的一个 `ErrorInfo`，
//! 但 `ErrorKind` 会被保留下来，便于日志和诊断。

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 分析流程错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 传输层失败（DNS、连接被拒、HTTP 层超时）
    #[error("网络请求失败 ({endpoint}): {source}")]
    Network {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    /// 服务端拒绝请求：非 2xx，或 2xx 但业务上报告失败（此时没有 HTTP 状态码）
    #[error(
        "服务端返回错误 ({endpoint}): status={}, message={}",
        .status.map_or_else(|| "n/a".to_string(), |s| s.to_string()),
        .message.as_deref().unwrap_or("<empty>")
    )]
    Server {
        endpoint: String,
        status: Option<u16>,
        message: Option<String>,
    },

    /// 响应体无法解析
    #[error("响应解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    /// 任务以 failed 状态结束
    #[error("分析任务失败: {reason}")]
    JobFailed { reason: String },

    /// 轮询次数耗尽仍未结束
    #[error("分析任务超时: 已轮询 {attempts} 次")]
    JobTimeout { attempts: u32 },

    /// 请求参数不合法
    #[error("请求参数无效: {0}")]
    Validation(String),

    /// 已有会话在运行
    #[error("已有分析正在进行中")]
    AlreadyRunning,

    /// 会话被重置，本次运行的结果被丢弃
    #[error("分析已被取消")]
    Cancelled,

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// 错误种类，UI 只显示文案，但诊断时需要区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Server,
    Decode,
    JobFailed,
    JobTimeout,
    Validation,
    AlreadyRunning,
    Cancelled,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Decode => "decode",
            ErrorKind::JobFailed => "job_failed",
            ErrorKind::JobTimeout => "job_timeout",
            ErrorKind::Validation => "validation",
            ErrorKind::AlreadyRunning => "already_running",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

/// 会话上保存的错误信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Network { .. } => ErrorKind::Network,
            AnalysisError::Server { .. } => ErrorKind::Server,
            AnalysisError::Decode { .. } => ErrorKind::Decode,
            AnalysisError::JobFailed { .. } => ErrorKind::JobFailed,
            AnalysisError::JobTimeout { .. } => ErrorKind::JobTimeout,
            AnalysisError::Validation(_) => ErrorKind::Validation,
            AnalysisError::AlreadyRunning => ErrorKind::AlreadyRunning,
            AnalysisError::Cancelled => ErrorKind::Cancelled,
            AnalysisError::Config(_) => ErrorKind::Config,
        }
    }

    /// 面向用户的文案
    ///
    /// 任务失败直接使用服务端给出的原因，不加前缀
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::JobFailed { reason } => reason.clone(),
            AnalysisError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind(),
            message: self.user_message(),
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::Config(err.to_string())
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Config(err.to_string())
    }
}

// ========== 便捷构造函数 ==========

impl AnalysisError {
    /// 创建网络错误
    pub fn network(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AnalysisError::Network {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建解析错误
    pub fn decode(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AnalysisError::Decode {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建任务失败错误
    pub fn job_failed(reason: impl Into<String>) -> Self {
        AnalysisError::JobFailed {
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AnalysisError>;
