//! 深度模式的任务协议类型
//!
//! 包含服务端的线上格式（`StartJobResponse` / `JobStatusResponse`）
//! 以及客户端内部使用的 `JobHandle` / `JobStatus`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::models::result::AnalysisResult;

/// 任务失败但服务端没有给出原因时使用的文案
pub const DEFAULT_FAILURE_REASON: &str = "Analysis failed";

/// 一个已启动的深度分析任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// 服务端分配的会话 ID，按不透明字符串处理
    pub session_id: String,
    pub started_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Utc::now(),
        }
    }
}

impl Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[任务 #{}]", self.session_id)
    }
}

/// 一次轮询得到的任务状态
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Processing { message: Option<String> },
    Completed(AnalysisResult),
    Failed { reason: String },
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Processing { .. } => "processing",
            JobStatus::Completed(_) => "completed",
            JobStatus::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing { .. })
    }
}

/// `POST /api/v1/analyze/async` 的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobResponse {
    #[serde(default)]
    pub success: bool,
    pub session_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// `GET /api/v1/analyze/status/{session_id}` 的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub session_id: String,
    pub status: WireJobStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl JobStatusResponse {
    /// 转换成内部状态
    ///
    /// `completed` 但没有内联结果时返回 `None`，调用方需要再去拉取完整结果
    pub fn into_status(self) -> Option<JobStatus> {
        match self.status {
            WireJobStatus::Completed => self.result.map(JobStatus::Completed),
            WireJobStatus::Failed => Some(JobStatus::Failed {
                reason: self
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string()),
            }),
            WireJobStatus::Pending | WireJobStatus::Processing => Some(JobStatus::Processing {
                message: self.message,
            }),
            WireJobStatus::Unknown => {
                tracing::warn!(
                    "任务 {} 返回未知状态，按 processing 处理",
                    self.session_id
                );
                Some(JobStatus::Processing {
                    message: self.message,
                })
            }
        }
    }
}
