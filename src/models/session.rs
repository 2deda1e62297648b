use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{AnalysisError, ErrorInfo};
use crate::models::result::AnalysisResult;
use crate::models::stage::{default_stages, AgentStage, StageStatus};

/// 分析模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// 直接调用同步分析接口
    #[default]
    Fast,
    /// 启动异步多 agent 任务并轮询
    Deep,
}

impl Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMode::Fast => f.write_str("fast"),
            AnalysisMode::Deep => f.write_str("deep"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(AnalysisMode::Fast),
            "deep" => Ok(AnalysisMode::Deep),
            other => Err(AnalysisError::Config(format!(
                "未知的分析模式 '{}'，可选值: fast / deep",
                other
            ))),
        }
    }
}

/// 一次分析运行的全部可见状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSession {
    pub mode: AnalysisMode,
    pub stages: Vec<AgentStage>,
    pub result: Option<AnalysisResult>,
    pub error: Option<ErrorInfo>,
    pub status_message: Option<String>,
    pub is_running: bool,
}

impl AnalysisSession {
    /// 空闲会话：所有阶段 Pending
    pub fn idle(mode: AnalysisMode) -> Self {
        Self {
            mode,
            stages: default_stages(),
            result: None,
            error: None,
            status_message: None,
            is_running: false,
        }
    }

    /// 新开始的会话
    pub fn begin(mode: AnalysisMode) -> Self {
        Self {
            is_running: true,
            ..Self::idle(mode)
        }
    }

    /// 成功结束：所有阶段强制 Complete
    pub fn succeed(&mut self, result: AnalysisResult) {
        for stage in self.stages.iter_mut() {
            stage.mark_complete();
        }
        self.result = Some(result);
        self.error = None;
        self.status_message = None;
        self.is_running = false;
    }

    /// 失败结束：正在运行的阶段标记为 Failed
    pub fn fail(&mut self, err: &AnalysisError) {
        for stage in self.stages.iter_mut() {
            stage.mark_failed();
        }
        self.result = None;
        self.error = Some(err.to_info());
        self.status_message = None;
        self.is_running = false;
    }

    pub fn stage_statuses(&self) -> Vec<StageStatus> {
        self.stages.iter().map(|s| s.status).collect()
    }

    pub fn all_stages(&self, status: StageStatus) -> bool {
        self.stages.iter().all(|s| s.status == status)
    }

    /// 检查终态是否自洽
    ///
    /// - result 和 error 不会同时存在
    /// - 有 result 时所有阶段都是 Complete
    /// - 不在运行时不会有阶段停留在 Running
    pub fn is_consistent(&self) -> bool {
        if self.result.is_some() && self.error.is_some() {
            return false;
        }
        if self.result.is_some() && !self.all_stages(StageStatus::Complete) {
            return false;
        }
        if !self.is_running && self.stages.iter().any(|s| s.status == StageStatus::Running) {
            return false;
        }
        true
    }
}
