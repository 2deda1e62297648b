/// 分析服务接口
///
/// 对外部分析服务的原始 HTTP 能力做一层抽象，返回的是线上格式；
/// 状态解释和轮询策略由 `services::JobClient` 负责
use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    AnalysisRequest, AnalysisResult, JobStatusResponse, ResultEnvelope, StartJobResponse,
};

pub const ANALYZE_DIRECT_PATH: &str = "/api/v1/analyze/real";
pub const ANALYZE_ASYNC_PATH: &str = "/api/v1/analyze/async";
pub const ANALYZE_STATUS_PATH: &str = "/api/v1/analyze/status";
pub const ANALYZE_RESULT_PATH: &str = "/api/v1/analyze/result";
pub const HEALTH_PATH: &str = "/api/v1/health";

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// `POST /api/v1/analyze/real`，同步返回分析结果
    async fn analyze_direct(&self, request: &AnalysisRequest) -> AppResult<AnalysisResult>;

    /// `POST /api/v1/analyze/async`
    async fn start_job(&self, request: &AnalysisRequest) -> AppResult<StartJobResponse>;

    /// `GET /api/v1/analyze/status/{session_id}`
    async fn job_status(&self, session_id: &str) -> AppResult<JobStatusResponse>;

    /// `GET /api/v1/analyze/result/{session_id}`，结果包在 `{ success, data }` 里
    async fn job_result(&self, session_id: &str) -> AppResult<ResultEnvelope>;

    /// `GET /api/v1/health`，任何失败都视为不健康
    async fn health_check(&self) -> bool;
}
