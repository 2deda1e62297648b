//! 任务客户端 - 业务能力层
//!
//! 封装深度模式的 start → poll → resolve 协议，以及快速模式的直接调用。
//! 只做网络 I/O，不持有任何会话状态

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clients::{AnalysisApi, ANALYZE_ASYNC_PATH, ANALYZE_RESULT_PATH};
use crate::error::{AnalysisError, AppResult, ErrorKind};
use crate::models::{AnalysisRequest, AnalysisResult, JobHandle, JobStatus};

/// 轮询策略：固定间隔，不做指数退避
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_millis(2000),
        }
    }
}

impl PollPolicy {
    /// 最坏情况下的总等待时间
    pub fn worst_case(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

#[derive(Clone)]
pub struct JobClient {
    api: Arc<dyn AnalysisApi>,
}

impl JobClient {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self { api }
    }

    /// 快速模式：同步分析
    pub async fn analyze_direct(&self, request: &AnalysisRequest) -> AppResult<AnalysisResult> {
        debug!("调用同步分析接口");
        self.api.analyze_direct(request).await
    }

    /// 启动深度分析任务
    pub async fn start(&self, request: &AnalysisRequest) -> AppResult<JobHandle> {
        let response = self.api.start_job(request).await?;

        if !response.success || response.session_id.trim().is_empty() {
            let message = if response.message.trim().is_empty() {
                "服务端未能启动分析任务".to_string()
            } else {
                response.message
            };
            return Err(AnalysisError::Server {
                endpoint: ANALYZE_ASYNC_PATH.to_string(),
                status: None,
                message: Some(message),
            });
        }

        let handle = JobHandle::new(response.session_id);
        info!("{} 🚀 深度分析任务已启动", handle);
        Ok(handle)
    }

    /// 查询一次任务状态
    ///
    /// 状态为 completed 但没有内联结果时，再去拉取完整结果
    pub async fn fetch_status(&self, handle: &JobHandle) -> AppResult<JobStatus> {
        let response = self.api.job_status(&handle.session_id).await?;

        match response.into_status() {
            Some(status) => Ok(status),
            None => {
                debug!("{} 状态已完成但没有内联结果，拉取完整结果", handle);
                let result = self.fetch_result(handle).await?;
                Ok(JobStatus::Completed(result))
            }
        }
    }

    /// 拉取已完成任务的完整结果
    ///
    /// 外壳报告失败或没有 `data` 时视为服务端错误
    pub async fn fetch_result(&self, handle: &JobHandle) -> AppResult<AnalysisResult> {
        let envelope = self.api.job_result(&handle.session_id).await?;
        envelope.into_data().ok_or_else(|| {
            warn!("{} 结果接口没有返回数据", handle);
            AnalysisError::Server {
                endpoint: ANALYZE_RESULT_PATH.to_string(),
                status: None,
                message: Some("服务端没有返回分析结果".to_string()),
            }
        })
    }

    /// 轮询直到任务结束
    ///
    /// - `Completed` 立即返回结果
    /// - `Failed` 立即返回 `JobFailed`
    /// - 轮询 `max_attempts` 次仍未结束返回 `JobTimeout`
    ///
    /// 网络错误只消耗一次轮询机会，在下一次轮询时自然重试；
    /// 其他错误（服务端错误、解析失败）直接终止
    pub async fn poll_until_resolved<F>(
        &self,
        handle: &JobHandle,
        policy: PollPolicy,
        mut on_status: F,
    ) -> AppResult<AnalysisResult>
    where
        F: FnMut(&JobStatus, u32) + Send,
    {
        for attempt in 1..=policy.max_attempts {
            match self.fetch_status(handle).await {
                Ok(status) => {
                    debug!(
                        "{} 第 {}/{} 次轮询: {}",
                        handle,
                        attempt,
                        policy.max_attempts,
                        status.label()
                    );
                    on_status(&status, attempt);

                    match status {
                        JobStatus::Completed(result) => {
                            info!("{} ✓ 任务完成 (第 {} 次轮询)", handle, attempt);
                            return Ok(result);
                        }
                        JobStatus::Failed { reason } => {
                            warn!("{} ❌ 任务失败: {}", handle, reason);
                            return Err(AnalysisError::job_failed(reason));
                        }
                        JobStatus::Processing { .. } => {}
                    }
                }
                Err(e) if e.kind() == ErrorKind::Network => {
                    warn!(
                        "{} ⚠️ 第 {} 次轮询网络错误，等待下一次轮询: {}",
                        handle, attempt, e
                    );
                }
                Err(e) => return Err(e),
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        warn!(
            "{} ⏱️ 轮询 {} 次后仍未完成",
            handle, policy.max_attempts
        );
        Err(AnalysisError::JobTimeout {
            attempts: policy.max_attempts,
        })
    }

    pub async fn health_check(&self) -> bool {
        self.api.health_check().await
    }
}
