//! 分析流程 - 流程层
//!
//! 核心职责：定义"一次分析"的完整流程，只负责推进阶段，不决定会话终态
//!
//! - 快速模式：阶段动画 + `POST /analyze/real`
//! - 深度模式：`POST /analyze/async` → 轮询 status → 结果，阶段随已用时间推进

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::{Config, FastModeStrategy};
use crate::error::{AnalysisError, AppResult};
use crate::models::{AnalysisMode, AnalysisRequest, AnalysisResult, JobStatus};
use crate::services::{JobClient, PollPolicy, ProgressSimulator};
use crate::workflow::session_ctx::SessionCtx;

pub const DEEP_START_MESSAGE: &str = "Starting deep analysis with multi-agent system...";

/// 深度模式轮询时的状态文案
pub fn deep_progress_message(elapsed_secs: u64, status: &JobStatus) -> String {
    format!("Analyzing... ({}s) - {}", elapsed_secs, status.label())
}

#[derive(Clone)]
pub struct AnalysisFlow {
    job_client: JobClient,
    simulator: ProgressSimulator,
    poll_policy: PollPolicy,
    fast_strategy: FastModeStrategy,
}

impl AnalysisFlow {
    pub fn new(
        job_client: JobClient,
        simulator: ProgressSimulator,
        poll_policy: PollPolicy,
        fast_strategy: FastModeStrategy,
    ) -> Self {
        Self {
            job_client,
            simulator,
            poll_policy,
            fast_strategy,
        }
    }

    pub fn from_config(job_client: JobClient, config: &Config) -> Self {
        Self::new(
            job_client,
            ProgressSimulator::new(config.stage_timing()),
            config.poll_policy(),
            config.fast_mode_strategy,
        )
    }

    pub fn job_client(&self) -> &JobClient {
        &self.job_client
    }

    pub async fn run(&self, ctx: &SessionCtx, request: &AnalysisRequest) -> AppResult<AnalysisResult> {
        match ctx.mode {
            AnalysisMode::Fast => self.run_fast(ctx, request).await,
            AnalysisMode::Deep => self.run_deep(ctx, request).await,
        }
    }

    // ========== 快速模式 ==========

    async fn run_fast(&self, ctx: &SessionCtx, request: &AnalysisRequest) -> AppResult<AnalysisResult> {
        match self.fast_strategy {
            FastModeStrategy::Sequential => {
                self.simulate_stages(ctx).await?;
                info!("{} 📤 阶段动画结束，调用同步分析接口", ctx);
                self.job_client.analyze_direct(request).await
            }
            FastModeStrategy::Concurrent => self.run_fast_concurrent(ctx, request).await,
        }
    }

    /// 动画和请求同时进行；请求失败时立即结束，成功时等待动画播放完
    async fn run_fast_concurrent(
        &self,
        ctx: &SessionCtx,
        request: &AnalysisRequest,
    ) -> AppResult<AnalysisResult> {
        let simulation = self.simulate_stages(ctx);
        let call = self.job_client.analyze_direct(request);
        tokio::pin!(simulation);
        tokio::pin!(call);

        let mut simulation_done = false;
        let outcome = loop {
            tokio::select! {
                biased;
                sim = &mut simulation, if !simulation_done => {
                    sim?;
                    simulation_done = true;
                }
                res = &mut call => break res,
            }
        };

        let result = outcome?;
        if !simulation_done {
            debug!("{} 请求已返回，等待阶段动画结束", ctx);
            simulation.await?;
        }
        Ok(result)
    }

    /// 逐个阶段：Running → 随机等待 → Complete
    async fn simulate_stages(&self, ctx: &SessionCtx) -> AppResult<()> {
        for index in 0..ctx.stage_count() {
            ctx.update(|s| {
                if let Some(stage) = s.stages.get_mut(index) {
                    stage.mark_running();
                }
            });

            sleep(self.simulator.stage_delay()).await;
            if !ctx.is_current() {
                return Err(AnalysisError::Cancelled);
            }

            ctx.update(|s| {
                if let Some(stage) = s.stages.get_mut(index) {
                    stage.mark_complete();
                    debug!("阶段 {} 完成", stage.id);
                }
            });
        }
        Ok(())
    }

    // ========== 深度模式 ==========

    async fn run_deep(&self, ctx: &SessionCtx, request: &AnalysisRequest) -> AppResult<AnalysisResult> {
        let clock = Instant::now();
        let mut tracker = self.simulator.deep_tracker();

        ctx.update(|s| {
            tracker.begin(&mut s.stages);
            s.status_message = Some(DEEP_START_MESSAGE.to_string());
        });

        let handle = self.job_client.start(request).await?;
        if !ctx.is_current() {
            return Err(AnalysisError::Cancelled);
        }

        let result = self
            .job_client
            .poll_until_resolved(&handle, self.poll_policy, |status, _attempt| {
                let elapsed = clock.elapsed();
                ctx.update(|s| {
                    s.status_message = Some(deep_progress_message(elapsed.as_secs(), status));
                    if let Some(index) = tracker.advance(&mut s.stages, elapsed) {
                        info!(
                            "{} ➡️ 进入阶段 {} ({})",
                            ctx, s.stages[index].id, s.stages[index].agent
                        );
                    }
                });
            })
            .await?;

        if !ctx.is_current() {
            return Err(AnalysisError::Cancelled);
        }
        Ok(result)
    }
}
