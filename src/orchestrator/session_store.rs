//! 分析会话存储 - 编排层
//!
//! ## 职责
//!
//! 持有唯一的 `AnalysisSession`，对外暴露 start / reset / set_mode，保证终态一致：
//!
//! 1. **单次运行**：已有会话运行中时拒绝新的 `start_analysis`（`AlreadyRunning`）
//! 2. **epoch 失效**：每次 start / reset 都会推进 epoch，过期运行的回调全部丢弃
//! 3. **取消**：reset 同时取消正在进行的请求和定时器
//! 4. **终态**：成功时所有阶段 Complete；失败时 Running 阶段变为 Failed
//!
//! 会话的每次变化都通过 `watch` 通道广播给视图层

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clients::AnalysisApi;
use crate::config::Config;
use crate::error::{AnalysisError, AppResult};
use crate::models::{AnalysisMode, AnalysisRequest, AnalysisResult, AnalysisSession};
use crate::services::JobClient;
use crate::workflow::{AnalysisFlow, SessionCtx};

pub struct AnalysisSessionStore {
    flow: AnalysisFlow,
    session: Arc<watch::Sender<AnalysisSession>>,
    epoch: Arc<AtomicU64>,
    cancel: Mutex<CancellationToken>,
}

impl AnalysisSessionStore {
    pub fn new(flow: AnalysisFlow, mode: AnalysisMode) -> Self {
        let (tx, _rx) = watch::channel(AnalysisSession::idle(mode));
        Self {
            flow,
            session: Arc::new(tx),
            epoch: Arc::new(AtomicU64::new(0)),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// 由配置构建，默认模式取 `config.analysis_mode`
    pub fn from_config(api: Arc<dyn AnalysisApi>, config: &Config) -> Self {
        let flow = AnalysisFlow::from_config(JobClient::new(api), config);
        Self::new(flow, config.analysis_mode)
    }

    pub fn job_client(&self) -> &JobClient {
        self.flow.job_client()
    }

    /// 订阅会话变化
    pub fn subscribe(&self) -> watch::Receiver<AnalysisSession> {
        self.session.subscribe()
    }

    pub fn snapshot(&self) -> AnalysisSession {
        self.session.borrow().clone()
    }

    pub fn mode(&self) -> AnalysisMode {
        self.session.borrow().mode
    }

    pub fn is_running(&self) -> bool {
        self.session.borrow().is_running
    }

    /// 切换模式，运行中不允许切换
    pub fn set_mode(&self, mode: AnalysisMode) -> AppResult<()> {
        let mut rejected = false;
        self.session.send_if_modified(|s| {
            if s.is_running {
                rejected = true;
                return false;
            }
            if s.mode == mode {
                return false;
            }
            s.mode = mode;
            true
        });

        if rejected {
            warn!("分析进行中，忽略模式切换 → {}", mode);
            return Err(AnalysisError::AlreadyRunning);
        }
        Ok(())
    }

    /// 开始一次分析
    ///
    /// 成功返回结果；失败返回错误，同时错误也会写入会话。
    /// 运行期间会话被重置时返回 `Cancelled`，会话不受影响
    pub async fn start_analysis(&self, request: &AnalysisRequest) -> AppResult<AnalysisResult> {
        let cancel = CancellationToken::new();
        let mut claimed: Option<(u64, AnalysisMode)> = None;

        // epoch、取消令牌和会话在同一把锁内切换，reset 也遵循同样的顺序
        self.session.send_if_modified(|s| {
            if s.is_running {
                return false;
            }
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = cancel.clone();
            claimed = Some((epoch, s.mode));
            *s = AnalysisSession::begin(s.mode);
            true
        });

        let Some((epoch, mode)) = claimed else {
            warn!("已有分析正在进行中，拒绝新的请求");
            return Err(AnalysisError::AlreadyRunning);
        };

        let ctx = SessionCtx::new(self.session.clone(), self.epoch.clone(), epoch, mode);
        info!("{} ▶️ 开始分析", ctx);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
            result = self.flow.run(&ctx, request) => result,
        };

        match outcome {
            Ok(result) => {
                let published = result.clone();
                if ctx.update(move |s| s.succeed(published)) {
                    info!("{} ✅ 分析完成", ctx);
                    Ok(result)
                } else {
                    info!("{} 会话已重置，丢弃分析结果", ctx);
                    Err(AnalysisError::Cancelled)
                }
            }
            Err(AnalysisError::Cancelled) => {
                info!("{} ⏹️ 分析已取消", ctx);
                Err(AnalysisError::Cancelled)
            }
            Err(e) => {
                if ctx.update(|s| s.fail(&e)) {
                    error!("{} ❌ 分析失败 ({}): {}", ctx, e.kind(), e);
                    Err(e)
                } else {
                    info!("{} 会话已重置，丢弃错误: {}", ctx, e);
                    Err(AnalysisError::Cancelled)
                }
            }
        }
    }

    /// 重置会话，任何时候都可以调用
    ///
    /// 正在进行的运行会被取消，之后到达的响应不会再修改会话
    pub fn reset_analysis(&self) {
        let mut epoch = 0;
        self.session.send_modify(|s| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            self.cancel
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .cancel();
            *s = AnalysisSession::idle(s.mode);
        });
        info!("会话已重置 (epoch #{})", epoch);
    }
}
