//! 会话上下文
//!
//! 封装"我在写哪一次运行的会话"这一信息。
//! 每次 `start_analysis` 都会分配一个新的 epoch，异步回调只在 epoch 仍然有效时才会写入会话

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{AnalysisMode, AnalysisSession};

#[derive(Debug, Clone)]
pub struct SessionCtx {
    session: Arc<watch::Sender<AnalysisSession>>,
    current_epoch: Arc<AtomicU64>,
    /// 本次运行分配到的 epoch
    pub epoch: u64,
    pub mode: AnalysisMode,
}

impl SessionCtx {
    pub fn new(
        session: Arc<watch::Sender<AnalysisSession>>,
        current_epoch: Arc<AtomicU64>,
        epoch: u64,
        mode: AnalysisMode,
    ) -> Self {
        Self {
            session,
            current_epoch,
            epoch,
            mode,
        }
    }

    /// 会话是否仍属于本次运行（没有被重置或被新的运行取代）
    pub fn is_current(&self) -> bool {
        self.current_epoch.load(Ordering::SeqCst) == self.epoch
    }

    /// 仅在 epoch 有效时修改会话，返回是否写入
    ///
    /// epoch 检查与写入在同一把锁内完成，过期的回调会被静默丢弃
    pub fn update<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut AnalysisSession),
    {
        self.session.send_if_modified(|session| {
            if !self.is_current() {
                return false;
            }
            modify(session);
            true
        })
    }

    pub fn stage_count(&self) -> usize {
        self.session.borrow().stages.len()
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[会话 #{} 模式#{}]", self.epoch, self.mode)
    }
}
