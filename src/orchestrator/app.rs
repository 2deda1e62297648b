//! 命令行应用 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：输出启动信息、创建 HTTP 客户端和会话存储、加载分析请求
//! 2. **健康检查**：服务不可用时只告警，不阻止运行
//! 3. **进度输出**：订阅会话变化，把阶段状态写入日志
//! 4. **结果输出**：分析结果以 JSON 打印到标准输出

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clients::HttpAnalysisClient;
use crate::config::Config;
use crate::models::{load_request, AgentStage, AnalysisRequest, AnalysisSession};
use crate::orchestrator::AnalysisSessionStore;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    store: Arc<AnalysisSessionStore>,
    request: AnalysisRequest,
}

impl App {
    /// 初始化应用
    ///
    /// `request_path` 为空时使用 `config.request_file`
    pub async fn initialize(config: Config, request_path: Option<PathBuf>) -> Result<Self> {
        logging::log_startup(&config);

        let client = HttpAnalysisClient::new(&config).context("创建 HTTP 客户端失败")?;
        let store = Arc::new(AnalysisSessionStore::from_config(Arc::new(client), &config));

        if !store.job_client().health_check().await {
            warn!("⚠️ 分析服务健康检查未通过: {}", config.api_base_url);
        }

        let path = request_path.unwrap_or_else(|| PathBuf::from(&config.request_file));
        info!("\n📁 正在加载分析请求...");
        let request = load_request(&path)
            .await
            .with_context(|| format!("加载分析请求失败: {}", path.display()))?;

        Ok(Self { store, request })
    }

    /// 运行一次分析并输出结果
    pub async fn run(&self) -> Result<()> {
        let watcher = self.spawn_progress_watcher();
        let outcome = self.store.start_analysis(&self.request).await;
        watcher.abort();

        logging::print_session_summary(&self.store.snapshot());

        let result = outcome.context("分析未成功完成")?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }

    /// 订阅会话，阶段状态变化时写日志
    fn spawn_progress_watcher(&self) -> JoinHandle<()> {
        let mut rx = self.store.subscribe();
        tokio::spawn(async move {
            let mut previous: Vec<AgentStage> = rx.borrow_and_update().stages.clone();
            let mut last_message: Option<String> = None;

            while rx.changed().await.is_ok() {
                let session: AnalysisSession = rx.borrow_and_update().clone();

                for stage in &session.stages {
                    let changed = previous
                        .iter()
                        .find(|p| p.id == stage.id)
                        .map_or(true, |p| p.status != stage.status);
                    if changed {
                        logging::log_stage_change(stage);
                    }
                }

                if session.status_message != last_message {
                    if let Some(message) = &session.status_message {
                        info!("💬 {}", message);
                    }
                    last_message = session.status_message.clone();
                }

                previous = session.stages;
            }
        })
    }
}
