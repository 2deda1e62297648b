//! # Pathway Analysis
//!
//! 移民路径分析服务的异步任务客户端
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责和分析服务通信
//! - `AnalysisApi` - 服务接口抽象，测试时可替换
//! - `HttpAnalysisClient` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `JobClient` - 启动任务、查询状态、轮询到终态
//! - `ProgressSimulator` - 阶段进度模拟（快速模式随机延迟，深度模式按耗时推算）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次分析"的完整流程
//! - `SessionCtx` - 上下文封装（epoch + 模式），过期后所有写入都被丢弃
//! - `AnalysisFlow` - 快速 / 深度两种流程
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_store` - 会话存储，start / reset / set_mode
//! - `orchestrator/app` - 命令行应用
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AnalysisApi, HttpAnalysisClient};
pub use config::Config;
pub use error::{AnalysisError, AppResult, ErrorInfo, ErrorKind};
pub use models::{
    AgentStage, AnalysisMode, AnalysisRequest, AnalysisResult, AnalysisSession, JobHandle,
    JobStatus, StageStatus,
};
pub use orchestrator::{AnalysisSessionStore, App};
pub use services::{JobClient, PollPolicy, ProgressSimulator};
pub use workflow::{AnalysisFlow, SessionCtx};
