//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有会话状态，决定一次分析何时开始、何时结束、何时作废。
//!
//! ## 模块划分
//!
//! ### `session_store` - 分析会话存储
//! - 持有唯一的 `AnalysisSession`，通过 watch 通道广播变化
//! - 提供 start / reset / set_mode
//! - 使用 epoch 和取消令牌丢弃过期运行
//!
//! ### `app` - 命令行应用
//! - 初始化客户端与会话存储
//! - 订阅会话输出进度，打印最终结果
//!
//! ## 层次关系
//!
//! ```text
//! app (命令行入口)
//!     ↓
//! session_store (单个会话)
//!     ↓
//! workflow::AnalysisFlow (一次分析的流程)
//!     ↓
//! services (能力层：JobClient / ProgressSimulator)
//!     ↓
//! clients (HTTP 访问)
//! ```

pub mod app;
pub mod session_store;

// 重新导出主要类型
pub use app::App;
pub use session_store::AnalysisSessionStore;
