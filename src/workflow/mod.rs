pub mod analysis_flow;
pub mod session_ctx;

pub use analysis_flow::AnalysisFlow;
pub use session_ctx::SessionCtx;
