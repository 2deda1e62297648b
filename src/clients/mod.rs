pub mod analysis_api;
pub mod http_client;

pub use analysis_api::{AnalysisApi, ANALYZE_ASYNC_PATH, ANALYZE_RESULT_PATH};
pub use http_client::HttpAnalysisClient;
