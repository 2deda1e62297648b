pub mod job;
pub mod loaders;
pub mod request;
pub mod result;
pub mod session;
pub mod stage;

pub use job::{JobHandle, JobStatus, JobStatusResponse, StartJobResponse};
pub use loaders::{load_request, parse_request};
pub use request::AnalysisRequest;
pub use result::{AnalysisResult, ProfileSummary, ResultEnvelope};
pub use session::{AnalysisMode, AnalysisSession};
pub use stage::{default_stages, AgentStage, StageStatus};
