pub mod job_client;
pub mod progress;

pub use job_client::{JobClient, PollPolicy};
pub use progress::{target_stage_index, ElapsedStageTracker, ProgressSimulator, StageTiming};
