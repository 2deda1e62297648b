//! 伪 agent 阶段
//!
//! 后端不会上报每个阶段的真实进度，这里的阶段只用于向用户展示流水线：
//! profile → paths → risk → synthesis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

impl StageStatus {
    /// Complete / Failed 之后不允许再变化
    pub fn is_settled(self) -> bool {
        matches!(self, StageStatus::Complete | StageStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStage {
    pub id: String,
    pub agent: String,
    pub label: String,
    pub description: String,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AgentStage {
    pub fn new(id: &str, agent: &str, label: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            agent: agent.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            status: StageStatus::Pending,
            started_at: None,
            completed_at: None,
        }
    }

    /// Pending → Running，其余情况不变。返回是否发生了变化
    pub fn mark_running(&mut self) -> bool {
        if self.status != StageStatus::Pending {
            return false;
        }
        self.status = StageStatus::Running;
        self.started_at = Some(Utc::now());
        true
    }

    /// Pending / Running → Complete
    pub fn mark_complete(&mut self) -> bool {
        if self.status.is_settled() {
            return false;
        }
        let now = Utc::now();
        self.started_at.get_or_insert(now);
        self.status = StageStatus::Complete;
        self.completed_at = Some(now);
        true
    }

    /// 只有 Running 的阶段会被标记为失败
    pub fn mark_failed(&mut self) -> bool {
        if self.status != StageStatus::Running {
            return false;
        }
        self.status = StageStatus::Failed;
        self.completed_at = Some(Utc::now());
        true
    }
}

/// 固定的四个阶段，顺序有意义
pub fn default_stages() -> Vec<AgentStage> {
    vec![
        AgentStage::new(
            "profile",
            "Profile Analyst",
            "Analyzing Your Profile",
            "Evaluating education, experience, and eligibility",
        ),
        AgentStage::new(
            "paths",
            "Path Generator",
            "Generating Mobility Paths",
            "Finding optimal routes to your destination countries",
        ),
        AgentStage::new(
            "risk",
            "Risk Assessor",
            "Assessing Risks & Blockers",
            "Evaluating potential challenges and approval probability",
        ),
        AgentStage::new(
            "synthesis",
            "Recommendation Synthesizer",
            "Synthesizing Recommendations",
            "Creating personalized action plan with citations",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stages_are_ordered_and_unique() {
        let stages = default_stages();
        let ids: Vec<&str> = stages.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(ids, vec!["profile", "paths", "risk", "synthesis"]);
        assert!(stages.iter().all(|s| s.status == StageStatus::Pending));
    }

    #[test]
    fn test_complete_never_regresses() {
        let mut stage = default_stages().remove(0);
        assert!(stage.mark_running());
        assert!(stage.mark_complete());

        assert!(!stage.mark_running());
        assert!(!stage.mark_failed());
        assert_eq!(stage.status, StageStatus::Complete);
        assert!(stage.started_at.is_some());
        assert!(stage.completed_at.is_some());
    }

    #[test]
    fn test_only_running_stage_can_fail() {
        let mut stages = default_stages();
        assert!(!stages[0].mark_failed());
        assert_eq!(stages[0].status, StageStatus::Pending);

        stages[1].mark_running();
        assert!(stages[1].mark_failed());
        assert!(!stages[1].mark_complete());
        assert_eq!(stages[1].status, StageStatus::Failed);
    }

    #[test]
    fn test_pending_can_jump_to_complete() {
        let mut stage = default_stages().remove(2);
        assert!(stage.mark_complete());
        assert_eq!(stage.started_at, stage.completed_at);
    }
}
