//! 阶段进度模拟 - 业务能力层
//!
//! 后端不会上报每个 agent 阶段的真实进度，这里根据时间推算出阶段变化，
//! 让界面可以展示逐步推进的效果。
//!
//! - 快速模式：逐个阶段 Running → 随机等待 → Complete
//! - 深度模式：按已用时间计算目标阶段 `min(t / seconds_per_stage, N - 1)`

use std::time::Duration;

use rand::Rng;

use crate::models::AgentStage;

/// 阶段时间参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    /// 快速模式每个阶段的最短等待
    pub min_delay: Duration,
    /// 快速模式每个阶段的最长等待
    pub max_delay: Duration,
    /// 深度模式每个阶段大约持续的秒数
    pub seconds_per_stage: u64,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(1500),
            max_delay: Duration::from_millis(2500),
            seconds_per_stage: 6,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressSimulator {
    timing: StageTiming,
}

impl ProgressSimulator {
    pub fn new(timing: StageTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> StageTiming {
        self.timing
    }

    /// 快速模式下一个阶段的等待时间，在 `[min_delay, max_delay]` 内均匀分布
    pub fn stage_delay(&self) -> Duration {
        let min = self.timing.min_delay.as_millis() as u64;
        let max = self.timing.max_delay.as_millis() as u64;
        if min >= max {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// 深度模式的阶段跟踪器
    pub fn deep_tracker(&self) -> ElapsedStageTracker {
        ElapsedStageTracker::new(self.timing.seconds_per_stage)
    }
}

/// 根据已用时间计算目标阶段下标
pub fn target_stage_index(elapsed: Duration, seconds_per_stage: u64, stage_count: usize) -> usize {
    if stage_count == 0 {
        return 0;
    }
    let per_stage = seconds_per_stage.max(1);
    let index = (elapsed.as_secs() / per_stage) as usize;
    index.min(stage_count - 1)
}

/// 深度模式的阶段推进器
///
/// 对非递减的时间序列单调推进，重复调用不会回退
#[derive(Debug, Clone)]
pub struct ElapsedStageTracker {
    seconds_per_stage: u64,
    current: usize,
}

impl ElapsedStageTracker {
    pub fn new(seconds_per_stage: u64) -> Self {
        Self {
            seconds_per_stage,
            current: 0,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// 把第一个阶段标记为 Running
    pub fn begin(&mut self, stages: &mut [AgentStage]) {
        self.current = 0;
        if let Some(first) = stages.first_mut() {
            first.mark_running();
        }
    }

    /// 按已用时间推进阶段
    ///
    /// 目标阶段超过当前阶段时，`[current, target)` 标记为 Complete，目标阶段标记为 Running。
    /// 发生推进时返回新的阶段下标
    pub fn advance(&mut self, stages: &mut [AgentStage], elapsed: Duration) -> Option<usize> {
        if stages.is_empty() {
            return None;
        }

        let target = target_stage_index(elapsed, self.seconds_per_stage, stages.len());
        if target <= self.current {
            return None;
        }

        for stage in &mut stages[self.current..target] {
            stage.mark_complete();
        }
        stages[target].mark_running();
        self.current = target;
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_stages, StageStatus};

    fn statuses(stages: &[AgentStage]) -> Vec<StageStatus> {
        stages.iter().map(|s| s.status).collect()
    }

    #[test]
    fn test_target_index_is_clamped() {
        assert_eq!(target_stage_index(Duration::from_secs(0), 6, 4), 0);
        assert_eq!(target_stage_index(Duration::from_millis(5999), 6, 4), 0);
        assert_eq!(target_stage_index(Duration::from_secs(6), 6, 4), 1);
        assert_eq!(target_stage_index(Duration::from_secs(18), 6, 4), 3);
        assert_eq!(target_stage_index(Duration::from_secs(600), 6, 4), 3);
        assert_eq!(target_stage_index(Duration::from_secs(10), 6, 0), 0);
    }

    #[test]
    fn test_monotonic_for_non_decreasing_samples() {
        let mut stages = default_stages();
        let mut tracker = ElapsedStageTracker::new(6);
        tracker.begin(&mut stages);

        let samples = [0u64, 1, 2, 5, 6, 6, 7, 11, 13, 19, 19, 25, 40, 90, 300];
        let mut last_index = 0;
        let mut previous = statuses(&stages);

        for secs in samples {
            tracker.advance(&mut stages, Duration::from_secs(secs));
            assert!(tracker.current() >= last_index);
            last_index = tracker.current();

            let now = statuses(&stages);
            for (before, after) in previous.iter().zip(now.iter()) {
                if *before == StageStatus::Complete {
                    assert_eq!(*after, StageStatus::Complete);
                }
            }
            assert_eq!(
                now.iter().filter(|s| **s == StageStatus::Running).count(),
                1
            );
            previous = now;
        }

        assert_eq!(
            statuses(&stages),
            vec![
                StageStatus::Complete,
                StageStatus::Complete,
                StageStatus::Complete,
                StageStatus::Running
            ]
        );
    }

    #[test]
    fn test_jump_completes_skipped_stages() {
        let mut stages = default_stages();
        let mut tracker = ElapsedStageTracker::new(6);
        tracker.begin(&mut stages);

        assert_eq!(tracker.advance(&mut stages, Duration::from_secs(14)), Some(2));
        assert_eq!(
            statuses(&stages),
            vec![
                StageStatus::Complete,
                StageStatus::Complete,
                StageStatus::Running,
                StageStatus::Pending
            ]
        );
    }

    #[test]
    fn test_advance_is_idempotent() {
        let mut stages = default_stages();
        let mut tracker = ElapsedStageTracker::new(6);
        tracker.begin(&mut stages);

        assert_eq!(tracker.advance(&mut stages, Duration::from_secs(7)), Some(1));
        let snapshot = stages.clone();
        assert_eq!(tracker.advance(&mut stages, Duration::from_secs(7)), None);
        assert_eq!(tracker.advance(&mut stages, Duration::from_secs(3)), None);
        assert_eq!(stages, snapshot);
    }

    #[test]
    fn test_stage_delay_within_bounds() {
        let simulator = ProgressSimulator::new(StageTiming::default());
        for _ in 0..200 {
            let delay = simulator.stage_delay();
            assert!(delay >= Duration::from_millis(1500));
            assert!(delay <= Duration::from_millis(2500));
        }
    }

    #[test]
    fn test_fixed_stage_delay() {
        let simulator = ProgressSimulator::new(StageTiming {
            min_delay: Duration::from_millis(3),
            max_delay: Duration::from_millis(3),
            seconds_per_stage: 1,
        });
        assert_eq!(simulator.stage_delay(), Duration::from_millis(3));
    }
}
