use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AnalysisError, AppResult};
use crate::models::AnalysisMode;
use crate::services::{PollPolicy, StageTiming};

/// 快速模式下阶段动画与真实请求的关系
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastModeStrategy {
    /// 先播放完阶段动画，再发真实请求（总耗时为两者之和）
    #[default]
    Sequential,
    /// 动画与请求同时进行（总耗时为两者中较长者）
    Concurrent,
}

impl std::str::FromStr for FastModeStrategy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(FastModeStrategy::Sequential),
            "concurrent" => Ok(FastModeStrategy::Concurrent),
            other => Err(AnalysisError::Config(format!(
                "未知的快速模式策略 '{}'",
                other
            ))),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 分析服务地址
    pub api_base_url: String,
    /// 默认分析模式
    pub analysis_mode: AnalysisMode,
    // --- 深度模式轮询 ---
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
    /// 每个阶段大约持续的秒数
    pub seconds_per_stage: u64,
    // --- 快速模式阶段动画 ---
    pub stage_min_delay_ms: u64,
    pub stage_max_delay_ms: u64,
    pub fast_mode_strategy: FastModeStrategy,
    /// HTTP 层超时，不设置则只依赖传输层
    pub request_timeout_secs: Option<u64>,
    /// 分析请求文件（JSON 或 TOML）
    pub request_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            analysis_mode: AnalysisMode::Fast,
            poll_max_attempts: 60,
            poll_interval_ms: 2000,
            seconds_per_stage: 6,
            stage_min_delay_ms: 1500,
            stage_max_delay_ms: 2500,
            fast_mode_strategy: FastModeStrategy::Sequential,
            request_timeout_secs: None,
            request_file: "analysis_request.json".to_string(),
            verbose_logging: false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺失字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// `PATHWAY_CONFIG` 指向的 TOML 文件（如果有）+ 环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("PATHWAY_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(path)?,
            _ => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("PATHWAY_API_URL").unwrap_or(self.api_base_url),
            analysis_mode: env_parse("ANALYSIS_MODE").unwrap_or(self.analysis_mode),
            poll_max_attempts: env_parse("POLL_MAX_ATTEMPTS").unwrap_or(self.poll_max_attempts),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS").unwrap_or(self.poll_interval_ms),
            seconds_per_stage: env_parse("SECONDS_PER_STAGE").unwrap_or(self.seconds_per_stage),
            stage_min_delay_ms: env_parse("STAGE_MIN_DELAY_MS").unwrap_or(self.stage_min_delay_ms),
            stage_max_delay_ms: env_parse("STAGE_MAX_DELAY_MS").unwrap_or(self.stage_max_delay_ms),
            fast_mode_strategy: env_parse("FAST_MODE_STRATEGY").unwrap_or(self.fast_mode_strategy),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").or(self.request_timeout_secs),
            request_file: std::env::var("REQUEST_FILE").unwrap_or(self.request_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AnalysisError::Config("api_base_url 不能为空".to_string()));
        }
        if self.poll_max_attempts == 0 {
            return Err(AnalysisError::Config(
                "poll_max_attempts 必须大于 0".to_string(),
            ));
        }
        if self.seconds_per_stage == 0 {
            return Err(AnalysisError::Config(
                "seconds_per_stage 必须大于 0".to_string(),
            ));
        }
        if self.stage_min_delay_ms > self.stage_max_delay_ms {
            return Err(AnalysisError::Config(format!(
                "stage_min_delay_ms ({}) 大于 stage_max_delay_ms ({})",
                self.stage_min_delay_ms, self.stage_max_delay_ms
            )));
        }
        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.poll_max_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn stage_timing(&self) -> StageTiming {
        StageTiming {
            min_delay: Duration::from_millis(self.stage_min_delay_ms),
            max_delay: Duration::from_millis(self.stage_max_delay_ms),
            seconds_per_stage: self.seconds_per_stage,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
