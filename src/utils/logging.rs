/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{AgentStage, AnalysisSession, StageStatus};

/// 初始化 tracing
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pathway_analysis={},warn", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 分析服务: {}", config.api_base_url);
    info!("🧭 分析模式: {}", config.analysis_mode);
    info!(
        "⏱️ 轮询策略: 最多 {} 次 / 每 {}ms",
        config.poll_max_attempts, config.poll_interval_ms
    );
    info!("{}", "=".repeat(60));
}

fn status_icon(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "⏳",
        StageStatus::Running => "🔄",
        StageStatus::Complete => "✅",
        StageStatus::Failed => "❌",
    }
}

/// 记录阶段变化
pub fn log_stage_change(stage: &AgentStage) {
    info!(
        "{} [{}] {} - {}",
        status_icon(stage.status),
        stage.agent,
        stage.label,
        stage.description
    );
}

/// 打印会话最终统计
pub fn print_session_summary(session: &AnalysisSession) {
    info!("\n{}", "=".repeat(60));
    info!("📊 分析结束 ({} 模式)", session.mode);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));

    for stage in &session.stages {
        info!("{} {}", status_icon(stage.status), stage.label);
    }

    match (&session.result, &session.error) {
        (Some(result), _) => {
            info!("✅ 推荐路径: {} 条", result.ranked_paths().len());
            if let Some(top) = result.top_path() {
                info!("🥇 首选路径: {}", truncate_text(&top.name, 60));
            }
        }
        (None, Some(error)) => warn!("❌ 失败: {}", truncate_text(&error.to_string(), 200)),
        (None, None) => warn!("⚠️ 会话没有结果"),
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("签证路径分析", 2), "签证...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
