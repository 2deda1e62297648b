use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::error::{AnalysisError, AppResult};
use crate::models::request::AnalysisRequest;

/// 请求文件格式，按扩展名判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
    Toml,
}

impl RequestFormat {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(RequestFormat::Json),
            Some("toml") => Ok(RequestFormat::Toml),
            _ => Err(AnalysisError::Validation(format!(
                "不支持的请求文件格式: {}（仅支持 .json / .toml）",
                path.display()
            ))),
        }
    }
}

/// 解析请求内容
pub fn parse_request(content: &str, format: RequestFormat) -> AppResult<AnalysisRequest> {
    let request: AnalysisRequest = match format {
        RequestFormat::Json => serde_json::from_str(content)
            .map_err(|e| AnalysisError::Validation(format!("请求 JSON 无法解析: {}", e)))?,
        RequestFormat::Toml => toml::from_str(content)
            .map_err(|e| AnalysisError::Validation(format!("请求 TOML 无法解析: {}", e)))?,
    };

    if request.nationality.trim().is_empty() {
        return Err(AnalysisError::Validation("nationality 不能为空".to_string()));
    }
    if request.goals.target_countries.is_empty() {
        return Err(AnalysisError::Validation(
            "goals.targetCountries 至少需要一个国家".to_string(),
        ));
    }

    Ok(request)
}

/// 从文件加载分析请求
pub async fn load_request(path: &Path) -> AppResult<AnalysisRequest> {
    let format = RequestFormat::from_path(path)?;
    let content = fs::read_to_string(path).await.map_err(|e| {
        AnalysisError::Validation(format!("无法读取请求文件 {}: {}", path.display(), e))
    })?;

    let request = parse_request(&content, format)?;
    info!(
        "已加载分析请求: {} (国籍 {}, 目标国家 {:?})",
        path.display(),
        request.nationality,
        request.goals.target_countries
    );
    Ok(request)
}
