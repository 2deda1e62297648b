/// 分析服务 HTTP 客户端
///
/// 基于 reqwest 实现 `AnalysisApi`
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::clients::analysis_api::{
    AnalysisApi, ANALYZE_ASYNC_PATH, ANALYZE_DIRECT_PATH, ANALYZE_RESULT_PATH,
    ANALYZE_STATUS_PATH, HEALTH_PATH,
};
use crate::config::Config;
use crate::error::{AnalysisError, AppResult};
use crate::models::{
    AnalysisRequest, AnalysisResult, JobStatusResponse, ResultEnvelope, StartJobResponse,
};
use crate::utils::logging::truncate_text;

/// 服务端错误文案的最大展示长度
const MAX_SERVER_MESSAGE_LEN: usize = 200;

pub struct HttpAnalysisClient {
    client: Client,
    base_url: Url,
}

impl HttpAnalysisClient {
    /// 根据配置创建客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;

        Self::with_reqwest_client(client, &config.api_base_url)
    }

    /// 使用已有的 reqwest 客户端
    pub fn with_reqwest_client(client: Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AnalysisError::Config(format!("无效的服务地址 '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AnalysisError::Config(format!(
                "服务地址不能作为基础 URL: {}",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 拼接接口地址，session_id 作为单独的路径段进行转义
    pub fn endpoint(&self, path: &str, session_id: Option<&str>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AnalysisError::Config(format!("服务地址不能作为基础 URL: {}", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = session_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint(path, None)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AnalysisError::network(path, e))?;

        read_json(path, response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session_id: Option<&str>,
    ) -> AppResult<T> {
        let url = self.endpoint(path, session_id)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AnalysisError::network(path, e))?;

        read_json(path, response).await
    }
}

/// 读取响应体并解码
async fn read_json<T: DeserializeOwned>(endpoint: &str, response: reqwest::Response) -> AppResult<T> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| AnalysisError::network(endpoint, e))?;

    decode_body(endpoint, status, &body)
}

/// 非 2xx 转成 `Server`，无法解析转成 `Decode`
pub fn decode_body<T: DeserializeOwned>(endpoint: &str, status: u16, body: &str) -> AppResult<T> {
    if !(200..300).contains(&status) {
        let message = extract_server_message(body);
        warn!(
            "接口 {} 返回 {}: {}",
            endpoint,
            status,
            message.as_deref().unwrap_or("<empty>")
        );
        return Err(AnalysisError::Server {
            endpoint: endpoint.to_string(),
            status: Some(status),
            message,
        });
    }

    serde_json::from_str(body).map_err(|e| AnalysisError::decode(endpoint, e))
}

/// 从错误响应体中提取服务端文案
///
/// 优先 `detail`（FastAPI 默认格式），其次 `message` / `error`，最后使用原始文本
pub fn extract_server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(JsonValue::Object(map)) = serde_json::from_str::<JsonValue>(trimmed) {
        for key in ["detail", "message", "error"] {
            if let Some(JsonValue::String(msg)) = map.get(key) {
                if !msg.trim().is_empty() {
                    return Some(msg.trim().to_string());
                }
            }
        }
    }

    Some(truncate_text(trimmed, MAX_SERVER_MESSAGE_LEN))
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn analyze_direct(&self, request: &AnalysisRequest) -> AppResult<AnalysisResult> {
        self.post_json(ANALYZE_DIRECT_PATH, request).await
    }

    async fn start_job(&self, request: &AnalysisRequest) -> AppResult<StartJobResponse> {
        self.post_json(ANALYZE_ASYNC_PATH, request).await
    }

    async fn job_status(&self, session_id: &str) -> AppResult<JobStatusResponse> {
        self.get_json(ANALYZE_STATUS_PATH, Some(session_id)).await
    }

    async fn job_result(&self, session_id: &str) -> AppResult<ResultEnvelope> {
        self.get_json(ANALYZE_RESULT_PATH, Some(session_id)).await
    }

    async fn health_check(&self) -> bool {
        match self.get_json::<JsonValue>(HEALTH_PATH, None).await {
            Ok(_) => true,
            Err(e) => {
                debug!("健康检查失败: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpAnalysisClient {
        HttpAnalysisClient::with_reqwest_client(Client::new(), base).unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let c = client("http://localhost:8000");
        let url = c.endpoint(ANALYZE_DIRECT_PATH, None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/analyze/real");
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let c = client("https://example.com/pathways/");
        let url = c.endpoint(ANALYZE_STATUS_PATH, Some("abc-123")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/pathways/api/v1/analyze/status/abc-123"
        );
    }

    #[test]
    fn test_session_id_is_escaped() {
        let c = client("http://localhost:8000");
        let url = c.endpoint(ANALYZE_RESULT_PATH, Some("a/b c")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/analyze/result/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = HttpAnalysisClient::with_reqwest_client(Client::new(), "not a url")
            .err()
            .unwrap();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_extract_server_message() {
        assert_eq!(
            extract_server_message(r#"{"detail":"Session not found"}"#).as_deref(),
            Some("Session not found")
        );
        assert_eq!(
            extract_server_message(r#"{"error":"quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(
            extract_server_message("Bad Gateway").as_deref(),
            Some("Bad Gateway")
        );
        assert_eq!(extract_server_message("   "), None);
    }

    #[test]
    fn test_decode_result_envelope() {
        let envelope: ResultEnvelope = decode_body(
            ANALYZE_RESULT_PATH,
            200,
            r#"{"success": true, "data": {"sessionId": "s-9", "score": 99}}"#,
        )
        .unwrap();

        let result = envelope.into_data().unwrap();
        assert_eq!(result.session_id(), Some("s-9"));
        assert_eq!(result.field("score"), Some(&serde_json::json!(99)));
        assert!(result.field("success").is_none());
    }

    #[test]
    fn test_decode_crewai_status_with_text_summary() {
        let body = r#"{
            "session_id": "s-2",
            "status": "completed",
            "created_at": "2025-01-01T10:00:00",
            "result": {
                "sessionId": "s-2",
                "profileSummary": "Analysis complete. See detailed recommendation below.",
                "rankedPaths": [{ "path_id": "eu_blue_card", "timeline": "6-9 months" }],
                "analysisMode": "crewai"
            }
        }"#;

        let response: JobStatusResponse = decode_body(ANALYZE_STATUS_PATH, 200, body).unwrap();
        let result = response.result.unwrap();
        assert_eq!(result.field("analysisMode"), Some(&serde_json::json!("crewai")));
    }

    #[test]
    fn test_decode_non_success_status_is_server_error() {
        let err = decode_body::<ResultEnvelope>(
            ANALYZE_RESULT_PATH,
            404,
            r#"{"detail": "Session not found"}"#,
        )
        .unwrap_err();

        match err {
            AnalysisError::Server {
                status, message, ..
            } => {
                assert_eq!(status, Some(404));
                assert_eq!(message.as_deref(), Some("Session not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    /// 需要本地启动分析服务：cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_health_check_against_local_server() {
        let _ = tracing_subscriber::fmt::try_init();

        let c = HttpAnalysisClient::new(&Config::from_env()).unwrap();
        assert!(c.health_check().await, "分析服务应该可以访问");
    }
}
