//! 集成测试公共工具：脚本化的分析服务

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use pathway_analysis::models::{JobStatusResponse, ResultEnvelope, StartJobResponse};
use pathway_analysis::{
    AnalysisApi, AnalysisError, AnalysisRequest, AnalysisResult, AnalysisSessionStore, AppResult,
    Config,
};

/// 按脚本依次返回响应的假服务
///
/// 状态脚本用完后一直返回 processing
#[derive(Default)]
pub struct ScriptedApi {
    direct: Mutex<Option<AppResult<AnalysisResult>>>,
    start: Mutex<Option<AppResult<StartJobResponse>>>,
    statuses: Mutex<VecDeque<AppResult<JobStatusResponse>>>,
    result: Mutex<Option<AppResult<ResultEnvelope>>>,
    pub direct_calls: AtomicU32,
    pub start_calls: AtomicU32,
    pub status_calls: AtomicU32,
    pub result_calls: AtomicU32,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direct(self, response: AppResult<AnalysisResult>) -> Self {
        *self.direct.lock().unwrap() = Some(response);
        self
    }

    pub fn with_start(self, response: AppResult<StartJobResponse>) -> Self {
        *self.start.lock().unwrap() = Some(response);
        self
    }

    pub fn with_status(self, response: AppResult<JobStatusResponse>) -> Self {
        self.statuses.lock().unwrap().push_back(response);
        self
    }

    pub fn with_result(self, response: AppResult<ResultEnvelope>) -> Self {
        *self.result.lock().unwrap() = Some(response);
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisApi for ScriptedApi {
    async fn analyze_direct(&self, _request: &AnalysisRequest) -> AppResult<AnalysisResult> {
        self.direct_calls.fetch_add(1, Ordering::SeqCst);
        self.direct
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(result_with_score(0)))
    }

    async fn start_job(&self, _request: &AnalysisRequest) -> AppResult<StartJobResponse> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.start
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(started("s-1")))
    }

    async fn job_status(&self, session_id: &str) -> AppResult<JobStatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(processing(session_id)))
    }

    async fn job_result(&self, _session_id: &str) -> AppResult<ResultEnvelope> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        self.result.lock().unwrap().take().unwrap_or_else(|| {
            Err(AnalysisError::Server {
                endpoint: "/api/v1/analyze/result".to_string(),
                status: Some(404),
                message: Some("Result not found".to_string()),
            })
        })
    }

    async fn health_check(&self) -> bool {
        true
    }
}

// ========== 响应构造 ==========

pub fn started(session_id: &str) -> StartJobResponse {
    StartJobResponse {
        success: true,
        session_id: session_id.to_string(),
        status: "processing".to_string(),
        message: "Analysis started".to_string(),
    }
}

fn status_response(value: Value) -> JobStatusResponse {
    serde_json::from_value(value).unwrap()
}

pub fn processing(session_id: &str) -> JobStatusResponse {
    status_response(json!({ "session_id": session_id, "status": "processing" }))
}

pub fn completed(session_id: &str, result: Value) -> JobStatusResponse {
    status_response(json!({
        "session_id": session_id,
        "status": "completed",
        "result": result,
    }))
}

pub fn failed(session_id: &str, error: &str) -> JobStatusResponse {
    status_response(json!({
        "session_id": session_id,
        "status": "failed",
        "error": error,
    }))
}

pub fn result_with_score(score: u32) -> AnalysisResult {
    serde_json::from_value(json!({ "score": score })).unwrap()
}

/// `GET /analyze/result/{id}` 的线上格式
pub fn envelope(data: Value) -> ResultEnvelope {
    serde_json::from_value(json!({ "success": true, "data": data })).unwrap()
}

/// 同步分析 `POST /analyze/real` 返回的结构
pub fn direct_backend_result() -> Value {
    json!({
        "sessionId": "0b7c6c1e-3f4a-4d55-9f0e-7d2b1f3e9a10",
        "profileSummary": {
            "strengths": ["5 years of software experience", "Master's degree"],
            "weaknesses": ["Limited savings for relocation"],
            "eligibleVisas": [
                { "country": "CA", "visaTypes": ["Express Entry"] },
                { "country": "DE", "visaTypes": ["EU Blue Card"] }
            ]
        },
        "rankedPaths": [{
            "id": "path_1",
            "rank": 1,
            "name": "Canada Express Entry",
            "description": "Federal Skilled Worker via Express Entry",
            "steps": [{
                "order": 1,
                "country": "Canada",
                "countryCode": "CA",
                "visaType": "Express Entry PR",
                "duration": "6-8 months",
                "purpose": "Permanent residence",
                "requirements": ["IELTS CLB 9", "ECA"],
                "estimatedCost": 2300,
                "currency": "CAD"
            }],
            "totalDuration": "6-8 months",
            "overallScore": 82,
            "approvalProbability": 70,
            "riskLevel": "low",
            "whyThisPath": "High CRS score from education and experience",
            "recommendation": "Take IELTS within 2 months"
        }],
        "actionItems": [{
            "order": 1,
            "action": "Book IELTS General",
            "deadline": "Within 1 month",
            "priority": "high",
            "details": "Target CLB 9 in every band"
        }],
        "citations": [{
            "id": "c1",
            "source": "IRCC",
            "text": "Express Entry eligibility",
            "url": "https://www.canada.ca/express-entry"
        }],
        "analysisTimestamp": "2025-01-01T10:00:00",
        "disclaimer": "This analysis is generated by AI and is for informational purposes only."
    })
}

/// CrewAI 深度分析完成后保存在会话里的结构
///
/// `profileSummary` 是一段文字，推荐路径沿用 agent 自己的字段名
pub fn crewai_backend_result(session_id: &str) -> Value {
    json!({
        "sessionId": session_id,
        "profileSummary": "Analysis complete. See detailed recommendation below.",
        "rankedPaths": [{
            "path_id": "eu_blue_card",
            "name": "Germany EU Blue Card",
            "timeline": "6-9 months",
            "approval_probability": 0.72
        }],
        "actionItems": [{
            "order": 1,
            "action": "Review detailed analysis",
            "deadline": "Within 1 week",
            "priority": "high",
            "details": "Review the comprehensive analysis provided by our AI agents"
        }],
        "citations": [],
        "analysisTimestamp": "2025-01-01T10:05:00",
        "analysisMode": "crewai",
        "agentOutputs": {
            "profileAnalyst": ["Strong technical background"],
            "pathGenerator": { "path_id": "eu_blue_card" },
            "riskAssessor": 0.72,
            "synthesizer": "Analysis complete. See detailed recommendation below."
        },
        "disclaimer": "This analysis is generated by AI using CrewAI multi-agent system and is for informational purposes only."
    })
}

pub fn network_error() -> AnalysisError {
    AnalysisError::network(
        "/api/v1/analyze/status/s-1",
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
    )
}

// ========== 测试夹具 ==========

pub fn sample_request() -> AnalysisRequest {
    serde_json::from_value(json!({
        "education": { "level": "masters", "field": "Computer Science" },
        "workExperience": {
            "title": "Software Engineer",
            "yearsOfExperience": 5,
            "skills": ["rust"]
        },
        "financial": { "annualIncomeUsd": 48000, "savingsUsd": 20000 },
        "goals": {
            "targetCountries": ["CA"],
            "timeline": "within_1_year",
            "priorities": ["career"]
        },
        "nationality": "IN",
        "age": 29
    }))
    .unwrap()
}

/// 快速的测试配置：阶段延迟 1ms，轮询间隔 10ms
pub fn fast_config(max_attempts: u32) -> Config {
    Config {
        poll_max_attempts: max_attempts,
        poll_interval_ms: 10,
        stage_min_delay_ms: 1,
        stage_max_delay_ms: 1,
        ..Config::default()
    }
}

pub fn store_with(api: Arc<ScriptedApi>, config: &Config) -> Arc<AnalysisSessionStore> {
    Arc::new(AnalysisSessionStore::from_config(api, config))
}
