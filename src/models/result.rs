//! 分析结果
//!
//! 后端不同路径返回的结构并不一致（同步分析、CrewAI 深度分析、LLM 自由输出），
//! 因此结果以原始 JSON 对象保存并原样透传。
//! 类型化的视图按需宽松解析，解析不了的部分只是读不到，不会让整个结果失效

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathStep {
    pub order: u32,
    pub country: String,
    pub country_code: String,
    pub visa_type: String,
    pub duration: String,
    pub purpose: String,
    pub requirements: Vec<String>,
    pub estimated_cost: f64,
    pub currency: String,
}

/// 推荐的移民路径
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankedPath {
    pub id: String,
    pub rank: u32,
    pub name: String,
    pub description: String,
    pub steps: Vec<PathStep>,
    pub total_duration: String,
    pub overall_score: f64,
    pub approval_probability: f64,
    pub risk_level: String,
    pub why_this_path: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionItem {
    pub order: u32,
    pub action: String,
    pub deadline: Option<String>,
    pub priority: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citation {
    pub id: String,
    pub source: String,
    pub text: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibleVisas {
    pub country: String,
    pub visa_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDetails {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub eligible_visas: Vec<EligibleVisas>,
}

/// 个人情况概要
///
/// 同步分析返回结构化对象，CrewAI 深度分析可能只返回一段文字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSummary {
    Details(ProfileDetails),
    Text(String),
}

/// 分析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    fields: Map<String, JsonValue>,
}

impl AnalysisResult {
    pub fn from_map(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    /// 读取原始字段
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, JsonValue> {
        self.fields
    }

    fn typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.field(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// 列表字段逐项解析，跳过无法识别的元素
    fn typed_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.field(key) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.field("sessionId").and_then(JsonValue::as_str)
    }

    pub fn analysis_timestamp(&self) -> Option<&str> {
        self.field("analysisTimestamp").and_then(JsonValue::as_str)
    }

    pub fn disclaimer(&self) -> Option<&str> {
        self.field("disclaimer").and_then(JsonValue::as_str)
    }

    pub fn profile_summary(&self) -> Option<ProfileSummary> {
        self.typed("profileSummary")
    }

    pub fn ranked_paths(&self) -> Vec<RankedPath> {
        self.typed_list("rankedPaths")
    }

    pub fn action_items(&self) -> Vec<ActionItem> {
        self.typed_list("actionItems")
    }

    pub fn citations(&self) -> Vec<Citation> {
        self.typed_list("citations")
    }

    /// 排名第一的路径
    pub fn top_path(&self) -> Option<RankedPath> {
        self.ranked_paths().into_iter().min_by_key(|p| p.rank)
    }
}

/// `GET /analyze/result/{id}` 的响应外壳
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<AnalysisResult>,
}

impl ResultEnvelope {
    pub fn ok(data: AnalysisResult) -> Self {
        Self {
            success: Some(true),
            data: Some(data),
        }
    }

    /// 取出结果；`success: false` 或没有 `data` 时返回 `None`
    pub fn into_data(self) -> Option<AnalysisResult> {
        match self.success {
            Some(false) => None,
            _ => self.data,
        }
    }
}
