use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 学历等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Bachelors,
    Masters,
    Phd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub level: EducationLevel,
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<u16>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub years_of_experience: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current_role: Option<bool>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financial {
    pub annual_income_usd: f64,
    pub savings_usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_debts: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 期望的移民时间线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    Immediate,
    #[serde(rename = "within_1_year")]
    Within1Year,
    #[serde(rename = "within_2_years")]
    Within2Years,
    Flexible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    pub target_countries: Vec<String>,
    pub timeline: Timeline,
    #[serde(default)]
    pub priorities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_size: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSkill {
    pub language: String,
    pub proficiency: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 分析请求
///
/// 核心流程只负责原样转发，不解读其中任何字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub education: Education,
    pub work_experience: WorkExperience,
    pub financial: Financial,
    pub goals: Goals,
    pub nationality: String,
    pub age: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageSkill>>,
    /// 未建模的字段，转发时原样带上
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[cfg(test)]
pub(crate) fn sample_request() -> AnalysisRequest {
    AnalysisRequest {
        education: Education {
            level: EducationLevel::Masters,
            field: "Computer Science".to_string(),
            institution: None,
            country: Some("IN".to_string()),
            graduation_year: Some(2019),
            extra: Map::new(),
        },
        work_experience: WorkExperience {
            title: "Software Engineer".to_string(),
            company: None,
            years_of_experience: 5.0,
            is_current_role: Some(true),
            skills: vec!["rust".to_string(), "distributed systems".to_string()],
            extra: Map::new(),
        },
        financial: Financial {
            annual_income_usd: 48_000.0,
            savings_usd: 20_000.0,
            has_debts: None,
            extra: Map::new(),
        },
        goals: Goals {
            target_countries: vec!["CA".to_string(), "DE".to_string()],
            timeline: Timeline::Within1Year,
            priorities: vec!["career".to_string()],
            family_size: None,
            extra: Map::new(),
        },
        nationality: "IN".to_string(),
        age: 29,
        languages: None,
        extra: Map::new(),
    }
}
