//! 入站请求与出站响应的信封结构

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::paper::AnalysisReport;

/// 入站请求 `{ action, payload }`
///
/// `action` 保持为字符串，未知值由编排层报告为调用方错误。
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub payload: Value,
}

/// 已识别的 action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GenerateMesh,
    SearchPubMed,
    AnalyzePapers,
}

impl Action {
    /// 解析 action 名称，未知名称返回 `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "generateMeSH" => Some(Action::GenerateMesh),
            "searchPubMed" => Some(Action::SearchPubMed),
            "analyzePapers" => Some(Action::AnalyzePapers),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GenerateMesh => "generateMeSH",
            Action::SearchPubMed => "searchPubMed",
            Action::AnalyzePapers => "analyzePapers",
        }
    }
}

/// `searchPubMed` 的 payload
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPayload {
    pub mesh: String,
    /// 省略时使用配置中的默认年限
    #[serde(default)]
    pub years: Option<u32>,
}

/// `analyzePapers` 的 payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePayload {
    pub paper_ids: Vec<String>,
}

/// `generateMeSH` 的响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshTermsResponse {
    pub mesh_terms: Vec<String>,
}

/// `analyzePapers` 的响应
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub analysis: AnalysisReport,
}
