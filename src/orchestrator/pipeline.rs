//! 流水线调度器
//!
//! 无状态：每次调用按 action 分发到恰好一个服务，
//! 结果统一编码为裸结果或 `{ "error": message }` 两种信封之一。
//! 调度器本身不重试。

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::clients::{build_language_model, LanguageModel, LiteratureDatabase, PubMedClient};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{
    Action, ActionRequest, AnalysisResponse, AnalyzePayload, MeshTermsResponse, RecencyWindow,
    SearchPayload,
};
use crate::services::{LiteratureSearch, SynthesisComposer, TermExpander};

/// 调度结果
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// 是否属于调用方错误（传输层映射为 400）
    pub client_error: bool,
    /// 响应体：裸结果或 `{ "error": message }`
    pub body: Value,
}

impl Envelope {
    fn success(body: Value) -> Self {
        Self {
            client_error: false,
            body,
        }
    }

    fn failure(err: &PipelineError) -> Self {
        Self {
            client_error: err.is_client_error(),
            body: err.to_envelope(),
        }
    }

    /// 是否为错误信封
    pub fn is_error(&self) -> bool {
        self.body.get("error").is_some()
    }
}

/// 流水线调度器
pub struct Pipeline {
    term_expander: TermExpander,
    literature_search: LiteratureSearch,
    synthesis: SynthesisComposer,
    default_recency_years: u32,
}

impl Pipeline {
    /// 用显式依赖创建调度器
    ///
    /// # 参数
    /// - `config`: 上限、语言等参数
    /// - `model`: 模型句柄，`None` 表示未配置凭证
    /// - `database`: 文献库客户端
    pub fn new(
        config: &Config,
        model: Option<Arc<dyn LanguageModel>>,
        database: Arc<dyn LiteratureDatabase>,
    ) -> Self {
        Self {
            term_expander: TermExpander::new(model.clone()),
            literature_search: LiteratureSearch::new(database.clone(), config.max_search_results),
            synthesis: SynthesisComposer::new(
                model,
                database,
                config.max_analysis_papers,
                config.summary_language.clone(),
            ),
            default_recency_years: config.default_recency_years,
        }
    }

    /// 从配置创建调度器（真实的模型与 PubMed 客户端）
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = build_language_model(config);
        let database: Arc<dyn LiteratureDatabase> = Arc::new(PubMedClient::new(config)?);
        Ok(Self::new(config, model, database))
    }

    /// 解析原始请求体并调度
    pub async fn handle_body(&self, body: &[u8]) -> Envelope {
        match parse_request(body) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("请求体无法解析: {}", e);
                Envelope::failure(&e)
            }
        }
    }

    /// 调度一次请求
    pub async fn handle(&self, request: ActionRequest) -> Envelope {
        match self.dispatch(request).await {
            Ok(body) => Envelope::success(body),
            Err(e) => {
                if e.is_client_error() {
                    warn!("❌ {}", e);
                } else {
                    error!("❌ {}", e);
                }
                Envelope::failure(&e)
            }
        }
    }

    /// 按 action 分发到对应服务
    pub async fn dispatch(&self, request: ActionRequest) -> PipelineResult<Value> {
        let action = Action::parse(&request.action)
            .ok_or_else(|| PipelineError::UnrecognizedAction(request.action.clone()))?;

        info!("➡️ action: {}", action.as_str());

        match action {
            Action::GenerateMesh => {
                let keyword = parse_keyword(&request.payload)?;
                let mesh_terms = self.term_expander.expand_terms(&keyword).await?;
                Ok(to_body(&MeshTermsResponse { mesh_terms }))
            }
            Action::SearchPubMed => {
                let payload: SearchPayload = parse_payload(action, request.payload)?;
                if payload.mesh.trim().is_empty() {
                    return Err(PipelineError::InvalidPayload("mesh 不能为空".to_string()));
                }
                let window =
                    RecencyWindow::new(payload.years.unwrap_or(self.default_recency_years));
                let papers = self
                    .literature_search
                    .search_literature(&payload.mesh, window)
                    .await;
                Ok(to_body(&papers))
            }
            Action::AnalyzePapers => {
                let payload: AnalyzePayload = parse_payload(action, request.payload)?;
                let analysis = self.synthesis.synthesize(&payload.paper_ids).await?;
                Ok(to_body(&AnalysisResponse { analysis }))
            }
        }
    }
}

/// 解析 `{ action, payload }` 请求体
pub fn parse_request(body: &[u8]) -> PipelineResult<ActionRequest> {
    serde_json::from_slice(body)
        .map_err(|e| PipelineError::InvalidPayload(format!("请求体格式错误: {}", e)))
}

/// `generateMeSH` 的 payload 是裸字符串；空关键词在这里拦截
fn parse_keyword(payload: &Value) -> PipelineResult<String> {
    match payload.as_str().map(str::trim) {
        Some(keyword) if !keyword.is_empty() => Ok(keyword.to_string()),
        Some(_) => Err(PipelineError::InvalidPayload("关键词不能为空".to_string())),
        None => Err(PipelineError::InvalidPayload(
            "generateMeSH 的 payload 必须是字符串".to_string(),
        )),
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(action: Action, payload: Value) -> PipelineResult<T> {
    serde_json::from_value(payload).map_err(|e| {
        PipelineError::InvalidPayload(format!("{} 的 payload 格式错误: {}", action.as_str(), e))
    })
}

/// 编码为响应体
fn to_body<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}
