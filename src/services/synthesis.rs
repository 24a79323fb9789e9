//! 综述生成服务 - 业务能力层
//!
//! 流程：截断 ID 列表 → efetch 批量取摘要 → 一次模型调用生成综述。
//!
//! 与检索不同，这里的任何失败都向上报告：综述失败没有等价的"空结果"。

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::{LanguageModel, LiteratureDatabase};
use crate::error::{PipelineError, PipelineResult};
use crate::models::AnalysisReport;

const SYSTEM_MESSAGE: &str =
    "You are an experienced medical researcher who writes concise, well-structured literature reviews.";

/// 综述生成服务
pub struct SynthesisComposer {
    model: Option<Arc<dyn LanguageModel>>,
    database: Arc<dyn LiteratureDatabase>,
    max_papers: usize,
    summary_language: String,
}

impl SynthesisComposer {
    /// 创建综述服务
    ///
    /// # 参数
    /// - `model`: 模型句柄，`None` 表示未配置凭证
    /// - `database`: 文献库客户端
    /// - `max_papers`: 单次送入模型的最大文献数
    /// - `summary_language`: 摘要翻译的目标语言
    pub fn new(
        model: Option<Arc<dyn LanguageModel>>,
        database: Arc<dyn LiteratureDatabase>,
        max_papers: usize,
        summary_language: impl Into<String>,
    ) -> Self {
        Self {
            model,
            database,
            max_papers,
            summary_language: summary_language.into(),
        }
    }

    /// 生成综述
    ///
    /// 超出上限的 ID 被静默丢弃，以保证整个调用落在托管平台的请求超时内。
    ///
    /// # 参数
    /// - `paper_ids`: 待综述的 PubMed ID
    ///
    /// # 返回
    /// 模型原样输出的格式化文本
    pub async fn synthesize(&self, paper_ids: &[String]) -> PipelineResult<AnalysisReport> {
        let model = self.model.as_ref().ok_or_else(PipelineError::missing_credential)?;

        let ids = select_ids(paper_ids, self.max_papers);
        if ids.is_empty() {
            return Err(PipelineError::InvalidPayload("paperIds 不能为空".to_string()));
        }
        if ids.len() < paper_ids.len() {
            info!(
                "✂️ 收到 {} 篇文献，只综述前 {} 篇",
                paper_ids.len(),
                ids.len()
            );
        }

        info!("📄 获取摘要: {}", ids.join(","));
        let documents = self
            .database
            .fetch_abstracts(&ids)
            .await
            .map_err(|e| PipelineError::upstream_synthesis(&e))?;
        debug!("摘要文本长度: {} 字符", documents.len());

        let prompt = build_prompt(&ids, &documents, &self.summary_language);

        info!("🤖 调用模型生成综述，模型: {}", model.model_name());
        let report = model
            .complete(&prompt, Some(SYSTEM_MESSAGE))
            .await
            .map_err(|e| PipelineError::upstream_synthesis(&e))?;

        info!("✓ 综述生成完成，长度: {} 字符", report.len());
        Ok(report)
    }
}

/// 取前 `max_papers` 个非空 ID，保持原有顺序
pub fn select_ids(paper_ids: &[String], max_papers: usize) -> Vec<String> {
    paper_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .take(max_papers)
        .map(str::to_string)
        .collect()
}

/// 构建综述提示词
fn build_prompt(ids: &[String], documents: &str, language: &str) -> String {
    format!(
        r#"Below are the abstracts of {count} PubMed papers (PMID: {ids}).

For EACH paper, write a section in Markdown with exactly this outline:

## <paper title>
- **Authors**: <authors>
- **Summary**: <a faithful summary of the abstract, written in {language}>
- **Relevance**: <why this paper matters for the research topic, written in {language}>
- **Next research steps**: <concrete follow-up studies this paper suggests, written in {language}>

Do not invent papers that are not listed. Keep each section concise.

--- ABSTRACTS ---
{documents}"#,
        count = ids.len(),
        ids = ids.join(", "),
        language = language,
        documents = documents.trim()
    )
}
