//! 术语扩展服务 - 业务能力层
//!
//! 只负责"关键词 → MeSH 候选术语"这一能力：
//! 一次模型调用，按逗号切分，不做去重、不校验数量。

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::LanguageModel;
use crate::error::{PipelineError, PipelineResult};
use crate::models::ControlledTerm;
use crate::utils::logging::truncate_text;

/// 请求模型返回的术语数量
pub const REQUESTED_TERM_COUNT: usize = 5;

const SYSTEM_MESSAGE: &str =
    "You are a medical librarian who maps free-text keywords to MeSH (Medical Subject Headings) terms.";

/// 术语扩展服务
pub struct TermExpander {
    model: Option<Arc<dyn LanguageModel>>,
}

impl TermExpander {
    /// 创建服务；`model` 为 `None` 表示未配置凭证
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    /// 将关键词扩展为候选术语
    ///
    /// # 参数
    /// - `keyword`: 非空关键词（空关键词应在调用方拦截）
    ///
    /// # 返回
    /// 模型输出按逗号切分、去除空白后的术语列表
    pub async fn expand_terms(&self, keyword: &str) -> PipelineResult<Vec<ControlledTerm>> {
        let model = self.model.as_ref().ok_or_else(PipelineError::missing_credential)?;

        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(PipelineError::InvalidPayload("关键词不能为空".to_string()));
        }

        info!("🔤 扩展关键词: {}", truncate_text(keyword, 50));

        let prompt = build_prompt(keyword);
        let response = model
            .complete(&prompt, Some(SYSTEM_MESSAGE))
            .await
            .map_err(|e| PipelineError::upstream_model(&e))?;

        debug!("模型原始输出: {}", truncate_text(&response, 200));

        let terms = split_terms(&response);
        info!("✓ 得到 {} 个候选术语", terms.len());

        Ok(terms)
    }
}

/// 构建术语扩展提示词
fn build_prompt(keyword: &str) -> String {
    format!(
        "List exactly {count} MeSH terms (in English) that are semantically related to the keyword \"{keyword}\".\n\
         Return them on a single line, separated by commas, with no numbering, no explanations and no extra text.",
        count = REQUESTED_TERM_COUNT,
        keyword = keyword
    )
}

/// 切分模型输出：去掉换行，按逗号切分，逐项去除空白
///
/// 空片段（如结尾多余的逗号）被丢弃，数量不做限制。
pub fn split_terms(raw: &str) -> Vec<ControlledTerm> {
    raw.replace(['\r', '\n'], " ")
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}
