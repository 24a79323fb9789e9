//! 模型诊断服务
//!
//! 列出模型服务当前可用的模型，用于排查模型名配置错误。
//! 只在 `enable_diagnostics` 打开时挂载，不参与任何流水线 action。

use anyhow::{Context, Result};
use async_openai::{config::OpenAIConfig, Client};
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};

/// 模型诊断服务
///
/// 与语言模型客户端共用 async-openai，凭证缺失时不构建客户端。
pub struct ModelDiagnostics {
    client: Option<Client<OpenAIConfig>>,
    base_url: String,
}

impl ModelDiagnostics {
    pub fn new(config: &Config) -> Self {
        let client = config.llm_api_key.as_deref().map(|api_key| {
            Client::with_config(
                OpenAIConfig::new()
                    .with_api_key(api_key)
                    .with_api_base(&config.llm_api_base_url),
            )
        });

        Self {
            client,
            base_url: config.llm_api_base_url.clone(),
        }
    }

    /// 列出可用模型 ID
    pub async fn list_models(&self) -> PipelineResult<Vec<String>> {
        let client = self.client.as_ref().ok_or_else(PipelineError::missing_credential)?;

        info!("🩺 查询可用模型: {}/models", self.base_url.trim_end_matches('/'));

        let body = fetch_model_list(client)
            .await
            .map_err(|e| PipelineError::upstream_model(&e))?;

        Ok(parse_model_ids(&body))
    }
}

/// 以原始 JSON 取回模型列表；兼容端点的条目字段不一定齐全
async fn fetch_model_list(client: &Client<OpenAIConfig>) -> Result<Value> {
    client
        .models()
        .list_byot::<Value>()
        .await
        .context("模型列表请求失败")
}

/// 解析 OpenAI 兼容格式 `{ "data": [{ "id": ... }] }`
pub fn parse_model_ids(body: &Value) -> Vec<String> {
    body.get("data")
        .and_then(Value::as_array)
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
