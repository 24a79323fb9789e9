//! LLM API 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Gemini 的 OpenAI 兼容端点、Azure 等）
//!
//! 业务层只依赖 [`LanguageModel`] trait，测试中可替换为桩实现。

use std::sync::Arc;

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;

/// 语言模型能力
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 发送一轮对话，返回模型输出（已去除首尾空白）
    async fn complete(&self, user_message: &str, system_message: Option<&str>) -> Result<String>;

    /// 模型名称，仅用于日志
    fn model_name(&self) -> &str;
}

/// 基于 OpenAI 兼容接口的语言模型客户端
pub struct OpenAiLanguageModel {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiLanguageModel {
    /// 创建客户端
    ///
    /// # 参数
    /// - `api_key`: 模型服务凭证
    /// - `config`: 提供端点、模型名与生成参数
    pub fn new(api_key: &str, config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiLanguageModel {
    async fn complete(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 根据配置构建模型句柄
///
/// 进程启动时调用一次；未配置凭证时返回 `None`，
/// 由业务层在调用前报告配置错误。
pub fn build_language_model(config: &Config) -> Option<Arc<dyn LanguageModel>> {
    match config.llm_api_key.as_deref() {
        Some(api_key) => Some(Arc::new(OpenAiLanguageModel::new(api_key, config))),
        None => {
            warn!("未配置模型凭证，模型相关 action 将返回配置错误");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credential_no_handle() {
        let config = Config::default();
        assert!(build_language_model(&config).is_none());
    }

    #[test]
    fn test_handle_uses_configured_model() {
        let config = Config {
            llm_api_key: Some("test-key".to_string()),
            llm_model_name: "gemini-1.5-flash".to_string(),
            ..Config::default()
        };
        let model = build_language_model(&config).unwrap();
        assert_eq!(model.model_name(), "gemini-1.5-flash");
    }

    /// 真实调用模型服务，需要设置 LLM_API_KEY
    #[tokio::test]
    #[ignore]
    async fn test_complete_live() {
        crate::utils::logging::init(true);

        let config = Config::from_env();
        let model = build_language_model(&config).expect("需要设置 LLM_API_KEY");

        let response = model
            .complete("Reply with the single word: pong", Some("You are terse."))
            .await
            .unwrap();

        println!("LLM 响应: {}", response);
        assert!(!response.is_empty());
    }
}
