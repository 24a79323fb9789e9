use serde_json::{json, Value};
use thiserror::Error;

/// 流水线错误类型
///
/// 组件边界处统一转换为该类型，再由编排层编码为 `{ "error": message }`。
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 缺少模型服务凭证，在发起任何外部调用之前报告
    #[error("配置错误: {0}")]
    Configuration(String),

    /// 模型服务调用失败（术语扩展）
    #[error("LLM调用失败: {0}")]
    UpstreamModel(String),

    /// 文献库调用失败，只在检索服务内部出现，总是降级为空结果
    #[error("文献检索失败: {0}")]
    UpstreamSearch(String),

    /// 综述生成失败（全文获取或模型调用）
    #[error("综述生成失败: {0}")]
    UpstreamSynthesis(String),

    /// 未知的 action
    #[error("未知的 action: {0}")]
    UnrecognizedAction(String),

    /// payload 与 action 不匹配
    #[error("请求参数错误: {0}")]
    InvalidPayload(String),
}

impl PipelineError {
    /// 缺少凭证时的标准错误
    pub fn missing_credential() -> Self {
        PipelineError::Configuration(
            "未配置 LLM_API_KEY，无法调用模型服务".to_string(),
        )
    }

    /// 创建模型调用错误，保留完整的错误链
    pub fn upstream_model(source: &anyhow::Error) -> Self {
        PipelineError::UpstreamModel(format!("{:#}", source))
    }

    /// 创建综述生成错误，保留完整的错误链
    pub fn upstream_synthesis(source: &anyhow::Error) -> Self {
        PipelineError::UpstreamSynthesis(format!("{:#}", source))
    }

    /// 是否属于调用方错误（HTTP 400）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnrecognizedAction(_) | PipelineError::InvalidPayload(_)
        )
    }

    /// 编码为统一的错误信封
    pub fn to_envelope(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// 流水线结果类型
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_client_error_classification() {
        assert!(PipelineError::UnrecognizedAction("x".into()).is_client_error());
        assert!(PipelineError::InvalidPayload("x".into()).is_client_error());
        assert!(!PipelineError::missing_credential().is_client_error());
        assert!(!PipelineError::UpstreamSynthesis("x".into()).is_client_error());
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = PipelineError::UnrecognizedAction("doSomethingElse".into()).to_envelope();
        let obj = envelope.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj["error"].as_str().unwrap().contains("doSomethingElse"));
    }

    #[test]
    fn test_error_chain_kept_in_message() {
        let err = anyhow::Result::<()>::Err(anyhow::anyhow!("connection refused"))
            .context("efetch 请求失败");
        let err = PipelineError::upstream_synthesis(&err.unwrap_err());
        let message = err.to_string();
        assert!(message.contains("efetch 请求失败"));
        assert!(message.contains("connection refused"));
    }
}
