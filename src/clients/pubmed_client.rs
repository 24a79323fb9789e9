//! PubMed E-utilities 客户端
//!
//! 封装 esearch / esummary / efetch 三个端点，只负责网络调用，
//! 返回松散类型的原始响应；字段校验与默认值由检索服务统一处理。
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

/// 文献库能力
#[async_trait]
pub trait LiteratureDatabase: Send + Sync {
    /// 执行检索，返回 esearch 的原始 JSON
    ///
    /// # 参数
    /// - `query`: 完整的检索式
    /// - `max_results`: 返回的最大 ID 数
    async fn search(&self, query: &str, max_results: usize) -> Result<Value>;

    /// 批量获取摘要元数据，返回 esummary 的原始 JSON
    async fn fetch_summaries(&self, ids: &[String]) -> Result<Value>;

    /// 批量获取摘要级全文（纯文本）
    async fn fetch_abstracts(&self, ids: &[String]) -> Result<String>;
}

/// PubMed 客户端
pub struct PubMedClient {
    http: Client,
    base_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl PubMedClient {
    /// 创建新的 PubMed 客户端
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(format!("{}/{}", config.pubmed_tool, env!("CARGO_PKG_VERSION")))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            http,
            base_url: config.pubmed_base_url.trim_end_matches('/').to_string(),
            tool: config.pubmed_tool.clone(),
            email: config.pubmed_email.clone(),
            api_key: config.pubmed_api_key.clone(),
        })
    }

    /// 端点完整 URL
    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}.fcgi", self.base_url, name)
    }

    /// 每个请求都携带的参数（db / tool / email / api_key）
    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("db", "pubmed".to_string()), ("tool", self.tool.clone())];
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(api_key) = &self.api_key {
            params.push(("api_key", api_key.clone()));
        }
        params
    }

    /// 发送 GET 请求并检查状态码
    async fn get(&self, name: &str, params: &[(&'static str, String)]) -> Result<reqwest::Response> {
        let url = self.endpoint(name);
        debug!("请求 {}，参数数量: {}", url, params.len());

        let response = self
            .http
            .get(&url)
            .query(&self.common_params())
            .query(params)
            .send()
            .await
            .with_context(|| format!("{} 请求失败", name))?
            .error_for_status()
            .with_context(|| format!("{} 返回错误状态", name))?;

        Ok(response)
    }
}

#[async_trait]
impl LiteratureDatabase for PubMedClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Value> {
        let params = [
            ("term", query.to_string()),
            ("retmax", max_results.to_string()),
            ("retmode", "json".to_string()),
            ("sort", "relevance".to_string()),
        ];

        self.get("esearch", &params)
            .await?
            .json::<Value>()
            .await
            .context("esearch 响应不是合法 JSON")
    }

    async fn fetch_summaries(&self, ids: &[String]) -> Result<Value> {
        let params = [("id", ids.join(",")), ("retmode", "json".to_string())];

        self.get("esummary", &params)
            .await?
            .json::<Value>()
            .await
            .context("esummary 响应不是合法 JSON")
    }

    async fn fetch_abstracts(&self, ids: &[String]) -> Result<String> {
        let params = [
            ("id", ids.join(",")),
            ("rettype", "abstract".to_string()),
            ("retmode", "text".to_string()),
        ];

        self.get("efetch", &params)
            .await?
            .text()
            .await
            .context("无法读取 efetch 响应")
    }
}
