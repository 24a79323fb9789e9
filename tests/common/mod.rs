//! 测试用桩实现：记录调用参数，可配置返回值或故障

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use pubmed_review::{Config, LanguageModel, LiteratureDatabase, Pipeline};
use serde_json::{json, Value};

/// 桩模型
#[derive(Default)]
pub struct StubModel {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, user_message: &str, _system_message: Option<&str>) -> Result<String> {
        self.prompts.lock().unwrap().push(user_message.to_string());
        if self.fail {
            anyhow::bail!("model service returned 500");
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

/// 桩文献库
#[derive(Default)]
pub struct StubDatabase {
    pub search_response: Value,
    pub summary_response: Value,
    pub abstracts: String,
    /// 模拟文献库宕机
    pub outage: bool,
    /// 只有 esummary 失败（esearch 正常返回 ID）
    pub summary_outage: bool,
    pub queries: Mutex<Vec<(String, usize)>>,
    pub summary_requests: Mutex<Vec<Vec<String>>>,
    pub fetch_requests: Mutex<Vec<Vec<String>>>,
}

impl StubDatabase {
    pub fn with_ids(ids: &[&str], summary_response: Value) -> Arc<Self> {
        Arc::new(Self {
            search_response: json!({ "esearchresult": { "idlist": ids } }),
            summary_response,
            ..Default::default()
        })
    }

    pub fn with_abstracts(text: &str) -> Arc<Self> {
        Arc::new(Self {
            abstracts: text.to_string(),
            ..Default::default()
        })
    }

    pub fn down() -> Arc<Self> {
        Arc::new(Self {
            outage: true,
            ..Default::default()
        })
    }

    pub fn summaries_down(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            search_response: json!({ "esearchresult": { "idlist": ids } }),
            summary_outage: true,
            ..Default::default()
        })
    }

    /// 所有外部调用次数之和
    pub fn total_calls(&self) -> usize {
        self.queries.lock().unwrap().len()
            + self.summary_requests.lock().unwrap().len()
            + self.fetch_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LiteratureDatabase for StubDatabase {
    async fn search(&self, query: &str, max_results: usize) -> Result<Value> {
        self.queries.lock().unwrap().push((query.to_string(), max_results));
        if self.outage {
            anyhow::bail!("esearch 请求失败: connection refused");
        }
        Ok(self.search_response.clone())
    }

    async fn fetch_summaries(&self, ids: &[String]) -> Result<Value> {
        self.summary_requests.lock().unwrap().push(ids.to_vec());
        if self.outage || self.summary_outage {
            anyhow::bail!("esummary 请求失败: connection refused");
        }
        Ok(self.summary_response.clone())
    }

    async fn fetch_abstracts(&self, ids: &[String]) -> Result<String> {
        self.fetch_requests.lock().unwrap().push(ids.to_vec());
        if self.outage {
            anyhow::bail!("efetch 请求失败: connection refused");
        }
        Ok(self.abstracts.clone())
    }
}

/// 用桩依赖构建调度器
pub fn pipeline_with(model: Option<Arc<StubModel>>, database: Arc<StubDatabase>) -> Pipeline {
    let model = model.map(|m| m as Arc<dyn LanguageModel>);
    Pipeline::new(&Config::default(), model, database)
}
