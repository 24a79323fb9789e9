//! 文献检索服务 - 业务能力层
//!
//! 流程：esearch 取 ID → esummary 批量取元数据 → 归一化为 [`PaperSummary`]。
//!
//! 上游响应可能残缺（缺 ID 列表、缺某条元数据、缺作者），
//! 所有容错规则集中在 [`extract_ids`] 与 [`normalize_summaries`] 两个纯函数中：
//! - 缺 ID 列表或列表为空 → 空结果
//! - 某个 ID 没有元数据记录 → 丢弃该 ID
//! - 缺标题 / 作者 → 使用占位值
//!
//! 任何传输层错误都降级为空结果，不向调用方报告。

use std::sync::Arc;

use chrono::Datelike;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clients::LiteratureDatabase;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{PaperSummary, RecencyWindow, YearRange, NO_AUTHORS, NO_TITLE};

/// 检索服务
pub struct LiteratureSearch {
    database: Arc<dyn LiteratureDatabase>,
    max_results: usize,
}

impl LiteratureSearch {
    /// 创建检索服务
    ///
    /// # 参数
    /// - `database`: 文献库客户端
    /// - `max_results`: 单次检索返回的最大 ID 数
    pub fn new(database: Arc<dyn LiteratureDatabase>, max_results: usize) -> Self {
        Self {
            database,
            max_results,
        }
    }

    /// 按术语与回溯年限检索文献，以当前年份为区间终点
    pub async fn search_literature(&self, term: &str, window: RecencyWindow) -> Vec<PaperSummary> {
        self.search_for_year(term, window, current_year()).await
    }

    /// 按术语与回溯年限检索文献，区间终点由调用方给定
    ///
    /// 永不失败：上游不可用时返回空列表。
    pub async fn search_for_year(
        &self,
        term: &str,
        window: RecencyWindow,
        current_year: i32,
    ) -> Vec<PaperSummary> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        let query = build_query(term, window.year_range(current_year));
        info!("🔍 PubMed 检索: {}", query);

        match self.try_search(&query).await {
            Ok(papers) => {
                info!("✓ 检索完成，得到 {} 篇文献", papers.len());
                papers
            }
            Err(e) => {
                warn!("⚠️ {}，按无结果处理", e);
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str) -> PipelineResult<Vec<PaperSummary>> {
        let search_response = self
            .database
            .search(query, self.max_results)
            .await
            .map_err(|e| PipelineError::UpstreamSearch(format!("{:#}", e)))?;

        let mut ids = extract_ids(&search_response);
        ids.truncate(self.max_results);
        if ids.is_empty() {
            debug!("esearch 未返回任何 ID");
            return Ok(Vec::new());
        }

        debug!("esearch 返回 {} 个 ID: {}", ids.len(), ids.join(","));

        let summary_response = self
            .database
            .fetch_summaries(&ids)
            .await
            .map_err(|e| PipelineError::UpstreamSearch(format!("{:#}", e)))?;

        Ok(normalize_summaries(&ids, &summary_response))
    }
}

/// 当前年份（本地时区）
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// 构建检索式：MeSH 限定 + 出版年份闭区间
pub fn build_query(term: &str, range: YearRange) -> String {
    let term = term.replace('"', "");
    format!(
        "\"{}\"[MeSH Terms] AND (\"{}\"[Date - Publication] : \"{}\"[Date - Publication])",
        term.trim(),
        range.start,
        range.end
    )
}

/// 从 esearch 响应中取出 ID 列表
///
/// 缺少 `esearchresult.idlist` 时返回空列表；数字形式的 ID 也被接受。
pub fn extract_ids(raw: &Value) -> Vec<String> {
    raw.pointer("/esearchresult/idlist")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|id| match id {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// 将 esummary 原始响应归一化为 [`PaperSummary`] 列表
///
/// 按 `ids` 的顺序输出；没有对应记录（或记录带 `error` 字段）的 ID 被丢弃，
/// 因此输出长度不超过 `ids` 长度。
pub fn normalize_summaries(ids: &[String], raw: &Value) -> Vec<PaperSummary> {
    let Some(result) = raw.get("result").and_then(Value::as_object) else {
        warn!("esummary 响应缺少 result 字段");
        return Vec::new();
    };

    ids.iter()
        .filter_map(|id| {
            let record = result.get(id).and_then(Value::as_object);
            let Some(record) = record.filter(|r| !r.contains_key("error")) else {
                debug!("ID {} 没有元数据记录，已丢弃", id);
                return None;
            };

            let title = record
                .get("title")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(NO_TITLE)
                .to_string();

            Some(PaperSummary {
                id: id.clone(),
                title,
                authors: join_authors(record.get("authors")),
                pubdate: non_empty_str(record.get("pubdate")),
                source: non_empty_str(record.get("source")),
            })
        })
        .collect()
}

/// 拼接作者显示串；作者项可以是 `{ "name": ... }` 或纯字符串
fn join_authors(authors: Option<&Value>) -> String {
    let names: Vec<&str> = authors
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|author| match author {
                    Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                    Value::String(name) => Some(name.as_str()),
                    _ => None,
                })
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        NO_AUTHORS.to_string()
    } else {
        names.join(", ")
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
