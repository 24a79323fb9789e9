use serde::{Deserialize, Serialize};

/// 受控主题词（MeSH 术语）
pub type ControlledTerm = String;

/// 综述报告，模型原样输出的格式化文本
pub type AnalysisReport = String;

/// 缺少作者时的占位值
pub const NO_AUTHORS: &str = "no authors";

/// 缺少标题时的占位值
pub const NO_TITLE: &str = "no title";

/// 回溯年限
///
/// 与当前年份组合为闭区间 `[当前年份 - years, 当前年份]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyWindow {
    pub years: u32,
}

impl RecencyWindow {
    pub fn new(years: u32) -> Self {
        Self { years }
    }

    /// 以给定年份为终点计算年份区间
    pub fn year_range(&self, current_year: i32) -> YearRange {
        let years = i32::try_from(self.years).unwrap_or(i32::MAX);
        YearRange {
            start: current_year.saturating_sub(years),
            end: current_year,
        }
    }
}

/// 出版年份闭区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

/// 文献摘要信息
///
/// `title` 与 `authors` 永远有值（缺失时使用占位值）；
/// `pubdate` / `source` 只在上游提供时序列化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSummary {
    /// PubMed ID
    pub id: String,
    pub title: String,
    /// 逗号拼接的作者显示串
    pub authors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubdate: Option<String>,
    /// 期刊名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PaperSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>, authors: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: authors.into(),
            pubdate: None,
            source: None,
        }
    }
}
