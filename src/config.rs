//! 程序配置
//!
//! 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 默认配置文件名（位于工作目录）
const DEFAULT_CONFIG_FILE: &str = "pubmed-review.toml";

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_address: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 是否挂载模型诊断接口
    pub enable_diagnostics: bool,
    // --- LLM 配置 ---
    /// 模型服务凭证，缺失时术语扩展与综述生成直接报配置错误
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- PubMed E-utilities 配置 ---
    pub pubmed_base_url: String,
    pub pubmed_api_key: Option<String>,
    pub pubmed_tool: String,
    pub pubmed_email: Option<String>,
    /// 单次外部 HTTP 调用超时（秒）
    pub http_timeout_secs: u64,
    // --- 流水线上限 ---
    /// 检索返回的最大文献数
    pub max_search_results: usize,
    /// 单次综述最多送入模型的文献数
    pub max_analysis_papers: usize,
    /// 未指定年限时的默认回溯年数
    pub default_recency_years: u32,
    /// 综述摘要使用的语言
    pub summary_language: String,
    /// 实际读取的配置文件（未读取时为 None）
    pub source_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8888".to_string(),
            verbose_logging: false,
            enable_diagnostics: false,
            llm_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.0-flash".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 4096,
            pubmed_base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            pubmed_api_key: None,
            pubmed_tool: "pubmed-review".to_string(),
            pubmed_email: None,
            http_timeout_secs: 25,
            max_search_results: 10,
            max_analysis_papers: 3,
            default_recency_years: 5,
            summary_language: "Japanese".to_string(),
            source_file: None,
        }
    }
}

/// TOML 配置文件结构，所有字段均可省略
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub bind_address: Option<String>,
    pub verbose_logging: Option<bool>,
    pub enable_diagnostics: Option<bool>,
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: Option<String>,
    pub llm_model_name: Option<String>,
    pub llm_temperature: Option<f32>,
    pub llm_max_tokens: Option<u32>,
    pub pubmed_base_url: Option<String>,
    pub pubmed_api_key: Option<String>,
    pub pubmed_tool: Option<String>,
    pub pubmed_email: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub max_search_results: Option<usize>,
    pub max_analysis_papers: Option<usize>,
    pub default_recency_years: Option<u32>,
    pub summary_language: Option<String>,
}

impl Config {
    /// 加载完整配置：默认值 → 配置文件 → 环境变量
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_file_path() {
            let file_config = load_file_config(&path)?;
            config = config.merge_file(file_config);
            config.source_file = Some(path);
        }

        Ok(config.merge_env(|name| std::env::var(name).ok()))
    }

    /// 只从环境变量加载（不读配置文件）
    pub fn from_env() -> Self {
        Self::default().merge_env(|name| std::env::var(name).ok())
    }

    /// 是否配置了模型服务凭证
    pub fn has_llm_credential(&self) -> bool {
        self.llm_api_key.is_some()
    }

    /// 用配置文件中的字段覆盖当前值
    pub fn merge_file(self, file: FileConfig) -> Self {
        Self {
            bind_address: file.bind_address.unwrap_or(self.bind_address),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
            enable_diagnostics: file.enable_diagnostics.unwrap_or(self.enable_diagnostics),
            llm_api_key: non_empty(file.llm_api_key).or(self.llm_api_key),
            llm_api_base_url: file.llm_api_base_url.unwrap_or(self.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(self.llm_model_name),
            llm_temperature: file.llm_temperature.unwrap_or(self.llm_temperature),
            llm_max_tokens: file.llm_max_tokens.unwrap_or(self.llm_max_tokens),
            pubmed_base_url: file.pubmed_base_url.unwrap_or(self.pubmed_base_url),
            pubmed_api_key: non_empty(file.pubmed_api_key).or(self.pubmed_api_key),
            pubmed_tool: file.pubmed_tool.unwrap_or(self.pubmed_tool),
            pubmed_email: non_empty(file.pubmed_email).or(self.pubmed_email),
            http_timeout_secs: file.http_timeout_secs.unwrap_or(self.http_timeout_secs),
            max_search_results: file.max_search_results.unwrap_or(self.max_search_results),
            max_analysis_papers: file.max_analysis_papers.unwrap_or(self.max_analysis_papers),
            default_recency_years: file
                .default_recency_years
                .unwrap_or(self.default_recency_years),
            summary_language: file.summary_language.unwrap_or(self.summary_language),
            source_file: self.source_file,
        }
    }

    /// 用环境变量覆盖当前值
    ///
    /// `lookup` 抽象了环境变量读取，便于测试。解析失败的值保持原值。
    pub fn merge_env<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_api_key = non_empty(lookup("LLM_API_KEY"))
            .or_else(|| non_empty(lookup("GEMINI_API_KEY")))
            .or(self.llm_api_key);

        Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(self.bind_address),
            verbose_logging: parse_env(lookup("VERBOSE_LOGGING")).unwrap_or(self.verbose_logging),
            enable_diagnostics: parse_env(lookup("ENABLE_DIAGNOSTICS")).unwrap_or(self.enable_diagnostics),
            llm_api_key,
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: parse_env(lookup("LLM_TEMPERATURE")).unwrap_or(self.llm_temperature),
            llm_max_tokens: parse_env(lookup("LLM_MAX_TOKENS")).unwrap_or(self.llm_max_tokens),
            pubmed_base_url: lookup("PUBMED_BASE_URL").unwrap_or(self.pubmed_base_url),
            pubmed_api_key: non_empty(lookup("PUBMED_API_KEY")).or(self.pubmed_api_key),
            pubmed_tool: lookup("PUBMED_TOOL").unwrap_or(self.pubmed_tool),
            pubmed_email: non_empty(lookup("PUBMED_EMAIL")).or(self.pubmed_email),
            http_timeout_secs: parse_env(lookup("HTTP_TIMEOUT_SECS")).unwrap_or(self.http_timeout_secs),
            max_search_results: parse_env(lookup("MAX_SEARCH_RESULTS")).unwrap_or(self.max_search_results),
            max_analysis_papers: parse_env(lookup("MAX_ANALYSIS_PAPERS")).unwrap_or(self.max_analysis_papers),
            default_recency_years: parse_env(lookup("DEFAULT_RECENCY_YEARS"))
                .unwrap_or(self.default_recency_years),
            summary_language: lookup("SUMMARY_LANGUAGE").unwrap_or(self.summary_language),
            source_file: self.source_file,
        }
    }
}

/// 解析 TOML 配置文件
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
    let file_config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
    Ok(file_config)
}

/// 确定配置文件路径：环境变量优先，其次工作目录下的默认文件
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PUBMED_REVIEW_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

/// 解析环境变量值，解析失败视为未配置
fn parse_env<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// 空字符串视为未配置
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
