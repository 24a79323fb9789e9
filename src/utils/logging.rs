//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数
use crate::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则按 `verbose` 选择 `debug` 或 `info`。
/// 重复调用不会报错（测试中会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pubmed_review={},tower_http=info", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 PubMed 文献综述服务启动");
    info!("🌐 监听地址: {}", config.bind_address);
    match &config.source_file {
        Some(path) => info!("📄 配置文件: {}", path.display()),
        None => info!("📄 配置文件: 未使用，仅默认值与环境变量"),
    }
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    if config.has_llm_credential() {
        info!("🔑 模型凭证: 已配置");
    } else {
        info!("⚠️ 模型凭证: 未配置，术语扩展与综述生成将返回配置错误");
    }
    info!(
        "📊 检索上限: {} 篇 | 综述上限: {} 篇 | 默认年限: {} 年",
        config.max_search_results, config.max_analysis_papers, config.default_recency_years
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
