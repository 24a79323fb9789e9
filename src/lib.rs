//! # PubMed Review
//!
//! 关键词 → MeSH 术语 → PubMed 文献 → AI 综述 的三段式流水线服务
//!
//! ## 架构设计
//!
//! ### ① 外部服务层（Clients）
//! - `clients/` - 只负责网络调用，返回原始响应
//! - `LanguageModel` - OpenAI 兼容的对话接口
//! - `LiteratureDatabase` - PubMed E-utilities（esearch / esummary / efetch）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，互不调用
//! - `TermExpander` - 关键词扩展为候选术语
//! - `LiteratureSearch` - 检索并归一化文献摘要，上游故障降级为空结果
//! - `SynthesisComposer` - 限量取摘要并生成综述
//! - `ModelDiagnostics` - 可选的模型列表诊断
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 按 action 分发，统一错误信封
//! - `orchestrator/server` - HTTP 路由、跨域、应用生命周期
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{build_language_model, LanguageModel, LiteratureDatabase, PubMedClient};
pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use models::{PaperSummary, RecencyWindow};
pub use orchestrator::{create_router, App, AppState, Envelope, Pipeline};
