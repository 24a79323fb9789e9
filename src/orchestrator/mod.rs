//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 接收 `{ action, payload }`，分发到恰好一个业务服务，
//! 把结果编码为统一的 JSON 信封。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 流水线调度器
//! - 解析 action 与 payload
//! - 调用术语扩展 / 文献检索 / 综述生成之一
//! - 错误统一编码为 `{ "error": message }`
//!
//! ### `server` - HTTP 入口
//! - axum 路由、跨域预检、存活探针
//! - 应用生命周期（初始化、运行、优雅退出）
//!
//! ## 层次关系
//!
//! ```text
//! server (HTTP)
//!     ↓
//! pipeline (按 action 分发)
//!     ↓
//! services (能力层：term_expander / literature_search / synthesis)
//!     ↓
//! clients (外部服务：LLM / PubMed)
//! ```
//!
//! 调用之间不保存任何状态：所选术语、检索结果都由调用方在下一次请求中重新提交。

pub mod pipeline;
pub mod server;

pub use pipeline::{Envelope, Pipeline};
pub use server::{create_router, App, AppState};
