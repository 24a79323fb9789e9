//! HTTP 服务 - 编排层入口
//!
//! ## 路由
//! - `POST /`、`POST /api`、`POST /.netlify/functions/api` → 流水线调度
//! - 同路径的 `OPTIONS` → 空的成功响应（跨域预检）
//! - `GET /health` → 存活探针，不触碰任何服务
//! - `GET /diagnostics/models` → 仅在开启诊断时挂载
//! - 其他方法 → 405，其他路径 → 404，均为 `{ "error": message }`
//!
//! 所有响应都带宽松的跨域头，内容类型统一为 JSON。

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::orchestrator::pipeline::Pipeline;
use crate::services::ModelDiagnostics;
use crate::utils::logging;

/// 路由共享状态
///
/// 只包含启动时构建的不可变句柄，请求之间没有共享的可变状态。
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub diagnostics: Option<Arc<ModelDiagnostics>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: ModelDiagnostics) -> Self {
        self.diagnostics = Some(Arc::new(diagnostics));
        self
    }
}

/// 构建路由
pub fn create_router(state: AppState) -> Router {
    let action_route = post(action_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed_handler);

    let mut router = Router::new()
        .route("/", action_route.clone())
        .route("/api", action_route.clone())
        .route("/.netlify/functions/api", action_route)
        .route("/health", get(health_handler).fallback(method_not_allowed_handler));

    if state.diagnostics.is_some() {
        router = router.route(
            "/diagnostics/models",
            get(list_models_handler).fallback(method_not_allowed_handler),
        );
    }

    // 最外层：CorsLayer 直接应答的预检也需要内容类型
    router
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .with_state(state)
}

/// POST - 流水线调度
async fn action_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let envelope = state.pipeline.handle_body(&body).await;
    let status = if envelope.client_error {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(envelope.body)).into_response()
}

/// OPTIONS - 跨域预检，直接返回空的成功响应
async fn preflight_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        "",
    )
        .into_response()
}

/// 路径存在但方法不支持
async fn method_not_allowed_handler() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "不支持的请求方法" })),
    )
        .into_response()
}

/// 未知路径
async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "未知的路径" }))).into_response()
}

/// GET /health
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /diagnostics/models
async fn list_models_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let Some(diagnostics) = state.diagnostics.as_ref() else {
        return Json(json!({ "error": "诊断接口未开启" }));
    };

    match diagnostics.list_models().await {
        Ok(models) => Json(json!({ "models": models })),
        Err(e) => Json(e.to_envelope()),
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    state: AppState,
}

impl App {
    /// 初始化应用：构建模型句柄与客户端（只执行一次）
    pub fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let pipeline = Pipeline::from_config(&config)?;
        let mut state = AppState::new(pipeline);

        if config.enable_diagnostics {
            info!("🩺 诊断接口已开启: GET /diagnostics/models");
            state = state.with_diagnostics(ModelDiagnostics::new(&config));
        }

        Ok(Self { config, state })
    }

    /// 运行 HTTP 服务，直到收到 Ctrl-C
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_address
            .parse()
            .with_context(|| format!("无效的监听地址: {}", self.config.bind_address))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("无法监听 {}", addr))?;

        info!("✓ 服务已启动: http://{}", addr);

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP 服务异常退出")?;

        info!("👋 服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // 无法安装信号处理器时一直运行
        std::future::pending::<()>().await;
    }
}
