//! HTTP Server 实现
//!
//! 使用 axum 创建日程 API Server，支持启动和优雅关闭。

use axum::{routing::get, Router};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState, Clock};
use crate::config::{AppConfig, DEFAULT_HOST};
use crate::storage::Database;

/// Server 控制句柄
///
/// 用于控制 Server 的生命周期，丢弃时自动关闭
pub struct ServerHandle {
    /// 关闭信号发送器
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// 当前运行的端口
    port: u16,
}

impl ServerHandle {
    /// 获取当前端口
    pub fn port(&self) -> u16 {
        self.port
    }

    /// 关闭 Server
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// 创建路由
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route(
            "/api/schedules",
            get(handlers::list_schedules).post(handlers::create_schedule),
        )
        .route(
            "/api/schedules/{id}",
            get(handlers::get_schedule)
                .put(handlers::update_schedule)
                .patch(handlers::patch_schedule)
                .delete(handlers::delete_schedule),
        )
        .route("/api/analytics", get(handlers::analytics))
        .route("/api/analytics/dashboard", get(handlers::dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// 日程 API Server
pub struct ApiServer {
    db: Arc<Mutex<Database>>,
    clock: Clock,
    host: String,
}

impl ApiServer {
    /// 创建新的 Server 实例，默认只监听本地地址
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self {
            db,
            clock: Clock::System,
            host: DEFAULT_HOST.to_string(),
        }
    }

    /// 指定时间来源
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// 指定监听地址
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// 启动 Server
    ///
    /// # Arguments
    /// * `port` - 监听端口，必须 >= 1024
    ///
    /// # Returns
    /// ServerHandle 用于控制 Server 生命周期
    pub async fn start(&self, port: u16) -> Result<ServerHandle, String> {
        // 验证端口
        AppConfig::validate_port(port)?;

        // 创建共享状态
        let state = Arc::new(AppState {
            db: self.db.clone(),
            clock: self.clock,
        });
        let app = create_router(state);

        // 创建 TCP listener
        let listener = tokio::net::TcpListener::bind((self.host.as_str(), port))
            .await
            .map_err(|e| format!("Failed to bind to {}:{}: {}", self.host, port, e))?;

        // 创建关闭信号
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        // 在后台运行 Server
        tokio::spawn(async move {
            let graceful = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = graceful.await {
                tracing::error!(error = %e, "Server error");
            }
        });

        tracing::info!(host = %self.host, port, "Schedule API listening");

        Ok(ServerHandle {
            shutdown_tx: Some(shutdown_tx),
            port,
        })
    }

    /// 检查端口是否可用
    pub async fn check_port_available(host: &str, port: u16) -> bool {
        tokio::net::TcpListener::bind((host, port)).await.is_ok()
    }
}
