//! Schedule Board - 服务入口
//!
//! 加载配置、初始化日志、打开数据库并启动 HTTP API。

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;

use schedule_board::config::AppConfig;
use schedule_board::logging::{init_logging, OpTimer};
use schedule_board::server::ApiServer;
use schedule_board::storage::Database;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "schedule-board")]
#[command(about = "Schedule Board - schedule booking API with analytics")]
#[command(version)]
struct Args {
    /// 配置目录 (包含 settings.yaml 与默认数据库)
    #[arg(long, env = "SCHEDULE_BOARD_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// 监听端口，覆盖配置文件
    #[arg(short, long, env = "SCHEDULE_BOARD_PORT")]
    port: Option<u16>,

    /// 监听地址，覆盖配置文件
    #[arg(long, env = "SCHEDULE_BOARD_HOST")]
    host: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(long)]
    log_level: Option<String>,

    /// 打印生效配置后退出
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_dir = args
        .config_dir
        .clone()
        .unwrap_or_else(AppConfig::default_config_dir);
    let config = apply_overrides(AppConfig::load(&config_dir), &args);

    if args.print_config {
        print!("{}", config.to_yaml().map_err(anyhow::Error::msg)?);
        return Ok(());
    }

    init_logging(&config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_dir = %config_dir.display(),
        "Starting Schedule Board"
    );

    let db_path = config.resolve_database_path(&config_dir);
    let timer = OpTimer::new("database", "open");
    let db = Database::new(&db_path);
    timer.finish_with_result(db.as_ref());
    let db = db.with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    let handle = ApiServer::new(Arc::new(Mutex::new(db)))
        .with_host(config.host.clone())
        .start(config.port)
        .await
        .map_err(anyhow::Error::msg)?;

    shutdown_signal().await;
    handle.shutdown();

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// 命令行参数优先于配置文件
fn apply_overrides(mut config: AppConfig, args: &Args) -> AppConfig {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
