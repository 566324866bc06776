use tower_http::{cors::CorsLayer, trace::TraceLayer};

use quote_server::{Config, ServerState, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境与日志
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;
    let log_dir = config.log_dir();
    quote_server::init_logger_with_file(Some(&config.log_level), log_dir.to_str());

    print_banner();
    tracing::info!("Quote server starting (env: {})", config.environment);

    // 2. 初始化状态（数据库 + JWT）
    let state = ServerState::initialize(&config).await?;

    // 3. 路由与中间件
    let app = quote_server::api::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // 4. 启动 HTTP 服务器
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Quote server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
