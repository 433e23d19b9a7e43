use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessgate::api::{create_router, AppState};
use tessgate::config::Config;

#[derive(Parser)]
#[command(name = "tessgate")]
#[command(about = "HTTP front end for the Tesseract OCR engine")]
struct Args {
    /// Address to bind, overrides APP_HOST
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides APP_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessgate=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        "Using OCR engine: {} (default language: {})",
        config.engine.binary,
        config.engine.default_language
    );
    let state = AppState::new(config.clone())?;
    if !state.engine.probe().await {
        tracing::warn!("OCR engine could not be started - requests will fail until it is installed");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Tessgate starting on http://{}", addr);
    tracing::info!("  Engine version:  GET  http://{}/", addr);
    tracing::info!("  Languages:       GET  http://{}/languages", addr);
    tracing::info!("  Extract text:    POST http://{}/extract-text?lang=<code>", addr);
    tracing::info!("  Upload limit:    {} bytes", config.server.upload_limit);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
