use std::sync::Arc;

use clap::Parser;
use rendora_api::routes;
use rendora_api::state::AppState;
use rendora_api::passthrough::ProxyPassThrough;
use rendora_config::RendoraConfig;
use rendora_engine::{RenderEngine, RendoraMetrics};
use rendora_headless::HeadlessDriver;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rendora")]
#[command(about = "Server-side rendering gateway for bot-facing SPA content")]
struct Args {
    /// Explicit config file path; defaults to ./config.{toml,yaml,json} or /etc/rendora/config.*
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = %e, "rendora exited with a fatal error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    // Config must load before logging is initialized the way the rest of
    // this stack sets it up, since `debug` gates the default filter level.
    let config = RendoraConfig::load(args.config.as_deref())?;

    init_tracing(config.debug);

    tracing::info!(
        listen = %format!("{}:{}", config.listen.address, config.listen.port),
        admin_enabled = config.server.enable,
        cache_kind = ?config.cache.kind,
        "starting rendora"
    );

    let metrics = Arc::new(RendoraMetrics::new()?);
    let cache = Arc::from(rendora_cache::build_backend(&config.cache).await?);
    let driver = Arc::new(HeadlessDriver::connect(config.headless.clone()).await?);
    let engine = Arc::new(RenderEngine::new(cache, driver, &config, metrics.clone()));
    let filters = Arc::new(config.filters.clone());

    let proxy = config
        .backend
        .url
        .as_ref()
        .map(|url| Arc::new(ProxyPassThrough::new(url.clone())));
    let static_root = config.backend.static_root.clone();

    let state = AppState {
        engine,
        filters,
        proxy,
        static_root,
        metrics,
        admin_auth: config.server.enable.then(|| config.server.auth.clone()),
    };

    let public_listener = TcpListener::bind((config.listen.address.as_str(), config.listen.port)).await?;
    let public_server = axum::serve(public_listener, routes::public::router(state.clone()))
        .with_graceful_shutdown(shutdown_signal());

    if config.server.enable {
        let admin_listener =
            TcpListener::bind((config.server.listen.address.as_str(), config.server.listen.port)).await?;
        tracing::info!(
            listen = %format!("{}:{}", config.server.listen.address, config.server.listen.port),
            "admin listener enabled"
        );
        let admin_server = axum::serve(admin_listener, routes::admin::router(state))
            .with_graceful_shutdown(shutdown_signal());

        tokio::try_join!(
            async { public_server.await.map_err(anyhow::Error::from) },
            async { admin_server.await.map_err(anyhow::Error::from) },
        )?;
    } else {
        public_server.await?;
    }

    tracing::info!("rendora shutdown complete");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if debug {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
