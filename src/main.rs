use black76_pricer::errors::PricerResult;
use black76_pricer::state::AppState;
use black76_pricer::{config, server};

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("black76_pricer starting");

    if let Err(e) = run().await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> PricerResult<()> {
    let cfg = config::AppConfig::from_env()?;

    tracing::info!(
        points = cfg.default_grid.point_count,
        low_factor = cfg.default_grid.low_factor,
        high_factor = cfg.default_grid.high_factor,
        parallel_threshold = cfg.parallel_threshold,
        "curve defaults loaded"
    );

    let port = cfg.server_port;
    let app_state = AppState::new(cfg);
    tracing::info!(model = app_state.model.name(), "pricing model ready");

    let app = server::router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
