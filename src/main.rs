use anyhow::{Context, Result};
use crowdwatch::api::{create_app, AppContext};
use crowdwatch::assistant::ChatResponder;
use crowdwatch::config::{apply_env_overrides, load_config, CrowdwatchConfig};
use crowdwatch::media::{MediaAnalyzer, MediaStorage};
use crowdwatch::simulation::OccupancySimulator;
use crowdwatch::state::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crowdwatch=info".into()),
        )
        .init();

    info!("Crowdwatch starting...");

    // Configuration file is optional; defaults apply when CROWDWATCH_CONFIG is unset
    let mut config = match std::env::var("CROWDWATCH_CONFIG") {
        Ok(path) => load_config(&path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to load config from {}", path))?,
        Err(_) => CrowdwatchConfig::default(),
    };
    apply_env_overrides(&mut config);

    info!(
        bind_address = %config.server.bind_address,
        port = config.server.port,
        simulation_enabled = config.simulation.enabled,
        interval_seconds = config.simulation.interval_seconds,
        upload_dir = %config.media.upload_dir.display(),
        "Configuration loaded"
    );

    let store = Arc::new(StateStore::with_default_gates());

    let simulator = Arc::new(OccupancySimulator::new(
        Arc::clone(&store),
        &config.simulation,
    ));
    if config.simulation.enabled {
        simulator.start();
    } else {
        info!("Crowd simulation disabled");
    }

    let analyzer = Arc::new(MediaAnalyzer::new(
        Arc::clone(&store),
        Duration::from_millis(config.media.processing_delay_ms),
    ));
    let storage = MediaStorage::new(config.media.upload_dir.clone(), config.media.max_upload_bytes);
    let responder = Arc::new(ChatResponder::new(config.chat.seed));

    let router = create_app(AppContext {
        store: Arc::clone(&store),
        responder,
        analyzer,
        storage,
        chat: config.chat.clone(),
    });

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "HTTP server listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    simulator.stop();
    server_handle.abort();
    info!("Crowdwatch stopped");

    Ok(())
}
