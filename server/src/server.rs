use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::broadcast;

use claimflow::{
    workflow, AppConfig, Database, ExtractionConsumer, ExtractionQueue, PlaceholderExtractor,
};

use crate::cli::ServeArgs;
use crate::error::ServerError;
use crate::routes::router;
use crate::state::AppState;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), ServerError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let db = Database::connect(&config.resolved_database_url()?).await?;
    if config.seed_default_stages {
        workflow::seed_default_stages(&db).await?;
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let queue = Arc::new(ExtractionQueue::new(config.ingestion.queue_capacity));

    let consumer = if config.ingestion.enabled {
        let extractor = Arc::new(PlaceholderExtractor::new(config.ingestion.extraction_delay()));
        let consumer = ExtractionConsumer::new(db.clone(), Arc::clone(&queue), extractor);
        Some(consumer.spawn(shutdown_tx.subscribe()))
    } else {
        log::info!("Ingestion disabled, extraction requests will not be processed");
        None
    };

    let config = Arc::new(config);
    let state = AppState::new(db.clone(), Arc::clone(&queue), Arc::clone(&config));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid listen address: {}", e),
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let backend = claimflow::db::backend_name(db.conn());
    tracing::info!(%addr, backend, "claimflow server ready");

    let signal_tx = shutdown_tx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            log::info!("Shutdown requested");
            let _ = signal_tx.send(());
        })
        .await?;

    queue.close();
    let _ = shutdown_tx.send(());
    if let Some(handle) = consumer {
        if let Err(e) = handle.await {
            log::error!("Extraction consumer task failed: {}", e);
        }
    }

    db.close().await?;
    log::info!("Server stopped");
    Ok(())
}
