use anyhow::Result;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use gallery_gateway::{
    config::AppConfig,
    errors, routes,
    services::{
        gallery_service::GalleryService, memory_store::MemoryObjectStore,
        object_store::ObjectStore, s3_store::S3ObjectStore,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!("Starting gallery-gateway with config: {:?}", cfg);
    errors::set_detail_exposure(cfg.expose_error_details());

    // --- Initialize object store ---
    let store: Arc<dyn ObjectStore> = match cfg.store.as_str() {
        "memory" => {
            tracing::info!("In-memory object store initialized (uploads are not durable)");
            Arc::new(MemoryObjectStore::new())
        }
        _ => {
            let store = S3ObjectStore::connect(
                cfg.bucket.clone(),
                cfg.region.clone(),
                cfg.endpoint_url.clone(),
                cfg.force_path_style,
            )
            .await;
            tracing::info!(
                "S3 object store initialized: bucket={} region={}",
                cfg.bucket,
                cfg.region
            );
            Arc::new(store)
        }
    };

    // --- Initialize core service + router ---
    let gallery = GalleryService::new(store, &cfg);
    let app = routes::app(gallery, &cfg)?;

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
