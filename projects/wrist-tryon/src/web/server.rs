use crate::catalog::Catalog;
use crate::cli::Args;
use crate::detector::DetectorClient;
use crate::web::api;
use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Shared handler state: the item catalog and the detector client.
pub struct AppState {
    pub catalog: Catalog,
    pub detector: DetectorClient,
}

pub async fn run_server(args: Args) -> Result<()> {
    let catalog = Catalog::new(&args.catalog_root);
    info!(
        "catalog root {} ({} items)",
        args.catalog_root,
        catalog.list().len()
    );

    // The blocking HTTP client must not be built on a runtime worker thread.
    let detector_url = args.detector_url.clone();
    let detector_token = args.detector_token.clone();
    let detector =
        tokio::task::spawn_blocking(move || DetectorClient::new(detector_url, detector_token))
            .await??;

    let state = Arc::new(AppState { catalog, detector });

    let mut current_port = args.port;
    let listener = loop {
        let addr = SocketAddr::new(args.host, current_port);
        match TcpListener::bind(addr) {
            Ok(listener) => {
                listener.set_nonblocking(true)?;
                info!("Successfully bound to {}", addr);
                break listener;
            }
            Err(e) => {
                warn!("Failed to bind to {}: {}. Trying next port...", addr, e);
                current_port += 1;
                if current_port == 0 {
                    return Err(anyhow::anyhow!("No available ports found"));
                }
            }
        }
    };

    let app = Router::new()
        .route("/api/health", get(api::health))
        .route("/api/items", get(api::get_items))
        .route("/api/items/:name/image", get(api::get_item_image))
        .route("/api/tryon", post(api::try_on_handler))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let tokio_listener = tokio::net::TcpListener::from_std(listener)?;
    info!(
        "Wrist try-on server started on http://{:?}",
        tokio_listener.local_addr()?
    );

    axum::serve(tokio_listener, app).await?;

    Ok(())
}
