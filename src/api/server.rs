use std::sync::Arc;

use axum::{Router, middleware, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{health, interactions, pixiv_image},
    signature::{SignatureVerifier, require_signature},
    state::AppState,
};
use crate::config::Config;
use crate::discord::{DeliveryApi, DiscordClient};
use crate::observability::Metrics;
use crate::pixiv::{GallerySource, PixivClient, ProxyUrls};
use crate::worker::{self, Deliverer, DeliveryQueue};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// HTTP surface: signed interactions, the image proxy and health
pub fn router(state: AppState) -> Router {
    let signed = Router::new()
        .route("/interactions", post(interactions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_signature,
        ));

    Router::new()
        .merge(signed)
        .route("/pixiv/image/{*path}", get(pixiv_image))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let config = Arc::new(config);

    let http = crate::http::build_client(&config.http)?;
    let request_timeout = config.http.request_timeout();
    let pixiv = Arc::new(
        PixivClient::new(http.clone(), &config.pixiv, config.pixiv_session_token())?
            .with_request_timeout(request_timeout),
    );
    let discord = Arc::new(
        DiscordClient::new(http, &config.discord.api_base, config.discord_bot_token())?
            .with_request_timeout(request_timeout),
    );
    let verifier = SignatureVerifier::from_hex(config.discord_public_key())?;
    let metrics = Arc::new(Metrics::new());

    let fetch_concurrency = config.worker.effective_fetch_concurrency();
    let deliverer = Arc::new(Deliverer::new(
        Arc::clone(&pixiv) as Arc<dyn GallerySource>,
        discord as Arc<dyn DeliveryApi>,
        ProxyUrls::new(&config.server.public_url),
        config.discord.webhook_name.clone(),
        fetch_concurrency,
    ));

    let (queue, receiver) = DeliveryQueue::new(config.worker.queue_capacity);
    let supervisor = tokio::spawn(worker::supervise(
        receiver,
        deliverer,
        Arc::clone(&metrics),
    ));
    info!(
        queue_capacity = config.worker.queue_capacity,
        fetch_concurrency, "Delivery worker started"
    );

    let address = config.server.bind_addr;
    let app = router(AppState::new(config, pixiv, verifier, queue, metrics));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "roxy listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last queue sender; the supervisor now drains.
    supervisor.await?;
    info!("Delivery worker stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
