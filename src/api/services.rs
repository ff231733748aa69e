use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{
    error::ApiError,
    models::{HealthResponse, InteractionEvent, InteractionResponse},
    state::AppState,
};
use crate::observability::Metrics;
use crate::pixiv::proxy::relayable_headers;
use crate::worker::DeliveryQueue;

/// Interaction endpoint (POST /interactions)
///
/// Signature verification has already happened in the route middleware.
/// Pings are answered with a pong. The configured command is answered with a
/// deferred response after its delivery job is queued; the job runs after
/// this response is sent. Everything else is acknowledged as deferred too.
pub async fn interactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InteractionResponse>, ApiError> {
    require_json(&headers)?;

    state.metrics.interaction_received();

    let event = InteractionEvent::from_slice(&body)?;
    let response = dispatch(
        event,
        &state.config.discord.command_name,
        &state.queue,
        &state.metrics,
    );

    Ok(Json(response))
}

/// Accepts `application/json` with optional parameters such as a charset
fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;

    let media_type: mime::Mime = content_type
        .parse()
        .map_err(|_| ApiError::InvalidPayload(format!("invalid Content-Type: {content_type}")))?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::JSON {
        return Err(ApiError::InvalidPayload(format!(
            "expected application/json, got {}",
            media_type.essence_str()
        )));
    }

    Ok(())
}

/// Maps a decoded interaction to its immediate reply
///
/// Never waits on delivery: a full queue drops the job and the placeholder
/// is left to expire.
pub fn dispatch(
    event: InteractionEvent,
    command_name: &str,
    queue: &DeliveryQueue,
    metrics: &Metrics,
) -> InteractionResponse {
    match event {
        InteractionEvent::Ping => {
            debug!("Answering ping");
            InteractionResponse::pong()
        }
        InteractionEvent::Command(command) if command.data.name == command_name => {
            let job = command.delivery_job();
            match queue.schedule(job) {
                Ok(()) => {
                    metrics.delivery_scheduled();
                    info!(channel_id = %command.channel_id, "Delivery scheduled");
                }
                Err(e) => {
                    metrics.delivery_rejected();
                    warn!(error = %e, channel_id = %command.channel_id, "Delivery dropped");
                }
            }
            InteractionResponse::deferred()
        }
        InteractionEvent::Command(command) => {
            debug!(command = %command.data.name, "Ignoring unhandled command");
            InteractionResponse::deferred()
        }
        InteractionEvent::Other(kind) => {
            debug!(kind, "Ignoring interaction");
            InteractionResponse::deferred()
        }
    }
}

/// Image proxy (GET /pixiv/image/{*path})
///
/// Streams the upstream body through without buffering it. Upstream status
/// and headers are relayed as-is, minus hop-by-hop headers.
pub async fn pixiv_image(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let upstream = state.pixiv.fetch_image(&path).await?;

    let status = upstream.status();
    let headers = relayable_headers(upstream.headers());
    if !status.is_success() {
        warn!(%status, %path, "Upstream image request failed");
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;

    Ok(response)
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());
    components.insert(
        "delivery_queue".to_string(),
        if state.queue.is_closed() {
            "unhealthy"
        } else {
            "healthy"
        }
        .to_string(),
    );

    let all_healthy = components.values().all(|status| status == "healthy");
    let (status_code, overall_status) = if all_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        deliveries: state.metrics.snapshot(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}
