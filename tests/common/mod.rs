//! Shared fixtures: a local server standing in for Pixiv and Discord

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use ed25519_dalek::{Signer, SigningKey};
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use roxy::config::Config;

pub const SESSION_TOKEN: &str = "test-session";
pub const REFERER: &str = "https://www.pixiv.net/ajax";
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image payload";

/// `slow.png` is sent as this many chunks, `SLOW_CHUNK_GAP` apart
pub const SLOW_CHUNKS: usize = 6;
pub const SLOW_CHUNK_GAP: Duration = Duration::from_millis(300);

/// Deterministic key the tests sign interactions with
pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

pub fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}

/// Config pointing both upstreams at `upstream`, with secrets filled in
pub fn test_config(upstream: SocketAddr) -> Config {
    let mut config: Config = toml::from_str(&format!(
        r#"
[server]
bind_addr = "127.0.0.1:0"
public_url = "https://roxy.test"
max_body_bytes = 4096

[http]
connect_timeout_secs = 2
request_timeout_secs = 5

[discord]
api_base = "http://{upstream}/api"
command_name = "pixiv"
webhook_name = "Previews"

[pixiv]
ajax_base = "http://{upstream}/ajax"
image_origin = "http://{upstream}/"
referer = "{REFERER}"

[worker]
queue_capacity = 4
fetch_concurrency = 2
"#
    ))
    .expect("test config parses");

    config.discord.public_key = Some(hex::encode(signing_key().verifying_key().to_bytes()));
    config.discord.bot_token = Some("bot-token".to_string());
    config.pixiv.session_token = Some(SESSION_TOKEN.to_string());
    config
}

pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// What the fake upstream saw
#[derive(Debug, Default)]
pub struct Recorded {
    pub ajax_headers: Vec<HeaderMap>,
    pub image_headers: Vec<HeaderMap>,
    pub webhooks_created: Vec<Value>,
    pub executed: Vec<(String, Value)>,
    pub deleted: Vec<String>,
}

#[derive(Clone, Default)]
pub struct Upstream {
    pub recorded: Arc<Mutex<Recorded>>,
    /// Webhooks returned by the channel listing
    pub existing_webhooks: Arc<Mutex<Vec<Value>>>,
}

impl Upstream {
    pub async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route("/ajax/illust/{id}", get(illust))
            .route("/ajax/illust/{id}/pages", get(pages))
            .route("/ajax/user/{id}", get(user))
            .route("/img-original/{*path}", get(image))
            .route(
                "/api/channels/{channel_id}/webhooks",
                get(list_webhooks).post(create_webhook),
            )
            .route("/api/webhooks/{id}/{token}", post(execute_webhook))
            .route(
                "/api/webhooks/{id}/{token}/messages/@original",
                axum::routing::delete(delete_original),
            )
            .with_state(self.clone());

        spawn_server(app).await
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

pub fn gallery_body(id: &str) -> Value {
    json!({
        "illustId": id,
        "illustTitle": format!("Gallery {id}"),
        "createDate": "2021-02-03T04:05:06+00:00",
        "pageCount": 2,
        "userId": "11",
        "tags": {
            "tags": [
                { "tag": "風景", "translation": { "en": "scenery" } },
                { "tag": "オリジナル" }
            ]
        },
        "urls": {
            "small": null,
            "regular": format!("https://i.pximg.net/img-master/img/2021/02/03/{id}_p0_master1200.jpg"),
            "original": format!("https://i.pximg.net/img-original/img/2021/02/03/{id}_p0.png")
        },
        "extraData": { "meta": { "canonical": format!("https://www.pixiv.net/en/artworks/{id}") } }
    })
}

async fn illust(
    State(upstream): State<Upstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    upstream.recorded().ajax_headers.push(headers);

    if id == "404" {
        return Json(json!({ "error": true, "message": "Work has been deleted", "body": [] }));
    }
    Json(json!({ "error": false, "message": "", "body": gallery_body(&id) }))
}

async fn pages(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "error": false,
        "body": [{
            "urls": { "original": format!("https://i.pximg.net/img-original/img/{id}_p0.png") },
            "width": 800,
            "height": 600
        }]
    }))
}

async fn user(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "error": false,
        "body": {
            "userId": id,
            "name": "Painter",
            "image": "https://i.pximg.net/user-profile/img/50.jpg",
            "imageBig": "https://i.pximg.net/user-profile/img/170.jpg"
        }
    }))
}

async fn image(
    State(upstream): State<Upstream>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    let authorised = headers
        .get(header::REFERER)
        .is_some_and(|value| value == REFERER);
    upstream.recorded().image_headers.push(headers);

    if !authorised {
        return StatusCode::FORBIDDEN.into_response();
    }
    if path.ends_with("missing.png") {
        return (StatusCode::NOT_FOUND, "no such image").into_response();
    }
    if path.ends_with("slow.png") {
        let chunks = stream::iter(0..SLOW_CHUNKS).then(|_| async {
            tokio::time::sleep(SLOW_CHUNK_GAP).await;
            Ok::<_, std::io::Error>(Bytes::from_static(IMAGE_BYTES))
        });
        return ([(header::CONTENT_TYPE, "image/png")], Body::from_stream(chunks)).into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "max-age=31536000"),
        ],
        IMAGE_BYTES,
    )
        .into_response()
}

async fn list_webhooks(State(upstream): State<Upstream>) -> Json<Value> {
    Json(Value::Array(upstream.existing_webhooks.lock().unwrap().clone()))
}

async fn create_webhook(
    State(upstream): State<Upstream>,
    Json(body): Json<Value>,
) -> Json<Value> {
    upstream.recorded().webhooks_created.push(body);
    Json(json!({ "id": "created-hook", "token": "created-token", "application_id": "app-1" }))
}

async fn execute_webhook(
    State(upstream): State<Upstream>,
    Path((id, token)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> StatusCode {
    upstream
        .recorded()
        .executed
        .push((format!("{id}/{token}"), body));
    StatusCode::NO_CONTENT
}

async fn delete_original(
    State(upstream): State<Upstream>,
    Path((id, token)): Path<(String, String)>,
) -> StatusCode {
    upstream.recorded().deleted.push(format!("{id}/{token}"));
    StatusCode::NO_CONTENT
}
