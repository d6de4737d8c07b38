#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, http};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use relay_api::config::Config;
use relay_api::AppState;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5000";

pub fn test_config() -> Config {
    Config {
        port: 0,
        allowed_origins: vec![
            ALLOWED_ORIGIN.to_string(),
            "https://sub.yourdomain.com".to_string(),
        ],
    }
}

/// Start an actual TCP server for WebSocket testing.
/// The server runs in the background.
pub async fn start_ws_server() -> (SocketAddr, AppState) {
    let state = AppState::new(test_config());
    let app = relay_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Build the upgrade request for `/ws`, optionally with an `Origin` header.
pub fn ws_request(
    addr: SocketAddr,
    query: &str,
    origin: Option<&str>,
) -> tungstenite::handshake::client::Request {
    let mut request = format!("ws://{addr}/ws{query}")
        .into_client_request()
        .expect("client request");
    if let Some(origin) = origin {
        request.headers_mut().insert(
            http::header::ORIGIN,
            http::HeaderValue::from_str(origin).expect("origin header"),
        );
    }
    request
}

/// Connect with an allowed origin using `name` as the display identifier.
pub async fn connect(addr: SocketAddr, name: &str) -> WsStream {
    let request = ws_request(addr, &format!("?id={name}"), Some(ALLOWED_ORIGIN));
    let (ws, _) = tokio_tungstenite::connect_async(request)
        .await
        .expect("ws connect");
    ws
}

/// Read the next frame, skipping control frames.
pub async fn next_frame(ws: &mut WsStream) -> tungstenite::Message {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream ended")
            .expect("ws read error");
        match msg {
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => return other,
        }
    }
}

/// Read the next frame and return it as text.
pub async fn next_text(ws: &mut WsStream) -> String {
    match next_frame(ws).await {
        tungstenite::Message::Text(t) => t.as_str().to_string(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

/// Read the next frame and parse it as a JSON notice.
pub async fn next_json(ws: &mut WsStream) -> serde_json::Value {
    let text = next_text(ws).await;
    serde_json::from_str(&text).expect("parse notice")
}

/// Wait until the registry holds exactly `expected` connections.
pub async fn wait_for_connections(state: &AppState, expected: usize) {
    let registry = state.broadcaster.registry().clone();
    time::timeout(Duration::from_secs(5), async move {
        while registry.len().await != expected {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timeout waiting for registry size");
}
