//! WebSocket upgrade handler: origin check, then one session per connection.

use axum::extract::ws::WebSocket;
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::StreamExt;

use crate::error::ApiError;
use crate::AppState;

use super::fanout::Broadcaster;
use super::session::Session;

/// Query parameter carrying the client's display name.
const NAME_PARAM: &str = "id";

/// First `id` value in the query string. Missing means empty; repeats
/// after the first are ignored.
fn display_name(params: &[(String, String)]) -> String {
    params
        .iter()
        .find(|(key, _)| key == NAME_PARAM)
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !state.origins.allows(origin) {
        tracing::warn!(%origin, "websocket origin rejected");
        return Err(ApiError::forbidden("Origin not allowed"));
    }

    let name = display_name(&params);
    let broadcaster = state.broadcaster.clone();
    Ok(ws
        .on_failed_upgrade(|e| tracing::warn!(?e, "websocket upgrade failed"))
        .on_upgrade(move |socket| handle_connection(socket, name, broadcaster)))
}

async fn handle_connection(socket: WebSocket, name: String, broadcaster: Broadcaster) {
    let (ws_tx, ws_rx) = socket.split();
    Session::new(name, broadcaster).run(Box::new(ws_tx), ws_rx).await;
}
