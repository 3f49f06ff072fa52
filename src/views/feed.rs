//! The live change feed used by every page.

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws},
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};

use crate::{
    state::AppState,
    store::{Collection, sqlite::SqliteStore, subscription::Subscription},
};

/// Streams the JSON contents of `collection`: once on connect, and again
/// after every change to it.
pub async fn sync_ws(
    ws: WebSocketUpgrade,
    Path(collection): Path<Collection>,
    State(state): State<AppState>,
) -> Response {
    // subscribe before upgrading, so that nothing written in between is
    // missed
    let subscription = Subscription::new(state.store.clone(), collection);

    ws.on_upgrade(move |socket| handle_socket(socket, subscription))
}

async fn handle_socket(
    socket: ws::WebSocket,
    mut subscription: Subscription<SqliteStore>,
) {
    let (mut sender, mut receiver) = socket.split();
    let collection = subscription.collection();

    let mut send_task = tokio::spawn(async move {
        while let Some(snapshot) = subscription.next().await {
            let json = match snapshot.map(|s| serde_json::to_string(&s)) {
                Ok(Ok(json)) => json,
                Ok(Err(e)) => {
                    tracing::error!(%collection, "failed to serialize snapshot: {e}");
                    break;
                }
                Err(e) => {
                    tracing::error!(%collection, "failed to load snapshot: {e}");
                    break;
                }
            };

            if sender.send(ws::Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {
            // keep alive
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    tracing::debug!(%collection, "change feed client disconnected");
}

