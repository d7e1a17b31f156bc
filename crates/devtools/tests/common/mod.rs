//! Shared scaffolding for integration tests: a mock debugging peer speaking
//! the wire protocol over a real WebSocket, plus wiremock fixtures for the
//! discovery surface.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Decides the `result` for each command; `None` leaves the caller waiting.
pub type Responder = Arc<dyn Fn(&str, &Value) -> Option<Value> + Send + Sync>;

pub fn reply_empty() -> Responder {
    Arc::new(|_, _| Some(json!({})))
}

/// Accept connections forever, answering commands through `responder`.
pub async fn spawn_peer(responder: Responder) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, responder.clone()));
        }
    });

    addr
}

pub async fn serve(stream: TcpStream, responder: Responder) {
    let mut ws = accept_async(stream).await.unwrap();

    while let Some(Ok(message)) = ws.next().await {
        let Message::Text(text) = message else {
            continue;
        };

        let frame: Value = serde_json::from_str(&text).unwrap();
        let id = frame["id"].as_u64().unwrap();
        let method = frame["method"].as_str().unwrap_or_default();

        if let Some(result) = responder(method, &frame["params"]) {
            let reply = json!({ "id": id, "result": result });
            if ws.send(Message::Text(reply.to_string())).await.is_err() {
                break;
            }
        }
    }
}

pub fn page_tab(ws_addr: SocketAddr, id: &str) -> Value {
    json!({
        "id": id,
        "type": "page",
        "title": format!("tab {id}"),
        "url": "about:blank",
        "webSocketDebuggerUrl": format!("ws://{ws_addr}/devtools/page/{id}"),
        "devtoolsFrontendUrl": format!("/devtools/inspector.html?ws={ws_addr}"),
    })
}

/// Discovery server whose `/json/list` returns the given tabs and whose
/// activate/close endpoints acknowledge everything.
pub async fn discovery_server(tabs: Value) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tabs))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/json/(activate|close)/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Target activated"))
        .mount(&server)
        .await;

    server
}

pub fn addr_of(server: &MockServer) -> String {
    server.address().to_string()
}
