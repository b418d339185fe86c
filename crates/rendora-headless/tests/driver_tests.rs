use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rendora_config::HeadlessConfig;
use rendora_headless::HeadlessDriver;
use rendora_types::RendoraError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Exercises the full bring-up sequence against a real Chrome DevTools
/// endpoint; needs `chromium --remote-debugging-port=9222` running locally.
#[tokio::test]
#[ignore = "Requires Chrome/Chromium with --remote-debugging-port=9222"]
async fn connects_and_renders_a_page() {
    let config = HeadlessConfig::default();
    let driver = HeadlessDriver::connect(config).await.expect("bring-up");

    let page = driver
        .render("http://example.com", false)
        .await
        .expect("render");

    assert_eq!(page.status, 200);
    assert!(page.content.contains("<html"));
}

#[tokio::test]
#[ignore = "Requires Chrome/Chromium with --remote-debugging-port=9222 and headless.pool.enabled=true"]
async fn pooled_sessions_serialize_renders() {
    let mut config = HeadlessConfig::default();
    config.pool.enabled = true;
    config.pool.initial_capacity = 2;
    config.pool.max_capacity = 2;

    let driver = HeadlessDriver::connect(config).await.expect("bring-up");

    let (a, b) = tokio::join!(
        driver.render("http://example.com/a", false),
        driver.render("http://example.com/b", false),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
}

/// A stub DevTools peer: serves `/json/version` over plain HTTP and a CDP
/// websocket that acknowledges every command generically but never emits
/// `Page.loadEventFired`, `Page.domContentEventFired`, or
/// `Network.responseReceived`. Used to drive the real bring-up and render
/// path without a live browser, to prove the render deadline is enforced
/// even when the remote never signals readiness.
async fn spawn_mock_devtools_peer() -> SocketAddr {
    let ws_listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock ws listener");
    let ws_addr = ws_listener.local_addr().expect("ws listener addr");

    tokio::spawn(async move {
        loop {
            let (stream, _) = match ws_listener.accept().await {
                Ok(pair) => pair,
                Err(_) => break,
            };
            tokio::spawn(serve_mock_cdp_connection(stream));
        }
    });

    let http_listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock http listener");
    let http_addr = http_listener.local_addr().expect("http listener addr");
    let ws_url = format!("ws://{ws_addr}/devtools/browser/mock");

    tokio::spawn(async move {
        loop {
            let (stream, _) = match http_listener.accept().await {
                Ok(pair) => pair,
                Err(_) => break,
            };
            tokio::spawn(serve_json_version(stream, ws_url.clone()));
        }
    });

    http_addr
}

async fn serve_json_version(mut stream: tokio::net::TcpStream, ws_url: String) {
    let mut buf = [0u8; 1024];
    let _ = stream.read(&mut buf).await;

    let body = serde_json::json!({ "webSocketDebuggerUrl": ws_url }).to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn serve_mock_cdp_connection(stream: tokio::net::TcpStream) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(s) => s,
        Err(_) => return,
    };
    let (mut write, mut read) = ws_stream.split();

    while let Some(Ok(msg)) = read.next().await {
        let Message::Text(text) = msg else { continue };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
            continue;
        };

        let Some(id) = value.get("id").cloned() else {
            continue;
        };
        let session_id = value.get("sessionId").cloned();
        let method = value.get("method").and_then(|m| m.as_str()).unwrap_or("");

        let result = match method {
            "Target.getTargets" => serde_json::json!({ "targetInfos": [] }),
            "Target.createTarget" => serde_json::json!({ "targetId": "mock-target-1" }),
            "Target.attachToTarget" => serde_json::json!({ "sessionId": "mock-session-1" }),
            "Page.navigate" => serde_json::json!({ "frameId": "mock-frame-1" }),
            // Generic ack for everything else (`Page.enable`, `Network.enable`,
            // `Network.setExtraHTTPHeaders`, `Network.setBlockedURLs`,
            // `Network.setCacheDisabled`, and any handshake call made during
            // `Browser::connect`). Most CDP `*.enable`/`*.set*` commands
            // return an empty object; a handful of plausible fields are
            // included defensively in case something else is expected.
            _ => serde_json::json!({
                "frameId": "mock-frame-1",
                "targetId": "mock-target-1",
                "sessionId": "mock-session-1",
                "targetInfos": [],
                "protocolVersion": "1.3",
                "product": "Mock/1.0",
                "revision": "0",
                "userAgent": "Mock",
                "jsVersion": "0",
            }),
        };

        let mut reply = serde_json::json!({ "id": id, "result": result });
        if let Some(sid) = session_id {
            reply["sessionId"] = sid;
        }
        if write.send(Message::Text(reply.to_string())).await.is_err() {
            return;
        }

        // `Target.createTarget`/`attachToTarget` may be awaited either via
        // the command reply above or via an `attachedToTarget` event,
        // depending on the client's auto-attach strategy — fire the event
        // too so either path is satisfied.
        if method == "Target.createTarget" || method == "Target.attachToTarget" {
            let event = serde_json::json!({
                "method": "Target.attachedToTarget",
                "params": {
                    "sessionId": "mock-session-1",
                    "targetInfo": {
                        "targetId": "mock-target-1",
                        "type": "page",
                        "title": "",
                        "url": "about:blank",
                        "attached": true,
                        "browserContextId": "mock-context-1",
                    },
                    "waitingForDebugger": false,
                },
            });
            if write.send(Message::Text(event.to_string())).await.is_err() {
                return;
            }
        }

        // `Page.loadEventFired`, `Page.domContentEventFired` and
        // `Network.responseReceived` are deliberately never sent — the
        // render this drives must hang until the render deadline fires.
    }
}

#[tokio::test]
async fn render_times_out_when_the_remote_never_signals_readiness() {
    let http_addr = spawn_mock_devtools_peer().await;

    let mut config = HeadlessConfig::default();
    config.url = format!("http://{http_addr}");
    config.timeout_secs = 5;

    let driver = HeadlessDriver::connect(config)
        .await
        .expect("bring-up against the mock devtools peer");

    let start = std::time::Instant::now();
    let result = driver.render("http://example.com", false).await;
    let elapsed = start.elapsed();

    assert!(
        matches!(result, Err(RendoraError::RenderTimeout(_))),
        "expected RenderTimeout, got {result:?}"
    );
    assert!(
        elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(8),
        "deadline not enforced within margin: {elapsed:?}"
    );
}
