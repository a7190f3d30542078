use std::fs;
use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use tokio::net::TcpListener;

use ledis::client::ExecuteClient;
use ledis::console::ReplyOrder;
use ledis::error::ConsoleError;
use ledis::handlers::line::run_lines;
use ledis::printer::LogPrinter;
use ledis::server::{router, serve_listener, ServerConfig};
use ledis::storage::Ledis;

async fn spawn_server(ledis: Ledis, static_dir: Option<&std::path::Path>) -> Result<String> {
    let app = router(ledis, static_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn test_execute_round_trip() -> Result<()> {
    let url = spawn_server(Ledis::new(), None).await?;
    let client = ExecuteClient::new(&url, None)?;

    assert_eq!(client.execute("SET a 1").await?, "OK");
    assert_eq!(client.execute("get a").await?, "1");
    assert_eq!(client.execute("SADD s y x").await?, "OK");
    assert_eq!(client.execute("SMEMBERS s").await?, "x,y");
    assert_eq!(client.execute("KEYS").await?, "a,s");

    let err = client.execute("GET s").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Server(_)));
    assert_eq!(
        err.to_string(),
        "key is not valid, this key may be a set key and does not support GET command"
    );

    let err = client.execute("PING").await.unwrap_err();
    assert_eq!(err.to_string(), "Unknown command");
    Ok(())
}

#[tokio::test]
async fn test_wire_format() -> Result<()> {
    let url = spawn_server(Ledis::new(), None).await?;
    let http = reqwest::Client::new();
    let execute = format!("{}/execute", url);

    let resp = http
        .post(&execute)
        .json(&serde_json::json!({ "command": "SET k v" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body, serde_json::json!({ "response": ["OK"] }));

    let resp = http
        .post(&execute)
        .json(&serde_json::json!({ "command": "SET k" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"], "SET command format is: SET key value");

    let resp = http.post(&execute).body("not json").send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await?, "Bad Request");

    let resp = http
        .post(&execute)
        .json(&serde_json::json!({ "cmd": "KEYS" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = http.get(&execute).send().await?;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = http.get(format!("{}/nowhere", url)).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_plain_text_rejection_renders_fallback() -> Result<()> {
    // A body the server cannot decode comes back as plain text, which the
    // console reports with the generic message.
    let url = spawn_server(Ledis::new(), None).await?;
    let resp = reqwest::Client::new()
        .post(format!("{}/execute", url))
        .body("{}")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.bytes().await?;
    assert_eq!(ledis::client::decode_error(&body), ledis::error::UNKNOWN_ERROR);
    Ok(())
}

#[tokio::test]
async fn test_static_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("views"))?;
    fs::create_dir_all(dir.path().join("static"))?;
    fs::write(dir.path().join("views/index.html"), "<pre id=\"output\"></pre>")?;
    fs::write(dir.path().join("static/app.css"), "body {}")?;

    let url = spawn_server(Ledis::new(), Some(dir.path())).await?;
    let http = reqwest::Client::new();

    let resp = http.get(format!("{}/", url)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await?, "<pre id=\"output\"></pre>");

    let resp = http.get(format!("{}/static/app.css", url)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await?, "body {}");

    let resp = http.get(format!("{}/static/missing.js", url)).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_line_session_against_server() -> Result<()> {
    let ledis = Ledis::new();
    ledis.handle("SET a 1").await?;
    ledis.handle("SADD s y x").await?;
    let url = spawn_server(ledis, None).await?;
    let client = ExecuteClient::new(&url, None)?;

    let mut out = Vec::new();
    let console = run_lines(
        &client,
        ReplyOrder::Submission,
        LogPrinter::new(false),
        &b"GET a\nSMEMBERS s\n\nGET zz\n"[..],
        &mut out,
    )
    .await?;

    assert_eq!(
        console.log().entries(),
        [
            "> GET a",
            "> SMEMBERS s",
            "> GET zz",
            "1",
            "x,y",
            "Error: key is not valid, this key may be a set key and does not support GET command",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_graceful_shutdown() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    let cfg = ServerConfig {
        bind_addr: listener.local_addr()?,
        static_dir: None,
        gc_interval: Duration::from_millis(50),
    };
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_listener(listener, cfg, Ledis::new(), async move {
        let _ = stop_rx.await;
    }));

    let client = ExecuteClient::new(&url, None)?;
    assert_eq!(client.execute("KEYS").await?, "");

    let _ = stop_tx.send(());
    tokio::time::timeout(Duration::from_secs(5), server).await???;
    Ok(())
}
