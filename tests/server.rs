//! Full server over real sockets: edge listener, origin relay, analytics host.

use std::time::Duration;

use tokio::net::TcpListener;

use umami_edge::{EdgeConfig, HttpServer, Shutdown, UmamiPlugin};

mod common;

use common::{config, origin_router, start_mock_umami, PAGE};

async fn start_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, origin_router()).await;
    });
    addr.to_string()
}

#[tokio::test]
async fn test_server_relays_injects_and_forwards() {
    let umami = start_mock_umami(Duration::ZERO).await;
    let origin = start_origin().await;

    let mut edge_config = EdgeConfig::default();
    edge_config.origin.address = origin;
    edge_config.timeouts = common::timeouts();
    edge_config.umami = config(&umami.url());
    edge_config.umami.server_side_tracking = true;
    edge_config.umami.server_side_tracking_mode = "notinjected".into();

    let plugin = UmamiPlugin::new(&edge_config.umami, &edge_config.timeouts)
        .await
        .unwrap();
    let snippet = plugin.snippet().unwrap().to_string();
    let server = HttpServer::new(edge_config, plugin).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let edge = format!("http://{}", listener.local_addr().unwrap());
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::new();

    // Page through the origin relay, with the tracker spliced in
    let response = client.get(format!("{}/", edge)).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body = response.text().await.unwrap();
    assert_eq!(body, PAGE.replacen("</head>", &format!("{}</head>", snippet), 1));

    // Forward path straight to the analytics host
    let response = client
        .post(format!("{}/_umami/api/collect", edge))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    let hits = umami.hits();
    let relayed = hits.last().unwrap();
    assert_eq!(relayed.path, "/api/collect");
    assert!(relayed.headers.contains_key("x-forwarded-for"));

    // Non-HTML page: no injection, so the server reports the view
    let response = client.get(format!("{}/api/data", edge)).send().await.unwrap();
    assert_eq!(response.text().await.unwrap(), r#"{"html":"</head>"}"#);
    let events = umami.wait_for_events(1, Duration::from_secs(5)).await;
    assert_eq!(events.len(), 1);
    let event: serde_json::Value = serde_json::from_slice(&events[0].body).unwrap();
    assert_eq!(event["payload"]["url"], "/api/data");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_server_reports_unreachable_origin() {
    let umami = start_mock_umami(Duration::ZERO).await;
    let closed = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let mut edge_config = EdgeConfig::default();
    edge_config.origin.address = closed.to_string();
    edge_config.umami = config(&umami.url());

    let plugin = UmamiPlugin::new(&edge_config.umami, &edge_config.timeouts)
        .await
        .unwrap();
    let app = HttpServer::new(edge_config, plugin).unwrap().router();

    let (status, _, _) = common::send(&app, common::get("/")).await;
    assert_eq!(status, 502);
}

#[test]
fn test_server_rejects_bad_origin_address() {
    let mut edge_config = EdgeConfig::default();
    edge_config.origin.address = "not an authority".into();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let plugin = runtime
        .block_on(UmamiPlugin::new(&edge_config.umami, &edge_config.timeouts))
        .unwrap();
    assert!(HttpServer::new(edge_config, plugin).is_err());
}
