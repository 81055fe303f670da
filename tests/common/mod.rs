//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::{get as get_route, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceExt;

use umami_edge::config::{TimeoutConfig, UmamiConfig};
use umami_edge::UmamiPlugin;

pub const PAGE: &str = "<html><head><title>Home</title></head><body>hi</body></html>";
#[allow(dead_code)]
pub const WEBSITE_ID: &str = "5b5ef3c8-7d8f-4a4b-9c1e-2f0d1a6b7c8d";

/// A request seen by the mock analytics host.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct MockState {
    hits: Arc<Mutex<Vec<Recorded>>>,
    send_delay: Duration,
}

/// Recording stand-in for the analytics host.
pub struct MockUmami {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl MockUmami {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<Recorded> {
        self.hits.lock().unwrap().clone()
    }

    /// Requests to `/api/send`.
    pub fn events(&self) -> Vec<Recorded> {
        self.hits()
            .into_iter()
            .filter(|r| r.path == "/api/send")
            .collect()
    }

    /// Wait until `count` events arrived, or `timeout` passed.
    pub async fn wait_for_events(&self, count: usize, timeout: Duration) -> Vec<Recorded> {
        let deadline = Instant::now() + timeout;
        loop {
            let events = self.events();
            if events.len() >= count || Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

/// Start a mock analytics host on an ephemeral port.
///
/// `/api/send` answers after `send_delay`; `/script.js` serves a tracker;
/// anything else echoes method and path as an HTML page.
pub async fn start_mock_umami(send_delay: Duration) -> MockUmami {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        hits: hits.clone(),
        send_delay,
    };

    let app = Router::new().fallback(record).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUmami { addr, hits }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.hits.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    match path.as_str() {
        "/api/send" => {
            tokio::time::sleep(state.send_delay).await;
            Json(serde_json::json!({ "ok": true })).into_response()
        }
        "/script.js" => (
            [("content-type", "application/javascript")],
            "(function(){/* tracker */})();",
        )
            .into_response(),
        "/redirect" => (StatusCode::FOUND, [("location", "/elsewhere")]).into_response(),
        _ => (
            StatusCode::ACCEPTED,
            [("x-upstream", "umami")],
            Html(format!("<html><head></head><body>{} {}</body></html>", method, path)),
        )
            .into_response(),
    }
}

/// The origin application used behind the edge.
pub fn origin_router() -> Router {
    Router::new()
        .route("/", get_route(|| async { Html(PAGE) }))
        .route(
            "/missing",
            get_route(|| async { (StatusCode::NOT_FOUND, Html(PAGE)) }),
        )
        .route(
            "/api/data",
            get_route(|| async { Json(serde_json::json!({ "html": "</head>" })) }),
        )
        .route("/fragment", get_route(|| async { Html("<p>no head here</p>") }))
        .route("/form", post(|| async { Html(PAGE) }))
        .fallback(|uri: Uri| async move {
            Html(format!("<html><head></head><body>origin {}</body></html>", uri.path()))
        })
}

/// A valid config pointing at `umami_host`.
pub fn config(umami_host: &str) -> UmamiConfig {
    UmamiConfig {
        umami_host: umami_host.to_string(),
        website_id: WEBSITE_ID.to_string(),
        ..Default::default()
    }
}

pub fn timeouts() -> TimeoutConfig {
    TimeoutConfig {
        request_secs: 5,
        forward_secs: 2,
        tracking_secs: 10,
    }
}

/// Origin router wrapped by a plugin built from `config`.
pub async fn edge(config: &UmamiConfig) -> Router {
    let plugin = UmamiPlugin::new(config, &timeouts()).await.unwrap();
    plugin.wrap(origin_router())
}

/// Drive one request through `app`, returning status, headers and body.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn request(method: Method, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "example.com")
        .body(Body::from(body))
        .unwrap()
}
