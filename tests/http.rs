use axum::{Router, extract::Query, http::StatusCode, routing::get};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Series {
    labels: Vec<String>,
    values: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct Range {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct Chart {
    labels: Vec<String>,
    values: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    revision: u64,
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    phase: String,
    range: Option<Range>,
    charts: HashMap<String, Widget>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static UPSTREAM: Lazy<String> = Lazy::new(spawn_fake_upstream);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

const TIMELINE_LINES: &str =
    "2025-06-01T00:09: 4\n2025-06-01T10:00: 1\n2025-06-02T08:00: 2\nmalformed-line";

async fn fake_fetch_data(Query(params): Query<HashMap<String, String>>) -> (StatusCode, String) {
    let query = params.get("query").cloned().unwrap_or_default();
    if query.starts_with("dates all;") {
        (StatusCode::OK, TIMELINE_LINES.to_string())
    } else if query.starts_with("sites all;") {
        (
            StatusCode::OK,
            r#"{"telegram": 3, "ria.ru": 5, "tass.ru": 2}"#.to_string(),
        )
    } else {
        (StatusCode::BAD_REQUEST, "unknown query".to_string())
    }
}

// Requests for 2024 fail, to exercise the abort path.
async fn fake_sentiment(Query(params): Query<HashMap<String, String>>) -> (StatusCode, String) {
    let query = params.get("query").cloned().unwrap_or_default();
    if query.contains("dateFrom=2024-") {
        return (StatusCode::SERVICE_UNAVAILABLE, "maintenance".to_string());
    }
    (
        StatusCode::OK,
        r#"{"positive": 62.5, "negative": 12.5, "normal": 25.0}"#.to_string(),
    )
}

fn spawn_fake_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake upstream");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("fake upstream runtime");
        runtime.block_on(async move {
            let app = Router::new()
                .route("/api/fetch-data", get(fake_fetch_data))
                .route("/api/sentiment", get(fake_sentiment));
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, app).await.expect("fake upstream");
        });
    });

    format!("http://{addr}")
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/dashboard")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_publication_dashboard"))
        .env("PORT", port.to_string())
        .env("DASHBOARD_UPSTREAM_URL", UPSTREAM.as_str())
        .env("DASHBOARD_LOCALE", "ru")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn refresh(client: &Client, base_url: &str, body: serde_json::Value) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/dashboard/refresh"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_normalize_sums_same_day_lines() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let series: Series = client
        .post(format!("{}/api/normalize", server.base_url))
        .body("2025-06-01T00:09: 4\n2025-06-01T10:00: 1\nmalformed-line")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(series.labels, vec!["1 июн"]);
    assert_eq!(series.values, vec![5]);

    let empty: Series = client
        .post(format!("{}/api/normalize", server.base_url))
        .body("[1, 2, 3]")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.labels.is_empty());
    assert!(empty.values.is_empty());
}

#[tokio::test]
async fn http_refresh_renders_three_charts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = refresh(&client, &server.base_url, serde_json::json!({})).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let snapshot: Snapshot = response.json().await.unwrap();

    assert_eq!(snapshot.phase, "idle");
    let range = snapshot.range.expect("range after refresh");
    assert_eq!(range.from, "2025-06-01");
    assert_eq!(range.to, "2025-06-07");

    let timeline = &snapshot.charts["timeline"].chart;
    assert_eq!(timeline.labels, vec!["1 июн (5)", "2 июн (2)"]);
    assert_eq!(timeline.values, vec![5.0, 2.0]);

    let sources = &snapshot.charts["sources"];
    assert_eq!(sources.revision, 1);
    assert_eq!(sources.chart.labels, vec!["Интернет СМИ (70.0%)", "Telegram (30.0%)"]);

    let sentiment = &snapshot.charts["sentiment"].chart;
    assert_eq!(sentiment.values, vec![62.5, 25.0, 12.5]);
}

#[tokio::test]
async fn http_failed_refresh_keeps_previous_charts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let ok = refresh(
        &client,
        &server.base_url,
        serde_json::json!({ "from": "2025-06-01", "to": "2025-06-03" }),
    )
    .await;
    assert!(ok.status().is_success());

    let failed = refresh(
        &client,
        &server.base_url,
        serde_json::json!({ "from": "2024-01-01", "to": "2024-01-07" }),
    )
    .await;
    assert_eq!(failed.status(), reqwest::StatusCode::BAD_GATEWAY);
    let message = failed.text().await.unwrap();
    assert!(message.contains("sentiment"), "unexpected error: {message}");

    let snapshot: Snapshot = client
        .get(format!("{}/api/dashboard", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot.phase, "idle");
    let range = snapshot.range.expect("range kept");
    assert_eq!(range.from, "2025-06-01");
    assert_eq!(range.to, "2025-06-03");
    assert_eq!(snapshot.charts.len(), 3);
}

#[tokio::test]
async fn http_rejects_inverted_range() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = refresh(
        &client,
        &server.base_url,
        serde_json::json!({ "from": "2025-06-07", "to": "2025-06-01" }),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let malformed = client
        .post(format!("{}/api/dashboard/refresh", server.base_url))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_index_serves_dashboard_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("timeline-chart"));
    assert!(page.contains("Тональность"));
    assert!(page.contains(r#"value="2025-06-01""#));
}
