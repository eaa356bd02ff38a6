use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use symcalc::{integration, serve, AppState, CalcError, Calculus, CasCalculus};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start(state: AppState) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(serve(listener, state, async {
            let _ = rx.await;
        }));
        Ok(Self {
            addr,
            client: reqwest::Client::new(),
            _shutdown: tx,
        })
    }

    async fn with_engine() -> anyhow::Result<Self> {
        Self::start(AppState::new(CasCalculus::new(Duration::from_secs(10)))).await
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn post_json(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.client.post(self.url(path)).json(&body).send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}

/// Derivatives come back in the engine's own term order, so compare values.
fn assert_same_function(actual: &Value, expected: &str) -> anyhow::Result<()> {
    let actual = actual
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("not a string: {actual}"))?;
    let (actual_expr, expected_expr) = (integration::parse(actual)?, integration::parse(expected)?);
    for point in [0.3, 1.1, 2.4] {
        let bindings = HashMap::from([("x".to_string(), point)]);
        let (a, e) = (actual_expr.eval(&bindings), expected_expr.eval(&bindings));
        match (a, e) {
            (Some(a), Some(e)) => anyhow::ensure!(
                (a - e).abs() <= 1e-9 * (1.0 + e.abs()),
                "{actual} != {expected} at x = {point}"
            ),
            _ => anyhow::bail!("cannot evaluate {actual} or {expected} at x = {point}"),
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_differentiate_endpoint() -> anyhow::Result<()> {
    let server = TestServer::with_engine().await?;

    let (status, body) = server
        .post_json("/differentiate", json!({"expression": "x**2 + 3*x", "variable": "x"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_object().map(|o| o.len()), Some(1));
    assert_same_function(&body["derivative"], "2*x + 3")?;

    let (status, body) = server
        .post_json("/differentiate", json!({"expression": "sin(x)*exp(x)", "variable": "x"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_same_function(&body["derivative"], "exp(x)*cos(x) + exp(x)*sin(x)")?;
    Ok(())
}

#[tokio::test]
async fn test_integrate_endpoint() -> anyhow::Result<()> {
    let server = TestServer::with_engine().await?;

    let (status, body) = server
        .post_json("/integrate", json!({"expression": "x**2", "variable": "x"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"integral": "x**3/3"}));

    let (status, body) = server
        .post_json("/integrate", json!({"expression": "1/(x**2 + 1)", "variable": "x"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["integral"], "atan(x)");
    Ok(())
}

#[tokio::test]
async fn test_integrate_without_closed_form_is_unevaluated() -> anyhow::Result<()> {
    let server = TestServer::with_engine().await?;

    let (status, body) = server
        .post_json("/integrate", json!({"expression": "exp(x**2)", "variable": "x"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["integral"], "Integral(exp(x**2), x)");
    Ok(())
}

#[tokio::test]
async fn test_invalid_input_is_rejected() -> anyhow::Result<()> {
    let server = TestServer::with_engine().await?;

    let (status, body) = server
        .post_json("/differentiate", json!({"expression": "  ", "variable": "x"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Parse error"));

    // 過深的巢狀括號不可讓服務崩潰
    let deep = format!("{}x{}", "(".repeat(3_000), ")".repeat(3_000));
    for route in ["/differentiate", "/integrate"] {
        let (status, body) = server
            .post_json(route, json!({"expression": deep.clone(), "variable": "x"}))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{route}");
        assert!(body["error"].as_str().unwrap_or_default().contains("nested"));
    }
    let response = server.client.get(server.url("/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = server
        .post_json("/integrate", json!({"expression": "x", "variable": "2x"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid variable name: '2x'");
    Ok(())
}

#[tokio::test]
async fn test_framework_rejects_malformed_bodies() -> anyhow::Result<()> {
    let server = TestServer::with_engine().await?;

    // 缺少欄位
    let (status, _) = server
        .post_json("/differentiate", json!({"expression": "x**2"}))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // 非法 JSON
    let response = server
        .client
        .post(server.url("/integrate"))
        .header("Content-Type", "application/json")
        .body("{\"expression\": ")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_health_endpoint() -> anyhow::Result<()> {
    let server = TestServer::with_engine().await?;

    let response = server.client.get(server.url("/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await?, json!({"status": "ok"}));
    Ok(())
}

struct TimingOutCalculus;

#[async_trait]
impl Calculus for TimingOutCalculus {
    async fn differentiate(&self, _expression: &str, _variable: &str) -> symcalc::Result<String> {
        Err(CalcError::Timeout { seconds: 1 })
    }

    async fn integrate(&self, _expression: &str, _variable: &str) -> symcalc::Result<String> {
        Err(CalcError::InternalError {
            message: "engine crashed".to_string(),
        })
    }
}

#[tokio::test]
async fn test_backend_failures_map_to_server_errors() -> anyhow::Result<()> {
    let server = TestServer::start(AppState::new(TimingOutCalculus)).await?;
    let request = json!({"expression": "x", "variable": "x"});

    let (status, body) = server.post_json("/differentiate", request.clone()).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Computation timed out after 1s");

    let (status, _) = server.post_json("/integrate", request).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
