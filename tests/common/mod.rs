#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use ritefolio_admin::app::{router, AppState};
use ritefolio_admin::database::{DatabaseError, Function, Gateway, JsonRow, Procedure, SqlParam};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ritefolio-admin"));
        cmd.arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        // Keep /health quick when no database is reachable
        if std::env::var_os("DATABASE_CONNECTION_TIMEOUT").is_none() {
            cmd.env("DATABASE_CONNECTION_TIMEOUT", "2");
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK
                    || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(server)
}

/// One call the handlers made against the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query { sql: String, params: Vec<SqlParam> },
    Procedure { procedure: Procedure, params: Vec<SqlParam> },
    Function { function: Function, params: Vec<SqlParam> },
    Ping,
}

/// In-memory gateway with canned rows, recording every call
#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    query_rows: Vec<(String, Vec<JsonRow>)>,
    function_rows: Vec<(Function, Vec<JsonRow>)>,
    failing: bool,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows for any statement whose SQL contains `fragment`
    pub fn with_query_rows(mut self, fragment: &str, rows: Vec<Value>) -> Self {
        self.query_rows.push((fragment.to_string(), to_rows(rows)));
        self
    }

    pub fn with_function_rows(mut self, function: Function, rows: Vec<Value>) -> Self {
        self.function_rows.push((function, to_rows(rows)));
        self
    }

    /// Every call fails as if the pool could not hand out a connection
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn procedure_calls(&self) -> Vec<(Procedure, Vec<SqlParam>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Procedure { procedure, params } => Some((procedure, params)),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<(String, Vec<SqlParam>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query { sql, params } => Some((sql, params)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), DatabaseError> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn query(
        &self,
        sql: &str,
        _database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<Vec<JsonRow>, DatabaseError> {
        self.record(Call::Query { sql: sql.to_string(), params: params.to_vec() })?;
        Ok(self
            .query_rows
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }

    async fn call_procedure(
        &self,
        procedure: Procedure,
        _database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<(), DatabaseError> {
        self.record(Call::Procedure { procedure, params: params.to_vec() })?;
        if params.len() != procedure.arity() {
            return Err(DatabaseError::ArityMismatch {
                routine: procedure.qualified_name(),
                expected: procedure.arity(),
                actual: params.len(),
            });
        }
        Ok(())
    }

    async fn call_function(
        &self,
        function: Function,
        _database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<Vec<JsonRow>, DatabaseError> {
        self.record(Call::Function { function, params: params.to_vec() })?;
        Ok(self
            .function_rows
            .iter()
            .find(|(f, _)| *f == function)
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }

    async fn ping(&self, _database: Option<&str>) -> Result<(), DatabaseError> {
        self.record(Call::Ping)
    }
}

fn to_rows(rows: Vec<Value>) -> Vec<JsonRow> {
    rows.into_iter()
        .map(|row| match row {
            Value::Object(map) => map,
            other => panic!("fixture row must be an object, got {}", other),
        })
        .collect()
}

pub fn test_app(gateway: Arc<FakeGateway>) -> Router {
    router(AppState::new(gateway))
}

/// Drive one request through the router and decode the JSON body
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json)?)
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&bytes)
        .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?;
    Ok((status, json))
}

pub async fn get(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, uri, None).await
}
