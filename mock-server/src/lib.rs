//! In-memory mock of the bitcoin.tax transactions API.
//!
//! Speaks the service's wire protocol faithfully enough for the core
//! crate's integration tests: every application-level outcome, including
//! credential rejection, is reported through an HTTP 200 envelope with a
//! `status` tag, never through the HTTP status line. Records are stored as
//! raw JSON objects so the server never re-encodes what clients sent.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};

/// Server default page size when the client omits `limit`.
pub const DEFAULT_LIMIT: usize = 100;

/// The uniform response wrapper.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    pub data: EnvelopeData,
}

#[derive(Debug, Default, Serialize)]
pub struct EnvelopeData {
    pub total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn success(total: usize, transactions: Vec<Value>) -> Json<Envelope> {
    Json(Envelope {
        status: "success",
        data: EnvelopeData {
            total,
            transactions,
            message: None,
        },
    })
}

fn fail(message: &str) -> Json<Envelope> {
    Json(Envelope {
        status: "fail",
        data: EnvelopeData {
            message: Some(message.to_string()),
            ..EnvelopeData::default()
        },
    })
}

#[derive(Default)]
struct Store {
    transactions: Vec<Value>,
    next_id: u64,
}

#[derive(Clone)]
struct AppState {
    key: Arc<str>,
    secret: Arc<str>,
    db: Arc<RwLock<Store>>,
}

pub fn app(key: &str, secret: &str) -> Router {
    let state = AppState {
        key: key.into(),
        secret: secret.into(),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/transactions", get(list_transactions).post(add_transactions))
        .with_state(state)
}

pub async fn run(listener: TcpListener, key: &str, secret: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(key, secret)).await
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    header("X-APIKEY") == Some(&*state.key) && header("X-APISECRET") == Some(&*state.secret)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    taxyear: Option<i32>,
    start: Option<usize>,
    limit: Option<usize>,
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Json<Envelope> {
    if !authorized(&state, &headers) {
        return fail("invalid key");
    }
    let Some(taxyear) = params.taxyear else {
        return fail("invalid taxyear");
    };

    let store = state.db.read().await;
    let matching: Vec<&Value> = store
        .transactions
        .iter()
        .filter(|tx| transaction_year(tx) == Some(taxyear))
        .collect();
    let total = matching.len();

    let start = params.start.unwrap_or(0).min(total);
    let end = start
        .saturating_add(params.limit.unwrap_or(DEFAULT_LIMIT))
        .min(total);
    let page = matching[start..end].iter().map(|tx| (*tx).clone()).collect();

    success(total, page)
}

async fn add_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(txs): Json<Vec<Value>>,
) -> Json<Envelope> {
    if !authorized(&state, &headers) {
        return fail("invalid key");
    }
    if txs.is_empty() {
        return fail("no transactions provided");
    }
    for tx in &txs {
        if let Err(msg) = validate(tx) {
            return fail(&msg);
        }
    }

    let mut store = state.db.write().await;
    let count = txs.len();
    for mut tx in txs {
        store.next_id += 1;
        let id = format!("mock-{:06}", store.next_id);
        tx.as_object_mut()
            .expect("validated as object")
            .insert("id".to_string(), Value::String(id));
        store.transactions.push(tx);
    }

    success(count, Vec::new())
}

const REQUIRED_FIELDS: [&str; 5] = ["date", "action", "symbol", "currency", "volume"];

fn validate(tx: &Value) -> Result<(), String> {
    let obj = tx
        .as_object()
        .ok_or_else(|| "transaction must be an object".to_string())?;
    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(format!("missing required field {field}"));
        }
    }
    if transaction_year(tx).is_none() {
        return Err("invalid date".to_string());
    }
    Ok(())
}

/// Calendar year of the record's `date`, used to scope list queries.
fn transaction_year(tx: &Value) -> Option<i32> {
    let date = tx.get("date")?.as_str()?;
    DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.year())
}
