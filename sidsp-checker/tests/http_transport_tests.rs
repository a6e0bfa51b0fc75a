//! HttpTransport tests against a local fake SIDSP API

mod helpers;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use helpers::spawn_server;
use serde_json::{json, Value};
use sidsp_checker::sequencer::{BY_TRN_V2, BY_YEAR_TRN_V1, BY_YEAR_TRN_V2};
use sidsp_checker::transport::{HttpTransport, RetryPolicy, Throttled};
use sidsp_checker::types::CUSTOMER_TRN;
use sidsp_checker::{resolve, sequence, NormalizedRow, Outcome, QueryParams, Transport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        backoff_base: Duration::from_millis(10),
        ..RetryPolicy::default()
    }
}

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::new(base_url, Duration::from_secs(5))
        .unwrap()
        .with_retry_policy(fast_retry())
}

/// Router answering 503 for the first `failures` hits, then `[{"id":1}]`
fn flaky_router(failures: usize, hits: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        BY_TRN_V2,
        get(move || {
            let hits = hits.clone();
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) < failures {
                    (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response()
                } else {
                    Json(json!([{"id": 1}])).into_response()
                }
            }
        }),
    )
}

#[tokio::test]
async fn test_retries_transient_status_then_succeeds() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base_url = spawn_server(flaky_router(1, hits.clone())).await;

    let outcome = transport(&base_url)
        .get(BY_TRN_V2, &QueryParams::by_trn("100379893"))
        .await;

    assert_eq!(outcome.status, 200);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(outcome.content_type.starts_with("application/json"));
}

#[tokio::test]
async fn test_returns_last_status_when_retries_exhausted() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base_url = spawn_server(flaky_router(10, hits.clone())).await;

    let outcome = transport(&base_url)
        .get(BY_TRN_V2, &QueryParams::by_trn("100379893"))
        .await;

    assert_eq!(outcome.status, 503);
    assert_eq!(outcome.body, "busy");
    // One attempt plus two retries
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_no_retry_policy_makes_single_attempt() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base_url = spawn_server(flaky_router(10, hits.clone())).await;

    let outcome = transport(&base_url)
        .with_retry_policy(RetryPolicy::none())
        .get(BY_TRN_V2, &QueryParams::by_trn("100379893"))
        .await;

    assert_eq!(outcome.status, 503);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sends_bearer_token_and_query() {
    async fn echo(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(json!({ "authorization": auth, "params": params }))
    }

    let base_url = spawn_server(Router::new().route(BY_YEAR_TRN_V2, get(echo))).await;

    let outcome = transport(&base_url)
        .with_token("tok-123")
        .get(BY_YEAR_TRN_V2, &QueryParams::by_year_trn("0012345", "2025"))
        .await;

    assert_eq!(outcome.status, 200);
    let body: Value = serde_json::from_str(&outcome.body).unwrap();
    assert_eq!(body["authorization"], "Bearer tok-123");
    assert_eq!(body["params"]["trn"], "0012345");
    assert_eq!(body["params"]["year"], "2025");
}

#[tokio::test]
async fn test_not_found_passes_through_without_retry() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new().route(
        BY_TRN_V2,
        get({
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::NOT_FOUND
                }
            }
        }),
    );
    let base_url = spawn_server(router).await;

    let outcome = transport(&base_url)
        .get(BY_TRN_V2, &QueryParams::by_trn("1"))
        .await;

    assert_eq!(outcome.status, 404);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_end_to_end_found_on_previous_api_version() {
    // v2 knows nothing for the year, v1 has the application
    let router = Router::new()
        .route(BY_YEAR_TRN_V2, get(|| async { Json(json!([])) }))
        .route(
            BY_YEAR_TRN_V1,
            get(|| async { Json(json!({"applicationNumber": "SLB-156439"})) }),
        );
    let base_url = spawn_server(router).await;
    let transport = Throttled::new(transport(&base_url), Duration::from_millis(1));

    let row = NormalizedRow::new(1).with_field(CUSTOMER_TRN, "100379893");
    let verdict = resolve(&transport, &sequence(&row, "2025")).await;

    assert_eq!(verdict.outcome, Outcome::Found);
    assert_eq!(verdict.http_status, 200);
    assert_eq!(
        verdict.endpoint_used,
        "/api/v1/Applications/ByYearTRN?trn=100379893&year=2025"
    );
}

#[tokio::test]
async fn test_end_to_end_unknown_routes_are_absent() {
    // Unrouted paths answer 404 from axum
    let base_url = spawn_server(Router::new()).await;
    let transport = transport(&base_url);

    let row = NormalizedRow::new(1).with_field(CUSTOMER_TRN, "100379893");
    let verdict = resolve(&transport, &sequence(&row, "2025")).await;

    assert_eq!(verdict.outcome, Outcome::Absent);
    assert_eq!(verdict.http_status, 404);
    assert_eq!(verdict.endpoint_used, "/api/v1/Applications/ByTRN?trn=100379893");
}
