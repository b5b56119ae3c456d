//! Gateway server built on axum.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::config::{IngestConfig, ServerConfig};
use crate::error::StoreError;
use crate::engine;
use crate::ingest;
use crate::store::SubmissionStore;
use crate::types::{NewSubmission, Submission};

/// Thread-safe shared gateway reference for axum handlers.
pub type SharedGateway = Arc<Mutex<GatewayState>>;

/// State behind the HTTP API: the store plus ingestion rules.
///
/// The mutex around it serializes appends; readers copy a snapshot out and
/// run the engine after releasing the lock.
pub struct GatewayState {
    store: Box<dyn SubmissionStore>,
    ingest: IngestConfig,
    started_at: chrono::DateTime<Utc>,
    /// Size of the last snapshot, bumped on every successful append.
    submission_count: usize,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("ingest", &self.ingest)
            .field("started_at", &self.started_at)
            .field("submission_count", &self.submission_count)
            .finish()
    }
}

impl GatewayState {
    pub fn new(store: Box<dyn SubmissionStore>, ingest: IngestConfig) -> Self {
        let submission_count = store.snapshot().len();
        Self {
            store,
            ingest,
            started_at: Utc::now(),
            submission_count,
        }
    }

    /// Wrap into the shared handle the router expects.
    pub fn shared(self) -> SharedGateway {
        Arc::new(Mutex::new(self))
    }

    /// Current submissions; an unreadable store reads as empty.
    pub fn snapshot(&mut self) -> Vec<Submission> {
        let submissions = self.store.snapshot();
        self.submission_count = submissions.len();
        submissions
    }

    /// Submission count as of the last snapshot or append, without touching
    /// the store.
    pub fn submission_count(&self) -> usize {
        self.submission_count
    }

    fn append(&mut self, submission: Submission) -> Result<(), StoreError> {
        self.store.append(submission)?;
        self.submission_count += 1;
        Ok(())
    }

    /// Uptime in seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_seconds().max(0) as u64
    }
}

/// Query parameters accepted by `GET /api/crossadmit`.
#[derive(Debug, Default, Deserialize)]
struct CrossAdmitQuery {
    id: Option<String>,
    university1: Option<String>,
    university2: Option<String>,
}

impl CrossAdmitQuery {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn pair(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.university1)?, non_empty(&self.university2)?))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

/// Build the axum Router for the CrossAdmit API.
pub fn router(shared: SharedGateway) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/crossadmit",
            get(crossadmit_handler).post(submit_handler),
        )
        .route("/api/crossadmit/majors", get(majors_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Health check endpoint.
async fn health_handler(State(gw): State<SharedGateway>) -> impl IntoResponse {
    let gw = gw.lock().await;
    Json(serde_json::json!({
        "status": "ok",
        "submissions": gw.submission_count(),
        "uptime_secs": gw.uptime_secs(),
    }))
}

/// Listing, lookup-by-id, and per-pair submission listing.
async fn crossadmit_handler(
    State(gw): State<SharedGateway>,
    Query(query): Query<CrossAdmitQuery>,
) -> Response {
    let submissions = gw.lock().await.snapshot();

    if let Some(id) = query.id() {
        return match engine::find_comparison_by_id(&submissions, id) {
            Some(comparison) => Json(serde_json::json!({
                "success": true,
                "comparison": comparison,
            }))
            .into_response(),
            None => {
                tracing::debug!(id, "Comparison not found");
                error_response(StatusCode::NOT_FOUND, "Comparison not found")
            }
        };
    }

    if let Some((university1, university2)) = query.pair() {
        let listed = engine::list_submissions_for_pair(&submissions, university1, university2);
        return Json(serde_json::json!({
            "success": true,
            "submissions": listed,
        }))
        .into_response();
    }

    let report = engine::build_report(&submissions);
    tracing::info!(
        submissions = report.total_submissions,
        comparisons = report.comparisons.len(),
        "Serving cross-admit comparisons"
    );
    Json(serde_json::json!({
        "success": true,
        "comparisons": report.comparisons,
        "totalSubmissions": report.total_submissions,
    }))
    .into_response()
}

/// Major-level breakdown for one pair.
async fn majors_handler(
    State(gw): State<SharedGateway>,
    Query(query): Query<CrossAdmitQuery>,
) -> Response {
    let Some((university1, university2)) = query.pair() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "university1 and university2 are required",
        );
    };

    let submissions = gw.lock().await.snapshot();
    match engine::compute_major_stats(&submissions, university1, university2) {
        Some(major_stats) => Json(serde_json::json!({
            "success": true,
            "majorStats": major_stats,
        }))
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Major statistics not found"),
    }
}

/// Register a new submission.
async fn submit_handler(
    State(gw): State<SharedGateway>,
    body: Result<Json<NewSubmission>, JsonRejection>,
) -> Response {
    let Json(new) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let mut gw = gw.lock().await;
    let submission = match ingest::accept(new, &gw.ingest) {
        Ok(submission) => submission,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected submission");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let id = submission.id.clone();
    match gw.append(submission) {
        Ok(()) => Json(serde_json::json!({
            "success": true,
            "message": "Registration complete",
            "id": id,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to store submission");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Start the API server on the configured address.
///
/// Runs until Ctrl-C is received.
pub async fn run(gw: SharedGateway, config: &ServerConfig) -> Result<(), std::io::Error> {
    let app = router(gw);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "CrossAdmit API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn make_shared_gateway() -> SharedGateway {
        GatewayState::new(Box::new(MemoryStore::new()), IngestConfig::default()).shared()
    }

    #[test]
    fn test_router_builds() {
        let _app = router(make_shared_gateway());
    }

    #[test]
    fn test_query_ignores_blank_params() {
        let query = CrossAdmitQuery {
            id: Some("  ".into()),
            university1: Some("A".into()),
            university2: Some(String::new()),
        };
        assert!(query.id().is_none());
        assert!(query.pair().is_none());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(make_shared_gateway());

        let req = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(app, req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body = axum::body::to_bytes(resp.into_body(), 10_000)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["submissions"], 0);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_appends() {
        let gw = make_shared_gateway();
        {
            let mut state = gw.lock().await;
            let new = NewSubmission {
                admitted_universities: vec!["A".into(), "B".into()],
                registered_university: "A".into(),
                ..Default::default()
            };
            let accepted = ingest::accept(new, &state.ingest).unwrap();
            state.append(accepted).unwrap();
            assert_eq!(state.submission_count(), 1);
        }
        assert_eq!(gw.lock().await.snapshot().len(), 1);
    }

    /// Store that counts full reads.
    struct CountingStore {
        inner: MemoryStore,
        loads: Arc<AtomicUsize>,
    }

    impl SubmissionStore for CountingStore {
        fn load_all(&self) -> Result<Vec<Submission>, StoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_all()
        }

        fn append(&mut self, submission: Submission) -> Result<(), StoreError> {
            self.inner.append(submission)
        }
    }

    #[tokio::test]
    async fn test_health_does_not_read_store() {
        let loads = Arc::new(AtomicUsize::new(0));
        let seeded = ingest::accept(
            NewSubmission {
                admitted_universities: vec!["A".into(), "B".into()],
                registered_university: "B".into(),
                ..Default::default()
            },
            &IngestConfig::default(),
        )
        .unwrap();
        let store = CountingStore {
            inner: MemoryStore::with_submissions(vec![seeded]),
            loads: loads.clone(),
        };
        let gw = GatewayState::new(Box::new(store), IngestConfig::default()).shared();
        let loads_after_startup = loads.load(Ordering::SeqCst);

        for _ in 0..3 {
            let req = axum::http::Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap();
            let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw.clone()), req)
                .await
                .unwrap();
            let body = axum::body::to_bytes(resp.into_body(), 10_000)
                .await
                .unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["submissions"], 1);
        }
        assert_eq!(loads.load(Ordering::SeqCst), loads_after_startup);
    }
}
