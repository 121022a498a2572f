//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    error::EntitlementError,
    services::{CycleStats, CycleSummary, UnlockCode},
    state::AppState,
};
use super::responses::{
    ApiResponse, HealthResponse, HistoryEntry, PremiumResponse, StatusResponse, UnlockRequest,
};

/// Handle POST /start - Begin a drive/pause cycle
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let (timer, started) = state.start();
    let message = if started {
        info!("Start endpoint called - cycle started");
        "Cycle started".to_string()
    } else {
        "Cycle already running".to_string()
    };
    Json(ApiResponse::for_timer(message, timer))
}

/// Handle POST /stop - Stop the cycle
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.stop();
    info!("Stop endpoint called - cycle stopped");
    Json(ApiResponse::inactive("Cycle stopped".to_string(), timer))
}

/// Handle POST /reset - Stop and zero the timer
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.reset();
    info!("Reset endpoint called - timer reset");
    Json(ApiResponse::inactive("Timer reset".to_string(), timer))
}

/// Handle POST /toggle - Start when idle, stop when running
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.toggle();
    let message = if timer.is_running { "Cycle started" } else { "Cycle stopped" };
    info!("Toggle endpoint called - {}", message.to_lowercase());
    Json(ApiResponse::for_timer(message.to_string(), timer))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.get_timer_state(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /achievements - Cycle report counts
pub async fn achievements_handler(State(state): State<Arc<AppState>>) -> Json<CycleSummary> {
    Json(state.cycle_log.summary())
}

/// Handle GET /stats - Driving and rest totals, premium only
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<CycleStats>, StatusCode> {
    let now = Utc::now();
    if let Err(e) = state.entitlements.require_premium(now) {
        warn!("Stats requested without premium: {}", e);
        return Err(status_for(&e));
    }
    Ok(Json(state.cycle_log.stats(&state.durations(), now)))
}

/// Handle GET /history - Past and current runs, newest first
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    let now = Utc::now();
    Json(
        state
            .cycle_log
            .history()
            .into_iter()
            .map(|run| HistoryEntry::new(run, now))
            .collect(),
    )
}

/// Handle GET /premium - Current premium status
pub async fn premium_handler(State(state): State<Arc<AppState>>) -> Json<PremiumResponse> {
    let now = Utc::now();
    Json(PremiumResponse::new(state.entitlements.status(now), now))
}

/// Handle POST /premium/unlock - Unlock premium with a code
pub async fn unlock_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UnlockRequest>,
) -> Result<Json<PremiumResponse>, StatusCode> {
    let code = match request.code.parse::<UnlockCode>() {
        Ok(code) => code,
        Err(e) => {
            warn!("Rejected unlock attempt: {}", e);
            return Err(status_for(&e));
        }
    };

    let now = Utc::now();
    let status = state.entitlements.unlock(code, now);
    info!("Premium unlocked via code");
    Ok(Json(PremiumResponse::new(status, now)))
}

/// Handle POST /premium/purchase - Permanent premium unlock
pub async fn purchase_handler(State(state): State<Arc<AppState>>) -> Json<PremiumResponse> {
    let now = Utc::now();
    let status = state.entitlements.unlock(UnlockCode::Purchase, now);
    info!("Premium purchased");
    Json(PremiumResponse::new(status, now))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn status_for(error: &EntitlementError) -> StatusCode {
    match error {
        EntitlementError::UnknownCode(_) => StatusCode::BAD_REQUEST,
        EntitlementError::NotPremium => StatusCode::FORBIDDEN,
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        Router,
    };
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::{
        api::create_router,
        services::{CycleLog, InMemoryEntitlements, SilentEmitter},
        state::PhaseDurations,
    };
    use super::*;

    fn router() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::with_collaborators(
            PhaseDurations::default(),
            Arc::new(SilentEmitter),
            Arc::new(CycleLog::new()),
            Arc::new(InMemoryEntitlements::new()),
        ));
        (create_router(Arc::clone(&state)), state)
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test(start_paused = true)]
    async fn start_then_stop() {
        let (router, _) = router();

        let (status, body) = call(&router, Method::POST, "/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
        assert_eq!(body["timer"]["phase"], "warm_up");
        assert_eq!(body["timer"]["remaining_seconds"], 30);

        let (_, body) = call(&router, Method::POST, "/start", None).await;
        assert_eq!(body["message"], "Cycle already running");

        let (status, body) = call(&router, Method::POST, "/stop", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "inactive");
        assert_eq!(body["timer"]["phase"], "idle");
        assert_eq!(body["timer"]["remaining_seconds"], 0);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_and_reset() {
        let (router, state) = router();

        let (_, body) = call(&router, Method::POST, "/toggle", None).await;
        assert_eq!(body["timer"]["is_running"], true);
        let (_, body) = call(&router, Method::POST, "/toggle", None).await;
        assert_eq!(body["timer"]["is_running"], false);

        call(&router, Method::POST, "/start", None).await;
        let (_, body) = call(&router, Method::POST, "/reset", None).await;
        assert_eq!(body["timer"]["phase"], "idle");
        assert_eq!(state.get_last_action().0.as_deref(), Some("reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn status_reports_timer_and_last_action() {
        let (router, _) = router();
        call(&router, Method::POST, "/start", None).await;

        let (status, body) = call(&router, Method::GET, "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["phase"], "warm_up");
        assert_eq!(body["last_action"], "start");
    }

    #[tokio::test]
    async fn achievements_count_starts() {
        let (router, _) = router();
        call(&router, Method::POST, "/start", None).await;
        call(&router, Method::POST, "/stop", None).await;

        let (_, body) = call(&router, Method::GET, "/achievements", None).await;
        assert_eq!(body["reports"], 1);
        assert_eq!(body["starts"], 1);
        assert_eq!(body["completed_cycles"], 0);
    }

    #[tokio::test(start_paused = true)]
    async fn history_records_interrupted_run() {
        let (router, _) = router();
        call(&router, Method::POST, "/start", None).await;
        call(&router, Method::POST, "/stop", None).await;

        let (status, body) = call(&router, Method::GET, "/history", None).await;
        assert_eq!(status, StatusCode::OK);
        let runs = body.as_array().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["status"], "interrupted");
        assert_eq!(runs[0]["completed_cycles"], 0);
        assert!(!runs[0]["ended_at"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn history_records_completed_run() {
        let (router, _) = router();
        call(&router, Method::POST, "/start", None).await;

        // warm-up, driving, warning and rest all elapse once
        tokio::time::sleep(Duration::from_millis(150_100)).await;
        let (_, body) = call(&router, Method::GET, "/history", None).await;
        assert_eq!(body[0]["status"], "in_progress");
        assert_eq!(body[0]["completed_cycles"], 1);

        call(&router, Method::POST, "/stop", None).await;
        let (_, body) = call(&router, Method::GET, "/history", None).await;
        let runs = body.as_array().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["status"], "completed");
        assert_eq!(runs[0]["completed_cycles"], 1);
    }

    #[tokio::test]
    async fn stats_require_premium() {
        let (router, _) = router();

        let (status, _) = call(&router, Method::GET, "/stats", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &router,
            Method::POST,
            "/premium/unlock",
            Some(r#"{"code": "desmayao"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_premium"], true);
        assert_eq!(body["code"], "desmayao");
        assert_eq!(body["remaining_seconds"], 7200);

        let (status, body) = call(&router, Method::GET, "/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed_cycles"], 0);
    }

    #[tokio::test]
    async fn unknown_code_is_bad_request() {
        let (router, _) = router();
        let (status, _) = call(
            &router,
            Method::POST,
            "/premium/unlock",
            Some(r#"{"code": "nope"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&router, Method::GET, "/premium", None).await;
        assert_eq!(body["is_premium"], false);
    }

    #[tokio::test]
    async fn purchase_is_permanent() {
        let (router, _) = router();
        let (_, body) = call(&router, Method::POST, "/premium/purchase", None).await;
        assert_eq!(body["is_premium"], true);
        assert_eq!(body["expires_at"], Value::Null);
        assert_eq!(body["remaining_seconds"], Value::Null);
    }

    #[tokio::test]
    async fn health() {
        let (router, _) = router();
        let (status, body) = call(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
