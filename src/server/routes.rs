use crate::boundary::{CalculationRequest, TextCalculationRequest};
use crate::curve::Metric;
use crate::errors::{PricerError, PricerResult};
use crate::session::{self, CalculationSnapshot};
use crate::state::{AppState, WsMessage};
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use portable_atomic::Ordering;
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct CurveQuery {
    pub metric: Option<String>,
}

/// POST /api/calculate -- JSON request, numeric fields
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CalculationRequest>,
) -> Response {
    match run_calculation(&state, req).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => reject(&state, e),
    }
}

/// POST /api/calculate/form -- urlencoded text fields, parsed here
pub async fn calculate_form(
    State(state): State<Arc<AppState>>,
    Form(text): Form<TextCalculationRequest>,
) -> Response {
    let req = match text.parse() {
        Ok(r) => r,
        Err(e) => return reject(&state, e),
    };
    match run_calculation(&state, req).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => reject(&state, e),
    }
}

/// GET /api/curve?metric=Delta -- one series from the cached curve, no repricing
pub async fn get_curve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CurveQuery>,
) -> Response {
    let name = params.metric.as_deref().unwrap_or("Price");
    let result = state
        .latest()
        .ok_or(PricerError::NoCurve)
        .and_then(|snap| session::on_select_metric(&snap.curve, name));

    match result {
        Ok(series) => {
            state.counters.metric_reads.fetch_add(1, Ordering::Relaxed);
            Json(series).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/state -- latest snapshot (from watch channel, no lock)
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Json<Option<Arc<CalculationSnapshot>>> {
    Json(state.latest())
}

/// GET /api/metrics -- selectable series names, display order
pub async fn get_metrics() -> Json<serde_json::Value> {
    let names: Vec<&str> = Metric::ALL.iter().map(|m| m.as_str()).collect();
    Json(serde_json::json!({ "metrics": names }))
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "calculations": state.counters.calculations.load(Relaxed),
        "stale_results": state.counters.stale_results.load(Relaxed),
        "metric_reads": state.counters.metric_reads.load(Relaxed),
        "rejected_requests": state.counters.rejected_requests.load(Relaxed),
        "ws_messages_sent": state.counters.ws_messages_sent.load(Relaxed),
    }))
}

/// Convert, price on a blocking thread, publish.
async fn run_calculation(
    state: &Arc<AppState>,
    req: CalculationRequest,
) -> PricerResult<Arc<CalculationSnapshot>> {
    let contract = req.to_contract()?;
    let grid = req.grid(&state.config.default_grid)?;
    let model = state.model.clone();
    let threshold = state.config.parallel_threshold;
    let sequence = state.next_sequence();

    let mut snapshot = tokio::task::spawn_blocking(move || {
        session::on_calculate(model.as_ref(), &contract, &grid, threshold)
    })
    .await??;
    snapshot.sequence = sequence;

    tracing::info!(
        request_id = %snapshot.request_id,
        sequence,
        option_type = %contract.option_type,
        forward = contract.forward,
        strike = contract.strike,
        points = grid.point_count,
        price = snapshot.result.price,
        "calculation complete"
    );

    let snapshot = Arc::new(snapshot);
    if !state.publish(snapshot.clone()) {
        tracing::info!(request_id = %snapshot.request_id, "newer calculation already cached");
    }
    Ok(snapshot)
}

fn reject(state: &AppState, e: PricerError) -> Response {
    tracing::warn!(error = %e, "calculation rejected");
    state.counters.rejected_requests.fetch_add(1, Ordering::Relaxed);
    state.broadcast(WsMessage::RequestRejected {
        reason: e.to_string(),
    });
    error_response(&e)
}

fn error_response(e: &PricerError) -> Response {
    let status = match e {
        PricerError::NoCurve => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}
