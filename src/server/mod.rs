pub mod routes;
pub mod ws;

use crate::state::AppState;
use axum::routing::{get, post};
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/api/calculate", post(routes::calculate))
        .route("/api/calculate/form", post(routes::calculate_form))
        .route("/api/curve", get(routes::get_curve))
        .route("/api/state", get(routes::get_state))
        .route("/api/metrics", get(routes::get_metrics))
        .route("/api/counters", get(routes::get_counters))
        .route("/ws", get(ws::ws_handler))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const ATM_CALL: &str = r#"{"futures_price":100,"strike":100,"days_to_expiry":365,
        "rate_pct":0,"volatility_pct":20,"option_type":"call"}"#;

    async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_calculate_then_select_metric() {
        let state = AppState::new(AppConfig::default());
        let app = router(state.clone());

        let (status, body) = send(app.clone(), post_json("/api/calculate", ATM_CALL)).await;
        assert_eq!(status, StatusCode::OK);
        let price = body["result"]["price"].as_f64().unwrap();
        assert!((price - 7.9656).abs() < 1e-3, "price={price}");
        assert_eq!(body["curve"]["strikes"].as_array().unwrap().len(), 50);

        let (status, body) = send(app.clone(), get_req("/api/curve?metric=Gamma")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metric"], "Gamma");
        assert_eq!(body["values"].as_array().unwrap().len(), 50);

        // Metric switch does not recompute
        assert_eq!(state.counters.calculations.load(portable_atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_curve_before_calculate_is_404() {
        let app = router(AppState::new(AppConfig::default()));
        let (status, body) = send(app, get_req("/api/curve?metric=Delta")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_unknown_metric_is_400() {
        let state = AppState::new(AppConfig::default());
        let app = router(state);
        send(app.clone(), post_json("/api/calculate", ATM_CALL)).await;
        let (status, _) = send(app, get_req("/api/curve?metric=Vanna")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_grid_rejected_and_cache_kept() {
        let state = AppState::new(AppConfig::default());
        let app = router(state.clone());
        send(app.clone(), post_json("/api/calculate", ATM_CALL)).await;
        let first = state.latest().unwrap().request_id.clone();

        let bad = ATM_CALL.replace("\"call\"", "\"put\",\"point_count\":1");
        let (status, body) = send(app, post_json("/api/calculate", &bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("point_count"));
        assert_eq!(state.latest().unwrap().request_id, first);
    }

    #[tokio::test]
    async fn test_degenerate_request_returns_zeros() {
        let app = router(AppState::new(AppConfig::default()));
        let zero_days = ATM_CALL.replace("365", "0");
        let (status, body) = send(app, post_json("/api/calculate", &zero_days)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["price"].as_f64(), Some(0.0));
        assert!(body["curve"]["series"]["Vega"]
            .as_array()
            .unwrap()
            .iter()
            .all(|v| v.as_f64() == Some(0.0)));
    }

    #[tokio::test]
    async fn test_form_text_fields() {
        let app = router(AppState::new(AppConfig::default()));
        let req = Request::builder()
            .method("POST")
            .uri("/api/calculate/form")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(
                "futures_price=100&strike=100&days_to_expiry=365&rate_pct=0&volatility_pct=20&option_type=put",
            ))
            .unwrap();
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK);
        let delta = body["result"]["delta"].as_f64().unwrap();
        assert!((delta + 0.46017).abs() < 1e-3, "delta={delta}");

        let req = Request::builder()
            .method("POST")
            .uri("/api/calculate/form")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(
                "futures_price=abc&strike=100&days_to_expiry=365&rate_pct=0&volatility_pct=20&option_type=put",
            ))
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("futures_price"));
    }

    #[tokio::test]
    async fn test_metrics_and_state() {
        let app = router(AppState::new(AppConfig::default()));
        let (_, body) = send(app.clone(), get_req("/api/metrics")).await;
        assert_eq!(body["metrics"][0], "Price");
        assert_eq!(body["metrics"].as_array().unwrap().len(), 6);

        let (status, body) = send(app, get_req("/api/state")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }
}
