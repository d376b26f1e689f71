use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and which pipeline stages are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "aggiequant-api",
        "database": state.store.is_some(),
        "email": state.notifier.is_some(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::build_router;
    use crate::test_support::{read_json, test_state, MemoryStore};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_configured_stages() {
        let app = build_router(test_state(Some(MemoryStore::new()), None, None));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body: Value = read_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
        assert_eq!(body["email"], false);
    }
}
