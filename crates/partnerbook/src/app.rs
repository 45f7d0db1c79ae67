use axum::{
    http::{header, HeaderName, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        health::{livez, readyz},
        partners::{create_partner, get_partner},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-caller-id"),
            HeaderName::from_static("x-caller-role"),
            HeaderName::from_static("x-request-id"),
        ]);

    let api_routes = Router::new()
        .route("/partners", post(create_partner))
        .route("/partners/{id}", get(get_partner))
        .layer(cors);

    let request_timeout = state.config.request_timeout();

    Router::new()
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::storage::inmemory::InMemoryItemStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn acme_salon() -> Value {
        json!({
            "name": "Acme Salon",
            "address": {
                "country": "Serbia",
                "city": "Belgrade",
                "location": {
                    "address": "Knez Mihailova 1",
                    "lat": "44.8176",
                    "lon": "20.4569"
                }
            },
            "working_hours": [
                {"day": "monday", "shifts": [{"start": "09:00:00", "end": "17:00:00"}]}
            ],
            "services": [{"name": "Haircut", "price": "15.00", "currency": "RSD"}],
            "staff": []
        })
    }

    fn post_partner(body: &Value, role: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/partners")
            .header("Content-Type", "application/json")
            .header("x-caller-id", "admin-1")
            .header("x-caller-role", role)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_partner_request(id: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/partners/{id}"))
            .header("x-caller-id", "user-1")
            .header("x-caller-role", "regular")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_partner() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(post_partner(&acme_salon(), "elevated"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert_eq!(created["name"], "Acme Salon");
        assert_eq!(created["is_active"], true);
        assert_eq!(created["services"][0]["price"], "15.00");

        let id = created["id"].as_str().unwrap();
        let response = app.oneshot(get_partner_request(id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let fetched = body_json(response).await;
        assert_eq!(fetched["id"], id);
        assert_eq!(fetched["services"][0]["name"], "Haircut");
        assert_eq!(fetched["services"][0]["currency"], "RSD");
        assert_eq!(fetched["staff"], json!([]));
        assert_eq!(fetched["working_hours"][0]["day"], "monday");
    }

    #[tokio::test]
    async fn test_get_missing_partner_is_404() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_partner_request("nonexistent-id"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "Partner with id nonexistent-id does not exist.",
                "status_code": 404
            })
        );
    }

    #[tokio::test]
    async fn test_overlong_name_is_422() {
        let app = create_app(AppState::default());
        let mut body = acme_salon();
        body["name"] = json!("A".repeat(51));

        let response = app.oneshot(post_partner(&body, "elevated")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["status_code"], 422);
    }

    #[tokio::test]
    async fn test_unknown_currency_is_rejected() {
        let app = create_app(AppState::default());
        let mut body = acme_salon();
        body["services"][0]["currency"] = json!("EUR");

        let response = app.oneshot(post_partner(&body, "elevated")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_caller_is_401() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/partners/01HZY8K3J6Q9W2X4V5T7R8M0NB")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_regular_caller_cannot_create_partner() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(post_partner(&acme_salon(), "regular"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await["message"],
            "The user doesn't have enough privileges"
        );
    }

    #[tokio::test]
    async fn test_store_outage_is_503() {
        let store = InMemoryItemStore::new();
        store.set_unavailable(true).await;
        let app = create_app(AppState::with_store(Arc::new(store), Config::default()));

        let response = app
            .oneshot(get_partner_request("01HZY8K3J6Q9W2X4V5T7R8M0NB"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_probes() {
        let store = InMemoryItemStore::new();
        let app = create_app(AppState::with_store(
            Arc::new(store.clone()),
            Config::default(),
        ));

        let livez = app
            .clone()
            .oneshot(Request::builder().uri("/livez").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(livez.status(), StatusCode::OK);

        let ready = app
            .clone()
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ready.status(), StatusCode::OK);

        store.set_unavailable(true).await;
        let not_ready = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(not_ready).await["healthy"], false);
    }
}
