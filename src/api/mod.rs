// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        Beneficiary, Product, PublicProfile, Role, StoreRecord, TransactionRecord,
        TransactionStatus,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod homeless;
pub mod store;
pub mod transactions;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        // Alias the browser clients poll on startup to restore a session.
        .route("/auth/verify", get(auth::me))
        .route("/homeless", get(homeless::list_beneficiaries))
        .route("/homeless/{qr_code}", get(homeless::get_by_qr_code))
        .route("/homeless/{qr_code}/balance", patch(homeless::update_balance))
        .route("/store", get(store::list_stores))
        .route("/store/{qr_code}", get(store::get_by_qr_code))
        .route(
            "/transaction",
            post(transactions::create_transaction).get(transactions::list_transactions),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::refresh,
        auth::me,
        homeless::get_by_qr_code,
        homeless::list_beneficiaries,
        homeless::update_balance,
        store::get_by_qr_code,
        store::list_stores,
        transactions::create_transaction,
        transactions::list_transactions,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            Role,
            PublicProfile,
            Beneficiary,
            StoreRecord,
            Product,
            TransactionRecord,
            TransactionStatus,
            auth::LoginRequest,
            auth::SessionResponse,
            auth::MessageResponse,
            homeless::BeneficiaryResponse,
            homeless::BeneficiaryListResponse,
            homeless::UpdateBalanceRequest,
            homeless::BalanceUpdated,
            homeless::BalanceUpdateResponse,
            store::StoreResponse,
            store::StoreListResponse,
            transactions::CreateTransactionRequest,
            transactions::DebitOutcome,
            transactions::DebitResponse,
            transactions::TransactionListResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Cookie session management"),
        (name = "Homeless", description = "Beneficiary lookup and balances"),
        (name = "Store", description = "Partner store lookup"),
        (name = "Transactions", description = "Point debits and the transaction log"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::seeded())
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Extract `name=value` for a cookie from the response's Set-Cookie headers.
    fn set_cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .map(|v| v.split(';').next().unwrap().to_string())
    }

    fn set_cookie_raw(response: &Response<Body>, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .map(|v| v.to_string())
    }

    async fn login(app: &Router, username: &str, password: &str, role: &str) -> Response<Body> {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({"username": username, "password": password, "role": role}),
            ))
            .await
            .unwrap()
    }

    /// Log in and return the access cookie as a `Cookie:` header value.
    async fn access_cookie(app: &Router, username: &str, password: &str, role: &str) -> String {
        let response = login(app, username, password, role).await;
        assert_eq!(response.status(), StatusCode::OK);
        set_cookie_pair(&response, "accessToken").unwrap()
    }

    #[tokio::test]
    async fn login_sets_both_session_cookies() {
        let app = app();
        let response = login(&app, "admin", "admin123", "ngo_admin").await;
        assert_eq!(response.status(), StatusCode::OK);

        let access = set_cookie_raw(&response, "accessToken").unwrap();
        let refresh = set_cookie_raw(&response, "refreshToken").unwrap();
        for cookie in [&access, &refresh] {
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("SameSite=Lax"));
            assert!(cookie.contains("Path=/"));
        }
        assert!(access.contains("Max-Age=900"));
        assert!(refresh.contains("Max-Age=604800"));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["username"], "admin");
        assert_eq!(body["user"]["role"], "ngo_admin");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn login_failures_share_one_response_shape() {
        let app = app();

        let ghost = login(&app, "ghost", "x", "store").await;
        let wrong_password = login(&app, "store1", "wrongpw", "store").await;
        let wrong_role = login(&app, "store1", "store123", "homeless").await;

        let mut bodies = Vec::new();
        for response in [ghost, wrong_password, wrong_role] {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(set_cookie_raw(&response, "accessToken").is_none());
            bodies.push(body_json(response).await);
        }
        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[1], bodies[2]);
    }

    #[tokio::test]
    async fn login_missing_fields_is_bad_request() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({"username": "admin"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn me_returns_profile_for_valid_session() {
        let app = app();
        let cookie = access_cookie(&app, "store1", "store123", "store").await;

        for uri in ["/auth/me", "/auth/verify"] {
            let response = app
                .clone()
                .oneshot(get_request(uri, Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["user"]["username"], "store1");
        }
    }

    #[tokio::test]
    async fn me_without_cookie_is_unauthenticated() {
        let app = app();
        let response = app
            .clone()
            .oneshot(get_request("/auth/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        // Absence of a token is not an expired session.
        assert!(body.get("expired").is_none());
    }

    #[tokio::test]
    async fn me_with_garbage_cookie_is_forbidden() {
        let app = app();
        let response = app
            .clone()
            .oneshot(get_request("/auth/me", Some("accessToken=garbage")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_clears_cookies() {
        let app = app();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/auth/logout", serde_json::json!({})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let access = set_cookie_raw(&response, "accessToken").unwrap();
            let refresh = set_cookie_raw(&response, "refreshToken").unwrap();
            assert!(access.starts_with("accessToken=;"));
            assert!(access.contains("Max-Age=0"));
            assert!(refresh.contains("Max-Age=0"));
        }
    }

    #[tokio::test]
    async fn refresh_issues_a_new_access_cookie() {
        let app = app();
        let response = login(&app, "admin", "admin123", "ngo_admin").await;
        let refresh_cookie = set_cookie_pair(&response, "refreshToken").unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .header(header::COOKIE, refresh_cookie.as_str())
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let access = set_cookie_pair(&response, "accessToken").unwrap();
        let me = app
            .clone()
            .oneshot(get_request("/auth/me", Some(&access)))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn refresh_without_cookie_is_unauthenticated() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request("POST", "/auth/refresh", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_with_invalid_cookie_keeps_cookies() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .header(header::COOKIE, "refreshToken=garbage")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        // Invalid (not expired) refresh tokens do not end the session.
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(set_cookie_raw(&response, "refreshToken").is_none());
    }

    #[tokio::test]
    async fn beneficiary_lookup_is_public() {
        let app = app();
        let response = app
            .clone()
            .oneshot(get_request("/homeless/QR_001", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["balance"], 150);
        assert_eq!(body["data"]["qrCode"], "QR_001");

        let missing = app
            .clone()
            .oneshot(get_request("/homeless/QR_999", None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn registry_lists_require_ngo_staff() {
        let app = app();

        for uri in ["/homeless", "/store"] {
            let anonymous = app.clone().oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
        }

        let store_cookie = access_cookie(&app, "store1", "store123", "store").await;
        for uri in ["/homeless", "/store"] {
            let forbidden = app
                .clone()
                .oneshot(get_request(uri, Some(&store_cookie)))
                .await
                .unwrap();
            assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        }

        let admin_cookie = access_cookie(&app, "admin", "admin123", "ngo_admin").await;
        let response = app
            .clone()
            .oneshot(get_request("/homeless", Some(&admin_cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn debit_round_trip() {
        let app = app();
        let cookie = access_cookie(&app, "store1", "store123", "store").await;

        let debit = serde_json::json!({
            "homelessQrCode": "QR_001",
            "storeQrCode": "STORE_QR_001",
            "amount": 80,
            "productName": "Lunch set"
        });
        let mut request = json_request("POST", "/transaction", debit);
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["newBalance"], 70);
        assert_eq!(body["data"]["transaction"]["amount"], 80);
        assert_eq!(body["data"]["transaction"]["status"], "completed");

        // The balance store reads the debited value.
        let lookup = app
            .clone()
            .oneshot(get_request("/homeless/QR_001", None))
            .await
            .unwrap();
        assert_eq!(body_json(lookup).await["data"]["balance"], 70);

        // A second oversized debit is rejected without mutation.
        let oversized = serde_json::json!({"homelessQrCode": "QR_001", "amount": 100});
        let mut request = json_request("POST", "/transaction", oversized);
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let lookup = app
            .clone()
            .oneshot(get_request("/homeless/QR_001", None))
            .await
            .unwrap();
        assert_eq!(body_json(lookup).await["data"]["balance"], 70);
    }

    #[tokio::test]
    async fn debit_requires_store_or_ngo_session() {
        let app = app();
        let debit = serde_json::json!({"homelessQrCode": "QR_001", "amount": 10});

        let anonymous = app
            .clone()
            .oneshot(json_request("POST", "/transaction", debit.clone()))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        // A beneficiary session is authenticated but not permitted.
        let cookie = access_cookie(&app, "homeless1", "homeless123", "homeless").await;
        let mut request = json_request("POST", "/transaction", debit);
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn transaction_log_guest_needs_a_filter() {
        let app = app();

        let guest = app
            .clone()
            .oneshot(get_request("/transaction", None))
            .await
            .unwrap();
        assert_eq!(guest.status(), StatusCode::UNAUTHORIZED);

        let filtered = app
            .clone()
            .oneshot(get_request("/transaction?qrCode=QR_001", None))
            .await
            .unwrap();
        assert_eq!(filtered.status(), StatusCode::OK);

        let admin_cookie = access_cookie(&app, "admin", "admin123", "ngo_admin").await;
        let unfiltered = app
            .clone()
            .oneshot(get_request("/transaction", Some(&admin_cookie)))
            .await
            .unwrap();
        assert_eq!(unfiltered.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn balance_patch_updates_and_validates() {
        let app = app();
        let cookie = access_cookie(&app, "admin", "admin123", "ngo_admin").await;

        let mut request = json_request(
            "PATCH",
            "/homeless/QR_001/balance",
            serde_json::json!({"newBalance": 500}),
        );
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["newBalance"], 500);

        let lookup = app
            .clone()
            .oneshot(get_request("/homeless/QR_001", None))
            .await
            .unwrap();
        assert_eq!(body_json(lookup).await["data"]["balance"], 500);

        // Unauthenticated top-ups are rejected.
        let request = json_request(
            "PATCH",
            "/homeless/QR_001/balance",
            serde_json::json!({"newBalance": 1}),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_endpoints_answer() {
        let app = app();
        for uri in ["/health", "/health/live"] {
            let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
