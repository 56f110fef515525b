// HTTP tests for the matching service

use actix_web::{http::StatusCode, test, web, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use mentor_match::config::Settings;
use mentor_match::core::MatchMaker;
use mentor_match::routes::{self, auth::Claims, AppState};
use serde_json::{json, Value};

fn state(jwt_secret: Option<&str>) -> AppState {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = jwt_secret.map(str::to_string);
    settings.matching.seed = Some(11);
    let matchmaker = MatchMaker::from_settings(&settings).unwrap();
    AppState::new(matchmaker, &settings)
}

fn token(secret: &str, role: &str) -> String {
    let claims = Claims {
        sub: "admin-1".to_string(),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

fn participants() -> Value {
    json!([
        {"id": "A", "role": "veterane", "course": "BCC", "pronouns": ["Ele/Dele"], "parties": 7},
        {"id": "B", "role": "veterane", "course": "LIC", "pronouns": ["Ela/Dela"], "parties": 2},
        {"id": "C", "role": "bixe", "course": "BCC", "pronouns": ["Ele/Dele"], "parties": 8},
        {"id": "D", "role": "bixe", "course": "LIC", "pronouns": ["Ela/Dela"], "parties": 1}
    ])
}

macro_rules! service {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(routes::json_config())
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_check() {
    let app = service!(state(None));
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn test_run_matching_returns_assignments() {
    let app = service!(state(None));
    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .set_json(json!({"participants": participants(), "maxConnections": 1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"A": ["C"], "B": ["D"]}));
}

#[actix_web::test]
async fn test_run_matching_rejects_out_of_range_connections() {
    let app = service!(state(None));
    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .set_json(json!({"participants": participants(), "maxConnections": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_run_matching_empty_table() {
    let app = service!(state(None));
    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .set_json(json!({"participants": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No users provided for matching");
    assert_eq!(body["status_code"], 422);
}

#[actix_web::test]
async fn test_run_matching_without_mentees() {
    let app = service!(state(None));
    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .set_json(json!({"participants": [{"id": "A", "role": "veterane", "course": "BCC"}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No bixes available for matching");
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let app = service!(state(None));
    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"participants\": [")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_admin_guard() {
    let app = service!(state(Some("top-secret")));
    let body = json!({"participants": participants(), "maxConnections": 1});

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .insert_header(("Authorization", format!("Bearer {}", token("top-secret", "USER"))))
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/run")
        .insert_header(("Authorization", format!("Bearer {}", token("top-secret", "ADMIN"))))
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
