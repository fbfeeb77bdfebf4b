//! Tests of the web handlers, driven through the router without a network listener.

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

use phyto_match::web::server::{app_routes, create_router, AppState, MAX_BODY_SIZE};
use phyto_match::{DrugTable, MatchingConfig, PlantTable};

const ASPIRIN: &str = "CC(=O)OC1=CC=CC=C1C(=O)O";

fn state() -> Arc<AppState> {
    let drugs = DrugTable::from_csv(&format!(
        "Drug Name,ICD-10 Code,SMILES\nAspirin,M79.3,{ASPIRIN}\n"
    ))
    .unwrap();
    let plants = PlantTable::from_csv(&format!(
        "Plant Name,Country of Origin,SMILES\n\
         Willow,Europe,{ASPIRIN}\n\
         Mystery,Europe,not_a_smiles\n\
         Octopus Weed,Europe,CCCCCCCC\n"
    ))
    .unwrap();
    Arc::new(AppState {
        drugs,
        plants,
        config: MatchingConfig::default(),
    })
}

fn app() -> Router {
    app_routes(state())
}

fn form_request(body: &str) -> Request<Body> {
    Request::post("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request(body: &serde_json::Value) -> Request<Body> {
    Request::post("/api/match")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), MAX_BODY_SIZE * 16).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_page() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("name=\"disease\""));
    assert!(html.contains("name=\"region\""));
    assert!(!html.contains("Results"));
}

#[tokio::test]
async fn test_form_submission_lists_plants() {
    let response = app()
        .oneshot(form_request("disease=M79&region=Europe"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<li>Willow</li>"));
    assert!(!html.contains("Mystery"));
    assert!(!html.contains("Octopus Weed"));
    assert!(html.contains("value=\"M79\""));
}

#[tokio::test]
async fn test_form_submission_no_results() {
    let response = app()
        .oneshot(form_request("disease=Z99&region=Europe"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No matching plants found."));
}

#[tokio::test]
async fn test_form_submission_blank_field() {
    let response = app()
        .oneshot(form_request("disease=M79&region=+++"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response)
        .await
        .contains("The region field must not be blank"));
}

#[tokio::test]
async fn test_form_submission_missing_field() {
    let response = app().oneshot(form_request("disease=M79")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_form_submission_escapes_input() {
    let response = app()
        .oneshot(form_request(
            "disease=%3Cscript%3Ealert(1)%3C%2Fscript%3E&region=Europe",
        ))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_api_match() {
    let response = app()
        .oneshot(json_request(&serde_json::json!({
            "disease": "m79",
            "region": "europe",
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["plants"], serde_json::json!(["Willow"]));
    assert_eq!(json["query"]["threshold"], 0.3);
    assert_eq!(json["stats"]["drug_chemicals"], 1);
    assert_eq!(json["stats"]["parse_failures"], 1);
}

#[tokio::test]
async fn test_api_match_threshold_zero() {
    let response = app()
        .oneshot(json_request(&serde_json::json!({
            "disease": "M79",
            "region": "Europe",
            "threshold": 0.0,
        })))
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["plants"], serde_json::json!(["Octopus Weed", "Willow"]));
}

#[tokio::test]
async fn test_api_match_invalid_threshold() {
    let response = app()
        .oneshot(json_request(&serde_json::json!({
            "disease": "M79",
            "region": "Europe",
            "threshold": 1.5,
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["error_type"], "validation_error");
    assert!(json["details"].is_null());
}

#[tokio::test]
async fn test_api_match_blank_disease() {
    let response = app()
        .oneshot(json_request(&serde_json::json!({
            "disease": "",
            "region": "Europe",
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_api_tables() {
    let response = app()
        .oneshot(Request::get("/api/tables").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["drug_records"], 1);
    assert_eq!(json["plant_records"], 3);
}

#[tokio::test]
async fn test_security_headers() {
    let request = Request::get("/")
        .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
        .body(Body::empty())
        .unwrap();
    let response = create_router(state()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let body = format!("disease=M79&region={}", "x".repeat(MAX_BODY_SIZE * 2));
    let request = Request::post("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40001))))
        .body(Body::from(body))
        .unwrap();
    let response = create_router(state()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
