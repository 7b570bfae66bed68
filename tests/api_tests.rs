use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use ndarray::array;
use serde_json::Value;

use anime_recommender::{
    api::{create_app, create_router, AppState},
    pipeline::SimilarityMatrix,
    services::{Enricher, ImageProvider},
};

const PLACEHOLDER: &str = "https://via.placeholder.com/150x200?text=No+Image";

/// Answers every lookup with a predictable URL, except for one name
struct FakePosters;

#[async_trait::async_trait]
impl ImageProvider for FakePosters {
    async fn fetch_image(&self, anime_name: &str) -> String {
        if anime_name == "K-On!" {
            PLACEHOLDER.to_string()
        } else {
            format!("https://posters.test/{}.jpg", anime_name.replace(' ', "_"))
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn sample_model() -> SimilarityMatrix {
    SimilarityMatrix::new(
        vec![
            "Cowboy Bebop".to_string(),
            "Samurai Champloo".to_string(),
            "Trigun".to_string(),
            "Outlaw Star".to_string(),
            "K-On!".to_string(),
        ],
        array![
            [1.0, 0.812_345, 0.6, 0.6, 0.1],
            [0.812_345, 1.0, 0.5, 0.4, 0.2],
            [0.6, 0.5, 1.0, 0.7, 0.1],
            [0.6, 0.4, 0.7, 1.0, 0.0],
            [0.1, 0.2, 0.1, 0.0, 1.0],
        ],
    )
    .unwrap()
}

fn create_test_state(top_n: usize) -> AppState {
    let enricher = Enricher::new(
        Arc::new(FakePosters),
        3,
        Duration::from_secs(5),
        PLACEHOLDER,
    );
    AppState::new(sample_model(), enricher, top_n)
}

fn create_test_server(top_n: usize) -> TestServer {
    let app = create_router(create_test_state(top_n));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(10);
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["items"], 5);
}

#[tokio::test]
async fn test_recommend_success() {
    let server = create_test_server(10);

    let response = server
        .get("/recommend")
        .add_query_param("anime", "Cowboy Bebop")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["input_anime"], "Cowboy Bebop");

    let recs = body["recommendations"].as_array().unwrap();
    let names: Vec<&str> = recs.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec!["Samurai Champloo", "Outlaw Star", "Trigun", "K-On!"]
    );

    assert_eq!(recs[0]["similarity_score"], 0.8123);
    assert_eq!(
        recs[0]["image_url"],
        "https://posters.test/Samurai_Champloo.jpg"
    );
    assert_eq!(recs[3]["image_url"], PLACEHOLDER);
}

#[tokio::test]
async fn test_recommend_respects_top_n() {
    let server = create_test_server(2);

    let response = server
        .get("/recommend")
        .add_query_param("anime", "Trigun")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["name"], "Outlaw Star");
    assert!(recs.iter().all(|r| r["name"] != "Trigun"));
}

#[tokio::test]
async fn test_recommend_missing_parameter() {
    let server = create_test_server(10);

    let response = server.get("/recommend").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert!(body["message"].as_str().unwrap().contains("anime"));
}

#[tokio::test]
async fn test_recommend_blank_parameter() {
    let server = create_test_server(10);

    let response = server
        .get("/recommend")
        .add_query_param("anime", "   ")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_repeated_parameter_is_json_400() {
    let server = create_test_server(10);

    let response = server
        .get("/recommend")
        .add_query_param("anime", "Trigun")
        .add_query_param("anime", "K-On!")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert!(body["message"].as_str().unwrap().contains("anime"));
}

#[tokio::test]
async fn test_recommend_unknown_anime() {
    let server = create_test_server(10);

    let response = server
        .get("/recommend")
        .add_query_param("anime", "cowboy bebop")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Anime not found");
    assert!(body["message"].as_str().unwrap().contains("cowboy bebop"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(10);

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("frontend-123"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), "frontend-123");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let server = create_test_server(10);

    let response = server.get("/health").await;

    let id = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_app_serves_front_end_beside_api() {
    let static_dir = tempfile::tempdir().unwrap();
    let page = "<html><body>anime search</body></html>";
    std::fs::write(static_dir.path().join("index.html"), page).unwrap();

    let app = create_app(create_test_state(10), static_dir.path());
    let server = TestServer::new(app).unwrap();

    let index = server.get("/").await;
    index.assert_status_ok();
    assert_eq!(index.text(), page);

    let response = server
        .get("/recommend")
        .add_query_param("anime", "Trigun")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["input_anime"], "Trigun");
    assert_eq!(body["recommendations"][0]["name"], "Outlaw Star");

    server
        .get("/missing.js")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
