use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use image::DynamicImage;
use tempfile::TempDir;
use tower::ServiceExt;
use visage::{
    AppState, ClassifierError, DetailCatalog, Prediction, ShapePredictor, StyleCatalog,
};

const BOUNDARY: &str = "test-boundary-7f3a";
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Predictor that always answers with a fixed label, standing in for the
/// ONNX-backed classifier.
struct FixedPredictor {
    label: &'static str,
}

impl ShapePredictor for FixedPredictor {
    fn predict(&self, _image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        let mut scores = HashMap::new();
        scores.insert(self.label.to_string(), 0.875);
        Ok(Prediction {
            label: self.label.to_string(),
            confidence: 87.5,
            scores,
        })
    }

    fn labels(&self) -> Vec<String> {
        vec![self.label.to_string()]
    }
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"fake image bytes").unwrap();
}

fn flat_app(label: &'static str, assets: &TempDir) -> Router {
    let state = AppState::new(
        Arc::new(FixedPredictor { label }),
        StyleCatalog::new(assets.path(), false),
        DetailCatalog::builtin(),
        3,
    );
    visage::build_router(state, assets.path(), BODY_LIMIT)
}

fn gendered_app(label: &'static str, assets: &TempDir) -> Router {
    let state = AppState::new(
        Arc::new(FixedPredictor { label }),
        StyleCatalog::new(assets.path(), true),
        DetailCatalog::builtin(),
        3,
    );
    visage::build_router(state, assets.path(), BODY_LIMIT)
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(32, 32);
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .expect("encode test image");
    buf
}

fn multipart_request(uri: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let assets = TempDir::new().unwrap();
    let app = flat_app("Oval", &assets);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_predict_returns_label_details_and_recommendations() {
    let assets = TempDir::new().unwrap();
    touch(&assets.path().join("oval/long_layers.jpg"));
    touch(&assets.path().join("oval/pixie_cut.jpg"));
    let app = flat_app("Oval", &assets);

    let response = app
        .oneshot(multipart_request("/predict", "image/png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["face_shape"], "Oval");
    assert!((body["confidence"].as_f64().unwrap() - 87.5).abs() < 1e-6);
    assert!(body["description"].as_str().unwrap().len() > 10);
    assert!(!body["tips"].as_array().unwrap().is_empty());
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);
    let url = body["recommendations"][0]["image_url"].as_str().unwrap();
    assert!(url.starts_with("/images/oval/"));
}

#[tokio::test]
async fn test_predict_with_empty_store_still_succeeds() {
    let assets = TempDir::new().unwrap();
    let app = flat_app("Oval", &assets);

    let response = app
        .oneshot(multipart_request("/predict", "image/png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_predict_rejects_non_image_upload() {
    let assets = TempDir::new().unwrap();
    let app = flat_app("Oval", &assets);

    let response = app
        .oneshot(multipart_request("/predict", "text/plain", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_UPLOAD");
}

#[tokio::test]
async fn test_predict_rejects_undecodable_image() {
    let assets = TempDir::new().unwrap();
    let app = flat_app("Oval", &assets);

    let response = app
        .oneshot(multipart_request("/predict", "image/png", b"not a real png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_UPLOAD");
}

#[tokio::test]
async fn test_predict_rejects_invalid_gender() {
    let assets = TempDir::new().unwrap();
    let app = flat_app("Oval", &assets);

    let response = app
        .oneshot(multipart_request(
            "/predict?gender=unknown",
            "image/png",
            &png_bytes(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_GENDER");
}

#[tokio::test]
async fn test_gendered_deployment_requires_gender_parameter() {
    let assets = TempDir::new().unwrap();
    touch(&assets.path().join("female/oval/a.jpg"));
    let app = gendered_app("Oval", &assets);

    let response = app
        .oneshot(multipart_request("/predict", "image/png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "GENDER_REQUIRED");
}

#[tokio::test]
async fn test_gendered_predict_draws_from_requested_partition() {
    let assets = TempDir::new().unwrap();
    touch(&assets.path().join("male/heart/buzz_cut.jpg"));
    touch(&assets.path().join("female/heart/textured_lob.jpg"));
    let app = gendered_app("Heart", &assets);

    let response = app
        .oneshot(multipart_request(
            "/predict?gender=male",
            "image/png",
            &png_bytes(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["image_url"], "/images/male/heart/buzz_cut.jpg");
}

#[tokio::test]
async fn test_browse_lists_all_assets() {
    let assets = TempDir::new().unwrap();
    touch(&assets.path().join("round/a.jpg"));
    touch(&assets.path().join("round/b.jpg"));
    touch(&assets.path().join("round/skip.txt"));
    let app = flat_app("Round", &assets);

    let response = app
        .oneshot(Request::get("/styles/round").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["category"], "round");
}

#[tokio::test]
async fn test_browse_missing_category_is_catalogued_404() {
    let assets = TempDir::new().unwrap();
    let app = flat_app("Round", &assets);

    let response = app
        .oneshot(Request::get("/styles/square").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NO_STYLES_FOUND");
}

#[tokio::test]
async fn test_browse_gendered_route_validates_gender() {
    let assets = TempDir::new().unwrap();
    touch(&assets.path().join("female/oval/a.jpg"));
    let app = gendered_app("Oval", &assets);

    let ok = gendered_app("Oval", &assets)
        .oneshot(
            Request::get("/styles/female/oval")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let bad = app
        .oneshot(
            Request::get("/styles/alien/oval")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    let body = json_body(bad).await;
    assert_eq!(body["error"]["code"], "INVALID_GENDER");
}

#[tokio::test]
async fn test_static_assets_are_served_under_images() {
    let assets = TempDir::new().unwrap();
    touch(&assets.path().join("oval/pixie_cut.jpg"));
    let app = flat_app("Oval", &assets);

    let response = app
        .oneshot(
            Request::get("/images/oval/pixie_cut.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
