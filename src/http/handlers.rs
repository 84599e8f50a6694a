use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog::{Gender, StyleAsset};
use crate::http::error::ApiError;
use crate::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    gender: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub face_shape: String,
    pub confidence: f32,
    pub description: String,
    pub tips: Vec<String>,
    pub recommendations: Vec<StyleAsset>,
}

#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub category: String,
    pub count: usize,
    pub styles: Vec<StyleAsset>,
}

/// POST /predict - classify an uploaded photograph and attach details plus
/// hairstyle recommendations for the predicted category.
///
/// Zero recommendations is not an error here; a deployment whose store lacks
/// a category still gets the prediction itself.
pub async fn predict(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
    multipart: Multipart,
) -> Result<Json<PredictionResponse>, ApiError> {
    let gender = parse_gender(params.gender.as_deref())?;
    if state.styles.is_gendered() && gender.is_none() {
        return Err(ApiError::GenderRequired);
    }

    let data = read_image_field(multipart).await?;
    let image = image::load_from_memory(&data)
        .map_err(|e| ApiError::InvalidUpload(format!("Could not decode image: {}", e)))?;

    // Inference is CPU-bound; keep it off the async workers.
    let predictor = state.predictor.clone();
    let prediction = tokio::task::spawn_blocking(move || predictor.predict(&image))
        .await
        .map_err(|e| ApiError::Internal(format!("Inference task failed: {}", e)))??;

    info!(
        "Predicted '{}' at {:.1}% confidence",
        prediction.label, prediction.confidence
    );

    let details = state.details.get(&prediction.label);
    let recommendations =
        state
            .styles
            .resolve(&prediction.label, gender, state.max_recommendations)?;

    Ok(Json(PredictionResponse {
        face_shape: prediction.label,
        confidence: prediction.confidence,
        description: details.description,
        tips: details.tips,
        recommendations,
    }))
}

/// GET /styles/{category} - browse every asset for a category in a flat
/// (non-gendered) deployment. An empty partition is a catalogued 404.
pub async fn browse_styles(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<StylesResponse>, ApiError> {
    browse(state, category, None).await
}

/// GET /styles/{gender}/{category} - browse a gendered partition.
pub async fn browse_styles_by_gender(
    State(state): State<AppState>,
    Path((gender, category)): Path<(String, String)>,
) -> Result<Json<StylesResponse>, ApiError> {
    let gender = parse_gender(Some(&gender))?;
    browse(state, category, gender).await
}

async fn browse(
    state: AppState,
    category: String,
    gender: Option<Gender>,
) -> Result<Json<StylesResponse>, ApiError> {
    let styles = state.styles.list(&category, gender)?;
    if styles.is_empty() {
        return Err(ApiError::NoStylesFound { category });
    }
    Ok(Json(StylesResponse {
        count: styles.len(),
        category,
        styles,
    }))
}

/// GET /health - liveness endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn parse_gender(raw: Option<&str>) -> Result<Option<Gender>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<Gender>()
            .map(Some)
            .map_err(ApiError::InvalidGender),
    }
}

/// Pulls the `file` field out of the multipart body, enforcing the image
/// content-type check at the boundary before any decoding happens.
async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(ApiError::InvalidUpload("File must be an image".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::InvalidUpload("Uploaded file is empty".to_string()));
        }
        return Ok(bytes.to_vec());
    }

    Err(ApiError::InvalidUpload("No file uploaded".to_string()))
}
