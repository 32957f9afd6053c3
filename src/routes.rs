use std::{sync::Arc, time::Instant};

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::HeaderMap,
    response::Html,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::AppError,
    gallery::{gallery, Gallery},
    recipes::{generate, GeneratedRecipe, API_KEY_HEADER},
    state::AppState,
    upload::ImageInput,
};

const IMAGE_FIELD: &str = "image";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUrlPayload {
    image_data: String,
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn examples_handler() -> Json<Gallery> {
    Json(gallery())
}

pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<GeneratedRecipe>, AppError> {
    let started = Instant::now();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            debug!(name = ?field.name(), "Skipping multipart field");
            continue;
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        let image = ImageInput::from_bytes(&data, state.config.max_image_bytes)?;

        return generate(&state, request_key(&headers), image, started)
            .await
            .map(Json);
    }

    Err(AppError::BadRequest(format!("Missing `{IMAGE_FIELD}` field")))
}

pub async fn data_url_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<DataUrlPayload>, JsonRejection>,
) -> Result<Json<GeneratedRecipe>, AppError> {
    let started = Instant::now();

    let Json(payload) = payload.map_err(|rejection| {
        AppError::from_rejection(rejection.status(), rejection.body_text())
    })?;

    let image = ImageInput::from_data_url(&payload.image_data, state.config.max_image_bytes)?;

    generate(&state, request_key(&headers), image, started)
        .await
        .map(Json)
}

fn request_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::from_rejection(err.status(), err.body_text())
}
