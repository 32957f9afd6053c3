use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{mistral::MistralError, normalize::NormalizeError, upload::ImageError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Upload is too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Configuration error: Please check environment variables")]
    MissingApiKey,

    #[error("Failed to generate recipe. Please try again.")]
    Upstream(#[from] MistralError),

    #[error("Failed to generate recipe. Please try again.")]
    Malformed(#[from] NormalizeError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge | AppError::Image(ImageError::TooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Image(_) => StatusCode::BAD_REQUEST,
            AppError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) | AppError::Malformed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Maps an axum extractor rejection onto our error shape.
    pub fn from_rejection(status: StatusCode, body_text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(body_text)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn upstream_failures_do_not_leak_details() {
        let (status, body) = render(AppError::Upstream(MistralError::Status {
            status: 401,
            body: "Unauthorized: key sk-live-123".to_string(),
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "Failed to generate recipe. Please try again.");
    }

    #[tokio::test]
    async fn malformed_output_is_a_gateway_error() {
        let err = crate::normalize::parse_model_output("no recipe here").unwrap_err();
        let (status, body) = render(AppError::from(err)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body["message"].as_str().unwrap().contains("no recipe here"));
    }

    #[tokio::test]
    async fn image_errors_map_to_client_statuses() {
        let too_large = ImageError::TooLarge { size: 10, limit: 5 };
        let (status, _) = render(AppError::Image(too_large)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let (status, body) = render(AppError::Image(ImageError::Empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Image is empty");
    }

    #[test]
    fn rejections_keep_payload_too_large() {
        assert!(matches!(
            AppError::from_rejection(StatusCode::PAYLOAD_TOO_LARGE, "length limit".into()),
            AppError::PayloadTooLarge
        ));
        assert!(matches!(
            AppError::from_rejection(StatusCode::UNSUPPORTED_MEDIA_TYPE, "bad".into()),
            AppError::BadRequest(text) if text == "bad"
        ));
    }
}
