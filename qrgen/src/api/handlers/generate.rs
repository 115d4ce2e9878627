//! HTTP handler for QR code generation.

use axum::{extract::State, http::header, response::IntoResponse};
use bytes::Bytes;

use crate::{AppState, api::json::JsonPayload, api::models::generate::GenerateRequest, errors::Result};

#[utoipa::path(
    post,
    path = "/generate",
    tag = "generate",
    summary = "Generate QR code",
    description = "Encode `value` as a QR code and return it as a PNG image, sized according to `fitTo`.",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "PNG image of the QR code", body = Vec<u8>, content_type = "image/png"),
        (status = 400, description = "Request failed validation", body = crate::errors::RejectionBody),
        (status = 415, description = "Request body is not JSON"),
        (status = 500, description = "Image generation failed", body = String, content_type = "text/plain"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn generate(State(state): State<AppState>, JsonPayload(request): JsonPayload<GenerateRequest>) -> Result<impl IntoResponse> {
    let png = state.qr.generate(&request).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], Bytes::from(png)))
}
