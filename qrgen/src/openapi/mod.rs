//! OpenAPI documentation for the HTTP surface.
//!
//! The document is served as JSON at `/api-docs/openapi.json` and rendered with Scalar at
//! `/docs`.

use utoipa::OpenApi;

use crate::{
    api,
    errors::{RejectionBody, ValidationIssue},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "qrgen",
        description = "Render text as QR code PNG images."
    ),
    paths(api::handlers::generate::generate),
    components(schemas(
        api::models::generate::GenerateRequest,
        api::models::generate::FitTo,
        RejectionBody,
        ValidationIssue,
    )),
    tags(
        (name = "generate", description = "QR code image generation"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_generate() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["paths"]["/generate"]["post"].is_object());
        assert!(json["components"]["schemas"]["GenerateRequest"].is_object());
        assert!(json["components"]["schemas"]["FitTo"].is_object());
    }

    #[test]
    fn test_openapi_success_response_is_png() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let responses = &json["paths"]["/generate"]["post"]["responses"];

        assert!(responses["200"]["content"]["image/png"].is_object());
        assert!(responses["400"]["content"]["application/json"].is_object());
    }
}
