//! API request and response data models.
//!
//! These models define the public API contract. They are deserialized with serde, validated
//! with `validator`, and annotated with `utoipa` for the OpenAPI document.
//!
//! - [`generate`]: QR generation payload and sizing directive

pub mod generate;
