use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Maximum length of the encoded text, in UTF-16 code units.
///
/// Clients count string length in UTF-16, so a character outside the Basic Multilingual Plane
/// (most emoji) counts twice.
pub const MAX_VALUE_LENGTH: usize = 500;

/// Request payload for generating a QR code image.
///
/// The same payload is accepted by `POST /generate` and by
/// [`QrService::generate`](crate::qr::QrService::generate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct GenerateRequest {
    /// Text to encode, 1-500 UTF-16 code units
    #[validate(custom(function = "validate_value"))]
    #[schema(min_length = 1, max_length = 500, example = "hello")]
    pub value: String,
    /// Output sizing directive
    #[serde(rename = "fitTo")]
    #[validate(custom(function = "validate_fit_to"))]
    pub fit_to: FitTo,
}

/// How the rendered image is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FitTo {
    /// Keep the native size of the vector image
    Original,
    /// Scale to an exact pixel width, keeping the aspect ratio
    Width {
        /// Target width in pixels, must be positive
        #[schema(minimum = 1, example = 256)]
        value: i64,
    },
}

impl GenerateRequest {
    /// Request an image at its native size.
    pub fn original(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            fit_to: FitTo::Original,
        }
    }

    /// Request an image scaled to `width` pixels.
    pub fn width(value: impl Into<String>, width: i64) -> Self {
        Self {
            value: value.into(),
            fit_to: FitTo::Width { value: width },
        }
    }
}

fn validate_value(value: &str) -> Result<(), ValidationError> {
    let length = value.encode_utf16().count();
    if length == 0 || length > MAX_VALUE_LENGTH {
        return Err(ValidationError::new("length").with_message("value must be between 1 and 500 characters".into()));
    }
    Ok(())
}

fn validate_fit_to(fit_to: &FitTo) -> Result<(), ValidationError> {
    match fit_to {
        FitTo::Width { value } if *value < 1 || *value > i64::from(u32::MAX) => {
            Err(ValidationError::new("positive").with_message("fitTo.value must be a positive integer".into()))
        }
        _ => Ok(()),
    }
}
