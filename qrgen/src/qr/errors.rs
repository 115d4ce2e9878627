use thiserror::Error;

/// Failures while turning text into PNG bytes.
///
/// None of these are the caller's fault once input validation has passed, so all of them
/// surface as a generic internal error at the API boundary.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to encode QR symbol: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Failed to parse QR SVG: {0}")]
    ParseSvg(#[from] resvg::usvg::Error),

    #[error("Invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Requested width {width} exceeds the {max} pixel limit")]
    TooWide { width: u32, max: u32 },

    #[error("Failed to allocate a {width}x{height} pixmap")]
    Allocate { width: u32, height: u32 },

    #[error("Failed to encode PNG: {0}")]
    EncodePng(String),

    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GenerationError {
    /// Pipeline stage the error belongs to, used as a metrics label.
    pub fn stage(&self) -> &'static str {
        match self {
            GenerationError::Encode(_) => "encode",
            GenerationError::ParseSvg(_) => "parse",
            GenerationError::InvalidSize { .. } | GenerationError::TooWide { .. } | GenerationError::Allocate { .. } => "rasterize",
            GenerationError::EncodePng(_) => "png",
            GenerationError::Task(_) => "task",
        }
    }
}
