use std::sync::Arc;
use std::time::Instant;

use tracing::{error, instrument};
use validator::Validate;

use super::{GenerationError, Rasterizer, encoder::Encoder, raster::OutputSize};
use crate::{
    api::models::generate::{FitTo, GenerateRequest},
    config::Config,
    errors::{Error, Result},
    metrics,
};

/// QR image generation service.
///
/// This is the embeddable entry point: the `/generate` handler calls it, and so can any
/// in-process caller that wants PNG bytes without going through HTTP. Every call validates its
/// input, so callers never need to pre-validate.
///
/// Cloning is cheap; clones share the encoder and the initialized rasterizer.
#[derive(Debug, Clone)]
pub struct QrService {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    encoder: Encoder,
    rasterizer: Rasterizer,
    max_width: u32,
}

impl Inner {
    fn render(&self, value: &str, size: OutputSize) -> std::result::Result<Vec<u8>, GenerationError> {
        if let OutputSize::Width(width) = size
            && self.max_width != 0
            && width > self.max_width
        {
            return Err(GenerationError::TooWide { width, max: self.max_width });
        }

        let svg = self.encoder.encode_svg(value)?;
        self.rasterizer.render(&svg, size)
    }
}

impl QrService {
    /// Build the service from configuration, initializing the rendering engine.
    ///
    /// This is the one-time startup step; it must complete before requests are served.
    pub fn new(config: &Config) -> std::result::Result<Self, GenerationError> {
        let rasterizer = Rasterizer::init()?;
        Ok(Self::with_rasterizer(config, rasterizer))
    }

    /// Build the service around an already initialized rasterizer.
    pub fn with_rasterizer(config: &Config, rasterizer: Rasterizer) -> Self {
        Self {
            inner: Arc::new(Inner {
                encoder: Encoder::new(&config.qr),
                rasterizer,
                max_width: config.limits.max_width,
            }),
        }
    }

    /// Check `request` against every input constraint and resolve its output size.
    pub fn validate(&self, request: &GenerateRequest) -> Result<OutputSize> {
        let checked = request.validate().map_err(Error::from).and_then(|_| match request.fit_to {
            FitTo::Original => Ok(OutputSize::Original),
            FitTo::Width { value } => u32::try_from(value)
                .map(OutputSize::Width)
                .map_err(|_| Error::invalid("fitTo", "positive", "fitTo.value must be a positive integer")),
        });

        if checked.is_err() {
            metrics::record_rejection();
        }
        checked
    }

    /// Generate a PNG for `request`.
    ///
    /// Encoding and rasterization run on the blocking thread pool.
    #[instrument(skip_all, fields(chars = request.value.chars().count(), fit = ?request.fit_to), err(level = "debug"))]
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>> {
        let size = self.validate(request)?;

        let inner = self.inner.clone();
        let value = request.value.clone();
        let started = Instant::now();
        let rendered = tokio::task::spawn_blocking(move || inner.render(&value, size))
            .await
            .map_err(GenerationError::from)
            .and_then(|result| result);

        self.finish(rendered, size, started)
    }

    /// Synchronous variant of [`generate`](Self::generate) for callers outside an async runtime.
    pub fn generate_blocking(&self, request: &GenerateRequest) -> Result<Vec<u8>> {
        let size = self.validate(request)?;
        let started = Instant::now();
        let rendered = self.inner.render(&request.value, size);

        self.finish(rendered, size, started)
    }

    fn finish(&self, rendered: std::result::Result<Vec<u8>, GenerationError>, size: OutputSize, started: Instant) -> Result<Vec<u8>> {
        match rendered {
            Ok(png) => {
                metrics::record_image_generated(size.label(), started.elapsed());
                Ok(png)
            }
            Err(e) => {
                metrics::record_generation_error(e.stage());
                error!(stage = e.stage(), "QR generation failed: {:#}", e);
                Err(e.into())
            }
        }
    }
}
