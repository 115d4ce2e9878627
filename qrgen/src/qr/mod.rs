//! QR image generation.
//!
//! Generation is a two-step pipeline:
//!
//! 1. [`encoder`] turns the request text into an SVG document using the configured
//!    [`QrConfig`](crate::config::QrConfig) styling.
//! 2. [`raster`] parses that SVG and rasterizes it into PNG bytes, honouring the request's
//!    [`FitTo`](crate::api::models::generate::FitTo) sizing directive.
//!
//! [`QrService`] glues both together, validates input and records metrics. It is the single
//! entry point shared by the HTTP handler and in-process callers.

pub mod encoder;
mod errors;
pub mod raster;
mod service;

pub use errors::GenerationError;
pub use raster::Rasterizer;
pub use service::QrService;
