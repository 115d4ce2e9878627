//! Text to SVG QR encoding.

use qrcode::{EcLevel, QrCode, render::svg};

use super::GenerationError;
use crate::config::{ErrorCorrection, QrConfig};

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

/// Encodes text as an SVG QR symbol with a fixed style.
#[derive(Debug, Clone)]
pub struct Encoder {
    ec_level: EcLevel,
    module_size: u32,
    quiet_zone: bool,
    dark_color: String,
    light_color: String,
}

impl Encoder {
    pub fn new(config: &QrConfig) -> Self {
        Self {
            ec_level: config.error_correction.into(),
            module_size: config.module_size.max(1),
            quiet_zone: config.quiet_zone,
            dark_color: config.dark_color.clone(),
            light_color: config.light_color.clone(),
        }
    }

    /// Encode `text` as UTF-8 bytes and render the symbol as an SVG document.
    ///
    /// The document's `width`/`height` are the module count (plus quiet zone) times the
    /// configured module size, which is what the rasterizer treats as the native size.
    pub fn encode_svg(&self, text: &str) -> Result<String, GenerationError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ec_level)?;

        let svg = code
            .render::<svg::Color>()
            .quiet_zone(self.quiet_zone)
            .module_dimensions(self.module_size, self.module_size)
            .dark_color(svg::Color(&self.dark_color))
            .light_color(svg::Color(&self.light_color))
            .build();

        Ok(svg)
    }
}
