//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `QRGEN_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `QRGEN_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `QRGEN_QR__MODULE_SIZE=4` sets the `qr.module_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use qrgen::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **QR rendering**: `qr.error_correction`, `qr.module_size`, `qr.quiet_zone`, `qr.dark_color`,
//!   `qr.light_color` - How the vector QR code is drawn
//! - **Limits**: `limits.max_body_size`, `limits.max_width` - Request and output size ceilings
//! - **CORS**: `cors.allowed_origins`, `cors.max_age` - Browser access
//! - **Features**: `enable_metrics`, `enable_otel_export` - Optional feature toggles
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! QRGEN_PORT=8080
//!
//! # Use the highest error correction level
//! QRGEN_QR__ERROR_CORRECTION=high
//!
//! # Allow arbitrarily wide images
//! QRGEN_LIMITS__MAX_WIDTH=0
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "QRGEN_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// QR code appearance
    pub qr: QrConfig,
    /// Request and output size limits
    pub limits: LimitsConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
    /// Expose Prometheus metrics at `/internal/metrics`
    pub enable_metrics: bool,
    /// Export traces over OTLP (configured via the standard `OTEL_*` variables)
    pub enable_otel_export: bool,
}

/// Error correction level of the encoded symbol.
///
/// Higher levels survive more damage at the cost of a denser symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    /// ~7% recovery
    Low,
    /// ~15% recovery
    #[default]
    Medium,
    /// ~25% recovery
    Quartile,
    /// ~30% recovery
    High,
}

/// QR rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    /// Error correction level used for every symbol
    pub error_correction: ErrorCorrection,
    /// Size of one module in the vector image, in pixels. This is the scale of the
    /// "original" sizing mode; the default of 1 keeps the symbol's native size.
    pub module_size: u32,
    /// Surround the symbol with the standard 4-module light border
    pub quiet_zone: bool,
    /// Fill colour for dark modules (any SVG colour string)
    pub dark_color: String,
    /// Fill colour for light modules (any SVG colour string)
    pub light_color: String,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::Medium,
            module_size: 1,
            quiet_zone: true,
            dark_color: "#000000".to_string(),
            light_color: "#ffffff".to_string(),
        }
    }
}

/// Limits configuration.
///
/// Protects the service from requests that would allocate unreasonable amounts of memory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    /// Default: 64KB
    pub max_body_size: usize,
    /// Maximum output width in pixels for the `width` sizing mode. Wider requests fail as a
    /// generation error instead of attempting the allocation.
    /// Set to 0 for unlimited (not recommended for production).
    /// Default: 16384, where a square RGBA pixmap reaches 1 GiB
    pub max_width: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
            max_width: 16_384,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// An allowed CORS origin.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            qr: QrConfig::default(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
            enable_metrics: true,
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.qr.module_size == 0 {
            return Err(Error::InvalidConfig {
                message: "qr.module_size must be at least 1".to_string(),
            });
        }

        if self.qr.dark_color.trim().is_empty() || self.qr.light_color.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "qr.dark_color and qr.light_color cannot be empty".to_string(),
            });
        }

        if self.limits.max_body_size == 0 {
            return Err(Error::InvalidConfig {
                message: "limits.max_body_size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values. QRGEN_CONFIG names the file itself.
            .merge(Env::prefixed("QRGEN_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
