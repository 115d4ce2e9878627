//! Test utilities shared by unit and HTTP tests.

use axum_test::TestServer;

use crate::config::{Config, LimitsConfig};

pub fn create_test_app() -> TestServer {
    create_test_app_with_config(create_test_config())
}

pub fn create_test_app_with_config(config: Config) -> TestServer {
    let app = crate::Application::new(config).expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        limits: LimitsConfig {
            max_width: 2048,
            ..LimitsConfig::default()
        },
        // The Prometheus recorder is process-global; only tests that exercise it turn it on
        enable_metrics: false,
        enable_otel_export: false,
        ..Config::default()
    }
}

/// Width and height of a PNG image.
pub fn png_dimensions(png: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory_with_format(png, image::ImageFormat::Png).expect("Response is not a valid PNG");
    (image.width(), image.height())
}

/// Decode the single QR code contained in a PNG image.
///
/// Native-size images have one pixel per module, which is too small for the detector, so small
/// images are first upscaled by a whole factor with nearest-neighbour sampling.
pub fn decode_qr(png: &[u8]) -> String {
    let image = image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("Response is not a valid PNG")
        .to_luma8();
    let factor = 1024u32.div_ceil(image.width()).max(1);
    let image = if factor > 1 {
        image::imageops::resize(&image, image.width() * factor, image.height() * factor, image::imageops::FilterType::Nearest)
    } else {
        image
    };

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(image.width() as usize, image.height() as usize, |x, y| {
        image.get_pixel(x as u32, y as u32).0[0]
    });
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "Expected exactly one QR code in the image");

    let (_meta, content) = grids[0].decode().expect("Failed to decode QR code");
    content
}
