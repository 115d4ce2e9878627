//! Generation metrics, recorded through the `metrics` facade.
//!
//! When `enable_metrics` is set the Prometheus recorder installed by the metrics layer picks these
//! up and they are rendered at `/internal/metrics`. Without a recorder the calls are no-ops.

use std::time::Duration;

use metrics::{counter, histogram};

/// Record a successfully generated image
///
/// # Arguments
/// * `fit` - Sizing mode label (`original` or `width`)
/// * `elapsed` - Time spent encoding and rasterizing
pub fn record_image_generated(fit: &'static str, elapsed: Duration) {
    counter!("qrgen_images_generated_total", "fit" => fit).increment(1);
    histogram!("qrgen_render_duration_seconds", "fit" => fit).record(elapsed.as_secs_f64());
}

/// Record a generation failure at the given pipeline stage
pub fn record_generation_error(stage: &'static str) {
    counter!("qrgen_generation_errors_total", "stage" => stage).increment(1);
}

/// Record a request rejected by input validation
pub fn record_rejection() {
    counter!("qrgen_rejections_total").increment(1);
}
