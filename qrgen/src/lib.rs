//! # qrgen: QR code images over HTTP
//!
//! `qrgen` is a small service that turns a piece of text into a QR code PNG. A client posts the
//! text and a sizing directive to `POST /generate` and gets back the image bytes.
//!
//! ## Overview
//!
//! Every request runs the same linear pipeline:
//!
//! 1. The JSON body is deserialized into a [`GenerateRequest`](api::models::generate::GenerateRequest)
//!    and validated (text of 1-500 UTF-16 code units, a positive width when scaling).
//! 2. The text is encoded as an SVG QR symbol ([`qr::encoder`]).
//! 3. The SVG is rasterized to PNG at the requested size ([`qr::raster`]).
//! 4. The PNG bytes are returned with `Content-Type: image/png`.
//!
//! Validation failures become a structured 400 response. Anything that goes wrong after
//! validation is logged and reported as a generic 500. The pipeline is pure: identical input
//! always produces byte-identical output.
//!
//! The same pipeline is available without HTTP through [`QrService`], which is what the handler
//! calls.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum). The rendering engine is
//! brought up once in [`Application::new`], before the listener is bound; after that handlers
//! share it read-only through [`AppState`]. Rendering is CPU-bound and runs on tokio's blocking
//! pool.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use qrgen::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = qrgen::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     qrgen::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Embedding
//!
//! ```no_run
//! use qrgen::{Config, QrService, api::models::generate::GenerateRequest};
//!
//! # fn main() -> anyhow::Result<()> {
//! let service = QrService::new(&Config::default())?;
//! let png = service.generate_blocking(&GenerateRequest::width("hello", 256))?;
//! std::fs::write("hello.png", png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
mod metrics;
mod openapi;
pub mod qr;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Json, Router,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
pub use qr::QrService;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `config`: Application configuration loaded from environment/files
/// - `qr`: Initialized generation service
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .qr(service)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub qr: QrService,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed = &config.cors.allowed_origins;
    let allow_origin = if allowed.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in allowed {
            if let CorsOrigin::Url(url) = origin {
                // Origins never carry a path; Url::as_str always appends one
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - The generation route, with the configured body limit
/// - Health check
/// - OpenAPI document and viewer
/// - Optional Prometheus metrics
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route(
            "/generate",
            post(api::handlers::generate::generate).layer(DefaultBodyLimit::max(state.config.limits.max_body_size)),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The qrgen application.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] initializes the rendering engine and builds the router.
///    Nothing is served until this completes.
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, in-flight requests finish and
///    telemetry is flushed
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting qrgen with configuration: {:#?}", config);

        let qr = QrService::new(&config).context("Failed to initialize the rendering engine")?;
        debug!("Rendering engine initialized");

        let app_state = AppState::builder().config(config.clone()).qr(qr).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, app_state, config })
    }

    /// The generation service backing this application, for in-process callers.
    pub fn qr_service(&self) -> &QrService {
        &self.app_state.qr
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "qrgen listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::models::generate::GenerateRequest;
    use crate::test_utils::{create_test_app, create_test_app_with_config, create_test_config, decode_qr};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_healthz() {
        let server = create_test_app();

        let response = server.get("/healthz").await;

        response.assert_status(StatusCode::OK);
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let server = create_test_app();

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/generate"].is_object());

        server.get("/docs").await.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let server = create_test_app();

        server.get("/nope").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let mut config = create_test_config();
        config.limits.max_body_size = 64;
        let server = create_test_app_with_config(config);

        let response = server
            .post("/generate")
            .json(&json!({"value": "a".repeat(200), "fitTo": {"mode": "original"}}))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Url("https://app.example.com".parse().unwrap())];
        config.cors.max_age = Some(600);
        let server = create_test_app_with_config(config);

        let response = server
            .method(axum::http::Method::OPTIONS, "/generate")
            .add_header("origin", "https://app.example.com")
            .add_header("access-control-request-method", "POST")
            .await;

        assert_eq!(
            response.headers().get("access-control-allow-origin").map(|v| v.to_str().unwrap()),
            Some("https://app.example.com")
        );
        assert_eq!(
            response.headers().get("access-control-max-age").map(|v| v.to_str().unwrap()),
            Some("600")
        );
    }

    #[tokio::test]
    async fn test_cors_wildcard() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Wildcard, CorsOrigin::Url("https://app.example.com".parse().unwrap())];
        let server = create_test_app_with_config(config);

        let response = server
            .method(axum::http::Method::OPTIONS, "/generate")
            .add_header("origin", "https://elsewhere.example.org")
            .add_header("access-control-request-method", "POST")
            .await;

        assert_eq!(
            response.headers().get("access-control-allow-origin").map(|v| v.to_str().unwrap()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_metrics_endpoint_reports_generation() {
        let mut config = create_test_config();
        config.enable_metrics = true;
        let server = create_test_app_with_config(config);

        server
            .post("/generate")
            .json(&json!({"value": "metrics", "fitTo": {"mode": "original"}}))
            .await
            .assert_status(StatusCode::OK);

        let response = server.get("/internal/metrics").await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("qrgen_images_generated_total"));
    }

    #[tokio::test]
    async fn test_embedded_service_matches_http_output() {
        let app = Application::new(create_test_config()).unwrap();
        let direct = app.qr_service().generate(&GenerateRequest::original("embedded")).await.unwrap();
        let server = app.into_test_server();

        let response = server
            .post("/generate")
            .json(&json!({"value": "embedded", "fitTo": {"mode": "original"}}))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.as_bytes().as_ref(), direct.as_slice());
        assert_eq!(decode_qr(&direct), "embedded");
    }
}
