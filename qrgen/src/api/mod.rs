//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Generation** (`POST /generate`): Render text as a QR code PNG
//! - **Health** (`GET /healthz`): Liveness check
//! - **Metrics** (`GET /internal/metrics`): Prometheus exposition, when enabled
//!
//! # OpenAPI Documentation
//!
//! Endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod json;
pub mod models;
