//! HTTP request handlers.
//!
//! Handlers only deal with the HTTP envelope: extracting the body, calling into
//! [`crate::qr::QrService`], and shaping the response.
//!
//! # Handler Modules
//!
//! - [`generate`]: QR code PNG generation
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and response bodies.

pub mod generate;
