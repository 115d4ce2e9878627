//! JSON body extractor with the service's rejection format.

use axum::extract::FromRequest;

use crate::errors::Error;

/// Like [`axum::Json`], but rejections are reported through [`Error`] so malformed bodies get
/// the same 400 response shape as failed validation.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonPayload<T>(pub T);
