//! Shared response types for API handlers.

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// `201 Created` with a `Location` header pointing at the new item.
#[derive(Debug)]
pub struct Created<T: Serialize> {
    pub location: String,
    pub body: T,
}

impl<T: Serialize> Created<T> {
    pub fn new(location: String, body: T) -> Self {
        Self { location, body }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::CREATED, Json(self.body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.location) {
            response.headers_mut().insert(LOCATION, value);
        }
        response
    }
}

/// Raw stored bytes (page image or archive bundle).
#[derive(Debug)]
pub struct Binary {
    pub content_type: &'static str,
    /// Offered download name; sets `Content-Disposition: attachment`.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl IntoResponse for Binary {
    fn into_response(self) -> Response {
        let len = self.bytes.len();
        let mut response = Response::new(Body::from(self.bytes));
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        if let Some(name) = self.filename {
            if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")) {
                headers.insert(CONTENT_DISPOSITION, value);
            }
        }
        response
    }
}
