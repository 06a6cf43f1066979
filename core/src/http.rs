//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe catalog requests and responses as plain data. The
//! gateway builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network; a `Transport` (or the host itself) performs the I/O.
//!
//! The catalog is read-only, so every request is a GET and carries no body.

/// A catalog GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL including the encoded query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub(crate) fn get(url: String) -> Self {
        Self {
            url,
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an `HttpRequest`, then handed
/// to the gateway for parsing.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
