//! The I/O seam between the gateway and the network.
//!
//! Anything that can turn an `HttpRequest` into an `HttpResponse` can drive
//! the coordinator: the bundled `ReqwestTransport`, a host runtime's own
//! fetch, or a scripted fake in tests. Non-2xx statuses are returned as data;
//! only failures to get any response at all become `FetchError::Network`.

use std::future::Future;

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>>;
}

/// `reqwest`-backed transport. Applies no timeout and never retries.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = self.client.get(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
