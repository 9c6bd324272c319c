//! HTTP client wrapper - runs wire requests through reqwest's blocking client

use std::time::Duration;

use crate::error::TransportError;
use crate::network::{ResponseBody, Transport, WireRequest, WireResponse};

/// `Transport` backed by `reqwest::blocking::Client`
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = client_builder(timeout).build()?;
        Ok(ReqwestTransport { client })
    }
}

fn client_builder(timeout: Duration) -> reqwest::blocking::ClientBuilder {
    reqwest::blocking::Client::builder().timeout(timeout)
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let (parts, body) = request.into_parts();

        let mut req_builder = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers);
        if !body.is_empty() {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().map_err(|e| -> TransportError {
            if e.is_timeout() {
                format!("Request timed out: {}", e).into()
            } else if e.is_connect() {
                format!("Connection failed: {}", e).into()
            } else {
                Box::new(e)
            }
        })?;

        let mut builder = http::Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(response.headers().clone());
        }
        Ok(builder.body(ResponseBody::new(response))?)
    }
}
