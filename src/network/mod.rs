//! Network layer - the transport seam the engine sends requests through
//!
//! The engine only builds `WireRequest` values and reads `WireResponse`
//! values; who performs the round-trip is up to the `Transport` it was
//! given.

pub mod client;

use std::fmt;
use std::io::{self, Read};

use crate::error::TransportError;

pub use client::ReqwestTransport;

/// Request ready to go on the wire
pub type WireRequest = http::Request<Vec<u8>>;

/// Response handed back by a transport. The body is left unread.
pub type WireResponse = http::Response<ResponseBody>;

/// Performs one HTTP round-trip. Implementations own timeouts; the engine
/// never retries.
pub trait Transport {
    fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// Readable response body
pub struct ResponseBody(Box<dyn Read + Send>);

impl ResponseBody {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        ResponseBody(Box::new(reader))
    }

    /// Drain the body as text, replacing invalid UTF-8
    pub fn into_string(mut self) -> io::Result<String> {
        let mut bytes = Vec::new();
        self.0.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl From<String> for ResponseBody {
    fn from(body: String) -> Self {
        ResponseBody::new(io::Cursor::new(body.into_bytes()))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(body: &'static str) -> Self {
        ResponseBody::new(body.as_bytes())
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseBody { .. }")
    }
}
