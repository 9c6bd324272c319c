use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// HTTP methods the request notation accepts
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn to_http(self) -> http::Method {
        match self {
            HttpMethod::GET => http::Method::GET,
            HttpMethod::POST => http::Method::POST,
            HttpMethod::PUT => http::Method::PUT,
            HttpMethod::DELETE => http::Method::DELETE,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ParseError;

    /// Exact, case-sensitive match. `get` is not `GET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseError::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Headers = IndexMap<String, String>;
pub type SearchParams = IndexMap<String, String>;
pub type FormFields = IndexMap<String, String>;

/// A parsed request.
///
/// `raw` is the text the request was parsed from, after template rendering.
/// It is the only part that gets persisted; everything else is rebuilt by
/// parsing `raw` again on load.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub raw: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub search_params: SearchParams,
    pub form_fields: FormFields,
    pub json_body: Option<String>,
}

impl Request {
    /// Bare request with no parameters. `raw` is synthesized as `METHOD URL`.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        let url = url.into();
        Request {
            raw: format!("{} {}", method, url),
            method,
            url,
            headers: Headers::new(),
            search_params: SearchParams::new(),
            form_fields: FormFields::new(),
            json_body: None,
        }
    }

    /// Text used by list filters
    pub fn filter_value(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.method, self.url)
    }
}

/// An executed request together with the status code it got back
#[derive(Clone, Debug, PartialEq)]
pub struct RequestAndResponse {
    pub request: Request,
    pub response_code: u16,
}

impl RequestAndResponse {
    pub fn new(request: Request, response_code: u16) -> Self {
        RequestAndResponse {
            request,
            response_code,
        }
    }
}

impl fmt::Display for RequestAndResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.request, self.response_code)
    }
}

/// Executed requests, oldest first
pub type History = Vec<RequestAndResponse>;

/// Reusable requests in the order they were saved
pub type SavedRequests = Vec<Request>;

/// Item of a request list: either a history entry or a saved request
#[derive(Clone, Copy, Debug)]
pub enum ListEntry<'a> {
    History(&'a RequestAndResponse),
    Saved(&'a Request),
}

impl<'a> ListEntry<'a> {
    pub fn request(&self) -> &'a Request {
        match self {
            ListEntry::History(entry) => &entry.request,
            ListEntry::Saved(request) => request,
        }
    }

    /// One-line label, e.g. `[GET]https://x (200)`
    pub fn describe(&self) -> String {
        match self {
            ListEntry::History(entry) => entry.to_string(),
            ListEntry::Saved(request) => request.to_string(),
        }
    }

    pub fn filter_value(&self) -> String {
        self.request().filter_value()
    }
}
