//! Turns a parsed `Request` into a `WireRequest`

use std::collections::HashSet;
use std::io::{self, Read};

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::blocking::multipart::Form;
use url::Url;

use crate::error::ExecutionError;
use crate::models::{FormFields, Request, SearchParams};
use crate::network::WireRequest;

/// Build the wire form of `request`: headers, search params merged into the
/// url query, and a multipart body for form fields or the raw JSON body.
pub fn build_wire_request(request: &Request) -> Result<WireRequest, ExecutionError> {
    let url = merge_search_params(&request.url, &request.search_params)?;
    let uri: http::Uri = url
        .as_str()
        .parse()
        .map_err(|e| ExecutionError::InvalidRequest(format!("invalid url '{}': {}", url, e)))?;

    let mut wire = WireRequest::new(Vec::new());
    *wire.method_mut() = request.method.to_http();
    *wire.uri_mut() = uri;

    for (key, value) in &request.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ExecutionError::InvalidRequest(format!("invalid header '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ExecutionError::InvalidRequest(format!("invalid value for header '{}': {}", key, e))
        })?;
        wire.headers_mut().insert(name, value);
    }

    if !request.form_fields.is_empty() {
        if request.json_body.is_some() {
            tracing::warn!(url = %request.url, "Form fields present, JSON body not sent");
        }
        let (content_type, body) =
            encode_multipart(&request.form_fields).map_err(ExecutionError::BodyConstruction)?;
        let content_type = HeaderValue::from_str(&content_type)
            .map_err(|e| ExecutionError::BodyConstruction(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        wire.headers_mut().insert(CONTENT_TYPE, content_type);
        *wire.body_mut() = body;
    } else if let Some(json) = &request.json_body {
        if !wire.headers().contains_key(CONTENT_TYPE) {
            wire.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        *wire.body_mut() = json.clone().into_bytes();
    }

    Ok(wire)
}

/// Merge search params into the query of `raw_url`.
///
/// A param overwrites the first existing pair with the same key (later
/// duplicates are dropped); unrelated pairs keep their order; new keys go
/// at the end. The url is left alone when there is nothing to merge.
pub fn merge_search_params(raw_url: &str, params: &SearchParams) -> Result<Url, ExecutionError> {
    let mut url = Url::parse(raw_url)
        .map_err(|e| ExecutionError::InvalidRequest(format!("invalid url '{}': {}", raw_url, e)))?;
    if params.is_empty() {
        return Ok(url);
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut seen = HashSet::new();
    pairs.retain(|(key, _)| !params.contains_key(key) || seen.insert(key.clone()));

    for (key, value) in params {
        match pairs.iter_mut().find(|(existing, _)| existing == key) {
            Some(pair) => pair.1 = value.clone(),
            None => pairs.push((key.clone(), value.clone())),
        }
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url)
}

/// Encode text fields as `multipart/form-data`.
/// Returns the content type (with boundary) and the body.
///
/// Field names that need it are percent-encoded into `name*=utf-8''...`,
/// so quotes and line breaks never reach the part headers raw.
pub fn encode_multipart(fields: &FormFields) -> io::Result<(String, Vec<u8>)> {
    let form = fields
        .iter()
        .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.clone()));
    let content_type = format!("multipart/form-data; boundary={}", form.boundary());

    let mut body = Vec::new();
    form.into_reader().read_to_end(&mut body)?;
    Ok((content_type, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_request;

    #[test]
    fn test_search_param_overwrites_and_preserves() {
        let mut params = SearchParams::new();
        params.insert("orderBy".to_string(), "name".to_string());

        let url = merge_search_params("https://x?search=a&orderBy=date", &params).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("search".to_string(), "a".to_string()),
                ("orderBy".to_string(), "name".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_params_appended_and_encoded() {
        let request = parse_request(r#"GET https://x/search?page=1 q=?"standard library" page=?2"#).unwrap();
        let wire = build_wire_request(&request).unwrap();
        assert_eq!(
            wire.uri().to_string(),
            "https://x/search?page=2&q=standard+library"
        );
    }

    #[test]
    fn test_url_without_params_is_kept() {
        let request = parse_request("DELETE https://pkg.go.dev/1?a=%20b").unwrap();
        let wire = build_wire_request(&request).unwrap();
        assert_eq!(wire.method(), &http::Method::DELETE);
        assert_eq!(wire.uri().to_string(), "https://pkg.go.dev/1?a=%20b");
        assert!(wire.body().is_empty());
    }

    #[test]
    fn test_headers_attached() {
        let request = parse_request(r#"GET https://x Authorization=:"Bearer abc" X-Trace=:1"#).unwrap();
        let wire = build_wire_request(&request).unwrap();
        assert_eq!(wire.headers()["authorization"], "Bearer abc");
        assert_eq!(wire.headers()["x-trace"], "1");
    }

    #[test]
    fn test_invalid_header_name() {
        let request = parse_request(r#"GET https://x "bad header"=:x"#).unwrap();
        assert!(matches!(
            build_wire_request(&request),
            Err(ExecutionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invalid_url() {
        let request = parse_request("GET not-a-url").unwrap();
        assert!(matches!(
            build_wire_request(&request),
            Err(ExecutionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_form_fields_become_multipart() {
        let request = parse_request(r#"POST https://x name="John Doe" age=42"#).unwrap();
        let wire = build_wire_request(&request).unwrap();

        let content_type = wire.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let body = String::from_utf8(wire.body().clone()).unwrap();
        let expected = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nJohn Doe\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"age\"\r\n\r\n42\r\n--{b}--\r\n",
            b = boundary
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn test_form_field_name_cannot_break_part_headers() {
        let request = parse_request("POST https://x \"evil\r\n\r\nsmuggled=v\" ok=1").unwrap();
        assert!(request.form_fields.contains_key("\"evil\r\n\r\nsmuggled"));

        let wire = build_wire_request(&request).unwrap();
        let body = String::from_utf8(wire.body().clone()).unwrap();

        assert!(!body.contains("\r\n\r\nsmuggled"));
        assert!(body.contains("Content-Disposition: form-data; name*=utf-8''%22evil%0D%0A%0D%0Asmuggled\r\n\r\nv\"\r\n"));
        assert!(body.contains("Content-Disposition: form-data; name=\"ok\"\r\n\r\n1\r\n"));
    }

    #[test]
    fn test_json_body_sent_verbatim() {
        let request = parse_request("PUT https://x {\"a\": [1, 2]}").unwrap();
        let wire = build_wire_request(&request).unwrap();
        assert_eq!(wire.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(wire.body().as_slice(), b"{\"a\": [1, 2]}");
    }

    #[test]
    fn test_json_body_keeps_explicit_content_type() {
        let request = parse_request("POST https://x Content-Type=:application/vnd.api+json {}").unwrap();
        let wire = build_wire_request(&request).unwrap();
        assert_eq!(wire.headers()[CONTENT_TYPE], "application/vnd.api+json");
    }
}
