//! Request notation parser
//!
//! ```text
//! POST https://api.example.com/users Authorization=:"Bearer abc" page=?2 name=John
//! PUT https://api.example.com/users/1 {"name": "John"}
//! ```
//!
//! The first two tokens are the method and the url. After that:
//! `key=:value` is a header, `key=?value` a search param, `key=value` a form
//! field, and a token starting with `{` or `[` begins a raw JSON body that
//! runs to the end of the text. Anything else is ignored.

use serde_json::Value;

use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::models::{HttpMethod, Request};
use crate::template;

/// Parse request text that carries no template data
pub fn parse_request(input: &str) -> Result<Request, ParseError> {
    parse_request_with(input, None)
}

/// Render `input` against `data`, then parse the rendered text
pub fn parse_request_with(input: &str, data: Option<&Value>) -> Result<Request, ParseError> {
    let raw = template::render(input, data).map_err(|source| ParseError::TemplateRender {
        text: input.to_string(),
        source,
    })?;
    let tokens = tokenize(&raw);
    parse_tokens(&raw, &tokens)
}

/// Build a request from the tokens of `raw`.
///
/// Only a missing or invalid method/url is an error. Stray parameter tokens
/// are skipped.
pub fn parse_tokens(raw: &str, tokens: &[Token]) -> Result<Request, ParseError> {
    if tokens.len() < 2 {
        return Err(ParseError::MissingMethodOrUrl);
    }

    let method: HttpMethod = tokens[0].literal.parse()?;
    let mut request = Request::new(method, tokens[1].literal.clone());
    request.raw = raw.to_string();

    let params = &tokens[2..];
    let mut i = 0;
    while i < params.len() {
        let token = &params[i];
        if token.is_marker() {
            i += 1;
            continue;
        }

        if token.literal.starts_with('{') || token.literal.starts_with('[') {
            request.json_body = Some(raw[token.offset..].to_string());
            break;
        }

        if let (Some(marker), Some(value)) = (params.get(i + 1), params.get(i + 2)) {
            if marker.is_marker() && !value.is_marker() {
                let target = match marker.kind {
                    TokenKind::HeaderMarker => &mut request.headers,
                    _ => &mut request.search_params,
                };
                target.insert(token.literal.clone(), strip_quotes(&value.literal).to_string());
                i += 3;
                continue;
            }
        }

        if let Some((key, value)) = token.literal.split_once('=') {
            if !key.is_empty() {
                request
                    .form_fields
                    .insert(key.to_string(), strip_quotes(value).to_string());
            }
        }
        i += 1;
    }

    tracing::debug!(
        method = %request.method,
        url = %request.url,
        headers = request.headers.len(),
        search_params = request.search_params.len(),
        form_fields = request.form_fields.len(),
        json_body = request.json_body.is_some(),
        "Parsed request"
    );

    Ok(request)
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
