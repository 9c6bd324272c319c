//! Request notation lexer
//!
//! Splits request text into literals and the two parameter markers:
//! `=:` (header) and `=?` (search param). Whitespace separates literals
//! except inside double quotes. Quotes are kept on the literal.

/// Header marker, as in `Accept=:application/json`
pub const HEADER_MARKER: &str = "=:";
/// Search param marker, as in `page=?2`
pub const SEARCH_MARKER: &str = "=?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Literal,
    HeaderMarker,
    SearchMarker,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub literal: String,
    pub kind: TokenKind,
    /// Byte offset of the token in the lexed text
    pub offset: usize,
}

impl Token {
    pub fn is_marker(&self) -> bool {
        self.kind != TokenKind::Literal
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn marker_at(bytes: &[u8], pos: usize) -> Option<TokenKind> {
    let rest = bytes.get(pos..)?;
    if rest.starts_with(HEADER_MARKER.as_bytes()) {
        Some(TokenKind::HeaderMarker)
    } else if rest.starts_with(SEARCH_MARKER.as_bytes()) {
        Some(TokenKind::SearchMarker)
    } else {
        None
    }
}

/// Position right after the quote closing the one at `pos`, or the end of
/// input when it is never closed.
fn skip_quoted(bytes: &[u8], pos: usize) -> usize {
    match bytes[pos + 1..].iter().position(|&b| b == b'"') {
        Some(i) => pos + i + 2,
        None => bytes.len(),
    }
}

fn read_literal(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => pos = skip_quoted(bytes, pos),
            b if is_whitespace(b) => break,
            _ if marker_at(bytes, pos).is_some() => break,
            _ => pos += 1,
        }
    }
    pos
}

/// Tokenize request text. Never fails; empty input gives no tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if is_whitespace(bytes[pos]) {
            pos += 1;
            continue;
        }

        if let Some(kind) = marker_at(bytes, pos) {
            tokens.push(Token {
                literal: input[pos..pos + 2].to_string(),
                kind,
                offset: pos,
            });
            pos += 2;
            continue;
        }

        // Literal boundaries are always ASCII, so slicing stays on char boundaries
        let start = pos;
        pos = read_literal(bytes, pos);
        tokens.push(Token {
            literal: input[start..pos].to_string(),
            kind: TokenKind::Literal,
            offset: start,
        });
    }

    tokens
}
