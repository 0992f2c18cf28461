const HTML_HEADER: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n";

const JSON_HEADER: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n";

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n";

/// A complete response; the connection is always closed after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Html(String),
    Json(String),
    NotFound,
}

impl Response {
    pub fn status_code(&self) -> u16 {
        match self {
            Response::Html(_) | Response::Json(_) => 200,
            Response::NotFound => 404,
        }
    }

    /// Status line, headers and body as sent on the wire
    pub fn to_bytes(&self) -> Vec<u8> {
        let (header, body) = match self {
            Response::Html(body) => (HTML_HEADER, body.as_str()),
            Response::Json(body) => (JSON_HEADER, body.as_str()),
            Response::NotFound => (NOT_FOUND, ""),
        };

        let mut bytes = Vec::with_capacity(header.len() + body.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }
}
