use std::fmt;
use std::io::Write;

use crate::http::headers::Headers;
use crate::http::writer::{ResponseWriter, WriterError};

/// HTTP status codes.
///
/// Only a handful of codes carry a reason phrase; any other code is written
/// with an empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
    /// Any other code, written without a reason phrase
    Other(u16),
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use rawhttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Other(404).as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
            StatusCode::Other(code) => *code,
        }
    }

    /// Returns the reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use rawhttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    /// assert_eq!(StatusCode::Other(418).reason_phrase(), "");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::Other(_) => "",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            400 => StatusCode::BadRequest,
            500 => StatusCode::InternalServerError,
            other => StatusCode::Other(other),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Headers every response starts with: the body length, a plain-text content
/// type, and `Connection: close` since connections are never reused.
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.replace("Content-Length", content_length.to_string());
    headers.replace("Content-Type", "text/plain");
    headers.replace("Connection", "close");
    headers
}

/// A complete response, written in one go through a [`ResponseWriter`].
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    /// A response with default headers sized to `body`.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status).body(body).build()
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::Ok, body)
    }

    pub fn bad_request(message: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    pub fn internal_error() -> Self {
        Self::new(StatusCode::InternalServerError, "500 Internal Server Error")
    }

    /// Drives `w` through status line, headers and body.
    pub fn write_to<W: Write>(&self, w: &mut ResponseWriter<W>) -> Result<(), WriterError> {
        w.write_status_line(self.status)?;
        w.write_headers(&self.headers)?;
        w.write_body(&self.body)
    }

    /// Serializes the response into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WriterError> {
        let mut w = ResponseWriter::new(Vec::new());
        self.write_to(&mut w)?;
        Ok(w.into_inner())
    }
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use rawhttp::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body("<h1>hi</h1>")
///     .build();
/// assert_eq!(response.headers.get("content-length"), Some("11"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    overrides: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            overrides: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Sets a header, replacing the default of the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Starts from [`default_headers`] for the body length and applies
    /// overrides on top.
    pub fn build(self) -> Response {
        let mut headers = default_headers(self.body.len());
        for (key, value) in self.overrides {
            headers.replace(&key, value);
        }

        Response {
            status: self.status,
            headers,
            body: self.body,
        }
    }
}
