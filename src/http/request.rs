use std::fmt;
use std::str::FromStr;

use crate::http::headers::{CRLF, Headers, find_crlf};
use crate::http::parser::{IncompleteKind, ParseError};

/// HTTP request methods accepted by the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    #[default]
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    /// Parses a method token. Methods are case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use rawhttp::http::request::Method;
    /// assert_eq!("GET".parse::<Method>().unwrap(), Method::GET);
    /// assert!("get".parse::<Method>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ParseError::MethodNotUppercase(s.to_string()));
        }

        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first line of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// The request target (e.g., "/index.html")
    pub target: String,
    /// Protocol version without the `HTTP/` prefix. Always "1.1".
    pub version: String,
}

impl RequestLine {
    /// Non-UTF-8 bytes become replacement characters. They can only
    /// survive in the target; method and version checks reject them.
    fn parse(line: &[u8]) -> Result<Self, ParseError> {
        let line = String::from_utf8_lossy(line);

        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ParseError::RequestLineParts(parts.len()));
        };

        let method = method.parse::<Method>()?;

        if target.is_empty() {
            return Err(ParseError::EmptyTarget);
        }

        let version = match version.split_once('/') {
            Some(("HTTP", "1.1")) => "1.1",
            Some(("HTTP", v)) if !v.contains('/') => {
                return Err(ParseError::UnsupportedVersion(version.to_string()));
            }
            _ => return Err(ParseError::MalformedVersion(version.to_string())),
        };

        Ok(Self {
            method,
            target: target.to_string(),
            version: version.to_string(),
        })
    }
}

/// Progress of a request through the parser. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Start,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// A request, complete once its state reaches [`ParseState::Done`].
///
/// `line` holds defaults until the request line has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
    state: ParseState,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            line: RequestLine::default(),
            headers: Headers::new(),
            body: Vec::new(),
            state: ParseState::Start,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    pub fn method(&self) -> Method {
        self.line.method
    }

    pub fn target(&self) -> &str {
        &self.line.target
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The declared body length. `None` when the header is absent or empty.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        match self.headers.get("content-length") {
            None | Some("") => Ok(None),
            Some(v) => v
                .parse::<usize>()
                .map(Some)
                .map_err(|_| ParseError::InvalidContentLength(v.to_string())),
        }
    }

    /// Feeds bytes to the state machine, stepping until the request is done
    /// or a step consumes nothing. Returns the number of bytes consumed; the
    /// caller must present the rest again together with newly read bytes.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Err(ParseError::AfterDone);
        }

        let mut total = 0;
        while !self.is_done() {
            let n = self.step(&data[total..])?;
            total += n;
            if n == 0 {
                break;
            }
        }

        Ok(total)
    }

    fn step(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Start => self.parse_request_line(data),
            ParseState::ParsingHeaders => self.parse_headers(data),
            ParseState::ParsingBody => self.parse_body(data),
            ParseState::Done => Err(ParseError::AfterDone),
        }
    }

    fn parse_request_line(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(idx) = find_crlf(data) else {
            return Ok(0);
        };

        self.line = RequestLine::parse(&data[..idx])?;
        self.state = ParseState::ParsingHeaders;

        Ok(idx + CRLF.len())
    }

    fn parse_headers(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut total = 0;

        while total < data.len() {
            let (n, done) = self.headers.parse(&data[total..])?;
            total += n;

            if done {
                self.state = match self.content_length()? {
                    Some(len) if len > 0 => ParseState::ParsingBody,
                    _ => ParseState::Done,
                };
                break;
            }

            if n == 0 {
                break;
            }
        }

        Ok(total)
    }

    /// Without `Content-Length` there is no body; chunked encoding is not
    /// supported.
    fn parse_body(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(declared) = self.content_length()? else {
            self.state = ParseState::Done;
            return Ok(0);
        };

        self.body.extend_from_slice(data);

        if self.body.len() > declared {
            return Err(ParseError::BodyTooLarge {
                received: self.body.len(),
                declared,
            });
        }

        if self.body.len() == declared {
            self.state = ParseState::Done;
        }

        Ok(data.len())
    }

    pub(crate) fn incomplete_kind(&self) -> IncompleteKind {
        match self.state {
            ParseState::ParsingBody => IncompleteKind::Body {
                received: self.body.len(),
                declared: self.content_length().ok().flatten().unwrap_or(0),
            },
            _ => IncompleteKind::Head,
        }
    }
}

/// Builder for constructing completed Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.set(key, value);
        self
    }

    /// Sets the body and a matching `Content-Length`.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.headers
            .replace("content-length", self.body.len().to_string());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let target = self.target.ok_or("target missing")?;
        if target.is_empty() {
            return Err("target empty");
        }

        Ok(Request {
            line: RequestLine {
                method: self.method.ok_or("method missing")?,
                target,
                version: "1.1".to_string(),
            },
            headers: self.headers,
            body: self.body,
            state: ParseState::Done,
        })
    }
}
