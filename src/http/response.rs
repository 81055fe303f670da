//! Response buffering for body rewriting.
//!
//! # Responsibilities
//! - Hold an origin response (status, headers, body) in memory
//! - Let the injector inspect and replace the complete body
//! - Emit the final response once, with a recomputed Content-Length
//!
//! # Design Decisions
//! - Status is recorded once; later writes are ignored
//! - Missing status means 200 OK
//! - `flush` consumes the capture, so a second flush cannot compile
//! - Bodies over the limit, or failing mid-read, are replayed as the origin
//!   sent them rather than truncated or replaced

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CONTENT_LENGTH, TRANSFER_ENCODING},
        response::Parts,
        Extensions, HeaderMap, HeaderValue, StatusCode, Version,
    },
    response::Response,
};
use futures_util::{stream, StreamExt};

/// Why a response could not be captured.
pub enum CaptureError {
    /// Body exceeded the limit. Carries the origin response, reassembled
    /// from the bytes already read and the unread remainder.
    Overflow(Response),
    /// Body stream failed mid-read. Carries the origin response, replaying
    /// the bytes already read and then the same failure.
    Body { reason: String, response: Response },
}

/// A buffered stand-in for the client connection.
pub struct ResponseCapture {
    status: Option<StatusCode>,
    version: Version,
    headers: HeaderMap,
    extensions: Extensions,
    body: Vec<u8>,
}

impl Default for ResponseCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCapture {
    pub fn new() -> Self {
        Self {
            status: None,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            extensions: Extensions::new(),
            body: Vec::new(),
        }
    }

    fn from_parts(parts: Parts) -> Self {
        let mut capture = Self {
            status: None,
            version: parts.version,
            headers: parts.headers,
            extensions: parts.extensions,
            body: Vec::new(),
        };
        capture.write_header(parts.status);
        capture
    }

    /// Drain an origin response into a capture, reading at most `limit` bytes.
    pub async fn capture(response: Response, limit: usize) -> Result<Self, CaptureError> {
        let (parts, body) = response.into_parts();
        let mut capture = Self::from_parts(parts);
        let mut chunks = body.into_data_stream();

        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let reason = e.to_string();
                    let head = Bytes::from(std::mem::take(&mut capture.body));
                    let replay = stream::iter([Ok::<Bytes, axum::Error>(head), Err(e)]);
                    return Err(CaptureError::Body {
                        reason,
                        response: capture.into_response(Body::from_stream(replay)),
                    });
                }
            };
            if capture.body.len() + chunk.len() > limit {
                let head = Bytes::from(std::mem::take(&mut capture.body));
                let replay = stream::iter([Ok::<Bytes, axum::Error>(head), Ok(chunk)]).chain(chunks);
                return Err(CaptureError::Overflow(
                    capture.into_response(Body::from_stream(replay)),
                ));
            }
            capture.write(&chunk);
        }

        Ok(capture)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Record the status. Only the first call has any effect.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// Append to the buffered body. Nothing reaches the client yet.
    pub fn write(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    /// Recorded status, or 200 if none was written.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn replace_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Emit the buffered response: status, headers, then body.
    pub fn flush(mut self) -> Response {
        let body = std::mem::take(&mut self.body);
        self.headers.remove(TRANSFER_ENCODING);
        self.headers
            .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        self.into_response(Body::from(body))
    }

    fn into_response(self, body: Body) -> Response {
        let mut response = Response::new(body);
        *response.status_mut() = self.status();
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers;
        *response.extensions_mut() = self.extensions;
        response
    }
}
