//! Relay of forward-path requests to the analytics host.
//!
//! # Responsibilities
//! - Rebuild the request against `{umamiHost}{remainder}?{query}`
//! - Relay method, headers and body; relay status, headers and body back
//! - Map transport failures to an error response for the client
//!
//! # Design Decisions
//! - No retries: this path is the analytics delivery channel itself
//! - Redirects are relayed, not followed
//! - Hop-by-hop headers are stripped in both directions

use std::net::IpAddr;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use thiserror::Error;
use url::Url;

use crate::observability::metrics;
use crate::security::headers::{append_forwarded_for, strip_hop_by_hop};

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request body could not be read: {0}")]
    Body(axum::Error),
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream request timed out")]
    Timeout,
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = match self {
            ForwardError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_GATEWAY,
        };
        (status, "Analytics upstream request failed").into_response()
    }
}

#[derive(Debug, Clone)]
pub struct ForwardingGateway {
    client: reqwest::Client,
    /// Base URL without trailing slash.
    host: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl ForwardingGateway {
    pub fn new(
        client: reqwest::Client,
        host: &str,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            timeout,
            max_body_bytes,
        }
    }

    /// Upstream URL for a remainder path and optional query.
    pub fn target_url(&self, remainder: &str, query: Option<&str>) -> Result<Url, ForwardError> {
        let mut url = Url::parse(&format!("{}{}", self.host, remainder))?;
        url.set_query(query);
        Ok(url)
    }

    /// Relay `req` to the analytics host at `remainder`.
    ///
    /// `peer` is the connecting address, appended to `X-Forwarded-For`.
    pub async fn forward(
        &self,
        req: Request<Body>,
        remainder: &str,
        peer: Option<IpAddr>,
    ) -> Result<Response, ForwardError> {
        let start = Instant::now();
        let url = self.target_url(remainder, req.uri().query())?;
        let (parts, body) = req.into_parts();

        let body = read_body(body, self.max_body_bytes).await?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        if let Some(ip) = peer {
            append_forwarded_for(&mut headers, ip);
        }

        tracing::debug!(method = %parts.method, url = %url, "Forwarding to analytics host");

        let exchange = async {
            let upstream = self
                .client
                .request(parts.method, url)
                .headers(headers)
                .body(body)
                .send()
                .await?;

            let status = upstream.status();
            let mut headers = upstream.headers().clone();
            strip_hop_by_hop(&mut headers);
            let body = upstream.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, body))
        };

        let (status, headers, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ForwardError::Timeout)??;

        metrics::record_forward(status.as_u16(), start);

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Buffer a request body of at most `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, ForwardError> {
    let mut buf = Vec::new();
    let mut chunks = body.into_data_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(ForwardError::Body)?;
        if buf.len() + chunk.len() > limit {
            return Err(ForwardError::BodyTooLarge(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}
