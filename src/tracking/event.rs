//! Synthetic pageview events.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::ConnectInfo,
    http::{header, Request},
};
use serde::Serialize;

use crate::routing::matcher::request_host;
use crate::security::headers::client_ip;

/// Request facts captured before the request is handed to the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub hostname: String,
    /// Path plus query.
    pub url: String,
    pub referrer: String,
    pub language: String,
    pub user_agent: Option<String>,
    pub client_ip: Option<IpAddr>,
}

impl PageView {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        let text = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Self {
            hostname: request_host(req).unwrap_or_default(),
            url: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            referrer: text(header::REFERER).unwrap_or_default(),
            language: text(header::ACCEPT_LANGUAGE)
                .as_deref()
                .map(primary_language)
                .unwrap_or_default(),
            user_agent: text(header::USER_AGENT),
            client_ip: client_ip(headers, peer),
        }
    }
}

/// First language tag of an `Accept-Language` value.
fn primary_language(value: &str) -> String {
    value
        .split(',')
        .next()
        .and_then(|tag| tag.split(';').next())
        .map(|tag| tag.trim().to_string())
        .unwrap_or_default()
}

/// Body of `POST /api/send` on the analytics host.
#[derive(Debug, Serialize)]
pub struct TrackingEvent<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: Payload<'a>,
}

#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    pub website: &'a str,
    pub hostname: &'a str,
    pub url: &'a str,
    pub referrer: &'a str,
    pub language: &'a str,
    pub title: &'a str,
    pub screen: &'a str,
}

impl<'a> TrackingEvent<'a> {
    pub fn pageview(website: &'a str, view: &'a PageView) -> Self {
        Self {
            kind: "event",
            payload: Payload {
                website,
                hostname: &view.hostname,
                url: &view.url,
                referrer: &view.referrer,
                language: &view.language,
                title: "",
                screen: "",
            },
        }
    }
}
