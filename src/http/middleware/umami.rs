//! Analytics edge middleware.
//! Puts `UmamiPlugin` in front of whatever handler follows it.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::plugin::UmamiPlugin;

pub async fn umami_middleware(
    State(plugin): State<UmamiPlugin>,
    req: Request<Body>,
    next: Next,
) -> Response {
    plugin.handle(req, next).await
}
