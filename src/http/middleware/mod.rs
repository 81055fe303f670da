//! Request middleware.

pub mod umami;

pub use umami::umami_middleware;
