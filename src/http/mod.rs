//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID)
//!     → middleware/umami.rs (analytics edge)
//!     → server.rs origin handler (relay to origin)
//!     → response.rs (buffering when the body is rewritten)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::{CaptureError, ResponseCapture};
pub use server::HttpServer;
