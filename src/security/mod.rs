//! Header hygiene for relayed requests.
//!
//! # Data Flow
//! ```text
//! Relayed request (origin or analytics host):
//!     → headers.rs (drop hop-by-hop, append X-Forwarded-For)
//!     → upstream
//! ```
//!
//! # Design Decisions
//! - Client address comes from X-Forwarded-For, then X-Real-Ip, then the peer

pub mod headers;
