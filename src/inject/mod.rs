//! Client-side tracker injection.
//!
//! # Data Flow
//! ```text
//! Settings ──(startup)──▶ script.rs (render snippet once)
//!
//! GET origin response
//!     → orchestrator.rs (eligibility: 2xx + text/html)
//!     → http::response (buffer body)
//!     → splice.rs (insert before first </head>)
//!     → flush with recomputed Content-Length
//! ```

pub mod orchestrator;
pub mod script;
pub mod splice;

pub use orchestrator::{InjectionOutcome, Injector};
pub use script::{render_script, ScriptError};
pub use splice::{splice, HEAD_CLOSE};
