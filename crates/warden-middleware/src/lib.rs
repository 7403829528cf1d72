//! # Warden Middleware
//!
//! The request pipeline that puts the authorization engine in front of a
//! handler.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → Authentication → Permissions → Authorization → Handler
//!                               │               │
//!                               ▼               ▼
//!                        403 ACCESS_DENIED   403 AUTHORIZATION_DENIED
//! ```
//!
//! | Stage | Middleware | Purpose |
//! |-------|------------|---------|
//! | 1 | Authentication | Install the principal from trusted upstream claims |
//! | 2 | Permissions | Attach the subject's permissions (fail-closed) |
//! | 3 | Authorization | Evaluate the operation's AND/OR requirement |
//!
//! Each request gets its own [`MiddlewareContext`]; nothing mutable is
//! shared between requests.
//!
//! ## Example
//!
//! ```
//! use warden_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 3);
//! assert_eq!(stages[1].name(), "permissions");
//! ```

#![doc(html_root_url = "https://docs.rs/warden-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use types::{Request, Response, ResponseExt};
