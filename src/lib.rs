//! `courier` is a composable HTTP client: an onion of middleware around a
//! pluggable transport, a fixed-delay retry engine above the pipeline,
//! and a fluent per-request builder seeded from client-wide defaults.
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn demo() -> courier::Result<()> {
//! use std::time::Duration;
//!
//! use courier::Client;
//! use courier::plugins::{json_decode, logger};
//!
//! let client = Client::builder()
//!     .user_agent("my-service/1.2.0")
//!     .with(logger())
//!     .with(json_decode())
//!     .retries(2)
//!     .retry_delay(Duration::from_millis(250))
//!     .build();
//!
//! let profile = client
//!     .get("https://api.example.com/v1/profile")
//!     .query_pair("expand", "teams")
//!     .timeout(Duration::from_secs(3))
//!     .as_response()
//!     .await?;
//!
//! println!("{} after {} retries", profile.status(), profile.retries().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Retry classification
//!
//! The retry engine re-attempts a call only when the composed chain
//! rejects with a transport timeout or with an error carrying a status
//! of 500 or above. Raw responses are never classified: a 500 response
//! that no middleware converts into an error counts as success. Clients
//! that want status-driven retries install a middleware that raises
//! [`Error::http_status`] from the response, and set a retry budget.

mod client;
mod context;
mod error;
mod middleware;
pub mod plugins;
mod request;
mod response;
mod retry;
mod transport;
mod util;

pub use crate::client::{Client, ClientBuilder};
pub use crate::context::{Attempt, Body, Context, RequestParts, ResponseParts};
pub use crate::error::{Error, ErrorCode};
pub use crate::middleware::{BoxFuture, Middleware, Next};
pub use crate::request::RequestBuilder;
pub use crate::response::Response;
pub use crate::retry::RetryPolicy;
pub use crate::transport::{HyperTransport, Transport};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{Body, Client, Context, Error, ErrorCode, Response, Result, RetryPolicy};
}
