//! Fluent REST path builder
//!
//! Builds resource URLs by chaining path segments off a root [`Client`] and
//! dispatches HTTP verbs against them through a pluggable [`Transport`].
//!
//! - Every chaining step creates a new immutable node; nodes share their
//!   ancestors and a single session configuration.
//! - Values in the configured ignore set are dropped before nodes are built.
//! - Session headers, cookies and params merge shallowly with per-call
//!   overrides; `auth` and `timeout` are replaced wholesale.
//!
//! # Examples
//!
//! ## Chaining
//!
//! ```no_run
//! use restpath::{Client, ClientOptions, chain};
//!
//! # fn example() -> Result<(), restpath::ClientError> {
//! let client = Client::new("http://localhost:8000", ClientOptions::default())?;
//!
//! let a = chain!(client => sample.path.to.resource)?;
//! let b = client.call(["sample", "path"])?.segment("to")?.segment("resource")?;
//! assert_eq!(a.url(), "http://localhost:8000/sample/path/to/resource");
//! assert_eq!(a, b);
//! # Ok(())
//! # }
//! ```
//!
//! ## Dispatching
//!
//! ```no_run
//! use std::time::Duration;
//! use restpath::{Auth, Client, ClientOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ClientOptions::default()
//!     .header("Accept", "application/json")
//!     .auth(Auth::basic("user", "pass"))
//!     .timeout(Duration::from_secs(10));
//! let client = Client::new("https://api.example.com", options)?;
//!
//! let resp = client
//!     .segment("users")?
//!     .get()
//!     .param("page", "2")
//!     .await?;
//! let users: serde_json::Value = resp.json().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Ignored values
//!
//! ```no_run
//! use restpath::{Client, ClientOptions};
//!
//! # fn example() -> Result<(), restpath::ClientError> {
//! let client = Client::new(
//!     "http://localhost:8000",
//!     ClientOptions::default().ignore(None::<&str>),
//! )?;
//! let version: Option<&str> = None;
//! let node = client.segment("a")?.segment(version)?.segment("b")?;
//! assert_eq!(node.url(), "http://localhost:8000/a/b");
//! # Ok(())
//! # }
//! ```

mod body;
mod config;
mod dispatch;
mod error;
mod merge;
mod node;
mod response;
mod segment;
mod transport;

#[cfg(test)]
mod testing;

// Re-export public API
pub use body::Body;
pub use config::{Auth, ClientOptions, ENV_PREFIX};
pub use dispatch::Dispatch;
pub use error::{BoxError, ClientError};
pub use merge::{EffectiveConfig, RequestOptions, merge};
pub use node::{BASE_URL_ENV, Client, SegmentHook};
pub use response::{BoxStream, Response};
pub use segment::{IgnoreSet, Segment};
pub use transport::{ReqwestTransport, Transport};

// Re-export commonly used types from dependencies
pub use http::{Method, StatusCode};

/// Extend a chain with identifier segments, mirroring attribute access.
///
/// `chain!(client => users.settings)` is `client.segment("users")` followed
/// by `.segment("settings")`, stopping at the first error.
#[macro_export]
macro_rules! chain {
    ($root:expr => $($seg:ident).+) => {{
        let node: ::core::result::Result<$crate::Client, $crate::ClientError> =
            ::core::result::Result::Ok($crate::Client::clone(&$root));
        $(
            let node = node.and_then(|n| n.segment(::core::stringify!($seg)));
        )+
        node
    }};
}
