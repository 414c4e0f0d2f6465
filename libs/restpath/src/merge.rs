//! Session and call-time option merging.
//!
//! Mapping options (`headers`, `cookies`, `params`) are merged shallowly with
//! call-time entries winning. Scalar options (`auth`, `timeout`) are replaced
//! wholesale when given at call time. The session side is only ever read.

use std::collections::BTreeMap;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use serde::Serialize;

use crate::body::Body;
use crate::config::{Auth, ClientOptions, check_cookie};
use crate::error::ClientError;

/// Per-call overrides for a single dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub auth: Option<Auth>,
    pub timeout: Option<Duration>,
    pub params: BTreeMap<String, String>,
    pub body: Body,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header. Names are stored lowercased so the last write wins
    /// regardless of case.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut name = name.into();
        name.make_ascii_lowercase();
        self.headers.insert(name, value.into());
        self
    }

    #[must_use]
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Reject cookies that would split or corrupt the `Cookie` header.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidConfig`] naming the first bad cookie.
    pub fn validate(&self) -> Result<(), ClientError> {
        self.cookies
            .iter()
            .try_for_each(|(name, value)| check_cookie(name, value))
    }

    /// Set a JSON body and the matching `content-type`.
    ///
    /// # Errors
    /// Returns [`ClientError::Serialization`] if the value cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = Body::from_json(value)?;
        self.headers
            .insert(CONTENT_TYPE.as_str().to_owned(), "application/json".to_owned());
        Ok(self)
    }

    /// Set a form-encoded body and the matching `content-type`.
    ///
    /// # Errors
    /// Returns [`ClientError::Serialization`] if the value cannot be encoded.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = Body::from_form(value)?;
        self.headers.insert(
            CONTENT_TYPE.as_str().to_owned(),
            "application/x-www-form-urlencoded".to_owned(),
        );
        Ok(self)
    }
}

/// The transient configuration handed to the transport for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub auth: Option<Auth>,
    pub timeout: Option<Duration>,
    pub params: BTreeMap<String, String>,
    pub body: Body,
}

impl EffectiveConfig {
    /// Render cookies as a single `Cookie` header value.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }
}

/// Combine session defaults with call-time overrides into a fresh value.
///
/// Call-time cookies are not checked here; see [`RequestOptions::validate`].
#[must_use]
pub fn merge(session: &ClientOptions, call: RequestOptions) -> EffectiveConfig {
    let mut headers = session.headers.clone();
    headers.extend(
        call.headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value)),
    );

    let mut cookies = session.cookies.clone();
    cookies.extend(call.cookies);

    let mut params = session.params.clone();
    params.extend(call.params);

    EffectiveConfig {
        headers,
        cookies,
        auth: call.auth.or_else(|| session.auth.clone()),
        timeout: call.timeout.or(session.timeout),
        params,
        body: call.body,
    }
}
