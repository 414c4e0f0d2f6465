use std::future::IntoFuture;
use std::time::Duration;

use futures::future::BoxFuture;
use http::Method;
use serde::Serialize;

use crate::body::Body;
use crate::config::Auth;
use crate::error::ClientError;
use crate::merge::RequestOptions;
use crate::node::Client;
use crate::response::{Response, block_on};
use crate::segment::Segment;

macro_rules! verbs {
    ($($(#[$doc:meta])* $name:ident => $method:ident),* $(,)?) => {
        impl Client {
            $(
                $(#[$doc])*
                pub fn $name(&self) -> Dispatch {
                    Dispatch::new(self.clone(), Method::$method)
                }
            )*
        }
    };
}

verbs! {
    /// Prepare a `GET` against this node.
    get => GET,
    /// Prepare a `POST` against this node.
    post => POST,
    /// Prepare a `PUT` against this node.
    put => PUT,
    /// Prepare a `DELETE` against this node.
    delete => DELETE,
    /// Prepare a `PATCH` against this node.
    patch => PATCH,
    /// Prepare a `HEAD` against this node.
    head => HEAD,
    /// Prepare an `OPTIONS` against this node.
    options_request => OPTIONS,
}

impl Client {
    /// Prepare a request with an arbitrary method.
    pub fn request(&self, method: Method) -> Dispatch {
        Dispatch::new(self.clone(), method)
    }
}

/// A pending verb call: extra segments plus call-time overrides.
///
/// Nothing is sent until the dispatch is awaited (or [`Dispatch::send`] /
/// [`Dispatch::send_blocking`] is called).
///
/// ```no_run
/// # use restpath::{Client, ClientOptions};
/// # async fn example(client: Client) -> Result<(), restpath::ClientError> {
/// let resp = client
///     .post()
///     .segments(["users", "42"])
///     .header("x-request-id", "abc")
///     .json(&serde_json::json!({"name": "x"}))?
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "a dispatch does nothing until it is awaited or sent"]
pub struct Dispatch {
    node: Client,
    method: Method,
    segments: Vec<Segment>,
    options: RequestOptions,
}

impl Dispatch {
    fn new(node: Client, method: Method) -> Self {
        Self {
            node,
            method,
            segments: Vec::new(),
            options: RequestOptions::default(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Append one extra segment, filtered like any chain value.
    pub fn segment(mut self, value: impl Into<Segment>) -> Self {
        self.segments.push(value.into());
        self
    }

    pub fn segments<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        self.segments.extend(values.into_iter().map(Into::into));
        self
    }

    /// Replace all call-time overrides at once.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options = self.options.header(name, value);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options = self.options.cookie(name, value);
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.options = self.options.auth(auth);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.timeout(timeout);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options = self.options.param(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.options = self.options.body(body);
        self
    }

    /// # Errors
    /// Returns [`ClientError::Serialization`] if the value cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.options = self.options.json(value)?;
        Ok(self)
    }

    /// # Errors
    /// Returns [`ClientError::Serialization`] if the value cannot be encoded.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.options = self.options.form(value)?;
        Ok(self)
    }

    /// Send the request.
    ///
    /// # Errors
    /// See [`Client::dispatch`].
    pub async fn send(self) -> Result<Response, ClientError> {
        self.node
            .dispatch(self.method, self.segments, self.options)
            .await
    }

    /// Send from synchronous code on a temporary runtime. The body is read
    /// before the runtime shuts down.
    ///
    /// # Errors
    /// Fails when called from inside an async runtime; otherwise see
    /// [`Client::dispatch`].
    pub fn send_blocking(self) -> Result<Response, ClientError> {
        block_on(async move { self.send().await?.buffered().await })?
    }
}

impl IntoFuture for Dispatch {
    type Output = Result<Response, ClientError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}
