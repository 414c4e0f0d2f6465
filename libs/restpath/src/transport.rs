use async_trait::async_trait;
use futures::TryStreamExt;
use http::Method;
use http::header::COOKIE;

use crate::body::Body;
use crate::config::Auth;
use crate::error::ClientError;
use crate::merge::EffectiveConfig;
use crate::response::Response;

/// The HTTP capability a [`Client`](crate::Client) dispatches through.
///
/// Implementations own connection handling, TLS and retries. Whatever they
/// return, success or error, reaches the caller unchanged.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        url: &str,
        options: EffectiveConfig,
    ) -> Result<Response, ClientError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    /// Returns [`ClientError::Reqwest`] if the underlying client cannot be
    /// initialised (e.g. TLS backend failure).
    pub fn new() -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self { http_client })
    }

    /// Wrap a preconfigured `reqwest` client.
    #[must_use]
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        options: EffectiveConfig,
    ) -> Result<Response, ClientError> {
        let mut req_builder = self.http_client.request(method.clone(), url);

        for (name, value) in &options.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = options.cookie_header() {
            req_builder = req_builder.header(COOKIE, cookie);
        }

        req_builder = match &options.auth {
            Some(Auth::Basic { username, password }) => {
                req_builder.basic_auth(username, password.as_deref())
            }
            Some(Auth::Bearer(token)) => req_builder.bearer_auth(token),
            None => req_builder,
        };

        if let Some(timeout) = options.timeout {
            req_builder = req_builder.timeout(timeout);
        }
        if !options.params.is_empty() {
            req_builder = req_builder.query(&options.params);
        }

        req_builder = match options.body {
            Body::Empty => req_builder,
            Body::Bytes(bytes) => req_builder.body(bytes),
        };

        tracing::debug!(%method, url, "sending request");
        let resp = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else if e.is_connect() {
                ClientError::Connection(e.to_string())
            } else {
                ClientError::Reqwest(e)
            }
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let final_url = resp.url().to_string();
        tracing::debug!(%method, url, status = status.as_u16(), "received response");

        let stream = resp
            .bytes_stream()
            .map_err(|e| ClientError::Io(std::io::Error::other(e)));

        Ok(Response::new(status, headers, final_url, Box::pin(stream)))
    }
}
