use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::Stream;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// Response returned by a [`Transport`](crate::Transport).
///
/// The chain core never looks inside it; status and body are for the caller.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: String,
    body: ResponseBody,
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("url", &self.url)
            .field("body", &self.body)
            .finish()
    }
}

enum ResponseBody {
    Buffered(Bytes),
    Streaming(BoxStream<Result<Bytes, ClientError>>),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Buffered(bytes) => {
                f.debug_tuple("ResponseBody::Buffered").field(&bytes.len()).finish()
            }
            ResponseBody::Streaming(_) => write!(f, "ResponseBody::Streaming(..)"),
        }
    }
}

impl Response {
    /// Create a new response from components
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        url: impl Into<String>,
        stream: BoxStream<Result<Bytes, ClientError>>,
    ) -> Self {
        Self {
            status,
            headers,
            url: url.into(),
            body: ResponseBody::Streaming(stream),
        }
    }

    /// Create a response from buffered bytes
    pub fn from_bytes(
        status: StatusCode,
        headers: HeaderMap,
        url: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            headers,
            url: url.into(),
            body: ResponseBody::Buffered(bytes.into()),
        }
    }

    /// Get the HTTP status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// URL the transport reports for this response
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read a streaming body to the end, keeping status and headers.
    ///
    /// # Errors
    /// Propagates the first error yielded by the body stream.
    pub async fn buffered(self) -> Result<Self, ClientError> {
        let Self {
            status,
            headers,
            url,
            body,
        } = self;
        let bytes = read_body(body).await?;
        Ok(Self::from_bytes(status, headers, url, bytes))
    }

    /// Consume the response and return the entire body as bytes
    ///
    /// # Errors
    /// Propagates the first error yielded by the body stream.
    pub async fn bytes(self) -> Result<Bytes, ClientError> {
        read_body(self.body).await
    }

    /// Blocking version of bytes() for sync contexts
    ///
    /// # Errors
    /// Fails when called from inside an async runtime, or when the body
    /// stream yields an error.
    pub fn bytes_blocking(self) -> Result<Bytes, ClientError> {
        match self.body {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            body @ ResponseBody::Streaming(_) => block_on(read_body(body))?,
        }
    }

    /// Consume the response and deserialize as JSON
    ///
    /// # Errors
    /// Returns [`ClientError::Serialization`] if the body is not valid JSON
    /// for `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let bytes = self.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(value)
    }

    /// Blocking version of json() for sync contexts
    ///
    /// # Errors
    /// See [`Response::json`] and [`Response::bytes_blocking`].
    pub fn json_blocking<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let bytes = self.bytes_blocking()?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(value)
    }

    /// Consume the response and return the body as a string
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidResponse`] if the body is not UTF-8.
    pub async fn text(self) -> Result<String, ClientError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ClientError::InvalidResponse(format!("Invalid UTF-8: {e}")))
    }

    /// Blocking version of text() for sync contexts
    ///
    /// # Errors
    /// See [`Response::text`] and [`Response::bytes_blocking`].
    pub fn text_blocking(self) -> Result<String, ClientError> {
        let bytes = self.bytes_blocking()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ClientError::InvalidResponse(format!("Invalid UTF-8: {e}")))
    }

    /// Convert the response into a byte stream for streaming consumption
    #[must_use]
    pub fn into_stream(self) -> BoxStream<Result<Bytes, ClientError>> {
        match self.body {
            ResponseBody::Buffered(bytes) => {
                Box::pin(futures::stream::once(async move { Ok(bytes) }))
            }
            ResponseBody::Streaming(stream) => stream,
        }
    }
}

async fn read_body(body: ResponseBody) -> Result<Bytes, ClientError> {
    match body {
        ResponseBody::Buffered(bytes) => Ok(bytes),
        ResponseBody::Streaming(mut stream) => {
            let mut buf = Vec::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                buf.extend_from_slice(&chunk);
            }
            Ok(Bytes::from(buf))
        }
    }
}

/// Drive `fut` to completion on a temporary current-thread runtime.
///
/// Nesting a runtime inside another panics in tokio, so an existing runtime
/// is reported as an error instead.
pub(crate) fn block_on<F: Future>(fut: F) -> Result<F::Output, ClientError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ClientError::Io(std::io::Error::other(
            "blocking call made from inside an async runtime",
        )));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(fut))
}
