use bytes::Bytes;
use serde::Serialize;

use crate::error::ClientError;

/// Request body passed through to the transport untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    /// Empty body
    #[default]
    Empty,
    /// Buffered bytes
    Bytes(Bytes),
}

impl Body {
    /// Create an empty body
    #[must_use]
    pub fn empty() -> Self {
        Body::Empty
    }

    /// Create a body from bytes
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Body::Bytes(bytes.into())
    }

    /// Create a body from a JSON-serializable value
    ///
    /// # Errors
    /// Returns [`ClientError::Serialization`] if the value cannot be encoded.
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ClientError> {
        let json = serde_json::to_vec(value)?;
        Ok(Body::Bytes(Bytes::from(json)))
    }

    /// Create an `application/x-www-form-urlencoded` body
    ///
    /// # Errors
    /// Returns [`ClientError::Serialization`] if the value is not a flat
    /// sequence of key/value pairs.
    pub fn from_form<T: Serialize + ?Sized>(value: &T) -> Result<Self, ClientError> {
        let encoded = serde_urlencoded::to_string(value)?;
        Ok(Body::Bytes(Bytes::from(encoded)))
    }

    /// Check if body is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl From<()> for Body {
    fn from((): ()) -> Self {
        Body::Empty
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Bytes(b)
    }
}
