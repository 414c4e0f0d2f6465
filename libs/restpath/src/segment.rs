use std::collections::HashSet;
use std::fmt;

use crate::error::ClientError;

/// A proposed path segment value.
///
/// Values are compared against the configured ignore set before they are
/// turned into path components, so `Null` can be filtered out like any other
/// value. A `Null` that survives filtering is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
}

impl Segment {
    /// Coerce the value into a path component.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidSegment`] for `Null` and for empty text.
    pub fn to_component(&self) -> Result<String, ClientError> {
        match self {
            Segment::Null => Err(ClientError::invalid_segment(
                "null",
                "an absent value has no path representation",
            )),
            Segment::Text(s) if s.is_empty() => Err(ClientError::invalid_segment(
                "\"\"",
                "empty segments produce a malformed path",
            )),
            Segment::Text(s) => Ok(s.clone()),
            Segment::Int(n) => Ok(n.to_string()),
            Segment::Bool(b) => Ok(b.to_string()),
        }
    }

    /// Convert a JSON scalar into a segment. Arrays, objects and non-integer
    /// numbers have no segment form.
    pub(crate) fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Segment::Null),
            serde_json::Value::Bool(b) => Some(Segment::Bool(*b)),
            serde_json::Value::String(s) => Some(Segment::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(Segment::Int),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Null => f.write_str("null"),
            Segment::Text(s) => f.write_str(s),
            Segment::Int(n) => write!(f, "{n}"),
            Segment::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Text(s.to_owned())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Text(s)
    }
}

impl From<&String> for Segment {
    fn from(s: &String) -> Self {
        Segment::Text(s.clone())
    }
}

impl From<bool> for Segment {
    fn from(b: bool) -> Self {
        Segment::Bool(b)
    }
}

macro_rules! int_segment {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Segment {
                fn from(n: $t) -> Self {
                    Segment::Int(i64::from(n))
                }
            }
        )*
    };
}

int_segment!(i8, i16, i32, i64, u8, u16, u32);

// Wider integers keep the numeric form when it fits and fall back to text.
macro_rules! wide_int_segment {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Segment {
                fn from(n: $t) -> Self {
                    i64::try_from(n).map_or_else(|_| Segment::Text(n.to_string()), Segment::Int)
                }
            }
        )*
    };
}

wide_int_segment!(u64, usize, isize, i128, u128);

impl From<f32> for Segment {
    fn from(n: f32) -> Self {
        Segment::Text(n.to_string())
    }
}

impl From<f64> for Segment {
    fn from(n: f64) -> Self {
        Segment::Text(n.to_string())
    }
}

impl<T: Into<Segment>> From<Option<T>> for Segment {
    fn from(value: Option<T>) -> Self {
        value.map_or(Segment::Null, Into::into)
    }
}

/// Values that are dropped instead of becoming chain nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet(HashSet<Segment>);

impl IgnoreSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: impl Into<Segment>) {
        self.0.insert(value.into());
    }

    #[must_use]
    pub fn contains(&self, value: &Segment) -> bool {
        self.0.contains(value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Drop ignored values and coerce the rest, preserving order.
    ///
    /// Filtering happens before coercion so an ignored `Null` never errors.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidSegment`] for the first surviving value
    /// that cannot be coerced.
    pub fn filter<I>(&self, values: I) -> Result<Vec<String>, ClientError>
    where
        I: IntoIterator<Item = Segment>,
    {
        values
            .into_iter()
            .filter(|v| !self.contains(v))
            .map(|v| v.to_component())
            .collect()
    }
}

impl<S: Into<Segment>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
