use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use http::{HeaderName, HeaderValue};
use serde::Deserialize;

use crate::error::ClientError;
use crate::merge::{EffectiveConfig, RequestOptions};
use crate::node::SegmentHook;
use crate::segment::{IgnoreSet, Segment};

/// Prefix of environment variables read by [`ClientOptions::load`].
pub const ENV_PREFIX: &str = "RESTPATH_";

/// Credentials attached to every request of a session.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer(String),
}

impl Auth {
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(token.into())
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Auth::Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Auth::Bearer(_) => f.write_str("Auth::Bearer(<redacted>)"),
        }
    }
}

/// Session-level configuration shared by every node descended from one root.
///
/// Setters only record values. Shape and content are checked when the options
/// are handed to [`Client::new`](crate::Client::new), so a bad header fails at
/// construction rather than on the first request.
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub auth: Option<Auth>,
    pub timeout: Option<Duration>,
    pub params: BTreeMap<String, String>,
    pub ignore: IgnoreSet,
    pub append_slash: bool,
    pub(crate) segment_hook: Option<Arc<dyn SegmentHook>>,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("headers", &self.headers)
            .field("cookies", &self.cookies)
            .field("auth", &self.auth)
            .field("timeout", &self.timeout)
            .field("params", &self.params)
            .field("ignore", &self.ignore)
            .field("append_slash", &self.append_slash)
            .field("segment_hook", &self.segment_hook.is_some())
            .finish()
    }
}

impl ClientOptions {
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
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

    /// Add a value to the ignore set.
    #[must_use]
    pub fn ignore(mut self, value: impl Into<Segment>) -> Self {
        self.ignore.insert(value);
        self
    }

    #[must_use]
    pub fn append_slash(mut self, append_slash: bool) -> Self {
        self.append_slash = append_slash;
        self
    }

    /// Install a hook invoked once for every node the chain creates.
    #[must_use]
    pub fn with_segment_hook(mut self, hook: impl SegmentHook + 'static) -> Self {
        self.segment_hook = Some(Arc::new(hook));
        self
    }

    /// Merge these session defaults with call-time overrides.
    #[must_use]
    pub fn merge(&self, call: RequestOptions) -> EffectiveConfig {
        crate::merge::merge(self, call)
    }

    /// Build options from a dynamic document such as parsed JSON or YAML.
    ///
    /// Recognised keys: `headers`, `cookies`, `auth`, `timeout`, `params`,
    /// `ignore`, `append_slash`. Unknown keys are rejected.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidConfig`] when the document does not have
    /// the expected shape, e.g. `headers` is not a mapping.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ClientError> {
        let raw: RawOptions = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        raw.into_options()
    }

    /// Load options from an optional YAML file layered under
    /// `RESTPATH_`-prefixed environment variables.
    ///
    /// `RESTPATH_BASE_URL` is not an option and is skipped here.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidConfig`] if a source cannot be read or
    /// holds malformed values.
    pub fn load(file: Option<&Path>) -> Result<Self, ClientError> {
        let mut figment = Figment::new();
        if let Some(path) = file {
            figment = figment.merge(Yaml::file(path));
        }
        let raw: RawOptions = figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["base_url"]))
            .extract()?;
        raw.into_options()
    }

    /// Check header and cookie shapes and lowercase header names so that
    /// session and call-time headers override each other case-insensitively.
    pub(crate) fn validated(mut self) -> Result<Self, ClientError> {
        let mut headers = BTreeMap::new();
        for (name, value) in self.headers {
            let parsed = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ClientError::InvalidConfig(format!("invalid header name {name:?}: {e}"))
            })?;
            HeaderValue::from_str(&value).map_err(|e| {
                ClientError::InvalidConfig(format!("invalid value for header {name:?}: {e}"))
            })?;
            headers.insert(parsed.as_str().to_owned(), value);
        }
        self.headers = headers;

        for (name, value) in &self.cookies {
            check_cookie(name, value)?;
        }
        Ok(self)
    }
}

/// Cookies are joined into one `Cookie` header, so names must not contain
/// separators and values must not contain `;`.
pub(crate) fn check_cookie(name: &str, value: &str) -> Result<(), ClientError> {
    if name.is_empty() || name.contains(['=', ';', ' ']) {
        return Err(ClientError::InvalidConfig(format!(
            "invalid cookie name {name:?}"
        )));
    }
    if value.contains(';') {
        return Err(ClientError::InvalidConfig(format!(
            "invalid value for cookie {name:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawOptions {
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    auth: Option<RawAuth>,
    timeout: Option<RawTimeout>,
    params: BTreeMap<String, String>,
    ignore: Vec<serde_json::Value>,
    append_slash: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAuth {
    Basic(String, String),
    Bearer { bearer: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Seconds(f64),
    Human(String),
}

impl RawTimeout {
    fn into_duration(self) -> Result<Duration, ClientError> {
        match self {
            RawTimeout::Seconds(secs) => Duration::try_from_secs_f64(secs)
                .map_err(|e| ClientError::InvalidConfig(format!("invalid timeout {secs}: {e}"))),
            RawTimeout::Human(text) => humantime::parse_duration(&text)
                .map_err(|e| ClientError::InvalidConfig(format!("invalid timeout {text:?}: {e}"))),
        }
    }
}

impl RawOptions {
    fn into_options(self) -> Result<ClientOptions, ClientError> {
        let mut ignore = IgnoreSet::new();
        for value in &self.ignore {
            let segment = Segment::from_json(value).ok_or_else(|| {
                ClientError::InvalidConfig(format!("ignore entry {value} is not a scalar"))
            })?;
            ignore.insert(segment);
        }

        let auth = self.auth.map(|raw| match raw {
            RawAuth::Basic(username, password) => Auth::basic(username, password),
            RawAuth::Bearer { bearer } => Auth::bearer(bearer),
        });

        Ok(ClientOptions {
            headers: self.headers,
            cookies: self.cookies,
            auth,
            timeout: self.timeout.map(RawTimeout::into_duration).transpose()?,
            params: self.params,
            ignore,
            append_slash: self.append_slash,
            segment_hook: None,
        })
    }
}
