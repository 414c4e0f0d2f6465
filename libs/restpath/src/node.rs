//! Path chain nodes.
//!
//! A [`Client`] is a handle to one immutable node. Every node points at its
//! parent and at the session shared by the whole tree, so extending a chain
//! never copies configuration and never touches existing nodes.

use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::config::ClientOptions;
use crate::error::ClientError;
use crate::merge::{RequestOptions, merge};
use crate::response::Response;
use crate::segment::Segment;
use crate::transport::{ReqwestTransport, Transport};

/// Environment variable read by [`Client::from_env`].
pub const BASE_URL_ENV: &str = "RESTPATH_BASE_URL";

/// Customises segment construction.
///
/// Called exactly once for every node a chain creates, after ignore filtering
/// and coercion. `lineage` holds the segments from the root down to the new
/// node's parent. The returned string becomes the node's segment; an error
/// aborts the whole extension without creating any node.
pub trait SegmentHook: Send + Sync {
    /// # Errors
    /// Implementations return [`ClientError::InvalidSegment`] to reject a
    /// segment.
    fn build(&self, lineage: &[&str], segment: String) -> Result<String, ClientError>;
}

impl<F> SegmentHook for F
where
    F: Fn(&[&str], String) -> Result<String, ClientError> + Send + Sync,
{
    fn build(&self, lineage: &[&str], segment: String) -> Result<String, ClientError> {
        self(lineage, segment)
    }
}

struct Session {
    base_url: String,
    options: ClientOptions,
    transport: Arc<dyn Transport>,
}

struct Node {
    segment: Option<String>,
    parent: Option<Arc<Node>>,
    session: Arc<Session>,
}

/// A node in a REST path chain, usable both as the root client and as any
/// resource below it.
///
/// ```no_run
/// use restpath::{Client, ClientOptions};
///
/// # async fn example() -> Result<(), restpath::ClientError> {
/// let client = Client::new("http://localhost:8000", ClientOptions::default())?;
/// let users = client.segment("users")?.call([42])?;
/// assert_eq!(users.url(), "http://localhost:8000/users/42");
/// let resp = users.get().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    node: Arc<Node>,
}

impl Client {
    /// Create a root node dispatching through [`ReqwestTransport`].
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidConfig`] if `base_url` is not an absolute
    /// URL or the options are malformed.
    pub fn new(base_url: impl AsRef<str>, options: ClientOptions) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(base_url, options, Arc::new(transport))
    }

    /// Create a root node dispatching through a custom transport.
    ///
    /// # Errors
    /// Same as [`Client::new`].
    pub fn with_transport(
        base_url: impl AsRef<str>,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.as_ref();
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("invalid base URL {base_url:?}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "base URL {base_url:?} cannot carry a path"
            )));
        }

        let session = Session {
            base_url: base_url.trim_end_matches('/').to_owned(),
            options: options.validated()?,
            transport,
        };
        Ok(Self {
            node: Arc::new(Node {
                segment: None,
                parent: None,
                session: Arc::new(session),
            }),
        })
    }

    /// Create a root node from `RESTPATH_BASE_URL` and the layered options
    /// of [`ClientOptions::load`].
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidConfig`] if the base URL is unset or
    /// any option is malformed.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|_| ClientError::InvalidConfig(format!("{BASE_URL_ENV} not set")))?;
        Self::new(base_url, ClientOptions::load(None)?)
    }

    /// Extend the chain by one value. The named-access form of chaining.
    ///
    /// # Errors
    /// See [`Client::call`].
    pub fn segment(&self, value: impl Into<Segment>) -> Result<Self, ClientError> {
        self.call([value.into()])
    }

    /// Extend the chain by a linear run of nodes, one per surviving value,
    /// in argument order.
    ///
    /// Values in the ignore set are dropped first; if none survive, a handle
    /// to this node is returned.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidSegment`] if a surviving value cannot be
    /// coerced or the segment hook rejects it. No node is created then.
    pub fn call<I, S>(&self, values: I) -> Result<Self, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        let session = &self.node.session;
        let components = session
            .options
            .ignore
            .filter(values.into_iter().map(Into::into))?;
        if components.is_empty() {
            return Ok(self.clone());
        }

        let components = match &session.options.segment_hook {
            Some(hook) => {
                let mut lineage = self.segments();
                let existing = lineage.len();
                for component in components {
                    let refs: Vec<&str> = lineage.iter().map(String::as_str).collect();
                    let built = hook.build(&refs, component.clone())?;
                    if built.is_empty() {
                        return Err(ClientError::invalid_segment(
                            component,
                            "segment hook returned an empty segment",
                        ));
                    }
                    lineage.push(built);
                }
                lineage.split_off(existing)
            }
            None => components,
        };

        let mut node = Arc::clone(&self.node);
        let mut depth = self.depth();
        for component in components {
            depth += 1;
            tracing::trace!(segment = %component, depth, "extending chain");
            node = Arc::new(Node {
                segment: Some(component),
                parent: Some(node),
                session: Arc::clone(session),
            });
        }
        Ok(Self { node })
    }

    /// Resolve this node to its URL.
    #[must_use]
    pub fn url(&self) -> String {
        let session = &self.node.session;
        let mut url = session.base_url.clone();
        for segment in self.segments() {
            url.push('/');
            url.push_str(&segment);
        }
        if session.options.append_slash {
            url.push('/');
        }
        url
    }

    /// Segments from the root down to this node.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = Some(&self.node);
        while let Some(node) = current {
            if let Some(segment) = &node.segment {
                segments.push(segment.clone());
            }
            current = node.parent.as_ref();
        }
        segments.reverse();
        segments
    }

    /// Number of segments between the root and this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = &self.node;
        while let Some(parent) = &current.parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// This node's own segment; `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.node.segment.as_deref()
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node.parent.as_ref().map(|parent| Self {
            node: Arc::clone(parent),
        })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Origin all URLs of this tree start with, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.node.session.base_url
    }

    /// Session configuration shared by the whole tree.
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.node.session.options
    }

    /// Extend by `segments`, merge `options` over the session and hand the
    /// request to the transport.
    ///
    /// This is the only point at which the chain awaits.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidSegment`] for unusable extra segments and
    /// [`ClientError::InvalidConfig`] for call-time cookies that would break
    /// the `Cookie` header. Nothing is sent in either case; any other error
    /// comes from the transport as is.
    pub async fn dispatch(
        &self,
        method: Method,
        segments: Vec<Segment>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        options.validate()?;
        let target = self.call(segments)?;
        let url = target.url();
        let effective = merge(target.options(), options);
        tracing::debug!(%method, url = %url, "dispatching request");
        target
            .node
            .session
            .transport
            .send(method, &url, effective)
            .await
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("url", &self.url()).finish()
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.url() == other.url()
    }
}

impl Eq for Client {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingHook, SpyTransport};

    const BASE_URL: &str = "http://localhost:8000";
    const URL: &str = "http://localhost:8000/sample/path/to/resource";

    fn client(options: ClientOptions) -> Client {
        Client::with_transport(BASE_URL, options, Arc::new(SpyTransport::default())).unwrap()
    }

    #[test]
    fn test_chaining_styles_agree() {
        let client = client(ClientOptions::default());
        let combs = [
            crate::chain!(client => sample.path.to.resource).unwrap(),
            client.segment("sample").unwrap().segment("path").unwrap().call(["to"]).unwrap().segment("resource").unwrap(),
            client.call(["sample", "path", "to", "resource"]).unwrap(),
            client.call(["sample"]).unwrap().call(["path"]).unwrap().call(["to"]).unwrap().call(["resource"]).unwrap(),
            crate::chain!(client => sample).unwrap().call(["path"]).unwrap().call(["to", "resource"]).unwrap(),
            crate::chain!(client.call(["sample", "path"]).unwrap() => to.resource).unwrap(),
        ];
        for comb in &combs {
            assert_eq!(comb.url(), URL);
            assert_eq!(comb.to_string(), URL);
        }
        assert!(combs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_root_resolves_to_base() {
        let client = client(ClientOptions::default());
        assert_eq!(client.url(), BASE_URL);
        assert!(client.is_root());
        assert_eq!(client.name(), None);
    }

    #[test]
    fn test_trailing_slash_on_origin_is_stripped() {
        let client = Client::with_transport(
            "http://localhost:8000//",
            ClientOptions::default(),
            Arc::new(SpyTransport::default()),
        )
        .unwrap();
        assert_eq!(client.url(), BASE_URL);
        assert_eq!(client.segment("a").unwrap().url(), "http://localhost:8000/a");
    }

    #[test]
    fn test_append_slash() {
        let client = client(ClientOptions::default().append_slash(true));
        assert_eq!(client.url(), "http://localhost:8000/");
        assert_eq!(
            crate::chain!(client => a.b).unwrap().url(),
            "http://localhost:8000/a/b/"
        );
    }

    #[test]
    fn test_ignore_filters_values() {
        let client = client(ClientOptions::default().ignore(None::<&str>));
        let node = client
            .segment("a")
            .unwrap()
            .segment(None::<&str>)
            .unwrap()
            .segment("b")
            .unwrap();
        assert_eq!(node.url(), "http://localhost:8000/a/b");
        assert_eq!(node, client.call(["a", "b"]).unwrap());
    }

    #[test]
    fn test_all_ignored_returns_same_node() {
        let client = client(ClientOptions::default().ignore("x"));
        let a = client.segment("a").unwrap();
        let same = a.call(["x", "x"]).unwrap();
        assert_eq!(same.segments(), vec!["a"]);
        assert!(Arc::ptr_eq(&a.node, &same.node));
    }

    #[test]
    fn test_null_without_ignore_is_invalid() {
        let client = client(ClientOptions::default());
        let err = client.call([Some("a"), None]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidSegment { .. }));
    }

    #[test]
    fn test_mixed_value_types() {
        let client = client(ClientOptions::default());
        let node = client
            .call([Segment::from("users"), Segment::from(42), Segment::from(true)])
            .unwrap();
        assert_eq!(node.url(), "http://localhost:8000/users/42/true");
    }

    #[test]
    fn test_multi_value_call_builds_linear_run() {
        let client = client(ClientOptions::default());
        let leaf = client.call(["a", "b", "c"]).unwrap();
        assert_eq!(leaf.name(), Some("c"));
        let b = leaf.parent().unwrap();
        assert_eq!(b.name(), Some("b"));
        let a = b.parent().unwrap();
        assert_eq!(a.name(), Some("a"));
        assert!(a.parent().unwrap().is_root());
    }

    #[test]
    fn test_nodes_are_immutable() {
        let client = client(ClientOptions::default());
        let a = client.segment("a").unwrap();
        let _ab = a.segment("b").unwrap();
        let _ac = a.segment("c").unwrap();
        assert_eq!(a.url(), "http://localhost:8000/a");
        assert_eq!(a.url(), a.url());
    }

    #[test]
    fn test_session_is_shared_not_copied() {
        let client = client(ClientOptions::default());
        let leaf = client.call(["a", "b"]).unwrap();
        assert!(Arc::ptr_eq(&client.node.session, &leaf.node.session));
    }

    #[test]
    fn test_hook_called_once_per_node() {
        let hook = CountingHook::default();
        let calls = hook.calls();
        let client = client(ClientOptions::default().ignore(None::<&str>).with_segment_hook(hook));

        let node = crate::chain!(client => sample.path).unwrap();
        let node = node.call([Some("to"), None, Some("resource")]).unwrap();
        assert_eq!(node.url(), URL);

        let seen = calls.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (vec![], "sample".to_owned()),
                (vec!["sample".to_owned()], "path".to_owned()),
                (vec!["sample".to_owned(), "path".to_owned()], "to".to_owned()),
                (
                    vec!["sample".to_owned(), "path".to_owned(), "to".to_owned()],
                    "resource".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn test_hook_can_rewrite_and_reject() {
        let client = client(ClientOptions::default().with_segment_hook(
            |_: &[&str], segment: String| {
                if segment.starts_with('_') {
                    Err(ClientError::InvalidSegment {
                        segment,
                        reason: "private".into(),
                    })
                } else {
                    Ok(segment.to_uppercase())
                }
            },
        ));
        assert_eq!(client.call(["a", "b"]).unwrap().url(), "http://localhost:8000/A/B");
        assert!(client.call(["a", "_b"]).is_err());
    }

    #[test]
    fn test_hook_returning_empty_segment_is_rejected() {
        let client = client(ClientOptions::default().with_segment_hook(
            |_: &[&str], segment: String| -> Result<String, ClientError> {
                Ok(if segment == "drop" { String::new() } else { segment })
            },
        ));
        let err = client.call(["a", "drop", "b"]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidSegment { ref segment, .. } if segment == "drop"
        ));
        assert_eq!(client.call(["a", "b"]).unwrap().url(), "http://localhost:8000/a/b");
    }

    #[test]
    fn test_depth_counts_segments() {
        let client = client(ClientOptions::default());
        assert_eq!(client.depth(), 0);
        let node = client.call(["sample", "path"]).unwrap().segment("to").unwrap();
        assert_eq!(node.depth(), 3);
        assert_eq!(node.parent().unwrap().depth(), 2);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Client::with_transport(
            "not a url",
            ClientOptions::default(),
            Arc::new(SpyTransport::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));

        let err = Client::with_transport(
            "mailto:someone@example.com",
            ClientOptions::default(),
            Arc::new(SpyTransport::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[test]
    fn test_construction_validates_headers_eagerly() {
        let spy = Arc::new(SpyTransport::default());
        let err = Client::with_transport(
            BASE_URL,
            ClientOptions::default().header("bad header", "x"),
            spy.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
        assert!(spy.requests().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_with_extra_segments() {
        let spy = Arc::new(SpyTransport::default());
        let client = Client::with_transport(
            BASE_URL,
            ClientOptions::default().ignore(None::<&str>),
            spy.clone(),
        )
        .unwrap();

        let extra = vec![Segment::from("path"), Segment::Null, Segment::from("to")];
        client
            .segment("sample")
            .unwrap()
            .dispatch(Method::GET, extra, RequestOptions::default())
            .await
            .unwrap();

        let requests = spy.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].url, "http://localhost:8000/sample/path/to");
    }

    #[tokio::test]
    async fn test_dispatch_rejects_bad_segment_before_sending() {
        let spy = Arc::new(SpyTransport::default());
        let client =
            Client::with_transport(BASE_URL, ClientOptions::default(), spy.clone()).unwrap();

        let err = client
            .dispatch(Method::GET, vec![Segment::Null], RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidSegment { .. }));
        assert!(spy.requests().is_empty());
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                (BASE_URL_ENV, Some("http://env-host:9000/")),
                ("RESTPATH_APPEND_SLASH", Some("true")),
            ],
            || {
                let client = Client::from_env().unwrap();
                assert_eq!(client.url(), "http://env-host:9000/");
                assert!(client.options().append_slash);
            },
        );
    }

    #[test]
    fn test_from_env_requires_base_url() {
        temp_env::with_vars([(BASE_URL_ENV, None::<&str>)], || {
            let err = Client::from_env().unwrap_err();
            assert!(matches!(err, ClientError::InvalidConfig(_)));
        });
    }
}
