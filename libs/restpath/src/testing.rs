//! Fakes shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};

use crate::error::ClientError;
use crate::merge::EffectiveConfig;
use crate::node::SegmentHook;
use crate::response::Response;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub method: Method,
    pub url: String,
    pub options: EffectiveConfig,
}

/// Records every request and answers `418` with `"<METHOD> <url>"` as body,
/// or fails with a connection error when built with [`SpyTransport::failing`].
#[derive(Debug, Default)]
pub(crate) struct SpyTransport {
    sent: Mutex<Vec<SentRequest>>,
    failure: Option<String>,
}

impl SpyTransport {
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::default(),
            failure: Some(message.to_owned()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for SpyTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        options: EffectiveConfig,
    ) -> Result<Response, ClientError> {
        self.sent.lock().unwrap().push(SentRequest {
            method: method.clone(),
            url: url.to_owned(),
            options,
        });
        if let Some(message) = &self.failure {
            return Err(ClientError::Connection(message.clone()));
        }
        Ok(Response::from_bytes(
            StatusCode::IM_A_TEAPOT,
            HeaderMap::new(),
            url,
            format!("{method} {url}"),
        ))
    }
}

type HookCalls = Arc<Mutex<Vec<(Vec<String>, String)>>>;

/// Segment hook that records its arguments and passes segments through.
#[derive(Debug, Default)]
pub(crate) struct CountingHook {
    calls: HookCalls,
}

impl CountingHook {
    pub(crate) fn calls(&self) -> HookCalls {
        Arc::clone(&self.calls)
    }
}

impl SegmentHook for CountingHook {
    fn build(&self, lineage: &[&str], segment: String) -> Result<String, ClientError> {
        let lineage = lineage.iter().map(|s| (*s).to_owned()).collect();
        self.calls.lock().unwrap().push((lineage, segment.clone()));
        Ok(segment)
    }
}
