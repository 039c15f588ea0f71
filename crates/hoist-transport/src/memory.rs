//! A scripted, recording transport for tests.
//!
//! Every endpoint accepts every update unless scripted otherwise. All
//! connect, push and close calls are recorded in order, so tests can assert
//! exactly which endpoints were contacted (or that none were).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use hoist_refs::{Refspec, Remote};

use crate::error::{Result, TransportError};
use crate::flags::PushFlags;
use crate::options::ConnectOptions;
use crate::status::{PushOutcome, RefOutcome, RefStatus};
use crate::traits::{Connection, Transport};

/// One recorded transport call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    Connect { url: String },
    Push { url: String, refspecs: Vec<String>, flags: PushFlags },
    Close { url: String },
}

/// How one endpoint behaves.
#[derive(Clone, Debug)]
pub struct ScriptedEndpoint {
    conditional_update: bool,
    rejections: Vec<(String, RefStatus)>,
    connect_error: Option<String>,
    push_error: Option<String>,
    close_error: Option<String>,
}

impl Default for ScriptedEndpoint {
    fn default() -> Self {
        Self::accept()
    }
}

impl ScriptedEndpoint {
    /// Accept every update.
    pub fn accept() -> Self {
        Self {
            conditional_update: true,
            rejections: Vec::new(),
            connect_error: None,
            push_error: None,
            close_error: None,
        }
    }

    /// Report `status` for the destination `dst`.
    pub fn rejecting(mut self, dst: impl Into<String>, status: RefStatus) -> Self {
        self.rejections.push((dst.into(), status));
        self
    }

    /// Fail the push as a whole.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.push_error = Some(message.into());
        self
    }

    /// Fail when the connection is closed.
    pub fn failing_close(mut self, message: impl Into<String>) -> Self {
        self.close_error = Some(message.into());
        self
    }

    /// Fail when the connection is constructed.
    pub fn refusing_connect(mut self, message: impl Into<String>) -> Self {
        self.connect_error = Some(message.into());
        self
    }

    pub fn without_conditional_update(mut self) -> Self {
        self.conditional_update = false;
        self
    }

    fn outcome(&self, refspecs: &[Refspec], head_ref: Option<&str>) -> PushOutcome {
        let mut updates: Vec<RefOutcome> = refspecs
            .iter()
            .filter(|spec| !spec.is_matching())
            .map(|spec| {
                let src = (!spec.src.is_empty()).then(|| spec.src.clone());
                let status = if spec.is_deletion() {
                    RefStatus::Deleted
                } else {
                    RefStatus::FastForward
                };
                RefOutcome::new(src, spec.destination(), status)
            })
            .collect();

        for (dst, status) in &self.rejections {
            match updates.iter_mut().find(|u| &u.dst == dst) {
                Some(update) => update.status = status.clone(),
                None => updates.push(RefOutcome::new(None, dst.clone(), status.clone())),
            }
        }
        PushOutcome::from_updates(updates, head_ref)
    }
}

/// A [`Transport`] whose endpoints follow a script.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    endpoints: HashMap<String, ScriptedEndpoint>,
    head_ref: Option<String>,
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, url: impl Into<String>, endpoint: ScriptedEndpoint) -> Self {
        self.endpoints.insert(url.into(), endpoint);
        self
    }

    /// The checked-out branch, used to tell NON_FF_HEAD from NON_FF_OTHER.
    pub fn with_head(mut self, refname: impl Into<String>) -> Self {
        self.head_ref = Some(refname.into());
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn connect_count(&self) -> usize {
        self.count(|c| matches!(c, TransportCall::Connect { .. }))
    }

    pub fn push_count(&self) -> usize {
        self.count(|c| matches!(c, TransportCall::Push { .. }))
    }

    fn count(&self, pred: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

fn record(calls: &Mutex<Vec<TransportCall>>, call: TransportCall) {
    if let Ok(mut calls) = calls.lock() {
        calls.push(call);
    }
}

impl Transport for ScriptedTransport {
    fn connect(
        &self,
        _remote: &Remote,
        url: &str,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn Connection>> {
        record(&self.calls, TransportCall::Connect { url: url.to_string() });
        let endpoint = self.endpoints.get(url).cloned().unwrap_or_default();
        if let Some(message) = &endpoint.connect_error {
            return Err(TransportError::Connect {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        Ok(Box::new(ScriptedConnection {
            url: url.to_string(),
            endpoint,
            head_ref: self.head_ref.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct ScriptedConnection {
    url: String,
    endpoint: ScriptedEndpoint,
    head_ref: Option<String>,
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn supports_conditional_update(&self) -> bool {
        self.endpoint.conditional_update
    }

    async fn push_refs(&mut self, refspecs: &[Refspec], flags: PushFlags) -> Result<PushOutcome> {
        record(
            &self.calls,
            TransportCall::Push {
                url: self.url.clone(),
                refspecs: refspecs.iter().map(ToString::to_string).collect(),
                flags,
            },
        );
        if let Some(message) = &self.endpoint.push_error {
            return Err(TransportError::Remote(message.clone()));
        }
        Ok(self.endpoint.outcome(refspecs, self.head_ref.as_deref()))
    }

    async fn close(&mut self) -> Result<()> {
        record(&self.calls, TransportCall::Close { url: self.url.clone() });
        match &self.endpoint.close_error {
            Some(message) => Err(TransportError::Remote(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasons::RejectReasons;

    /// Helper to connect to `url` with default options.
    fn connect(transport: &ScriptedTransport, url: &str) -> Box<dyn Connection> {
        transport
            .connect(&Remote::with_url("origin", url), url, &ConnectOptions::default())
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_by_default_and_records_calls() {
        let transport = ScriptedTransport::new();
        let mut conn = connect(&transport, "https://a");
        assert_eq!(conn.url(), "https://a");
        let outcome = conn
            .push_refs(&[Refspec::new("refs/heads/main", "refs/heads/main")], PushFlags::NONE)
            .await
            .unwrap();
        conn.close().await.unwrap();

        assert!(!outcome.has_rejections());
        assert_eq!(outcome.updates[0].status, RefStatus::FastForward);
        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::Connect { url: "https://a".into() },
                TransportCall::Push {
                    url: "https://a".into(),
                    refspecs: vec!["refs/heads/main:refs/heads/main".into()],
                    flags: PushFlags::NONE,
                },
                TransportCall::Close { url: "https://a".into() },
            ]
        );
    }

    #[tokio::test]
    async fn scripted_rejection_sets_reasons() {
        let transport = ScriptedTransport::new()
            .with_head("refs/heads/main")
            .with_endpoint(
                "https://b",
                ScriptedEndpoint::accept()
                    .rejecting("refs/heads/main", RefStatus::RejectNonFastForward),
            );
        let mut conn = connect(&transport, "https://b");
        let outcome = conn
            .push_refs(&[Refspec::new("refs/heads/main", "refs/heads/main")], PushFlags::NONE)
            .await
            .unwrap();
        assert_eq!(outcome.reasons, RejectReasons::NON_FF_HEAD);
    }

    #[tokio::test]
    async fn scripted_failures() {
        let transport = ScriptedTransport::new()
            .with_endpoint("https://c", ScriptedEndpoint::accept().failing("boom").failing_close("eof"))
            .with_endpoint("https://d", ScriptedEndpoint::accept().refusing_connect("no route"));

        let mut conn = connect(&transport, "https://c");
        assert!(conn.push_refs(&[], PushFlags::NONE).await.is_err());
        assert!(conn.close().await.is_err());

        let refused = transport.connect(
            &Remote::with_url("origin", "https://d"),
            "https://d",
            &ConnectOptions::default(),
        );
        assert!(matches!(refused, Err(TransportError::Connect { .. })));
        assert_eq!(transport.connect_count(), 2);
        assert_eq!(transport.push_count(), 1);
    }
}
