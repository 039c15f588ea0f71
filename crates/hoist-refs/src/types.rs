//! Remote and branch snapshots.
//!
//! These mirror what a configuration store knows about remotes and local
//! branches. They are read-only inputs to refspec resolution and dispatch.

use serde::{Deserialize, Serialize};

use crate::names::HEADS_PREFIX;
use crate::refspec::Refspec;

/// A configured (or anonymous, URL-only) remote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    /// Remote name (e.g. "origin"), or the URL itself for anonymous remotes.
    pub name: String,
    /// Fetch/push URLs, in configuration order.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Dedicated push URLs; when non-empty they replace `urls` for pushing.
    #[serde(default)]
    pub push_urls: Vec<String>,
    /// Stored push refspecs (`remote.<name>.push`).
    #[serde(default)]
    pub push_refspecs: Vec<Refspec>,
    /// `remote.<name>.mirror`.
    #[serde(default)]
    pub mirror: bool,
}

impl Remote {
    /// A remote with a single URL and nothing else configured.
    pub fn with_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urls: vec![url.into()],
            ..Default::default()
        }
    }

    /// The endpoints a push goes to: push URLs, else URLs, else the name.
    pub fn push_endpoints(&self) -> Vec<String> {
        if !self.push_urls.is_empty() {
            self.push_urls.clone()
        } else if !self.urls.is_empty() {
            self.urls.clone()
        } else {
            vec![self.name.clone()]
        }
    }

    /// Query the stored push refspecs with a concrete source ref.
    pub fn query_push(&self, src: &str) -> Option<Refspec> {
        Refspec::query(&self.push_refspecs, src)
    }
}

/// One upstream entry (`branch.<name>.merge`) of a local branch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    /// The ref on the remote this branch follows (e.g. "refs/heads/main").
    #[serde(default)]
    pub src: Option<String>,
    /// The local remote-tracking ref it is fetched into, when known.
    #[serde(default)]
    pub dst: Option<String>,
}

impl Tracking {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: Some(src.into()), dst: None }
    }
}

/// A local branch and its tracking configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Short name (e.g. "main").
    pub name: String,
    /// Full name (e.g. "refs/heads/main").
    #[serde(default)]
    pub refname: String,
    /// `branch.<name>.remote`.
    #[serde(default)]
    pub remote: Option<String>,
    /// `branch.<name>.pushRemote`.
    #[serde(default)]
    pub push_remote: Option<String>,
    /// `branch.<name>.merge` entries.
    #[serde(default)]
    pub merge: Vec<Tracking>,
}

impl Branch {
    /// A branch with no tracking configuration. `name` may be short or full.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let short = name.strip_prefix(HEADS_PREFIX).unwrap_or(&name).to_string();
        Self {
            refname: format!("{HEADS_PREFIX}{short}"),
            name: short,
            remote: None,
            push_remote: None,
            merge: Vec::new(),
        }
    }

    /// Builder: follow `src` on `remote`.
    pub fn tracking(mut self, remote: impl Into<String>, src: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self.merge.push(Tracking::new(src));
        self
    }

    /// Builder: push to `remote` instead of the fetch remote.
    pub fn pushing_to(mut self, remote: impl Into<String>) -> Self {
        self.push_remote = Some(remote.into());
        self
    }

    /// The single upstream source, when exactly one entry with a known
    /// source is configured.
    pub fn sole_upstream(&self) -> Option<&str> {
        match self.merge.as_slice() {
            [only] => only.src.as_deref(),
            _ => None,
        }
    }
}
