//! The [`ConfigStore`] trait: read access to remotes, branches and settings.
//!
//! Any backend (in-memory fixtures, a repository's git config) implements the
//! five required methods; remote selection for push and fetch is shared.

use std::path::Path;

use hoist_refs::{Branch, Remote};

use crate::error::{ConfigError, Result};
use crate::settings::PushSettings;

/// Remote used when nothing else is configured.
pub const DEFAULT_REMOTE: &str = "origin";

/// Read-only configuration backend.
pub trait ConfigStore: Send + Sync {
    /// A configured remote by name. `Ok(None)` if no such remote has a URL.
    fn remote(&self, name: &str) -> Result<Option<Remote>>;

    /// A local branch by short name, or the checked-out branch for `None`.
    ///
    /// Returns `Ok(None)` for `None` when HEAD is detached.
    fn branch(&self, name: Option<&str>) -> Result<Option<Branch>>;

    /// All local branches with their tracking configuration.
    fn branches(&self) -> Result<Vec<Branch>>;

    /// Full names of every local reference.
    fn local_references(&self) -> Result<Vec<String>>;

    /// Push-related settings.
    fn push_settings(&self) -> Result<PushSettings>;

    /// A remote by name, or an anonymous remote when `name_or_url` is a URL.
    fn get_remote(&self, name_or_url: &str) -> Result<Remote> {
        if let Some(remote) = self.remote(name_or_url)? {
            return Ok(remote);
        }
        if looks_like_url(name_or_url) {
            return Ok(Remote::with_url(name_or_url, name_or_url));
        }
        Err(ConfigError::RemoteNotFound {
            name: name_or_url.to_string(),
        })
    }

    /// The remote a push goes to.
    ///
    /// An explicit name or URL wins. Otherwise the current branch's
    /// `pushRemote`, then `remote.pushDefault`, then the branch's `remote`,
    /// then `origin`. `Ok(None)` when the chosen name is not configured.
    fn push_remote(&self, explicit: Option<&str>) -> Result<Option<Remote>> {
        if let Some(name) = explicit {
            return self.get_remote(name).map(Some);
        }
        let branch = self.branch(None)?;
        let settings = self.push_settings()?;
        let name = branch
            .as_ref()
            .and_then(|b| b.push_remote.clone())
            .or(settings.remote_push_default)
            .or_else(|| branch.as_ref().and_then(|b| b.remote.clone()))
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string());
        tracing::debug!(remote = %name, "selected push remote");
        self.remote(&name)
    }

    /// The remote the current branch fetches from, if configured.
    fn fetch_remote(&self) -> Result<Option<Remote>> {
        let name = self
            .branch(None)?
            .and_then(|b| b.remote)
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string());
        self.remote(&name)
    }
}

/// Heuristic for "this names a repository directly".
///
/// Accepts `scheme://...`, scp-style `host:path`, and filesystem paths that
/// are explicit (`/`, `./`, `../`, `~`) or exist.
pub fn looks_like_url(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if s.contains("://") {
        return true;
    }
    if let Some((host, _)) = s.split_once(':') {
        if !host.is_empty() && !host.contains('/') {
            return true;
        }
    }
    s.starts_with('/')
        || s.starts_with("./")
        || s.starts_with("../")
        || s.starts_with('~')
        || Path::new(s).exists()
}
