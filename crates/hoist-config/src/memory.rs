//! In-memory configuration store for tests and fixtures.
//!
//! [`InMemoryConfigStore`] keeps a [`ConfigSnapshot`] behind a `RwLock`. A
//! snapshot can be built with the `with_*` builders or parsed from TOML:
//!
//! ```toml
//! current_branch = "main"
//! local_refs = ["refs/tags/v1"]
//!
//! [push]
//! default_mode = "upstream"
//!
//! [[remotes]]
//! name = "origin"
//! urls = ["https://example.com/r.git"]
//!
//! [[branches]]
//! name = "main"
//! remote = "origin"
//! merge = [{ src = "refs/heads/main" }]
//! ```

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use hoist_refs::{Branch, Remote, HEADS_PREFIX};

use crate::error::{ConfigError, Result};
use crate::settings::PushSettings;
use crate::store::ConfigStore;

/// Everything an [`InMemoryConfigStore`] knows.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub push: PushSettings,
    pub remotes: Vec<Remote>,
    pub branches: Vec<Branch>,
    /// Short name of the checked-out branch; `None` means detached HEAD.
    pub current_branch: Option<String>,
    /// Local refs beyond the branches listed in `branches`.
    pub local_refs: Vec<String>,
}

impl ConfigSnapshot {
    /// Parse a snapshot from TOML, filling in omitted branch refnames.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut snapshot: ConfigSnapshot = toml::from_str(content)?;
        for branch in &mut snapshot.branches {
            if branch.refname.is_empty() {
                branch.refname = format!("{HEADS_PREFIX}{}", branch.name);
            }
        }
        Ok(snapshot)
    }
}

/// An in-memory implementation of [`ConfigStore`].
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    snapshot: RwLock<ConfigSnapshot>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(Self::from_snapshot(ConfigSnapshot::from_toml(content)?))
    }

    pub fn with_remote(self, remote: Remote) -> Self {
        self.update(|s| s.remotes.push(remote))
    }

    pub fn with_branch(self, branch: Branch) -> Self {
        self.update(|s| s.branches.push(branch))
    }

    /// Check out `name`; the branch is added if it is not known yet.
    pub fn with_current_branch(self, name: &str) -> Self {
        self.update(|s| {
            if !s.branches.iter().any(|b| b.name == name) {
                s.branches.push(Branch::new(name));
            }
            s.current_branch = Some(name.to_string());
        })
    }

    pub fn with_local_ref(self, name: impl Into<String>) -> Self {
        self.update(|s| s.local_refs.push(name.into()))
    }

    pub fn with_settings(self, settings: PushSettings) -> Self {
        self.update(|s| s.push = settings)
    }

    /// Detach HEAD.
    pub fn detach_head(&self) -> Result<()> {
        self.write()?.current_branch = None;
        Ok(())
    }

    fn update(mut self, f: impl FnOnce(&mut ConfigSnapshot)) -> Self {
        if let Ok(snapshot) = self.snapshot.get_mut() {
            f(snapshot);
        }
        self
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, ConfigSnapshot>> {
        self.snapshot
            .read()
            .map_err(|e| ConfigError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, ConfigSnapshot>> {
        self.snapshot
            .write()
            .map_err(|e| ConfigError::Poisoned(e.to_string()))
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn remote(&self, name: &str) -> Result<Option<Remote>> {
        let snapshot = self.read()?;
        Ok(snapshot
            .remotes
            .iter()
            .find(|r| r.name == name && !(r.urls.is_empty() && r.push_urls.is_empty()))
            .cloned())
    }

    fn branch(&self, name: Option<&str>) -> Result<Option<Branch>> {
        let snapshot = self.read()?;
        let Some(name) = name.or(snapshot.current_branch.as_deref()) else {
            return Ok(None);
        };
        let short = name.strip_prefix(HEADS_PREFIX).unwrap_or(name);
        Ok(Some(
            snapshot
                .branches
                .iter()
                .find(|b| b.name == short)
                .cloned()
                .unwrap_or_else(|| Branch::new(short)),
        ))
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        Ok(self.read()?.branches.clone())
    }

    fn local_references(&self) -> Result<Vec<String>> {
        let snapshot = self.read()?;
        let mut refs: Vec<String> = snapshot
            .branches
            .iter()
            .map(|b| b.refname.clone())
            .chain(snapshot.local_refs.iter().cloned())
            .collect();
        refs.sort();
        refs.dedup();
        Ok(refs)
    }

    fn push_settings(&self) -> Result<PushSettings> {
        Ok(self.read()?.push.clone())
    }
}
