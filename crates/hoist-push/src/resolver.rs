//! Short-name resolution through tracking metadata.
//!
//! `hoist push origin main` has to decide where `main` goes. The answer
//! depends on the remote's stored push refspecs and, in upstream mode, on the
//! branch's configured upstream. [`resolve`] is pure; callers build a
//! [`TrackingSnapshot`] once and reuse it for every argument.

use hoist_config::{ConfigStore, PushMode};
use hoist_refs::{count_ref_matches, Branch, RefMatch, Remote, HEADS_PREFIX};

use crate::error::Result;

/// Everything [`resolve`] consults.
#[derive(Clone, Debug)]
pub struct TrackingSnapshot {
    pub remote: Remote,
    /// Full names of all local refs.
    pub local_refs: Vec<String>,
    pub branches: Vec<Branch>,
    pub mode: PushMode,
}

impl TrackingSnapshot {
    /// Load refs and branches from `store` for pushing to `remote`.
    pub fn load(store: &dyn ConfigStore, remote: Remote, mode: PushMode) -> Result<Self> {
        Ok(Self {
            remote,
            local_refs: store.local_references()?,
            branches: store.branches()?,
            mode,
        })
    }

    fn branch(&self, short: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == short)
    }
}

/// Map a short ref name given on the command line to a refspec string.
///
/// The input comes back unchanged unless it names exactly one local ref.
/// Then the remote's stored push refspecs get the first say; failing that,
/// upstream mode maps a branch to its single upstream.
pub fn resolve(short_name: &str, snapshot: &TrackingSnapshot) -> String {
    let matched = match count_ref_matches(short_name, &snapshot.local_refs) {
        RefMatch::Unique(full) => full,
        RefMatch::None | RefMatch::Ambiguous(_) => return short_name.to_string(),
    };

    if let Some(mapped) = snapshot.remote.query_push(&matched) {
        tracing::debug!(name = short_name, refspec = %mapped, "mapped through stored push refspec");
        return mapped.to_string();
    }

    if snapshot.mode == PushMode::Upstream {
        let upstream = matched
            .strip_prefix(HEADS_PREFIX)
            .and_then(|short| snapshot.branch(short))
            .and_then(Branch::sole_upstream);
        if let Some(upstream) = upstream {
            tracing::debug!(name = short_name, upstream, "mapped to upstream");
            return format!("{short_name}:{upstream}");
        }
    }

    short_name.to_string()
}
