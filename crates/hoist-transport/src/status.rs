//! Per-destination push outcomes.
//!
//! [`classify_update`] decides, from what is known locally about a planned
//! update and the remote's current value, whether the update may be sent and
//! how it will be described. Connections use it before talking to the
//! remote; the remote can still refuse an update, which shows up as
//! [`RefStatus::RemoteReject`].

use serde::Serialize;

use hoist_refs::TAGS_PREFIX;

use crate::reasons::RejectReasons;

/// What happened (or, for a dry run, would happen) to one remote ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefStatus {
    UpToDate,
    New,
    FastForward,
    Forced,
    Deleted,
    RejectNonFastForward,
    RejectAlreadyExists,
    RejectFetchFirst,
    RejectNeedsForce,
    /// The remote value did not match the lease expectation.
    RejectStale,
    /// Not sent because another ref of an atomic push was rejected.
    AtomicPushFailed,
    /// Refused by the remote, with its message when it sent one.
    RemoteReject(Option<String>),
}

impl RefStatus {
    /// `true` for statuses that count as a failed push.
    pub fn is_rejected(&self) -> bool {
        !matches!(
            self,
            RefStatus::UpToDate
                | RefStatus::New
                | RefStatus::FastForward
                | RefStatus::Forced
                | RefStatus::Deleted
        )
    }

    /// `true` when an update has to be sent to the remote.
    pub fn needs_send(&self) -> bool {
        matches!(
            self,
            RefStatus::New | RefStatus::FastForward | RefStatus::Forced | RefStatus::Deleted
        )
    }

    /// Short explanation shown after `[rejected]`, if any.
    pub fn reject_reason(&self) -> Option<&str> {
        match self {
            RefStatus::RejectNonFastForward => Some("non-fast-forward"),
            RefStatus::RejectAlreadyExists => Some("already exists"),
            RefStatus::RejectFetchFirst => Some("fetch first"),
            RefStatus::RejectNeedsForce => Some("needs force"),
            RefStatus::RejectStale => Some("stale info"),
            RefStatus::AtomicPushFailed => Some("atomic push failed"),
            RefStatus::RemoteReject(message) => message.as_deref(),
            _ => None,
        }
    }
}

/// The outcome for one destination ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RefOutcome {
    /// Local source ref, when the update had one.
    pub src: Option<String>,
    /// Remote destination ref.
    pub dst: String,
    /// Remote value before the push (hex object id).
    pub old: Option<String>,
    /// Value pushed (hex object id); `None` for deletions.
    pub new: Option<String>,
    pub status: RefStatus,
}

impl RefOutcome {
    pub fn new(src: Option<String>, dst: impl Into<String>, status: RefStatus) -> Self {
        Self {
            src,
            dst: dst.into(),
            old: None,
            new: None,
            status,
        }
    }

    /// Builder: record the old and new object ids.
    pub fn with_ids(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old = old;
        self.new = new;
        self
    }

    /// One-line summary in the `<flag> <from>..<to> <src> -> <dst>` style.
    pub fn summary(&self) -> String {
        let (flag, what) = match &self.status {
            RefStatus::UpToDate => ("=", "[up to date]".to_string()),
            RefStatus::New if self.dst.starts_with(TAGS_PREFIX) => ("*", "[new tag]".to_string()),
            RefStatus::New => ("*", "[new branch]".to_string()),
            RefStatus::Deleted => ("-", "[deleted]".to_string()),
            RefStatus::FastForward => (" ", range(&self.old, &self.new, "..")),
            RefStatus::Forced => ("+", range(&self.old, &self.new, "...")),
            RefStatus::RemoteReject(_) => ("!", "[remote rejected]".to_string()),
            _ => ("!", "[rejected]".to_string()),
        };
        let target = match self.src.as_deref() {
            Some(src) if !src.is_empty() => format!("{} -> {}", short_name(src), short_name(&self.dst)),
            _ => short_name(&self.dst).to_string(),
        };
        match self.status.reject_reason() {
            Some(reason) => format!("{flag} {what} {target} ({reason})"),
            None if self.status == RefStatus::Forced => format!("{flag} {what} {target} (forced update)"),
            None => format!("{flag} {what} {target}"),
        }
    }
}

fn range(old: &Option<String>, new: &Option<String>, sep: &str) -> String {
    let abbrev = |id: &Option<String>| {
        id.as_deref()
            .map(|s| s.chars().take(7).collect::<String>())
            .unwrap_or_default()
    };
    format!("{}{sep}{}", abbrev(old), abbrev(new))
}

fn short_name(name: &str) -> &str {
    name.strip_prefix("refs/heads/")
        .or_else(|| name.strip_prefix(TAGS_PREFIX))
        .unwrap_or(name)
}

/// What one connection reports for one push.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PushOutcome {
    pub updates: Vec<RefOutcome>,
    pub reasons: RejectReasons,
}

impl PushOutcome {
    /// Build an outcome, deriving the reject reasons from the updates.
    pub fn from_updates(updates: Vec<RefOutcome>, head_ref: Option<&str>) -> Self {
        let reasons = RejectReasons::collect(&updates, head_ref);
        Self { updates, reasons }
    }

    /// `true` if any ref was refused.
    pub fn has_rejections(&self) -> bool {
        self.updates.iter().any(|u| u.status.is_rejected())
    }
}

/// Everything [`classify_update`] needs to know about one planned update.
#[derive(Clone, Debug, Default)]
pub struct UpdateFacts<'a> {
    /// Full destination ref name.
    pub dst: &'a str,
    /// The remote's current value; `None` if the ref does not exist there.
    pub old: Option<&'a str>,
    /// The value to push; `None` for a deletion.
    pub new: Option<&'a str>,
    /// Force was requested for this update.
    pub force: bool,
    /// Lease expectation: `Some(None)` expects the ref to be absent.
    pub expected_old: Option<Option<&'a str>>,
    /// The remote's current object exists locally.
    pub old_known: bool,
    /// Both the old and the new object are commits.
    pub both_commits: bool,
    /// The new commit descends from the old one.
    pub fast_forward: bool,
}

/// Classify a planned update before it is sent.
///
/// A lease that matches overrides the fast-forward checks; one that does not
/// match rejects the update as stale even when force was requested.
pub fn classify_update(facts: &UpdateFacts<'_>) -> RefStatus {
    let Some(new) = facts.new else {
        return match facts.old {
            Some(_) => RefStatus::Deleted,
            None => RefStatus::RemoteReject(Some("remote ref does not exist".into())),
        };
    };
    let Some(old) = facts.old else {
        return match facts.expected_old {
            Some(Some(_)) => RefStatus::RejectStale,
            _ => RefStatus::New,
        };
    };
    if old == new {
        return RefStatus::UpToDate;
    }

    let mut force = facts.force;
    if let Some(expected) = facts.expected_old {
        if expected != Some(old) {
            return RefStatus::RejectStale;
        }
        force = true;
    }

    let rejection = if facts.dst.starts_with(TAGS_PREFIX) {
        Some(RefStatus::RejectAlreadyExists)
    } else if !facts.old_known {
        Some(RefStatus::RejectFetchFirst)
    } else if !facts.both_commits {
        Some(RefStatus::RejectNeedsForce)
    } else if !facts.fast_forward {
        Some(RefStatus::RejectNonFastForward)
    } else {
        None
    };

    match (rejection, force) {
        (None, _) => RefStatus::FastForward,
        (Some(_), true) => RefStatus::Forced,
        (Some(rejected), false) => rejected,
    }
}
