use std::time::Duration;

use serde::{Deserialize, Serialize};

use hoist_refs::refname_matches;

use crate::error::{Result, TransportError};

/// Address family to use when connecting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    #[default]
    Any,
    V4,
    V6,
}

/// What a lease expects the remote value of one ref to be.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum LeaseExpect {
    /// Whatever our remote-tracking ref for it says.
    Tracking,
    /// The object named by this revision.
    Value(String),
    /// The ref must not exist.
    Absent,
}

/// One `--force-with-lease=<ref>[:<expect>]` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaseEntry {
    pub refname: String,
    pub expect: LeaseExpect,
}

/// The accumulated `--force-with-lease` options of one invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LeaseOption {
    /// Bare `--force-with-lease`: every other ref uses its tracking value.
    pub use_tracking_for_rest: bool,
    pub entries: Vec<LeaseEntry>,
}

impl LeaseOption {
    /// `true` when no lease was requested.
    pub fn is_empty(&self) -> bool {
        !self.use_tracking_for_rest && self.entries.is_empty()
    }

    /// Apply one `--force-with-lease[=<ref>[:<expect>]]` occurrence.
    ///
    /// An empty `<expect>` means the ref must not exist yet.
    pub fn apply(&mut self, value: Option<&str>) -> Result<()> {
        let Some(value) = value else {
            self.use_tracking_for_rest = true;
            return Ok(());
        };
        let (refname, expect) = match value.split_once(':') {
            Some((refname, "")) => (refname, LeaseExpect::Absent),
            Some((refname, rev)) => (refname, LeaseExpect::Value(rev.to_string())),
            None => (value, LeaseExpect::Tracking),
        };
        if refname.is_empty() {
            return Err(TransportError::InvalidLease(value.to_string()));
        }
        self.entries.push(LeaseEntry {
            refname: refname.to_string(),
            expect,
        });
        Ok(())
    }

    /// `--no-force-with-lease`: forget everything given so far.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The expectation that applies to the destination `dst`, if any.
    pub fn expectation_for(&self, dst: &str) -> Option<LeaseExpect> {
        self.entries
            .iter()
            .find(|entry| refname_matches(&entry.refname, dst))
            .map(|entry| entry.expect.clone())
            .or_else(|| self.use_tracking_for_rest.then_some(LeaseExpect::Tracking))
    }
}

/// Per-connection settings fixed for the whole invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectOptions {
    /// Negative is quiet, zero is normal, positive is verbose.
    pub verbosity: i32,
    /// Force progress reporting on or off; `None` decides by terminal.
    pub progress: Option<bool>,
    pub family: IpFamily,
    pub thin: bool,
    /// Program to run on the remote side instead of the default.
    pub receive_pack: Option<String>,
    /// Strings sent to the remote as push options.
    pub push_options: Vec<String>,
    pub lease: LeaseOption,
    pub timeout: Option<Duration>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            verbosity: 0,
            progress: None,
            family: IpFamily::Any,
            thin: true,
            receive_pack: None,
            push_options: Vec::new(),
            lease: LeaseOption::default(),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_parsing() {
        let mut lease = LeaseOption::default();
        assert!(lease.is_empty());

        lease.apply(Some("main")).unwrap();
        lease.apply(Some("topic:abc123")).unwrap();
        lease.apply(Some("fresh:")).unwrap();
        assert_eq!(lease.entries[0].expect, LeaseExpect::Tracking);
        assert_eq!(lease.entries[1].expect, LeaseExpect::Value("abc123".into()));
        assert_eq!(lease.entries[2].expect, LeaseExpect::Absent);
        assert!(matches!(
            lease.apply(Some(":abc")),
            Err(TransportError::InvalidLease(_))
        ));
    }

    #[test]
    fn lease_lookup() {
        let mut lease = LeaseOption::default();
        lease.apply(Some("main:abc")).unwrap();
        assert_eq!(
            lease.expectation_for("refs/heads/main"),
            Some(LeaseExpect::Value("abc".into()))
        );
        assert_eq!(lease.expectation_for("refs/heads/topic"), None);

        lease.apply(None).unwrap();
        assert_eq!(lease.expectation_for("refs/heads/topic"), Some(LeaseExpect::Tracking));

        lease.clear();
        assert!(lease.is_empty());
    }

    #[test]
    fn default_connect_options_are_thin() {
        let options = ConnectOptions::default();
        assert!(options.thin);
        assert!(options.lease.is_empty());
        assert_eq!(options.family, IpFamily::Any);
    }
}
