use std::ops::{BitOr, BitOrAssign};

use serde::{Serialize, Serializer};

use crate::status::{RefOutcome, RefStatus};

/// Why a remote refused updates, accumulated across refs and endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RejectReasons(u8);

impl RejectReasons {
    pub const NONE: Self = Self(0);
    /// A non-fast-forward update of the ref fed by the checked-out branch.
    pub const NON_FF_HEAD: Self = Self(1 << 0);
    /// A non-fast-forward update of any other ref.
    pub const NON_FF_OTHER: Self = Self(1 << 1);
    /// A tag that already exists on the remote.
    pub const ALREADY_EXISTS: Self = Self(1 << 2);
    /// The remote has work we do not have locally.
    pub const FETCH_FIRST: Self = Self(1 << 3);
    /// The update involves a non-commit object and needs `--force`.
    pub const NEEDS_FORCE: Self = Self(1 << 4);

    /// Every reason, highest advice priority first.
    pub const ALL: [(RejectReasons, &'static str); 5] = [
        (Self::NON_FF_HEAD, "non-ff-head"),
        (Self::NON_FF_OTHER, "non-ff-other"),
        (Self::ALREADY_EXISTS, "already-exists"),
        (Self::FETCH_FIRST, "fetch-first"),
        (Self::NEEDS_FORCE, "needs-force"),
    ];

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if any reason in `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|(reason, _)| self.intersects(*reason))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Reasons implied by a set of ref outcomes.
    ///
    /// A non-fast-forward rejection counts as [`Self::NON_FF_HEAD`] when the
    /// rejected update is fed by `head_ref`, the checked-out branch's full
    /// name. The destination plays no part.
    pub fn collect(updates: &[RefOutcome], head_ref: Option<&str>) -> Self {
        let mut reasons = Self::NONE;
        for update in updates {
            reasons |= match update.status {
                RefStatus::RejectNonFastForward => {
                    if head_ref.is_some_and(|head| update.src.as_deref() == Some(head)) {
                        Self::NON_FF_HEAD
                    } else {
                        Self::NON_FF_OTHER
                    }
                }
                RefStatus::RejectAlreadyExists => Self::ALREADY_EXISTS,
                RefStatus::RejectFetchFirst => Self::FETCH_FIRST,
                RefStatus::RejectNeedsForce => Self::NEEDS_FORCE,
                _ => Self::NONE,
            };
        }
        reasons
    }
}

impl BitOr for RejectReasons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RejectReasons {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Serialize for RejectReasons {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create a rejected outcome.
    fn rejected(src: &str, dst: &str, status: RefStatus) -> RefOutcome {
        RefOutcome::new(Some(src.to_string()), dst, status)
    }

    #[test]
    fn non_ff_on_head_branch() {
        let updates = vec![rejected(
            "refs/heads/main",
            "refs/heads/main",
            RefStatus::RejectNonFastForward,
        )];
        let reasons = RejectReasons::collect(&updates, Some("refs/heads/main"));
        assert_eq!(reasons, RejectReasons::NON_FF_HEAD);
    }

    #[test]
    fn non_ff_elsewhere() {
        let updates = vec![rejected(
            "refs/heads/topic",
            "refs/heads/topic",
            RefStatus::RejectNonFastForward,
        )];
        assert_eq!(
            RejectReasons::collect(&updates, Some("refs/heads/main")),
            RejectReasons::NON_FF_OTHER
        );
        assert_eq!(RejectReasons::collect(&updates, None), RejectReasons::NON_FF_OTHER);
    }

    #[test]
    fn non_ff_onto_head_name_from_other_branch() {
        let updates = vec![rejected(
            "refs/heads/topic",
            "refs/heads/main",
            RefStatus::RejectNonFastForward,
        )];
        assert_eq!(
            RejectReasons::collect(&updates, Some("refs/heads/main")),
            RejectReasons::NON_FF_OTHER
        );
    }

    #[test]
    fn union_of_reasons() {
        let updates = vec![
            rejected("refs/tags/v1", "refs/tags/v1", RefStatus::RejectAlreadyExists),
            rejected("refs/heads/a", "refs/heads/a", RefStatus::RejectFetchFirst),
            rejected("refs/heads/b", "refs/heads/b", RefStatus::FastForward),
        ];
        let reasons = RejectReasons::collect(&updates, None);
        assert_eq!(reasons.names(), vec!["already-exists", "fetch-first"]);
        assert!(!reasons.intersects(RejectReasons::NEEDS_FORCE));
    }

    #[test]
    fn names_follow_priority_order() {
        let all = RejectReasons::NEEDS_FORCE | RejectReasons::NON_FF_HEAD;
        assert_eq!(all.names(), vec!["non-ff-head", "needs-force"]);
        assert!(RejectReasons::NONE.is_empty());
    }
}
