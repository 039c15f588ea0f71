use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Serialize, Serializer};

/// Flags for one push, passed unchanged to every connection.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PushFlags(u32);

impl PushFlags {
    pub const NONE: Self = Self(0);
    pub const DRY_RUN: Self = Self(1 << 0);
    pub const FORCE: Self = Self(1 << 1);
    pub const ALL: Self = Self(1 << 2);
    pub const MIRROR: Self = Self(1 << 3);
    pub const PORCELAIN: Self = Self(1 << 4);
    pub const SET_UPSTREAM: Self = Self(1 << 5);
    pub const PRUNE: Self = Self(1 << 6);
    pub const NO_VERIFY: Self = Self(1 << 7);
    pub const FOLLOW_TAGS: Self = Self(1 << 8);
    pub const ATOMIC: Self = Self(1 << 9);
    pub const PUSH_OPTIONS: Self = Self(1 << 10);
    pub const CERT_ALWAYS: Self = Self(1 << 11);
    pub const CERT_IF_ASKED: Self = Self(1 << 12);
    pub const RECURSE_CHECK: Self = Self(1 << 13);
    pub const RECURSE_ON_DEMAND: Self = Self(1 << 14);
    pub const RECURSE_ONLY: Self = Self(1 << 15);

    const NAMES: &'static [(PushFlags, &'static str)] = &[
        (Self::DRY_RUN, "dry-run"),
        (Self::FORCE, "force"),
        (Self::ALL, "all"),
        (Self::MIRROR, "mirror"),
        (Self::PORCELAIN, "porcelain"),
        (Self::SET_UPSTREAM, "set-upstream"),
        (Self::PRUNE, "prune"),
        (Self::NO_VERIFY, "no-verify"),
        (Self::FOLLOW_TAGS, "follow-tags"),
        (Self::ATOMIC, "atomic"),
        (Self::PUSH_OPTIONS, "push-options"),
        (Self::CERT_ALWAYS, "cert-always"),
        (Self::CERT_IF_ASKED, "cert-if-asked"),
        (Self::RECURSE_CHECK, "recurse-check"),
        (Self::RECURSE_ON_DEMAND, "recurse-on-demand"),
        (Self::RECURSE_ONLY, "recurse-only"),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Insert or remove `other` depending on `on`.
    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    /// Names of the set flags, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for PushFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PushFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PushFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PushFlags({})", self)
    }
}

impl fmt::Display for PushFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&self.names().join("|"))
    }
}

impl Serialize for PushFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_query() {
        let mut flags = PushFlags::FORCE | PushFlags::DRY_RUN;
        assert!(flags.contains(PushFlags::FORCE));
        assert!(!flags.contains(PushFlags::MIRROR));
        assert!(flags.contains(PushFlags::FORCE | PushFlags::DRY_RUN));

        flags.set(PushFlags::FORCE, false);
        assert!(!flags.contains(PushFlags::FORCE));
        flags |= PushFlags::ATOMIC;
        assert_eq!(flags.names(), vec!["dry-run", "atomic"]);
    }

    #[test]
    fn display() {
        assert_eq!(PushFlags::NONE.to_string(), "none");
        assert_eq!((PushFlags::MIRROR | PushFlags::FORCE).to_string(), "force|mirror");
    }
}
