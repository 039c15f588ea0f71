//! Reference names, refspecs and remote/branch descriptions for hoist.
//!
//! This crate holds the value types every other hoist crate agrees on. None of
//! it performs I/O: remotes and branches are plain snapshots produced by a
//! configuration store, and refspecs are parsed from and rendered to their
//! usual `[+]<src>:<dst>` text form.
//!
//! # Modules
//!
//! - [`error`] — Error types for refspec parsing
//! - [`names`] — Ref namespace helpers and short-name matching
//! - [`refspec`] — The [`Refspec`] mapping type and wildcard expansion
//! - [`types`] — [`Remote`], [`Branch`] and [`Tracking`] snapshots

pub mod error;
pub mod names;
pub mod refspec;
pub mod types;

pub use error::{RefError, Result};
pub use names::{
    count_ref_matches, refname_matches, strip_heads_prefix, RefMatch, HEADS_PREFIX, REMOTES_PREFIX,
    TAGS_PREFIX,
};
pub use refspec::Refspec;
pub use types::{Branch, Remote, Tracking};
