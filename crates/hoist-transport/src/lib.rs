//! The transport seam for hoist.
//!
//! A [`Transport`] hands out one [`Connection`] per endpoint URL. Connections
//! push a finalized refspec list and report a [`PushOutcome`]: one
//! [`RefOutcome`] per destination plus the [`RejectReasons`] those outcomes
//! imply. How objects travel is entirely the transport's business.
//!
//! # Modules
//!
//! - [`error`] — Error types for transport operations
//! - [`flags`] — [`PushFlags`] bitset
//! - [`reasons`] — [`RejectReasons`] bitset
//! - [`status`] — Per-ref [`RefStatus`] and client-side update classification
//! - [`options`] — [`ConnectOptions`], [`IpFamily`], [`LeaseOption`]
//! - [`traits`] — The [`Transport`] and [`Connection`] traits
//! - [`memory`] — [`ScriptedTransport`], a recording transport for tests
//! - [`git`] — [`GitTransport`], backed by libgit2

pub mod error;
pub mod flags;
pub mod git;
pub mod memory;
pub mod options;
pub mod reasons;
pub mod status;
pub mod traits;

pub use error::{Result, TransportError};
pub use flags::PushFlags;
pub use git::GitTransport;
pub use memory::{ScriptedEndpoint, ScriptedTransport, TransportCall};
pub use options::{ConnectOptions, IpFamily, LeaseExpect, LeaseOption};
pub use reasons::RejectReasons;
pub use status::{classify_update, PushOutcome, RefOutcome, RefStatus, UpdateFacts};
pub use traits::{Connection, Transport};
