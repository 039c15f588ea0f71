//! Configuration for hoist: push settings and the remote/branch registry.
//!
//! The push core never reads configuration on its own. Callers load a
//! [`PushSettings`] and the remote/branch snapshots it needs through a
//! [`ConfigStore`] once per invocation and pass them down explicitly.
//!
//! # Modules
//!
//! - [`error`] — Error types for configuration access
//! - [`settings`] — [`PushSettings`], [`PushMode`], [`SignPush`], advice toggles
//! - [`store`] — The [`ConfigStore`] trait and remote lookup rules
//! - [`memory`] — [`InMemoryConfigStore`], loadable from TOML fixtures
//! - [`git`] — [`GitConfigStore`], backed by a repository's git config

pub mod error;
pub mod git;
pub mod memory;
pub mod settings;
pub mod store;

pub use error::{ConfigError, Result};
pub use git::GitConfigStore;
pub use memory::{ConfigSnapshot, InMemoryConfigStore};
pub use settings::{AdviceSettings, PushMode, PushSettings, RecurseSubmodules, SignPush};
pub use store::{looks_like_url, ConfigStore};
