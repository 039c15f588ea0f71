//! The push core of hoist.
//!
//! Given configuration and command-line input, this crate decides *what* to
//! push (a finalized list of refspecs) and *where* (every push URL of the
//! chosen remote), dispatches the push through a
//! [`Transport`](hoist_transport::Transport), and turns rejections into
//! advice.
//!
//! # Pipeline
//!
//! 1. [`refspecs::collect_refspecs`] turns arguments into refspecs, mapping
//!    short names through [`resolver::resolve`].
//! 2. With no refspecs, [`policy::derive_refspecs`] applies the push mode.
//! 3. [`dispatch::dispatch`] pushes to each URL in turn and aggregates the
//!    outcomes; [`advice::select_advice`] picks at most one hint.
//!
//! [`command::prepare_push`] and [`command::run_push`] tie the steps together.
//!
//! # Modules
//!
//! - [`error`] — [`PushError`] and its usage, policy and dispatch parts
//! - [`options`] — The immutable [`PushOptions`] of one invocation
//! - [`resolver`] — Short-name to refspec mapping via tracking metadata
//! - [`refspecs`] — Argument collection (`tag <name>`, `--delete`, `--tags`)
//! - [`policy`] — The five push modes
//! - [`advice`] — Rejection advice table
//! - [`report`] — The [`Reporter`] output seam
//! - [`dispatch`] — Per-URL push and aggregation
//! - [`command`] — [`prepare_push`], [`run_push`], [`PushExit`]

pub mod advice;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod policy;
pub mod refspecs;
pub mod report;
pub mod resolver;

pub use advice::select_advice;
pub use command::{execute_push, prepare_push, run_push, PushExit, PushPlan};
pub use dispatch::{dispatch, DispatchReport, EndpointReport};
pub use error::{DispatchError, PolicyError, PushError, Result, UsageError};
pub use options::PushOptions;
pub use policy::{derive_refspecs, is_triangular, PolicyContext};
pub use refspecs::collect_refspecs;
pub use report::{RecordingReporter, ReportEvent, Reporter};
pub use resolver::{resolve, TrackingSnapshot};
