use async_trait::async_trait;

use hoist_refs::{Refspec, Remote};

use crate::error::Result;
use crate::flags::PushFlags;
use crate::options::ConnectOptions;
use crate::status::PushOutcome;

/// Opens connections to remote endpoints.
pub trait Transport: Send + Sync {
    /// Prepare a connection to `url`, one of `remote`'s push endpoints.
    ///
    /// No network I/O happens here; a connection talks to its endpoint only
    /// when asked to push.
    fn connect(
        &self,
        remote: &Remote,
        url: &str,
        options: &ConnectOptions,
    ) -> Result<Box<dyn Connection>>;
}

/// A session with a single endpoint.
#[async_trait]
pub trait Connection: Send {
    fn url(&self) -> &str;

    /// Whether the endpoint can honour lease (compare-and-swap) updates.
    fn supports_conditional_update(&self) -> bool;

    /// Push `refspecs` and report what happened to each destination.
    ///
    /// Refused updates are reported in the outcome; `Err` means the push
    /// could not be carried out at all.
    async fn push_refs(&mut self, refspecs: &[Refspec], flags: PushFlags) -> Result<PushOutcome>;

    /// Release the session.
    async fn close(&mut self) -> Result<()>;
}
