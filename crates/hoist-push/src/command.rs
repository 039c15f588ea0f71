use serde::Serialize;

use hoist_config::{AdviceSettings, ConfigError, ConfigStore, PushSettings};
use hoist_refs::{Refspec, Remote};
use hoist_transport::{ConnectOptions, PushFlags, Transport};

use crate::dispatch::{dispatch, DispatchReport};
use crate::error::{PushError, Result, UsageError};
use crate::options::PushOptions;
use crate::policy::{derive_refspecs, is_triangular, PolicyContext};
use crate::refspecs::collect_refspecs;
use crate::report::Reporter;
use crate::resolver::TrackingSnapshot;

/// Process exit status of a push invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PushExit {
    Success = 0,
    /// At least one endpoint failed.
    Failure = 1,
    /// Aborted before or instead of pushing.
    Fatal = 128,
}

impl PushExit {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A fully validated push, ready for dispatch.
#[derive(Clone, Debug, Serialize)]
pub struct PushPlan {
    pub remote: Remote,
    /// Empty only for `--all` and `--mirror`, which the transport expands.
    pub refspecs: Vec<Refspec>,
    pub flags: PushFlags,
    pub connect: ConnectOptions,
    pub advice: AdviceSettings,
}

/// Validate `options` against configuration and settle what to push where.
///
/// Nothing here touches a transport, so every usage, configuration and
/// policy error surfaces before any endpoint is contacted.
pub fn prepare_push(store: &dyn ConfigStore, options: &PushOptions) -> Result<PushPlan> {
    if options.delete && (options.tags || options.all || options.mirror) {
        return Err(UsageError::DeleteIncompatible.into());
    }
    if options.delete && options.refspecs.is_empty() {
        return Err(UsageError::DeleteWithoutRefs.into());
    }

    let settings = store.push_settings()?;
    let mut refspecs = collect_refspecs(&options.refspecs, options.delete, options.tags, || {
        let remote = match store.push_remote(options.repo.as_deref()) {
            Ok(Some(remote)) => remote,
            Ok(None) | Err(ConfigError::RemoteNotFound { .. }) => Remote {
                name: options.repo.clone().unwrap_or_default(),
                ..Default::default()
            },
            Err(err) => return Err(err.into()),
        };
        TrackingSnapshot::load(store, remote, settings.effective_mode())
    })?;

    if options.push_options.iter().any(|o| o.contains('\n')) {
        return Err(UsageError::PushOptionNewline.into());
    }

    let remote = push_remote(store, options.repo.as_deref())?;

    let mut flags = options.flags(&settings);
    if remote.mirror {
        flags.insert(PushFlags::MIRROR | PushFlags::FORCE);
    }

    let tags_only = refspecs.first().is_some_and(|s| s.src == "refs/tags/*");
    if flags.contains(PushFlags::ALL) && !refspecs.is_empty() {
        return Err(if tags_only {
            UsageError::AllAndTags
        } else {
            UsageError::AllWithRefspecs
        }
        .into());
    }
    if flags.contains(PushFlags::MIRROR) && !refspecs.is_empty() {
        return Err(if tags_only {
            UsageError::MirrorAndTags
        } else {
            UsageError::MirrorWithRefspecs
        }
        .into());
    }
    if flags.contains(PushFlags::ALL | PushFlags::MIRROR) {
        return Err(UsageError::AllAndMirror.into());
    }

    if refspecs.is_empty() && !flags.contains(PushFlags::ALL) {
        if !remote.push_refspecs.is_empty() {
            tracing::debug!(remote = %remote.name, "using stored push refspecs");
            refspecs = remote.push_refspecs.clone();
        } else if !flags.contains(PushFlags::MIRROR) {
            refspecs = default_refspecs(store, &remote, &settings)?;
        }
    }

    tracing::debug!(
        remote = %remote.name,
        refspecs = ?refspecs.iter().map(ToString::to_string).collect::<Vec<_>>(),
        flags = %flags,
        "push planned"
    );
    Ok(PushPlan {
        remote,
        refspecs,
        flags,
        connect: options.connect_options(),
        advice: settings.advice,
    })
}

fn push_remote(store: &dyn ConfigStore, repo: Option<&str>) -> Result<Remote> {
    match store.push_remote(repo) {
        Ok(Some(remote)) => Ok(remote),
        Ok(None) => Err(match repo {
            Some(repo) => UsageError::BadRepository(repo.to_string()),
            None => UsageError::NoDestination,
        }
        .into()),
        Err(ConfigError::RemoteNotFound { name }) => Err(UsageError::BadRepository(name).into()),
        Err(err) => Err(err.into()),
    }
}

fn default_refspecs(store: &dyn ConfigStore, remote: &Remote, settings: &PushSettings) -> Result<Vec<Refspec>> {
    let branch = store.branch(None)?;
    let fetch_remote = store.fetch_remote()?;
    let ctx = PolicyContext {
        branch: branch.as_ref(),
        remote,
        triangular: is_triangular(remote, fetch_remote.as_ref()),
        explicit_mode: settings.mode_is_explicit(),
    };
    Ok(derive_refspecs(settings.effective_mode(), &ctx)?)
}

/// Prepare and dispatch a push.
pub async fn execute_push(
    store: &dyn ConfigStore,
    transport: &dyn Transport,
    reporter: &mut dyn Reporter,
    options: &PushOptions,
) -> Result<DispatchReport> {
    let plan = prepare_push(store, options)?;
    Ok(dispatch(transport, &plan, reporter).await?)
}

/// Run a whole push invocation and map it to an exit status.
///
/// Fatal errors are handed to `reporter` rather than returned.
pub async fn run_push(
    store: &dyn ConfigStore,
    transport: &dyn Transport,
    reporter: &mut dyn Reporter,
    options: &PushOptions,
) -> PushExit {
    match execute_push(store, transport, reporter, options).await {
        Ok(report) if report.is_success() => PushExit::Success,
        Ok(_) => PushExit::Failure,
        Err(err) => {
            report_fatal(reporter, &err);
            PushExit::Fatal
        }
    }
}

fn report_fatal(reporter: &mut dyn Reporter, err: &PushError) {
    tracing::debug!(error = ?err, "push aborted");
    reporter.fatal(&err.to_string());
}
