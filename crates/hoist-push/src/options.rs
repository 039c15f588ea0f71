use std::time::Duration;

use hoist_config::{PushSettings, RecurseSubmodules, SignPush};
use hoist_transport::{ConnectOptions, IpFamily, LeaseOption, PushFlags};

/// Everything one push invocation was asked to do.
///
/// Built once from the command line and never modified afterwards. Options
/// left as `None` fall back to [`PushSettings`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushOptions {
    /// Remote name or URL; `None` selects the configured push remote.
    pub repo: Option<String>,
    /// Refspec arguments following the repository.
    pub refspecs: Vec<String>,
    pub all: bool,
    pub mirror: bool,
    pub delete: bool,
    pub tags: bool,
    pub dry_run: bool,
    pub porcelain: bool,
    pub force: bool,
    pub lease: LeaseOption,
    pub set_upstream: bool,
    pub prune: bool,
    pub no_verify: bool,
    pub follow_tags: Option<bool>,
    pub atomic: bool,
    pub sign: Option<SignPush>,
    pub recurse_submodules: Option<RecurseSubmodules>,
    pub push_options: Vec<String>,
    pub verbosity: i32,
    pub progress: Option<bool>,
    pub thin: bool,
    pub family: IpFamily,
    pub receive_pack: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            repo: None,
            refspecs: Vec::new(),
            all: false,
            mirror: false,
            delete: false,
            tags: false,
            dry_run: false,
            porcelain: false,
            force: false,
            lease: LeaseOption::default(),
            set_upstream: false,
            prune: false,
            no_verify: false,
            follow_tags: None,
            atomic: false,
            sign: None,
            recurse_submodules: None,
            push_options: Vec::new(),
            verbosity: 0,
            progress: None,
            thin: true,
            family: IpFamily::Any,
            receive_pack: None,
            timeout: None,
        }
    }
}

impl PushOptions {
    /// Push to `repo` with the given refspec arguments.
    pub fn to(repo: impl Into<String>, refspecs: &[&str]) -> Self {
        Self {
            repo: Some(repo.into()),
            refspecs: refspecs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Flags for the transport, with configuration filling the gaps.
    ///
    /// `--mirror` implies `--force`.
    pub fn flags(&self, settings: &PushSettings) -> PushFlags {
        let mut flags = PushFlags::NONE;
        flags.set(PushFlags::ALL, self.all);
        flags.set(PushFlags::MIRROR | PushFlags::FORCE, self.mirror);
        flags.set(PushFlags::DRY_RUN, self.dry_run);
        flags.set(PushFlags::PORCELAIN, self.porcelain);
        if self.force {
            flags.insert(PushFlags::FORCE);
        }
        flags.set(PushFlags::SET_UPSTREAM, self.set_upstream);
        flags.set(PushFlags::PRUNE, self.prune);
        flags.set(PushFlags::NO_VERIFY, self.no_verify);
        flags.set(PushFlags::ATOMIC, self.atomic);
        flags.set(
            PushFlags::FOLLOW_TAGS,
            self.follow_tags.unwrap_or(settings.follow_tags),
        );
        flags.set(PushFlags::PUSH_OPTIONS, !self.push_options.is_empty());

        match self.sign.unwrap_or(settings.sign) {
            SignPush::Never => {}
            SignPush::Always => flags.insert(PushFlags::CERT_ALWAYS),
            SignPush::IfAsked => flags.insert(PushFlags::CERT_IF_ASKED),
        }
        match self.recurse_submodules.unwrap_or(settings.recurse_submodules) {
            RecurseSubmodules::No => {}
            RecurseSubmodules::Check => flags.insert(PushFlags::RECURSE_CHECK),
            RecurseSubmodules::OnDemand => flags.insert(PushFlags::RECURSE_ON_DEMAND),
            RecurseSubmodules::Only => flags.insert(PushFlags::RECURSE_ONLY),
        }
        flags
    }

    /// Per-connection settings handed to the transport.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            verbosity: self.verbosity,
            progress: self.progress,
            family: self.family,
            thin: self.thin,
            receive_pack: self.receive_pack.clone(),
            push_options: self.push_options.clone(),
            lease: self.lease.clone(),
            timeout: self.timeout,
        }
    }
}
