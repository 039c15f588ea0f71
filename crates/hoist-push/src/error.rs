//! Error types for the push pipeline.
//!
//! Everything here aborts the invocation before (usage, policy, config) or
//! instead of (dispatch) talking to any endpoint. Per-endpoint push failures
//! are not errors; they are counted in the
//! [`DispatchReport`](crate::dispatch::DispatchReport).

use thiserror::Error;

/// Invalid combinations of arguments and options.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("--delete is incompatible with --all, --mirror and --tags")]
    DeleteIncompatible,

    #[error("--delete doesn't make sense without any refs")]
    DeleteWithoutRefs,

    #[error("tag shorthand without <tag>")]
    TagWithoutName,

    #[error("--delete only accepts plain target ref names")]
    DeleteNotPlain,

    #[error("push options must not have new line characters")]
    PushOptionNewline,

    #[error("--all and --tags are incompatible")]
    AllAndTags,

    #[error("--all can't be combined with refspecs")]
    AllWithRefspecs,

    #[error("--mirror and --tags are incompatible")]
    MirrorAndTags,

    #[error("--mirror can't be combined with refspecs")]
    MirrorWithRefspecs,

    #[error("--all and --mirror are incompatible")]
    AllAndMirror,

    #[error("bad repository '{0}'")]
    BadRepository(String),

    #[error(
        "No configured push destination.\n\
         Either specify the URL from the command-line or configure a remote repository using\n\
         \n    git remote add <name> <url>\n\
         \nand then push using the remote name\n\
         \n    hoist push <name>\n"
    )]
    NoDestination,

    #[error(transparent)]
    Refspec(#[from] hoist_refs::RefError),

    #[error("{0}")]
    InvalidOption(String),
}

/// The push mode could not produce refspecs for the current state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error(
        "You are not currently on a branch.\n\
         To push the history leading to the current (detached HEAD)\n\
         state now, use\n\
         \n    hoist push {remote} HEAD:<name-of-remote-branch>\n"
    )]
    DetachedHead { remote: String },

    #[error(
        "The current branch {branch} has no upstream branch.\n\
         To push the current branch and set the remote as upstream, use\n\
         \n    hoist push --set-upstream {remote} {branch}\n"
    )]
    NoUpstream { branch: String, remote: String },

    #[error("The current branch {branch} has multiple upstream branches, refusing to push.")]
    MultipleUpstreams { branch: String },

    #[error(
        "You are pushing to remote '{remote}', which is not the upstream of\n\
         your current branch '{branch}', without telling me what to push\n\
         to update which remote branch."
    )]
    NotUpstreamRemote { remote: String, branch: String },

    #[error(
        "The upstream branch of your current branch does not match\n\
         the name of your current branch.  To push to the upstream branch\n\
         on the remote, use\n\
         \n    hoist push {remote} HEAD:{upstream}\n\
         \nTo push to the branch of the same name on the remote, use\n\
         \n    hoist push {remote} {branch}\n{}",
        mode_hint(.hint)
    )]
    UpstreamMismatch {
        remote: String,
        branch: String,
        upstream: String,
        hint: bool,
    },

    #[error("You didn't specify any refspecs to push, and push.default is \"nothing\".")]
    NothingToPush,
}

fn mode_hint(hint: &bool) -> &'static str {
    if *hint {
        "\nTo choose either option permanently, see push.default in the configuration."
    } else {
        ""
    }
}

/// Dispatch was refused before any endpoint was pushed to.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("underlying transport for '{url}' does not support --force-with-lease option")]
    ConditionalUpdateUnsupported { url: String },
}

/// Any error that aborts a push invocation.
#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] hoist_config::ConfigError),
}

/// Convenience type alias for push operations.
pub type Result<T> = std::result::Result<T, PushError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_hint_only_when_mode_unset() {
        let err = PolicyError::UpstreamMismatch {
            remote: "origin".into(),
            branch: "feature".into(),
            upstream: "main".into(),
            hint: true,
        };
        let text = err.to_string();
        assert!(text.contains("hoist push origin HEAD:main"));
        assert!(text.contains("hoist push origin feature"));
        assert!(text.contains("push.default"));

        let quiet = PolicyError::UpstreamMismatch {
            remote: "origin".into(),
            branch: "feature".into(),
            upstream: "main".into(),
            hint: false,
        };
        assert!(!quiet.to_string().contains("push.default"));
    }

    #[test]
    fn no_upstream_names_the_fix() {
        let err = PolicyError::NoUpstream {
            branch: "topic".into(),
            remote: "origin".into(),
        };
        assert!(err.to_string().contains("hoist push --set-upstream origin topic"));
    }
}
