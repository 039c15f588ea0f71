//! Default refspecs from the push mode.
//!
//! Used only when the invocation names no refspecs, passes neither `--all`
//! nor `--mirror`, and the remote stores no push refspecs of its own.

use hoist_config::PushMode;
use hoist_refs::{strip_heads_prefix, Branch, Refspec, Remote};

use crate::error::PolicyError;

/// The state the push mode is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct PolicyContext<'a> {
    /// The checked-out branch; `None` on a detached HEAD.
    pub branch: Option<&'a Branch>,
    /// The remote being pushed to.
    pub remote: &'a Remote,
    /// The fetch remote differs from the push remote.
    pub triangular: bool,
    /// `push.default` was set rather than defaulted.
    pub explicit_mode: bool,
}

/// `true` when the branch fetches from one remote and pushes to another.
pub fn is_triangular(push_remote: &Remote, fetch_remote: Option<&Remote>) -> bool {
    fetch_remote.is_some_and(|fetch| fetch.name != push_remote.name)
}

/// Derive the refspecs `mode` implies for `ctx`.
pub fn derive_refspecs(mode: PushMode, ctx: &PolicyContext<'_>) -> Result<Vec<Refspec>, PolicyError> {
    let specs = match mode {
        PushMode::Matching => vec![Refspec::matching()],
        PushMode::Simple if ctx.triangular => current(ctx)?,
        PushMode::Simple => upstream(ctx, true)?,
        PushMode::Upstream => upstream(ctx, false)?,
        PushMode::Current => current(ctx)?,
        PushMode::Nothing => return Err(PolicyError::NothingToPush),
    };
    tracing::debug!(
        %mode,
        triangular = ctx.triangular,
        refspecs = ?specs.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "derived default refspecs"
    );
    Ok(specs)
}

fn checked_out<'a>(ctx: &PolicyContext<'a>) -> Result<&'a Branch, PolicyError> {
    ctx.branch.ok_or_else(|| PolicyError::DetachedHead {
        remote: ctx.remote.name.clone(),
    })
}

fn current(ctx: &PolicyContext<'_>) -> Result<Vec<Refspec>, PolicyError> {
    let branch = checked_out(ctx)?;
    Ok(vec![Refspec::new(&branch.refname, &branch.refname)])
}

fn upstream(ctx: &PolicyContext<'_>, simple: bool) -> Result<Vec<Refspec>, PolicyError> {
    let branch = checked_out(ctx)?;
    if branch.merge.is_empty() || branch.remote.is_none() {
        return Err(PolicyError::NoUpstream {
            branch: branch.name.clone(),
            remote: ctx.remote.name.clone(),
        });
    }
    if branch.merge.len() > 1 {
        return Err(PolicyError::MultipleUpstreams {
            branch: branch.name.clone(),
        });
    }
    if ctx.triangular {
        return Err(PolicyError::NotUpstreamRemote {
            remote: ctx.remote.name.clone(),
            branch: branch.name.clone(),
        });
    }
    let Some(source) = branch.sole_upstream() else {
        return Err(PolicyError::NoUpstream {
            branch: branch.name.clone(),
            remote: ctx.remote.name.clone(),
        });
    };

    if simple && branch.refname != source {
        return Err(PolicyError::UpstreamMismatch {
            remote: ctx.remote.name.clone(),
            branch: branch.name.clone(),
            upstream: strip_heads_prefix(source).to_string(),
            hint: !ctx.explicit_mode,
        });
    }
    Ok(vec![Refspec::new(&branch.refname, source)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn origin() -> Remote {
        Remote::with_url("origin", "https://example.com/r.git")
    }

    /// Helper to build a context for `branch` pushing to `remote`.
    fn ctx<'a>(branch: Option<&'a Branch>, remote: &'a Remote, triangular: bool) -> PolicyContext<'a> {
        PolicyContext {
            branch,
            remote,
            triangular,
            explicit_mode: true,
        }
    }

    fn texts(specs: &[Refspec]) -> Vec<String> {
        specs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn simple_with_matching_upstream() {
        let remote = origin();
        let branch = Branch::new("x").tracking("origin", "refs/heads/x");
        let specs = derive_refspecs(PushMode::Simple, &ctx(Some(&branch), &remote, false)).unwrap();
        assert_eq!(texts(&specs), vec!["refs/heads/x:refs/heads/x"]);
    }

    #[test]
    fn simple_with_different_upstream_fails() {
        let remote = origin();
        let branch = Branch::new("feature").tracking("origin", "refs/heads/main");
        let err = derive_refspecs(PushMode::Simple, &ctx(Some(&branch), &remote, false)).unwrap_err();
        assert_eq!(
            err,
            PolicyError::UpstreamMismatch {
                remote: "origin".into(),
                branch: "feature".into(),
                upstream: "main".into(),
                hint: false,
            }
        );
    }

    #[test]
    fn unset_mode_adds_hint() {
        let remote = origin();
        let branch = Branch::new("feature").tracking("origin", "refs/heads/main");
        let context = PolicyContext {
            explicit_mode: false,
            ..ctx(Some(&branch), &remote, false)
        };
        let err = derive_refspecs(PushMode::Simple, &context).unwrap_err();
        assert!(matches!(err, PolicyError::UpstreamMismatch { hint: true, .. }));
    }

    #[test]
    fn simple_triangular_behaves_as_current() {
        let remote = Remote::with_url("fork", "https://example.com/fork.git");
        let branch = Branch::new("feature").tracking("origin", "refs/heads/main");
        let specs = derive_refspecs(PushMode::Simple, &ctx(Some(&branch), &remote, true)).unwrap();
        assert_eq!(texts(&specs), vec!["refs/heads/feature:refs/heads/feature"]);
    }

    #[test]
    fn upstream_mode_checks() {
        let remote = origin();

        let lonely = Branch::new("lonely");
        assert!(matches!(
            derive_refspecs(PushMode::Upstream, &ctx(Some(&lonely), &remote, false)),
            Err(PolicyError::NoUpstream { .. })
        ));

        let tracked = Branch::new("feature").tracking("origin", "refs/heads/main");
        assert!(matches!(
            derive_refspecs(PushMode::Upstream, &ctx(Some(&tracked), &remote, true)),
            Err(PolicyError::NotUpstreamRemote { .. })
        ));

        let specs = derive_refspecs(PushMode::Upstream, &ctx(Some(&tracked), &remote, false)).unwrap();
        assert_eq!(texts(&specs), vec!["refs/heads/feature:refs/heads/main"]);
    }

    #[test]
    fn upstream_with_unknown_source() {
        let remote = origin();
        let mut branch = Branch::new("odd").tracking("origin", "refs/heads/odd");
        branch.merge[0].src = None;
        assert!(matches!(
            derive_refspecs(PushMode::Upstream, &ctx(Some(&branch), &remote, false)),
            Err(PolicyError::NoUpstream { .. })
        ));
    }

    #[test]
    fn detached_head() {
        let remote = origin();
        for mode in [PushMode::Simple, PushMode::Upstream, PushMode::Current] {
            assert_eq!(
                derive_refspecs(mode, &ctx(None, &remote, false)).unwrap_err(),
                PolicyError::DetachedHead { remote: "origin".into() }
            );
        }
    }

    #[test]
    fn current_and_nothing() {
        let remote = origin();
        let branch = Branch::new("wip");
        let specs = derive_refspecs(PushMode::Current, &ctx(Some(&branch), &remote, false)).unwrap();
        assert_eq!(texts(&specs), vec!["refs/heads/wip:refs/heads/wip"]);
        assert_eq!(
            derive_refspecs(PushMode::Nothing, &ctx(Some(&branch), &remote, false)).unwrap_err(),
            PolicyError::NothingToPush
        );
    }

    #[test]
    fn triangular_detection() {
        let origin = origin();
        let fork = Remote::with_url("fork", "https://example.com/fork.git");
        assert!(!is_triangular(&origin, Some(&origin)));
        assert!(is_triangular(&fork, Some(&origin)));
        assert!(!is_triangular(&fork, None));
    }

    fn branch_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,10}(/[a-z][a-z0-9-]{0,6})?"
    }

    fn arbitrary_branch() -> impl Strategy<Value = Option<Branch>> {
        proptest::option::of((branch_name(), proptest::collection::vec(branch_name(), 0..3)).prop_map(
            |(name, upstreams)| {
                let mut branch = Branch::new(name);
                for upstream in upstreams {
                    branch = branch.tracking("origin", format!("refs/heads/{upstream}"));
                }
                branch
            },
        ))
    }

    proptest! {
        #[test]
        fn simple_triangular_never_raises_mismatch(name in branch_name(), upstream in branch_name()) {
            let remote = Remote::with_url("fork", "https://example.com/fork.git");
            let branch = Branch::new(name.clone()).tracking("origin", format!("refs/heads/{upstream}"));
            let specs = derive_refspecs(PushMode::Simple, &ctx(Some(&branch), &remote, true)).unwrap();
            let full = format!("refs/heads/{name}");
            prop_assert_eq!(specs, vec![Refspec::new(full.clone(), full)]);
        }

        #[test]
        fn simple_mismatch_never_substitutes_current(name in branch_name(), upstream in branch_name()) {
            prop_assume!(name != upstream);
            let remote = origin();
            let branch = Branch::new(name).tracking("origin", format!("refs/heads/{upstream}"));
            let result = derive_refspecs(PushMode::Simple, &ctx(Some(&branch), &remote, false));
            prop_assert!(
                matches!(result, Err(PolicyError::UpstreamMismatch { .. })),
                "expected an upstream mismatch"
            );
        }

        #[test]
        fn upstream_with_two_entries_always_fails(
            name in branch_name(),
            first in branch_name(),
            second in branch_name(),
            triangular in any::<bool>(),
        ) {
            let remote = origin();
            let branch = Branch::new(name)
                .tracking("origin", format!("refs/heads/{first}"))
                .tracking("origin", format!("refs/heads/{second}"));
            prop_assert!(derive_refspecs(PushMode::Upstream, &ctx(Some(&branch), &remote, triangular)).is_err());
        }

        #[test]
        fn matching_ignores_branch_state(branch in arbitrary_branch(), triangular in any::<bool>()) {
            let remote = origin();
            let specs = derive_refspecs(PushMode::Matching, &ctx(branch.as_ref(), &remote, triangular)).unwrap();
            prop_assert_eq!(specs, vec![Refspec::matching()]);
        }
    }
}
