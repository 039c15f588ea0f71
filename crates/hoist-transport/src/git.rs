//! [`GitTransport`]: pushes through libgit2.
//!
//! libgit2 handles the wire protocol. Before anything is sent, each
//! connection lists the remote's refs, expands the refspecs against local and
//! remote refs, and classifies every update with [`classify_update`]. Only
//! updates that pass are sent, so rejections carry the same reasons a
//! smart server would give. Atomic pushes are all-or-nothing on this side:
//! if any update is rejected, none is sent.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use async_trait::async_trait;
use git2::{Cred, Direction, Oid, RemoteCallbacks, Repository};

use hoist_refs::{
    count_ref_matches, RefMatch, Refspec, Remote, HEADS_PREFIX, REMOTES_PREFIX, TAGS_PREFIX,
};

use crate::error::{Result, TransportError};
use crate::flags::PushFlags;
use crate::options::{ConnectOptions, IpFamily, LeaseExpect};
use crate::status::{classify_update, PushOutcome, RefOutcome, RefStatus, UpdateFacts};
use crate::traits::{Connection, Transport};

/// A [`Transport`] over libgit2, pushing from the repository at `git_dir`.
#[derive(Clone, Debug)]
pub struct GitTransport {
    git_dir: PathBuf,
}

impl GitTransport {
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
        }
    }
}

impl Transport for GitTransport {
    fn connect(
        &self,
        remote: &Remote,
        url: &str,
        options: &ConnectOptions,
    ) -> Result<Box<dyn Connection>> {
        if options.family != IpFamily::Any {
            tracing::warn!(url, family = ?options.family, "address family cannot be selected; ignoring");
        }
        if let Some(program) = &options.receive_pack {
            tracing::warn!(url, program = %program, "receive-pack override is not supported; ignoring");
        }
        if !options.thin {
            tracing::debug!(url, "thin packs are chosen by libgit2; ignoring --no-thin");
        }
        Ok(Box::new(GitConnection {
            git_dir: self.git_dir.clone(),
            remote_name: remote.name.clone(),
            url: url.to_string(),
            options: options.clone(),
        }))
    }
}

struct GitConnection {
    git_dir: PathBuf,
    remote_name: String,
    url: String,
    options: ConnectOptions,
}

#[async_trait]
impl Connection for GitConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn supports_conditional_update(&self) -> bool {
        true
    }

    async fn push_refs(&mut self, refspecs: &[Refspec], flags: PushFlags) -> Result<PushOutcome> {
        let job = PushJob {
            git_dir: self.git_dir.clone(),
            remote_name: self.remote_name.clone(),
            url: self.url.clone(),
            options: self.options.clone(),
            refspecs: refspecs.to_vec(),
            flags,
        };
        let task = tokio::task::spawn_blocking(move || job.run());
        let joined = match self.options.timeout {
            Some(after) => tokio::time::timeout(after, task)
                .await
                .map_err(|_| TransportError::Timeout {
                    url: self.url.clone(),
                    after,
                })?,
            None => task.await,
        };
        joined.map_err(|e| TransportError::Task(e.to_string()))?
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One concrete update after refspec expansion.
#[derive(Clone, Debug)]
struct PlannedUpdate {
    src: Option<String>,
    dst: String,
    new: Option<Oid>,
    force: bool,
}

struct PushJob {
    git_dir: PathBuf,
    remote_name: String,
    url: String,
    options: ConnectOptions,
    refspecs: Vec<Refspec>,
    flags: PushFlags,
}

impl PushJob {
    fn run(self) -> Result<PushOutcome> {
        self.check_flags()?;
        let repo = Repository::open(&self.git_dir)?;
        let head_ref = head_ref(&repo);

        let mut remote = repo.remote_anonymous(&self.url)?;
        let remote_refs = self.list_remote(&repo, &mut remote)?;
        let local_refs = local_refs(&repo)?;
        tracing::debug!(
            url = %self.url,
            remote_refs = remote_refs.len(),
            local_refs = local_refs.len(),
            "listed refs"
        );

        let planned = self.plan(&repo, &local_refs, &remote_refs)?;
        let mut updates = planned
            .iter()
            .map(|update| self.classify(&repo, update, &remote_refs))
            .collect::<Result<Vec<_>>>()?;

        if self.flags.contains(PushFlags::ATOMIC) && updates.iter().any(|u| u.status.is_rejected())
        {
            for update in updates.iter_mut().filter(|u| u.status.needs_send()) {
                update.status = RefStatus::AtomicPushFailed;
            }
        }

        if !self.flags.contains(PushFlags::DRY_RUN) {
            self.send(&repo, &mut remote, &mut updates)?;
            if self.flags.contains(PushFlags::SET_UPSTREAM) {
                self.set_upstream(&repo, &updates)?;
            }
        }

        Ok(PushOutcome::from_updates(updates, head_ref.as_deref()))
    }

    fn check_flags(&self) -> Result<()> {
        if self.flags.contains(PushFlags::CERT_ALWAYS) {
            return Err(TransportError::Unsupported("signed push".into()));
        }
        if self.flags.contains(PushFlags::CERT_IF_ASKED) {
            tracing::debug!(url = %self.url, "signed push unavailable; pushing unsigned");
        }
        if self.flags.contains(PushFlags::RECURSE_ONLY) {
            return Err(TransportError::Unsupported("--recurse-submodules=only".into()));
        }
        if self.flags.contains(PushFlags::RECURSE_CHECK)
            || self.flags.contains(PushFlags::RECURSE_ON_DEMAND)
        {
            tracing::warn!(url = %self.url, "submodules are not pushed or checked");
        }
        Ok(())
    }

    fn list_remote(
        &self,
        repo: &Repository,
        remote: &mut git2::Remote<'_>,
    ) -> Result<HashMap<String, Oid>> {
        let connection = remote
            .connect_auth(Direction::Push, Some(credential_callbacks(repo)), None)
            .map_err(|e| TransportError::Connect {
                url: self.url.clone(),
                message: e.message().to_string(),
            })?;
        let heads = connection
            .list()?
            .iter()
            .filter(|head| head.name().starts_with("refs/") && !head.name().ends_with("^{}"))
            .map(|head| (head.name().to_string(), head.oid()))
            .collect();
        Ok(heads)
    }

    /// Expand flags and refspecs into concrete updates, one per destination.
    fn plan(
        &self,
        repo: &Repository,
        local: &BTreeMap<String, Oid>,
        remote: &HashMap<String, Oid>,
    ) -> Result<Vec<PlannedUpdate>> {
        let mut planned = Vec::new();
        let mirror = self.flags.contains(PushFlags::MIRROR);

        if mirror {
            for (name, oid) in local {
                planned.push(PlannedUpdate {
                    src: Some(name.clone()),
                    dst: name.clone(),
                    new: Some(*oid),
                    force: true,
                });
            }
        } else if self.flags.contains(PushFlags::ALL) {
            for (name, oid) in local.iter().filter(|(name, _)| name.starts_with(HEADS_PREFIX)) {
                planned.push(PlannedUpdate {
                    src: Some(name.clone()),
                    dst: name.clone(),
                    new: Some(*oid),
                    force: false,
                });
            }
        }

        for spec in &self.refspecs {
            self.expand(repo, spec, local, remote, &mut planned)?;
        }

        if mirror || self.flags.contains(PushFlags::PRUNE) {
            self.plan_prune(local, remote, &mut planned);
        }
        if self.flags.contains(PushFlags::FOLLOW_TAGS) {
            follow_tags(repo, local, remote, &mut planned)?;
        }

        let mut seen = HashSet::new();
        planned.retain(|update| seen.insert(update.dst.clone()));
        Ok(planned)
    }

    fn expand(
        &self,
        repo: &Repository,
        spec: &Refspec,
        local: &BTreeMap<String, Oid>,
        remote: &HashMap<String, Oid>,
        planned: &mut Vec<PlannedUpdate>,
    ) -> Result<()> {
        if spec.is_matching() {
            for (name, oid) in local {
                if name.starts_with(HEADS_PREFIX) && remote.contains_key(name) {
                    planned.push(PlannedUpdate {
                        src: Some(name.clone()),
                        dst: name.clone(),
                        new: Some(*oid),
                        force: spec.force,
                    });
                }
            }
            return Ok(());
        }

        if spec.is_deletion() {
            let dst = expand_destination(spec.destination(), None, remote)?;
            planned.push(PlannedUpdate {
                src: None,
                dst,
                new: None,
                force: spec.force,
            });
            return Ok(());
        }

        if spec.is_pattern() {
            for (name, oid) in local {
                if let Some(dst) = spec.map_source(name) {
                    planned.push(PlannedUpdate {
                        src: Some(name.clone()),
                        dst,
                        new: Some(*oid),
                        force: spec.force,
                    });
                }
            }
            return Ok(());
        }

        let (src, new) = resolve_source(repo, &spec.src, local)?;
        let dst = match (&spec.dst, &src) {
            (Some(dst), _) => expand_destination(dst, src.as_deref(), remote)?,
            (None, Some(src)) => src.clone(),
            (None, None) => {
                return Err(TransportError::BadDestination {
                    dst: spec.src.clone(),
                    reason: "a destination is required when pushing a revision".into(),
                })
            }
        };
        planned.push(PlannedUpdate {
            src,
            dst,
            new: Some(new),
            force: spec.force,
        });
        Ok(())
    }

    /// Delete remote refs whose local counterparts are gone.
    fn plan_prune(
        &self,
        local: &BTreeMap<String, Oid>,
        remote: &HashMap<String, Oid>,
        planned: &mut Vec<PlannedUpdate>,
    ) {
        let mut patterns: Vec<Refspec> = self
            .refspecs
            .iter()
            .filter(|spec| spec.is_pattern())
            .cloned()
            .collect();
        if self.flags.contains(PushFlags::ALL) {
            patterns.push(Refspec::new("refs/heads/*", "refs/heads/*"));
        }
        let mirror = self.flags.contains(PushFlags::MIRROR);

        let mut stale: Vec<&String> = remote
            .keys()
            .filter(|name| {
                if mirror {
                    return !local.contains_key(*name);
                }
                patterns.iter().any(|spec| {
                    spec.map_destination(name)
                        .is_some_and(|src| !local.contains_key(&src))
                })
            })
            .collect();
        stale.sort();
        for name in stale {
            planned.push(PlannedUpdate {
                src: None,
                dst: name.clone(),
                new: None,
                force: true,
            });
        }
    }

    fn classify(
        &self,
        repo: &Repository,
        update: &PlannedUpdate,
        remote: &HashMap<String, Oid>,
    ) -> Result<RefOutcome> {
        let old = remote.get(&update.dst).copied();
        let old_known = old.is_some_and(|oid| repo.find_object(oid, None).is_ok());
        let both_commits = match (old, update.new) {
            (Some(old), Some(new)) => repo.find_commit(old).is_ok() && repo.find_commit(new).is_ok(),
            _ => false,
        };
        let fast_forward = match (old, update.new) {
            (Some(old), Some(new)) if both_commits => {
                old == new || repo.graph_descendant_of(new, old)?
            }
            _ => false,
        };

        let expected = self.lease_expectation(repo, &update.dst)?;
        let old_hex = old.map(|oid| oid.to_string());
        let new_hex = update.new.map(|oid| oid.to_string());
        let facts = UpdateFacts {
            dst: &update.dst,
            old: old_hex.as_deref(),
            new: new_hex.as_deref(),
            force: update.force || self.flags.contains(PushFlags::FORCE),
            expected_old: expected.as_ref().map(|e| e.as_deref()),
            old_known,
            both_commits,
            fast_forward,
        };
        let status = classify_update(&facts);
        tracing::debug!(dst = %update.dst, ?status, "classified update");

        Ok(RefOutcome::new(update.src.clone(), update.dst.clone(), status)
            .with_ids(old_hex, new_hex))
    }

    /// The resolved lease for `dst`: `Some(None)` expects the ref absent.
    fn lease_expectation(&self, repo: &Repository, dst: &str) -> Result<Option<Option<String>>> {
        let Some(expectation) = self.options.lease.expectation_for(dst) else {
            return Ok(None);
        };
        let expected = match expectation {
            LeaseExpect::Absent => None,
            LeaseExpect::Value(rev) => Some(repo.revparse_single(&rev)?.id().to_string()),
            LeaseExpect::Tracking => {
                let tracking = dst
                    .strip_prefix(HEADS_PREFIX)
                    .map(|branch| format!("{REMOTES_PREFIX}{}/{branch}", self.remote_name));
                tracking
                    .and_then(|name| repo.refname_to_id(&name).ok())
                    .map(|oid| oid.to_string())
            }
        };
        Ok(Some(expected))
    }

    fn send(
        &self,
        repo: &Repository,
        remote: &mut git2::Remote<'_>,
        updates: &mut [RefOutcome],
    ) -> Result<()> {
        let specs: Vec<String> = updates
            .iter()
            .filter(|u| u.status.needs_send())
            .map(|u| {
                let force = if u.status == RefStatus::Forced { "+" } else { "" };
                match (&u.src, &u.new) {
                    (_, None) => format!(":{}", u.dst),
                    (Some(src), Some(_)) => format!("{force}{src}:{}", u.dst),
                    (None, Some(new)) => format!("{force}{new}:{}", u.dst),
                }
            })
            .collect();
        if specs.is_empty() {
            return Ok(());
        }

        let statuses: RefCell<HashMap<String, Option<String>>> = RefCell::new(HashMap::new());
        {
            let mut callbacks = credential_callbacks(repo);
            callbacks.push_update_reference(|refname, status| {
                statuses
                    .borrow_mut()
                    .insert(refname.to_string(), status.map(str::to_string));
                Ok(())
            });
            if self.options.progress != Some(false) && self.options.verbosity >= 0 {
                callbacks.push_transfer_progress(|current, total, bytes| {
                    tracing::trace!(current, total, bytes, "writing objects");
                });
            }

            let push_options: Vec<&str> =
                self.options.push_options.iter().map(String::as_str).collect();
            let mut options = git2::PushOptions::new();
            options.remote_callbacks(callbacks);
            if !push_options.is_empty() {
                options.remote_push_options(&push_options);
            }

            tracing::debug!(url = %self.url, refspecs = ?specs, "sending updates");
            remote.push(specs.as_slice(), Some(&mut options))?;
        }

        let statuses = statuses.into_inner();
        for update in updates.iter_mut().filter(|u| u.status.needs_send()) {
            if let Some(Some(message)) = statuses.get(&update.dst) {
                update.status = RefStatus::RemoteReject(Some(message.clone()));
            }
        }
        Ok(())
    }

    /// Record `branch.<name>.remote` and `.merge` for every pushed branch.
    fn set_upstream(&self, repo: &Repository, updates: &[RefOutcome]) -> Result<()> {
        if repo.find_remote(&self.remote_name).is_err() {
            tracing::debug!(remote = %self.remote_name, "not a configured remote; upstream not set");
            return Ok(());
        }
        let mut config = repo.config()?;
        for update in updates {
            if update.status.is_rejected() || update.new.is_none() {
                continue;
            }
            let Some(branch) = update.src.as_deref().and_then(|s| s.strip_prefix(HEADS_PREFIX))
            else {
                continue;
            };
            if !update.dst.starts_with(HEADS_PREFIX) {
                continue;
            }
            config.set_str(&format!("branch.{branch}.remote"), &self.remote_name)?;
            config.set_str(&format!("branch.{branch}.merge"), &update.dst)?;
            tracing::info!(branch, remote = %self.remote_name, merge = %update.dst, "set upstream");
        }
        Ok(())
    }
}

/// Credentials from the ssh agent or a credential helper.
fn credential_callbacks<'a>(repo: &Repository) -> RemoteCallbacks<'a> {
    let config = repo.config().ok();
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username_from_url, allowed| {
        if allowed.is_ssh_key() {
            if let Some(user) = username_from_url {
                return Cred::ssh_key_from_agent(user);
            }
        }
        if allowed.is_user_pass_plaintext() {
            if let Some(config) = &config {
                if let Ok(cred) = Cred::credential_helper(config, url, username_from_url) {
                    return Ok(cred);
                }
            }
        }
        Cred::default()
    });
    callbacks
}

/// Full name of the checked-out branch, if any.
fn head_ref(repo: &Repository) -> Option<String> {
    repo.find_reference("HEAD")
        .ok()
        .and_then(|head| head.symbolic_target().map(str::to_string))
}

/// Every direct local ref and the object it names.
fn local_refs(repo: &Repository) -> Result<BTreeMap<String, Oid>> {
    let mut refs = BTreeMap::new();
    for reference in repo.references()? {
        let reference = reference?;
        if let (Some(name), Some(oid)) = (reference.name(), reference.target()) {
            refs.insert(name.to_string(), oid);
        }
    }
    Ok(refs)
}

/// Resolve a refspec source to its full ref name (when it names a ref) and
/// the object to push.
fn resolve_source(
    repo: &Repository,
    src: &str,
    local: &BTreeMap<String, Oid>,
) -> Result<(Option<String>, Oid)> {
    let names: Vec<&str> = local.keys().map(String::as_str).collect();
    match count_ref_matches(src, &names) {
        RefMatch::Unique(full) => {
            if let Some(oid) = local.get(&full).copied() {
                return Ok((Some(full), oid));
            }
        }
        RefMatch::Ambiguous(_) => {
            return Err(TransportError::NoMatch(format!("{src} (matches more than one)")));
        }
        RefMatch::None => {}
    }
    if src == "HEAD" || src == "@" {
        if let Some(branch) = head_ref(repo) {
            let oid = repo.refname_to_id(&branch)?;
            return Ok((Some(branch), oid));
        }
    }
    let object = repo
        .revparse_single(src)
        .map_err(|_| TransportError::NoMatch(src.to_string()))?;
    Ok((None, object.id()))
}

/// Turn a possibly abbreviated destination into a full ref name.
///
/// Full names pass through. Otherwise a unique match among the remote's refs
/// wins; failing that, the destination lands next to the source: under
/// `refs/tags/` for tags and `refs/heads/` for everything else.
fn expand_destination(
    dst: &str,
    src: Option<&str>,
    remote: &HashMap<String, Oid>,
) -> Result<String> {
    if dst.starts_with("refs/") {
        return Ok(dst.to_string());
    }
    let mut names: Vec<&str> = remote.keys().map(String::as_str).collect();
    names.sort_unstable();
    match count_ref_matches(dst, &names) {
        RefMatch::Unique(full) => Ok(full),
        RefMatch::Ambiguous(_) => Err(TransportError::BadDestination {
            dst: dst.to_string(),
            reason: "matches more than one remote ref".into(),
        }),
        RefMatch::None if src.is_some_and(|s| s.starts_with(TAGS_PREFIX)) => {
            Ok(format!("{TAGS_PREFIX}{dst}"))
        }
        RefMatch::None => Ok(format!("{HEADS_PREFIX}{dst}")),
    }
}

/// Add annotated tags that point into the pushed history and are missing on
/// the remote.
fn follow_tags(
    repo: &Repository,
    local: &BTreeMap<String, Oid>,
    remote: &HashMap<String, Oid>,
    planned: &mut Vec<PlannedUpdate>,
) -> Result<()> {
    let pushed: Vec<Oid> = planned
        .iter()
        .filter_map(|u| u.new)
        .filter(|oid| repo.find_commit(*oid).is_ok())
        .collect();
    let mut extra = Vec::new();
    for (name, oid) in local {
        if !name.starts_with(TAGS_PREFIX) || remote.contains_key(name) {
            continue;
        }
        let Ok(tag) = repo.find_tag(*oid) else {
            continue;
        };
        let target = tag.target_id();
        let mut reachable = false;
        for tip in &pushed {
            if *tip == target || repo.graph_descendant_of(*tip, target)? {
                reachable = true;
                break;
            }
        }
        if reachable {
            extra.push(PlannedUpdate {
                src: Some(name.clone()),
                dst: name.clone(),
                new: Some(*oid),
                force: false,
            });
        }
    }
    planned.extend(extra);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _local_dir: TempDir,
        _remote_dir: TempDir,
        local: Repository,
        remote: Repository,
        url: String,
    }

    /// Helper to create a local repository with one commit on `main` and an
    /// empty bare repository configured as `origin`.
    fn fixture() -> Fixture {
        let local_dir = TempDir::new().unwrap();
        let remote_dir = TempDir::new().unwrap();
        let local = Repository::init(local_dir.path()).unwrap();
        let remote = Repository::init_bare(remote_dir.path()).unwrap();
        let url = remote_dir.path().to_string_lossy().to_string();

        local.set_head("refs/heads/main").unwrap();
        {
            let mut config = local.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        local.remote("origin", &url).unwrap();
        commit(&local, Some("HEAD"), "init");

        Fixture {
            _local_dir: local_dir,
            _remote_dir: remote_dir,
            local,
            remote,
            url,
        }
    }

    /// Helper to commit the empty tree on top of `update_ref` (or as a root
    /// commit when the ref does not exist yet).
    fn commit(repo: &Repository, update_ref: Option<&str>, message: &str) -> Oid {
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = repo.signature().unwrap();
        let parent = update_ref
            .and_then(|name| repo.refname_to_id(name).ok())
            .map(|oid| repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(update_ref, &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    async fn push(fx: &Fixture, specs: &[&str], flags: PushFlags) -> Result<PushOutcome> {
        push_with(fx, specs, flags, ConnectOptions::default()).await
    }

    async fn push_with(
        fx: &Fixture,
        specs: &[&str],
        flags: PushFlags,
        options: ConnectOptions,
    ) -> Result<PushOutcome> {
        let transport = GitTransport::new(fx.local.path());
        let remote = Remote::with_url("origin", fx.url.clone());
        let mut conn = transport.connect(&remote, &fx.url, &options)?;
        let refspecs: Vec<Refspec> = specs.iter().map(|s| Refspec::parse(s).unwrap()).collect();
        let outcome = conn.push_refs(&refspecs, flags).await;
        conn.close().await?;
        outcome
    }

    fn remote_ref(fx: &Fixture, name: &str) -> Option<Oid> {
        fx.remote.refname_to_id(name).ok()
    }

    #[tokio::test]
    async fn push_new_branch_then_up_to_date() {
        let fx = fixture();
        let head = fx.local.refname_to_id("refs/heads/main").unwrap();

        let outcome = push(&fx, &["main"], PushFlags::NONE).await.unwrap();
        assert_eq!(outcome.updates.len(), 1);
        assert_eq!(outcome.updates[0].dst, "refs/heads/main");
        assert_eq!(outcome.updates[0].status, RefStatus::New);
        assert_eq!(remote_ref(&fx, "refs/heads/main"), Some(head));

        let again = push(&fx, &["main"], PushFlags::NONE).await.unwrap();
        assert_eq!(again.updates[0].status, RefStatus::UpToDate);
        assert!(!again.has_rejections());
    }

    #[tokio::test]
    async fn fast_forward_update() {
        let fx = fixture();
        push(&fx, &["main"], PushFlags::NONE).await.unwrap();
        let next = commit(&fx.local, Some("HEAD"), "second");

        let outcome = push(&fx, &["refs/heads/main:refs/heads/main"], PushFlags::NONE)
            .await
            .unwrap();
        assert_eq!(outcome.updates[0].status, RefStatus::FastForward);
        assert_eq!(remote_ref(&fx, "refs/heads/main"), Some(next));
    }

    #[tokio::test]
    async fn diverged_history_is_rejected_unless_forced() {
        let fx = fixture();
        push(&fx, &["main"], PushFlags::NONE).await.unwrap();
        let pushed = remote_ref(&fx, "refs/heads/main");
        let other = commit(&fx.local, Some("refs/heads/other"), "unrelated root");

        let outcome = push(&fx, &["other:main"], PushFlags::NONE).await.unwrap();
        assert_eq!(outcome.updates[0].status, RefStatus::RejectNonFastForward);
        assert_eq!(outcome.reasons, crate::RejectReasons::NON_FF_OTHER);
        assert_eq!(remote_ref(&fx, "refs/heads/main"), pushed);

        let forced = push(&fx, &["+other:main"], PushFlags::NONE).await.unwrap();
        assert_eq!(forced.updates[0].status, RefStatus::Forced);
        assert_eq!(remote_ref(&fx, "refs/heads/main"), Some(other));
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let fx = fixture();
        let outcome = push(&fx, &["main"], PushFlags::DRY_RUN).await.unwrap();
        assert_eq!(outcome.updates[0].status, RefStatus::New);
        assert_eq!(remote_ref(&fx, "refs/heads/main"), None);
    }

    #[tokio::test]
    async fn delete_remote_branch() {
        let fx = fixture();
        push(&fx, &["main", "main:refs/heads/scratch"], PushFlags::NONE)
            .await
            .unwrap();
        assert!(remote_ref(&fx, "refs/heads/scratch").is_some());

        let outcome = push(&fx, &[":scratch"], PushFlags::NONE).await.unwrap();
        assert_eq!(outcome.updates[0].dst, "refs/heads/scratch");
        assert_eq!(outcome.updates[0].status, RefStatus::Deleted);
        assert_eq!(remote_ref(&fx, "refs/heads/scratch"), None);

        let missing = push(&fx, &[":scratch"], PushFlags::NONE).await.unwrap();
        assert!(missing.has_rejections());
    }

    #[tokio::test]
    async fn atomic_push_sends_nothing_when_one_ref_is_rejected() {
        let fx = fixture();
        push(&fx, &["main"], PushFlags::NONE).await.unwrap();
        commit(&fx.local, Some("refs/heads/other"), "unrelated root");

        let outcome = push(&fx, &["other:main", "main:refs/heads/fresh"], PushFlags::ATOMIC)
            .await
            .unwrap();
        assert_eq!(outcome.updates[0].status, RefStatus::RejectNonFastForward);
        assert_eq!(outcome.updates[1].status, RefStatus::AtomicPushFailed);
        assert_eq!(remote_ref(&fx, "refs/heads/fresh"), None);
    }

    #[tokio::test]
    async fn stale_lease_is_rejected() {
        let fx = fixture();
        push(&fx, &["main"], PushFlags::NONE).await.unwrap();
        commit(&fx.local, Some("refs/heads/other"), "unrelated root");

        let mut options = ConnectOptions::default();
        options.lease.apply(Some("main:")).unwrap();
        let outcome = push_with(&fx, &["+other:main"], PushFlags::NONE, options)
            .await
            .unwrap();
        assert_eq!(outcome.updates[0].status, RefStatus::RejectStale);
    }

    #[tokio::test]
    async fn matching_lease_forces_update() {
        let fx = fixture();
        push(&fx, &["main"], PushFlags::NONE).await.unwrap();
        let pushed = remote_ref(&fx, "refs/heads/main").unwrap();
        let other = commit(&fx.local, Some("refs/heads/other"), "unrelated root");

        let mut options = ConnectOptions::default();
        options.lease.apply(Some(&format!("main:{pushed}"))).unwrap();
        let outcome = push_with(&fx, &["other:main"], PushFlags::NONE, options)
            .await
            .unwrap();
        assert_eq!(outcome.updates[0].status, RefStatus::Forced);
        assert_eq!(remote_ref(&fx, "refs/heads/main"), Some(other));
    }

    #[tokio::test]
    async fn set_upstream_records_tracking() {
        let fx = fixture();
        push(&fx, &["main"], PushFlags::SET_UPSTREAM).await.unwrap();
        let config = fx.local.config().unwrap().snapshot().unwrap();
        assert_eq!(config.get_string("branch.main.remote").unwrap(), "origin");
        assert_eq!(config.get_string("branch.main.merge").unwrap(), "refs/heads/main");
    }

    #[tokio::test]
    async fn push_all_and_prune() {
        let fx = fixture();
        let head = fx.local.head().unwrap().peel_to_commit().unwrap();
        fx.local.branch("topic", &head, false).unwrap();
        push(&fx, &["main:refs/heads/gone"], PushFlags::NONE).await.unwrap();

        let outcome = push(&fx, &[], PushFlags::ALL | PushFlags::PRUNE).await.unwrap();
        let dsts: Vec<_> = outcome.updates.iter().map(|u| u.dst.as_str()).collect();
        assert_eq!(dsts, vec!["refs/heads/main", "refs/heads/topic", "refs/heads/gone"]);
        assert!(remote_ref(&fx, "refs/heads/topic").is_some());
        assert_eq!(remote_ref(&fx, "refs/heads/gone"), None);
    }

    #[tokio::test]
    async fn follow_tags_adds_annotated_tags() {
        let fx = fixture();
        let head = fx.local.head().unwrap().peel_to_commit().unwrap();
        let sig = fx.local.signature().unwrap();
        fx.local
            .tag("v1", head.as_object(), &sig, "release", false)
            .unwrap();

        let outcome = push(&fx, &["main"], PushFlags::FOLLOW_TAGS).await.unwrap();
        let dsts: Vec<_> = outcome.updates.iter().map(|u| u.dst.as_str()).collect();
        assert_eq!(dsts, vec!["refs/heads/main", "refs/tags/v1"]);
        assert!(remote_ref(&fx, "refs/tags/v1").is_some());
    }

    #[tokio::test]
    async fn unknown_source_is_an_error() {
        let fx = fixture();
        let err = push(&fx, &["nope"], PushFlags::NONE).await.unwrap_err();
        assert!(matches!(err, TransportError::NoMatch(_)));
    }

    #[tokio::test]
    async fn signed_push_is_unsupported() {
        let fx = fixture();
        let err = push(&fx, &["main"], PushFlags::CERT_ALWAYS).await.unwrap_err();
        assert!(matches!(err, TransportError::Unsupported(_)));
    }
}
