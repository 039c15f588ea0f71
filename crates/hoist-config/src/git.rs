//! [`GitConfigStore`]: a [`ConfigStore`] over a repository's git config.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use git2::{BranchType, Config, ErrorCode, Repository};

use hoist_refs::{Branch, Refspec, Remote, Tracking, HEADS_PREFIX};

use crate::error::{ConfigError, Result};
use crate::settings::{
    parse_bool, AdviceSettings, PushMode, PushSettings, RecurseSubmodules, SignPush,
};
use crate::store::ConfigStore;

/// Reads remotes, branches and push settings from a git repository.
pub struct GitConfigStore {
    repo: Mutex<Repository>,
    git_dir: PathBuf,
}

impl GitConfigStore {
    /// Open the repository containing `path`, searching parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self::from_repository(repo))
    }

    pub fn from_repository(repo: Repository) -> Self {
        let git_dir = repo.path().to_path_buf();
        Self {
            repo: Mutex::new(repo),
            git_dir,
        }
    }

    /// The repository's `.git` directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn repo(&self) -> Result<MutexGuard<'_, Repository>> {
        self.repo
            .lock()
            .map_err(|e| ConfigError::Poisoned(e.to_string()))
    }

    fn config(&self) -> Result<Config> {
        let mut config = self.repo()?.config()?;
        Ok(config.snapshot()?)
    }

    fn read_branch(config: &Config, name: &str) -> Result<Branch> {
        let mut branch = Branch::new(name);
        branch.remote = get_string(config, &format!("branch.{name}.remote"))?;
        branch.push_remote = get_string(config, &format!("branch.{name}.pushRemote"))?;
        branch.merge = multivar(config, &format!("branch.{name}.merge"))?
            .into_iter()
            .map(Tracking::new)
            .collect();
        Ok(branch)
    }

    fn current_branch_name(repo: &Repository) -> Result<Option<String>> {
        let head = match repo.find_reference("HEAD") {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix(HEADS_PREFIX))
            .map(str::to_string))
    }
}

impl ConfigStore for GitConfigStore {
    fn remote(&self, name: &str) -> Result<Option<Remote>> {
        let config = self.config()?;
        let urls = multivar(&config, &format!("remote.{name}.url"))?;
        let push_urls = multivar(&config, &format!("remote.{name}.pushurl"))?;
        if urls.is_empty() && push_urls.is_empty() {
            return Ok(None);
        }
        let push_refspecs = multivar(&config, &format!("remote.{name}.push"))?
            .iter()
            .map(|s| Refspec::parse(s))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mirror = match get_string(&config, &format!("remote.{name}.mirror"))? {
            Some(value) if value.eq_ignore_ascii_case("push") => true,
            Some(value) => parse_bool(&value).unwrap_or(false),
            None => false,
        };
        Ok(Some(Remote {
            name: name.to_string(),
            urls,
            push_urls,
            push_refspecs,
            mirror,
        }))
    }

    fn branch(&self, name: Option<&str>) -> Result<Option<Branch>> {
        let name = match name {
            Some(name) => Some(name.strip_prefix(HEADS_PREFIX).unwrap_or(name).to_string()),
            None => Self::current_branch_name(&*self.repo()?)?,
        };
        let Some(name) = name else {
            return Ok(None);
        };
        let config = self.config()?;
        Self::read_branch(&config, &name).map(Some)
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        let names = {
            let repo = self.repo()?;
            let mut names = Vec::new();
            for entry in repo.branches(Some(BranchType::Local))? {
                let (branch, _) = entry?;
                if let Some(name) = branch.name()? {
                    names.push(name.to_string());
                }
            }
            names
        };
        let config = self.config()?;
        names
            .iter()
            .map(|name| Self::read_branch(&config, name))
            .collect()
    }

    fn local_references(&self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let mut refs = Vec::new();
        for reference in repo.references()? {
            if let Some(name) = reference?.name() {
                refs.push(name.to_string());
            }
        }
        refs.sort();
        Ok(refs)
    }

    fn push_settings(&self) -> Result<PushSettings> {
        let config = self.config()?;
        let default_mode = get_string(&config, "push.default")?
            .map(|value| value.parse::<PushMode>())
            .transpose()?;
        let sign = get_string(&config, "push.gpgSign")?
            .map(|value| SignPush::parse("push.gpgSign", &value))
            .transpose()?
            .unwrap_or_default();
        let recurse_submodules = get_string(&config, "push.recurseSubmodules")?
            .map(|value| RecurseSubmodules::parse("push.recurseSubmodules", &value))
            .transpose()?
            .unwrap_or_default();

        let defaults = AdviceSettings::default();
        let advice = AdviceSettings {
            update_rejected: get_bool(&config, "advice.pushUpdateRejected")?
                .unwrap_or(defaults.update_rejected),
            non_ff_current: get_bool(&config, "advice.pushNonFFCurrent")?
                .unwrap_or(defaults.non_ff_current),
            non_ff_matching: get_bool(&config, "advice.pushNonFFMatching")?
                .unwrap_or(defaults.non_ff_matching),
            already_exists: get_bool(&config, "advice.pushAlreadyExists")?
                .unwrap_or(defaults.already_exists),
            fetch_first: get_bool(&config, "advice.pushFetchFirst")?
                .unwrap_or(defaults.fetch_first),
            needs_force: get_bool(&config, "advice.pushNeedsForce")?
                .unwrap_or(defaults.needs_force),
        };

        Ok(PushSettings {
            default_mode,
            remote_push_default: get_string(&config, "remote.pushDefault")?,
            follow_tags: get_bool(&config, "push.followTags")?.unwrap_or(false),
            sign,
            recurse_submodules,
            advice,
        })
    }
}

fn get_string(config: &Config, key: &str) -> Result<Option<String>> {
    match config.get_string(key) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn get_bool(config: &Config, key: &str) -> Result<Option<bool>> {
    let Some(value) = get_string(config, key)? else {
        return Ok(None);
    };
    parse_bool(&value)
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        })
}

/// Every value of a multi-valued key, in file order.
fn multivar(config: &Config, key: &str) -> Result<Vec<String>> {
    let mut entries = match config.multivar(key, None) {
        Ok(entries) => entries,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut values = Vec::new();
    while let Some(entry) = entries.next() {
        let entry = entry?;
        if let Some(value) = entry.value() {
            values.push(value.to_string());
        }
    }
    Ok(values)
}
