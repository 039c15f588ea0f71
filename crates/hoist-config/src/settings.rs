use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// `push.default`: which refspecs to push when none are given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    /// Every local branch that also exists on the remote, by name.
    Matching,
    /// The current branch to its upstream, only if the names agree.
    Simple,
    /// The current branch to its upstream.
    #[serde(alias = "tracking")]
    Upstream,
    /// The current branch to the branch of the same name.
    Current,
    /// Refuse to push without explicit refspecs.
    Nothing,
}

impl PushMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushMode::Matching => "matching",
            PushMode::Simple => "simple",
            PushMode::Upstream => "upstream",
            PushMode::Current => "current",
            PushMode::Nothing => "nothing",
        }
    }
}

impl fmt::Display for PushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PushMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "matching" => Ok(PushMode::Matching),
            "simple" => Ok(PushMode::Simple),
            "upstream" | "tracking" => Ok(PushMode::Upstream),
            "current" => Ok(PushMode::Current),
            "nothing" => Ok(PushMode::Nothing),
            _ => Err(ConfigError::InvalidValue {
                key: "push.default".into(),
                value: s.into(),
            }),
        }
    }
}

/// `push.gpgSign` / `--signed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignPush {
    #[default]
    Never,
    Always,
    IfAsked,
}

impl SignPush {
    /// Interpret a boolean-or-`if-asked` value as git config spells it.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("if-asked") {
            return Ok(SignPush::IfAsked);
        }
        match parse_bool(value) {
            Some(true) => Ok(SignPush::Always),
            Some(false) => Ok(SignPush::Never),
            None => Err(ConfigError::InvalidValue {
                key: key.into(),
                value: value.into(),
            }),
        }
    }
}

/// `push.recurseSubmodules` / `--recurse-submodules`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurseSubmodules {
    #[default]
    No,
    Check,
    OnDemand,
    Only,
}

impl RecurseSubmodules {
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "check" => Ok(RecurseSubmodules::Check),
            "on-demand" => Ok(RecurseSubmodules::OnDemand),
            "only" => Ok(RecurseSubmodules::Only),
            other if parse_bool(other) == Some(false) => Ok(RecurseSubmodules::No),
            _ => Err(ConfigError::InvalidValue {
                key: key.into(),
                value: value.into(),
            }),
        }
    }
}

/// `advice.*` toggles for rejected pushes. All enabled by default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceSettings {
    /// Master switch (`advice.pushUpdateRejected`).
    pub update_rejected: bool,
    /// `advice.pushNonFFCurrent`.
    pub non_ff_current: bool,
    /// `advice.pushNonFFMatching`.
    pub non_ff_matching: bool,
    /// `advice.pushAlreadyExists`.
    pub already_exists: bool,
    /// `advice.pushFetchFirst`.
    pub fetch_first: bool,
    /// `advice.pushNeedsForce`.
    pub needs_force: bool,
}

impl Default for AdviceSettings {
    fn default() -> Self {
        Self {
            update_rejected: true,
            non_ff_current: true,
            non_ff_matching: true,
            already_exists: true,
            fetch_first: true,
            needs_force: true,
        }
    }
}

impl AdviceSettings {
    /// Every advice message switched off.
    pub fn silent() -> Self {
        Self {
            update_rejected: false,
            non_ff_current: false,
            non_ff_matching: false,
            already_exists: false,
            fetch_first: false,
            needs_force: false,
        }
    }
}

/// Everything push reads from configuration, loaded once per invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    /// `push.default`; `None` when unset (behaves as [`PushMode::Simple`]).
    pub default_mode: Option<PushMode>,
    /// `remote.pushDefault`.
    pub remote_push_default: Option<String>,
    /// `push.followTags`.
    pub follow_tags: bool,
    /// `push.gpgSign`.
    pub sign: SignPush,
    /// `push.recurseSubmodules`.
    pub recurse_submodules: RecurseSubmodules,
    /// `advice.*`.
    pub advice: AdviceSettings,
}

impl PushSettings {
    /// Parse settings from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The push mode in effect.
    pub fn effective_mode(&self) -> PushMode {
        self.default_mode.unwrap_or(PushMode::Simple)
    }

    /// Whether `push.default` was set explicitly.
    pub fn mode_is_explicit(&self) -> bool {
        self.default_mode.is_some()
    }
}

/// Git-style boolean: `true/yes/on/1` and `false/no/off/0`.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}
