//! The push [`Refspec`]: a `(source, destination, force)` mapping.
//!
//! Text forms accepted by [`Refspec::parse`]:
//!
//! | text                         | meaning                                     |
//! |------------------------------|---------------------------------------------|
//! | `main`                       | push `main` to the ref of the same name     |
//! | `main:refs/heads/release`    | push `main` to an explicit destination      |
//! | `+refs/heads/*:refs/heads/*` | forced wildcard mapping                     |
//! | `:`                          | matching: every local branch the remote has |
//! | `:refs/heads/old`            | delete the destination                      |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RefError, Result};

/// A single push mapping.
///
/// `dst` is `None` when the text had no `:`; the destination is then the
/// source itself. The matching refspec has an empty `src` and an empty
/// `dst`; a deletion has an empty `src` and a non-empty `dst`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Refspec {
    pub src: String,
    pub dst: Option<String>,
    pub force: bool,
}

impl Refspec {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self { src: src.into(), dst: Some(dst.into()), force: false }
    }

    pub fn forced(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self { src: src.into(), dst: Some(dst.into()), force: true }
    }

    /// A source-only refspec (`main`).
    pub fn single(src: impl Into<String>) -> Self {
        Self { src: src.into(), dst: None, force: false }
    }

    /// The matching refspec (`:`).
    pub fn matching() -> Self {
        Self { src: String::new(), dst: Some(String::new()), force: false }
    }

    /// A deletion of `dst` (`:<dst>`).
    pub fn deletion(dst: impl Into<String>) -> Self {
        Self { src: String::new(), dst: Some(dst.into()), force: false }
    }

    /// Same mapping with the force flag set to `force`.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Parse `[+]<src>[:<dst>]`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| RefError::InvalidRefspec {
            spec: text.to_string(),
            reason: reason.to_string(),
        };

        let (force, rest) = match text.strip_prefix('+') {
            Some(stripped) => (true, stripped),
            None => (false, text),
        };
        if rest.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("must not contain whitespace or control characters"));
        }

        let (src, dst) = match rest.rsplit_once(':') {
            Some((src, dst)) => (src, Some(dst)),
            None => (rest, None),
        };

        let src_stars = src.matches('*').count();
        let dst_stars = dst.map_or(0, |d| d.matches('*').count());
        if src_stars > 1 || dst_stars > 1 {
            return Err(invalid("at most one '*' per side"));
        }

        match dst {
            None if src.is_empty() => return Err(invalid("empty refspec")),
            Some("") if !src.is_empty() => return Err(invalid("empty destination")),
            Some(d) if src.is_empty() && !d.is_empty() && dst_stars > 0 => {
                return Err(invalid("cannot delete a wildcard destination"));
            }
            Some(_) if !src.is_empty() && src_stars != dst_stars => {
                return Err(invalid("source and destination must both be patterns or neither"));
            }
            _ => {}
        }

        Ok(Self {
            src: src.to_string(),
            dst: dst.map(str::to_string),
            force,
        })
    }

    /// `true` for `:` / `+:`.
    pub fn is_matching(&self) -> bool {
        self.src.is_empty() && self.dst.as_deref() == Some("")
    }

    /// `true` for `:<dst>`.
    pub fn is_deletion(&self) -> bool {
        self.src.is_empty() && self.dst.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// `true` when the source is a wildcard pattern.
    pub fn is_pattern(&self) -> bool {
        self.src.contains('*')
    }

    /// The destination, falling back to the source for `main`-style specs.
    pub fn destination(&self) -> &str {
        self.dst.as_deref().unwrap_or(&self.src)
    }

    /// Map a concrete source ref through this refspec.
    ///
    /// Returns the destination `name` would be pushed to, or `None` if this
    /// refspec does not apply to it.
    pub fn map_source(&self, name: &str) -> Option<String> {
        if self.src.is_empty() {
            return None;
        }
        if self.is_pattern() {
            let captured = match_pattern(&self.src, name)?;
            return Some(substitute(self.destination(), captured));
        }
        (self.src == name).then(|| self.destination().to_string())
    }

    /// Map a concrete destination ref back to the source that would feed it.
    pub fn map_destination(&self, name: &str) -> Option<String> {
        if self.src.is_empty() {
            return None;
        }
        if self.is_pattern() {
            let captured = match_pattern(self.destination(), name)?;
            return Some(substitute(&self.src, captured));
        }
        (self.destination() == name).then(|| self.src.clone())
    }

    /// Find the first refspec in `specs` that maps `src` and return the
    /// resulting concrete mapping.
    pub fn query<'a, I>(specs: I, src: &str) -> Option<Refspec>
    where
        I: IntoIterator<Item = &'a Refspec>,
    {
        specs.into_iter().find_map(|spec| {
            spec.map_source(src).map(|dst| Refspec {
                src: src.to_string(),
                dst: Some(dst),
                force: spec.force,
            })
        })
    }
}

/// Match `name` against a single-`*` pattern, returning the captured part.
fn match_pattern<'n>(pattern: &str, name: &'n str) -> Option<&'n str> {
    let (prefix, suffix) = pattern.split_once('*')?;
    if name.len() < prefix.len() + suffix.len() {
        return None;
    }
    name.strip_prefix(prefix)?.strip_suffix(suffix)
}

fn substitute(pattern: &str, captured: &str) -> String {
    pattern.replacen('*', captured, 1)
}

impl fmt::Display for Refspec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.force {
            f.write_str("+")?;
        }
        f.write_str(&self.src)?;
        if let Some(dst) = &self.dst {
            write!(f, ":{dst}")?;
        }
        Ok(())
    }
}

impl FromStr for Refspec {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Refspec {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Refspec> for String {
    fn from(spec: Refspec) -> Self {
        spec.to_string()
    }
}
