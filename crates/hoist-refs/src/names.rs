//! Reference namespace helpers and short-name matching.
//!
//! Short-name matching follows the usual lookup order: the name itself, then
//! `refs/`, `refs/tags/`, `refs/heads/`, `refs/remotes/` and finally
//! `refs/remotes/<name>/HEAD`.

/// Namespace of local branches.
pub const HEADS_PREFIX: &str = "refs/heads/";
/// Namespace of tags.
pub const TAGS_PREFIX: &str = "refs/tags/";
/// Namespace of remote-tracking refs.
pub const REMOTES_PREFIX: &str = "refs/remotes/";

/// Lookup rules for expanding an abbreviated ref name, in priority order.
const LOOKUP_RULES: &[(&str, &str)] = &[
    ("", ""),
    ("refs/", ""),
    (TAGS_PREFIX, ""),
    (HEADS_PREFIX, ""),
    (REMOTES_PREFIX, ""),
    (REMOTES_PREFIX, "/HEAD"),
];

/// Strip the `refs/heads/` namespace from a ref name, if present.
///
/// ```
/// use hoist_refs::strip_heads_prefix;
///
/// assert_eq!(strip_heads_prefix("refs/heads/main"), "main");
/// assert_eq!(strip_heads_prefix("refs/tags/v1"), "refs/tags/v1");
/// ```
pub fn strip_heads_prefix(name: &str) -> &str {
    name.strip_prefix(HEADS_PREFIX).unwrap_or(name)
}

/// Returns `true` if `abbrev` names `full` under one of the lookup rules.
pub fn refname_matches(abbrev: &str, full: &str) -> bool {
    LOOKUP_RULES.iter().any(|(prefix, suffix)| {
        full.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .is_some_and(|middle| middle == abbrev)
    })
}

/// Outcome of matching a short name against a set of local refs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefMatch {
    /// Nothing matched.
    None,
    /// Exactly one ref matched; carries its full name.
    Unique(String),
    /// More than one ref matched with the same strength.
    Ambiguous(usize),
}

/// Count how many of `refs` the abbreviated `pattern` names.
///
/// A match is weak when it lands outside `refs/heads/` and `refs/tags/` and
/// the pattern was neither the full name nor the name without `refs/`.
/// Strong matches win; weak ones are only counted when no strong match
/// exists. Otherwise `main` would be ambiguous between `refs/heads/main` and
/// `refs/remotes/origin/main`.
pub fn count_ref_matches<S: AsRef<str>>(pattern: &str, refs: &[S]) -> RefMatch {
    let mut strong: Vec<&str> = Vec::new();
    let mut weak: Vec<&str> = Vec::new();

    for name in refs.iter().map(AsRef::as_ref) {
        if !refname_matches(pattern, name) {
            continue;
        }
        let is_weak = name.len() != pattern.len()
            && name.len().checked_sub(5) != Some(pattern.len())
            && !name.starts_with(HEADS_PREFIX)
            && !name.starts_with(TAGS_PREFIX);
        if is_weak {
            weak.push(name);
        } else {
            strong.push(name);
        }
    }

    let winners = if strong.is_empty() { weak } else { strong };
    match winners.as_slice() {
        [] => RefMatch::None,
        [only] => RefMatch::Unique((*only).to_string()),
        many => RefMatch::Ambiguous(many.len()),
    }
}
