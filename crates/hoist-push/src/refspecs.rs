use hoist_refs::{Refspec, TAGS_PREFIX};

use crate::error::{Result, UsageError};
use crate::resolver::{resolve, TrackingSnapshot};

/// Turn refspec arguments into refspecs.
///
/// - `--tags` contributes `refs/tags/*` ahead of everything else.
/// - `tag <name>` is shorthand for `refs/tags/<name>`.
/// - With `delete`, a plain `<name>` becomes `:<name>`.
/// - Other arguments without `:` go through [`resolve`]; `load` is called
///   for the snapshot the first time one does, and never again.
pub fn collect_refspecs<F>(
    args: &[String],
    delete: bool,
    tags: bool,
    mut load: F,
) -> Result<Vec<Refspec>>
where
    F: FnMut() -> Result<TrackingSnapshot>,
{
    let mut specs = Vec::with_capacity(args.len() + usize::from(tags));
    if tags {
        specs.push(Refspec::new("refs/tags/*", "refs/tags/*"));
    }

    let mut snapshot: Option<TrackingSnapshot> = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let text = if arg == "tag" {
            let name = args.next().ok_or(UsageError::TagWithoutName)?;
            if delete {
                format!(":{TAGS_PREFIX}{name}")
            } else {
                format!("{TAGS_PREFIX}{name}")
            }
        } else if delete {
            if arg.contains(':') {
                return Err(UsageError::DeleteNotPlain.into());
            }
            format!(":{arg}")
        } else if !arg.contains(':') {
            let snap = match &mut snapshot {
                Some(snap) => snap,
                empty => empty.insert(load()?),
            };
            resolve(arg, snap)
        } else {
            arg.clone()
        };
        specs.push(Refspec::parse(&text).map_err(UsageError::from)?);
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_config::PushMode;
    use hoist_refs::{Branch, Remote};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn snapshot() -> TrackingSnapshot {
        TrackingSnapshot {
            remote: Remote::with_url("origin", "https://example.com/r.git"),
            local_refs: vec!["refs/heads/main".into()],
            branches: vec![Branch::new("main").tracking("origin", "refs/heads/trunk")],
            mode: PushMode::Upstream,
        }
    }

    fn never_load() -> Result<TrackingSnapshot> {
        panic!("snapshot should not be loaded")
    }

    fn texts(specs: &[Refspec]) -> Vec<String> {
        specs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn tag_shorthand() {
        let specs = collect_refspecs(&args(&["tag", "v1"]), false, false, never_load).unwrap();
        assert_eq!(texts(&specs), vec!["refs/tags/v1"]);

        let deleted = collect_refspecs(&args(&["tag", "v1"]), true, false, never_load).unwrap();
        assert_eq!(texts(&deleted), vec![":refs/tags/v1"]);
    }

    #[test]
    fn tag_as_last_argument_is_an_error() {
        let err = collect_refspecs(&args(&["main:main", "tag"]), false, false, never_load).unwrap_err();
        assert!(matches!(err, crate::PushError::Usage(UsageError::TagWithoutName)));
    }

    #[test]
    fn delete_rewrites_plain_names() {
        let specs = collect_refspecs(&args(&["old", "stale"]), true, false, never_load).unwrap();
        assert_eq!(texts(&specs), vec![":old", ":stale"]);

        let err = collect_refspecs(&args(&["a:b"]), true, false, never_load).unwrap_err();
        assert!(matches!(err, crate::PushError::Usage(UsageError::DeleteNotPlain)));
    }

    #[test]
    fn tags_flag_comes_first() {
        let specs = collect_refspecs(&args(&["a:b"]), false, true, never_load).unwrap();
        assert_eq!(texts(&specs), vec!["refs/tags/*:refs/tags/*", "a:b"]);
    }

    #[test]
    fn explicit_mappings_are_literal() {
        let specs = collect_refspecs(&args(&["+main:refs/heads/x"]), false, false, never_load).unwrap();
        assert!(specs[0].force);
        assert_eq!(specs[0].destination(), "refs/heads/x");
    }

    #[test]
    fn snapshot_loaded_once() {
        let mut loads = 0;
        let specs = collect_refspecs(&args(&["main", "other"]), false, false, || {
            loads += 1;
            Ok(snapshot())
        })
        .unwrap();
        assert_eq!(loads, 1);
        assert_eq!(texts(&specs), vec!["main:refs/heads/trunk", "other"]);
    }

    #[test]
    fn invalid_refspec_is_a_usage_error() {
        let err = collect_refspecs(&args(&["a:b:c*"]), false, false, never_load).unwrap_err();
        assert!(matches!(err, crate::PushError::Usage(UsageError::Refspec(_))));
    }
}
