use hoist_config::AdviceSettings;
use hoist_transport::RejectReasons;

const PULL_BEFORE_PUSH: &str = "\
Updates were rejected because the tip of your current branch is behind
its remote counterpart. Integrate the remote changes (e.g.
'git pull ...') before pushing again.
See the 'Note about fast-forwards' in 'hoist push --help' for details.";

const CHECKOUT_PULL_PUSH: &str = "\
Updates were rejected because a pushed branch tip is behind its remote
counterpart. Check out this branch and integrate the remote changes
(e.g. 'git pull ...') before pushing again.
See the 'Note about fast-forwards' in 'hoist push --help' for details.";

const REF_ALREADY_EXISTS: &str = "Updates were rejected because the tag already exists in the remote.";

const REF_FETCH_FIRST: &str = "\
Updates were rejected because the remote contains work that you do
not have locally. This is usually caused by another repository pushing
to the same ref. You may want to first integrate the remote changes
(e.g., 'git pull ...') before pushing again.
See the 'Note about fast-forwards' in 'hoist push --help' for details.";

const REF_NEEDS_FORCE: &str = "\
You cannot update a remote ref that points at a non-commit object,
or update a remote ref to make it point at a non-commit object,
without using the '--force' option.";

type Selector = fn(&AdviceSettings) -> bool;

/// Highest priority first. Only the first entry whose bit is set is consulted.
const TABLE: [(RejectReasons, Selector, &str); 5] = [
    (RejectReasons::NON_FF_HEAD, |a| a.non_ff_current, PULL_BEFORE_PUSH),
    (RejectReasons::NON_FF_OTHER, |a| a.non_ff_matching, CHECKOUT_PULL_PUSH),
    (RejectReasons::ALREADY_EXISTS, |a| a.already_exists, REF_ALREADY_EXISTS),
    (RejectReasons::FETCH_FIRST, |a| a.fetch_first, REF_FETCH_FIRST),
    (RejectReasons::NEEDS_FORCE, |a| a.needs_force, REF_NEEDS_FORCE),
];

/// Pick the advice for a set of rejection reasons.
///
/// The highest-priority reason present decides. If its category, or the
/// `pushUpdateRejected` master switch, is off, no advice is given at all.
pub fn select_advice(reasons: RejectReasons, settings: &AdviceSettings) -> Option<&'static str> {
    let (_, enabled, message) = TABLE.iter().find(|(bit, _, _)| reasons.intersects(*bit))?;
    (settings.update_rejected && enabled(settings)).then_some(*message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_priority_wins() {
        let reasons = RejectReasons::NON_FF_HEAD | RejectReasons::ALREADY_EXISTS;
        let advice = select_advice(reasons, &AdviceSettings::default()).unwrap();
        assert!(advice.contains("tip of your current branch is behind"));
    }

    #[test]
    fn each_reason_has_advice() {
        let settings = AdviceSettings::default();
        for (reason, _) in RejectReasons::ALL {
            assert!(select_advice(reason, &settings).is_some(), "{reason:?}");
        }
        assert_eq!(select_advice(RejectReasons::NONE, &settings), None);
    }

    #[test]
    fn master_switch_silences_everything() {
        let settings = AdviceSettings {
            update_rejected: false,
            ..Default::default()
        };
        assert_eq!(select_advice(RejectReasons::FETCH_FIRST, &settings), None);
    }

    #[test]
    fn disabled_category_does_not_fall_through() {
        let settings = AdviceSettings {
            non_ff_matching: false,
            ..Default::default()
        };
        let reasons = RejectReasons::NON_FF_OTHER | RejectReasons::NEEDS_FORCE;
        assert_eq!(select_advice(reasons, &settings), None);
    }

    #[test]
    fn messages_name_this_command() {
        let advice = select_advice(RejectReasons::NON_FF_OTHER, &AdviceSettings::default()).unwrap();
        assert!(advice.contains("Check out this branch"));
        assert!(advice.contains("hoist push --help"));
    }
}
