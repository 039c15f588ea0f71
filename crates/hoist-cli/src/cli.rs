use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use hoist_config::{RecurseSubmodules, SignPush};
use hoist_push::PushOptions;
use hoist_transport::IpFamily;

#[derive(Parser)]
#[command(
    name = "hoist",
    about = "Update remote refs along with their objects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Run as if started in <path>
    #[arg(short = 'C', long = "directory", global = true, default_value = ".")]
    pub directory: PathBuf,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Update remote refs along with associated objects
    Push(PushArgs),
    /// Show what a push would send where, without contacting the remote
    Resolve(PushArgs),
}

#[derive(Args, Debug, Default)]
pub struct PushArgs {
    /// Remote name or URL
    pub repository: Option<String>,
    /// Refspecs to push; `tag <name>` is shorthand for refs/tags/<name>
    pub refspecs: Vec<String>,

    /// Repository, when none is given positionally
    #[arg(long = "repo", value_name = "REPOSITORY")]
    pub repo: Option<String>,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Push all branches
    #[arg(long, visible_alias = "branches")]
    pub all: bool,
    /// Mirror all refs
    #[arg(long)]
    pub mirror: bool,
    /// Delete the named refs
    #[arg(short, long)]
    pub delete: bool,
    /// Push tags (in addition to refspecs)
    #[arg(long)]
    pub tags: bool,
    #[arg(short = 'n', long)]
    pub dry_run: bool,
    /// Machine-readable output
    #[arg(long)]
    pub porcelain: bool,
    /// Force updates
    #[arg(short, long)]
    pub force: bool,

    /// Require the old value of the ref to be at this value
    #[arg(
        long = "force-with-lease",
        value_name = "REFNAME[:EXPECT]",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "",
        action = ArgAction::Append
    )]
    pub force_with_lease: Vec<String>,
    /// Drop every --force-with-lease
    #[arg(long)]
    pub no_force_with_lease: bool,

    /// Set upstream for hoist pull/status
    #[arg(short = 'u', long)]
    pub set_upstream: bool,
    /// Prune locally removed refs
    #[arg(long)]
    pub prune: bool,
    /// Bypass the pre-push hook
    #[arg(long, overrides_with = "verify")]
    pub no_verify: bool,
    #[arg(long, overrides_with = "no_verify", hide = true)]
    pub verify: bool,

    /// Push missing but relevant tags
    #[arg(long, overrides_with = "no_follow_tags")]
    pub follow_tags: bool,
    #[arg(long, overrides_with = "follow_tags")]
    pub no_follow_tags: bool,

    /// Request atomic transaction on remote side
    #[arg(long)]
    pub atomic: bool,

    /// GPG sign the push (yes, no or if-asked)
    #[arg(
        long,
        value_name = "WHEN",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub signed: Option<String>,
    #[arg(long, conflicts_with = "signed")]
    pub no_signed: bool,

    /// Control recursive pushing of submodules (check, on-demand, only, no)
    #[arg(long, value_name = "MODE", require_equals = true)]
    pub recurse_submodules: Option<String>,
    #[arg(long, conflicts_with = "recurse_submodules")]
    pub no_recurse_submodules: bool,

    /// Option to transmit
    #[arg(short = 'o', long = "push-option", value_name = "OPTION")]
    pub push_option: Vec<String>,

    /// Force progress reporting
    #[arg(long, overrides_with = "no_progress")]
    pub progress: bool,
    #[arg(long, overrides_with = "progress")]
    pub no_progress: bool,

    #[arg(long, overrides_with = "no_thin", hide = true)]
    pub thin: bool,
    #[arg(long, overrides_with = "thin")]
    pub no_thin: bool,

    /// Receive pack program
    #[arg(long, visible_alias = "exec", value_name = "PROGRAM")]
    pub receive_pack: Option<String>,

    /// Use IPv4 addresses only
    #[arg(short = '4', long, conflicts_with = "ipv6")]
    pub ipv4: bool,
    /// Use IPv6 addresses only
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Give up on an endpoint after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl PushArgs {
    /// The push options these arguments describe.
    pub fn to_options(&self) -> anyhow::Result<PushOptions> {
        let mut options = PushOptions {
            repo: self.repository.clone().or_else(|| self.repo.clone()),
            refspecs: self.refspecs.clone(),
            all: self.all,
            mirror: self.mirror,
            delete: self.delete,
            tags: self.tags,
            dry_run: self.dry_run,
            porcelain: self.porcelain,
            force: self.force,
            set_upstream: self.set_upstream,
            prune: self.prune,
            no_verify: self.no_verify && !self.verify,
            follow_tags: flag_pair(self.follow_tags, self.no_follow_tags),
            atomic: self.atomic,
            push_options: self.push_option.clone(),
            verbosity: i32::from(self.verbose) - i32::from(self.quiet),
            progress: flag_pair(self.progress, self.no_progress),
            thin: self.thin || !self.no_thin,
            receive_pack: self.receive_pack.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            ..Default::default()
        };

        if !self.no_force_with_lease {
            for value in &self.force_with_lease {
                let value = (!value.is_empty()).then_some(value.as_str());
                options.lease.apply(value)?;
            }
        }

        options.sign = match (&self.signed, self.no_signed) {
            (_, true) => Some(SignPush::Never),
            (Some(value), false) => Some(SignPush::parse("--signed", value)?),
            (None, false) => None,
        };
        options.recurse_submodules = match (&self.recurse_submodules, self.no_recurse_submodules) {
            (_, true) => Some(RecurseSubmodules::No),
            (Some(value), false) => Some(RecurseSubmodules::parse("--recurse-submodules", value)?),
            (None, false) => None,
        };
        options.family = if self.ipv4 {
            IpFamily::V4
        } else if self.ipv6 {
            IpFamily::V6
        } else {
            IpFamily::Any
        };
        Ok(options)
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_transport::LeaseExpect;

    /// Helper to parse `hoist push <args>` and return the push arguments.
    fn push_args(args: &[&str]) -> PushArgs {
        let cli = Cli::try_parse_from(["hoist", "push"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Push(args) => args,
            Command::Resolve(_) => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_plain_push() {
        let args = push_args(&[]);
        assert_eq!(args.repository, None);
        let options = args.to_options().unwrap();
        assert_eq!(options, PushOptions::default());
    }

    #[test]
    fn parse_repository_and_refspecs() {
        let args = push_args(&["origin", "main", "tag", "v1.0"]);
        assert_eq!(args.repository.as_deref(), Some("origin"));
        assert_eq!(args.refspecs, vec!["main", "tag", "v1.0"]);
    }

    #[test]
    fn positional_repository_wins_over_repo() {
        let options = push_args(&["--repo", "backup", "origin"]).to_options().unwrap();
        assert_eq!(options.repo.as_deref(), Some("origin"));
        let options = push_args(&["--repo", "backup"]).to_options().unwrap();
        assert_eq!(options.repo.as_deref(), Some("backup"));
    }

    #[test]
    fn parse_flags() {
        let options = push_args(&["-f", "-n", "--atomic", "-u", "--porcelain", "--no-thin", "-vv", "origin"])
            .to_options()
            .unwrap();
        assert!(options.force && options.dry_run && options.atomic);
        assert!(options.set_upstream && options.porcelain);
        assert!(!options.thin);
        assert_eq!(options.verbosity, 2);
    }

    #[test]
    fn parse_leases() {
        let options = push_args(&["--force-with-lease", "--force-with-lease=main:abc123", "origin"])
            .to_options()
            .unwrap();
        assert!(options.lease.use_tracking_for_rest);
        assert_eq!(options.lease.entries[0].expect, LeaseExpect::Value("abc123".into()));

        let cleared = push_args(&["--force-with-lease=main", "--no-force-with-lease"])
            .to_options()
            .unwrap();
        assert!(cleared.lease.is_empty());
    }

    #[test]
    fn parse_signed() {
        let bare = push_args(&["--signed"]).to_options().unwrap();
        assert_eq!(bare.sign, Some(SignPush::Always));
        let asked = push_args(&["--signed=if-asked"]).to_options().unwrap();
        assert_eq!(asked.sign, Some(SignPush::IfAsked));
        assert!(push_args(&["--signed=sometimes"]).to_options().is_err());
    }

    #[test]
    fn parse_tristate_flags() {
        let options = push_args(&["--no-follow-tags", "--progress"]).to_options().unwrap();
        assert_eq!(options.follow_tags, Some(false));
        assert_eq!(options.progress, Some(true));

        let last_wins = push_args(&["--no-follow-tags", "--follow-tags"]).to_options().unwrap();
        assert_eq!(last_wins.follow_tags, Some(true));
    }

    #[test]
    fn parse_misc_options() {
        let options = push_args(&[
            "-o",
            "ci.skip",
            "--push-option=notify=none",
            "--recurse-submodules=on-demand",
            "-4",
            "--timeout",
            "30",
            "--exec",
            "/usr/bin/receive",
        ])
        .to_options()
        .unwrap();
        assert_eq!(options.push_options, vec!["ci.skip", "notify=none"]);
        assert_eq!(options.recurse_submodules, Some(RecurseSubmodules::OnDemand));
        assert_eq!(options.family, IpFamily::V4);
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.receive_pack.as_deref(), Some("/usr/bin/receive"));
    }

    #[test]
    fn parse_resolve_with_json() {
        let cli = Cli::try_parse_from(["hoist", "--format", "json", "resolve", "origin"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Resolve(_)));
    }

    #[test]
    fn command_definition() {
        use clap::CommandFactory;
        let command = Cli::command();
        command.clone().debug_assert();
        assert_eq!(
            command.get_about().map(ToString::to_string).as_deref(),
            Some("Update remote refs along with their objects")
        );
    }

    #[test]
    fn ip_families_conflict() {
        assert!(Cli::try_parse_from(["hoist", "push", "-4", "-6"]).is_err());
    }
}
