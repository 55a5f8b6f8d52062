//! Command-line definition and lenient argument filtering.
use std::ffi::{OsStr, OsString};

use clap::{CommandFactory, Parser, Subcommand};

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "provision",
    about = "Manifest-driven machine provisioning",
    version
)]
pub struct Cli {
    /// Subcommand to run (defaults to `install`).
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override provisioning root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Also process the optional, heavier manifests
    #[arg(long, global = true)]
    pub full: bool,

    /// Exit non-zero when any item or task fails
    #[arg(long, global = true)]
    pub strict: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Back up configuration files, install every manifest, and report
    Install,
    /// Only back up configuration files
    Backup,
    /// Print the environment and everything currently installed
    Summary,
    /// Print shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

impl Cli {
    /// The requested subcommand, defaulting to [`Command::Install`].
    #[must_use]
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Install)
    }
}

/// Drop flags the CLI does not define so that they are ignored rather than
/// rejected.
///
/// Returns the filtered arguments (program name first) and the dropped
/// flags. A bare word right after an unknown flag is taken as that flag's
/// value and dropped with it, unless it names a subcommand or the current
/// subcommand accepts positional arguments. Everything after `--` is passed
/// through.
#[must_use]
pub fn filter_unknown_args(
    args: impl IntoIterator<Item = OsString>,
) -> (Vec<OsString>, Vec<String>) {
    let known = KnownArgs::from_command(&Cli::command());
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    let mut args = args.into_iter().peekable();
    let mut positionals_allowed = false;

    if let Some(program) = args.next() {
        kept.push(program);
    }

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();

        if text == "--" {
            kept.push(arg);
            kept.extend(args.by_ref());
            break;
        }

        if let Some(long) = text.strip_prefix("--") {
            let (name, inline_value) = long
                .split_once('=')
                .map_or((long, false), |(name, _)| (name, true));
            match known.long(name) {
                Some(takes_value) => {
                    kept.push(arg);
                    if takes_value
                        && !inline_value
                        && let Some(value) = args.next()
                    {
                        kept.push(value);
                    }
                }
                None => {
                    let mut flag = text;
                    if !inline_value
                        && !positionals_allowed
                        && let Some(value) = args.next_if(|next| known.is_stray_value(next))
                    {
                        flag.push(' ');
                        flag.push_str(&value.to_string_lossy());
                    }
                    dropped.push(flag);
                }
            }
            continue;
        }

        if let Some(shorts) = text.strip_prefix('-')
            && !shorts.is_empty()
        {
            let mut retained = String::new();
            let mut takes_value = false;
            let mut trailing_unknown = false;
            for (i, c) in shorts.char_indices() {
                trailing_unknown = false;
                match known.short(c) {
                    Some(true) => {
                        retained.push_str(shorts.get(i..).unwrap_or_default());
                        takes_value = i + c.len_utf8() == shorts.len();
                        break;
                    }
                    Some(false) => retained.push(c),
                    None => {
                        dropped.push(format!("-{c}"));
                        trailing_unknown = true;
                    }
                }
            }
            if !retained.is_empty() {
                kept.push(OsString::from(format!("-{retained}")));
                if takes_value && let Some(value) = args.next() {
                    kept.push(value);
                }
            }
            if trailing_unknown
                && !positionals_allowed
                && let Some(value) = args.next_if(|next| known.is_stray_value(next))
                && let Some(last) = dropped.last_mut()
            {
                last.push(' ');
                last.push_str(&value.to_string_lossy());
            }
            continue;
        }

        if let Some(takes_positionals) = known.subcommand(&text) {
            positionals_allowed = takes_positionals;
        }
        kept.push(arg);
    }

    (kept, dropped)
}

/// Flag and subcommand names defined in the command tree.
#[derive(Debug, Default)]
struct KnownArgs {
    /// Long flags with whether each takes a value.
    longs: Vec<(String, bool)>,
    /// Short flags with whether each takes a value.
    shorts: Vec<(char, bool)>,
    /// Top-level subcommands with whether each accepts positionals.
    subcommands: Vec<(String, bool)>,
}

impl KnownArgs {
    fn from_command(cmd: &clap::Command) -> Self {
        let mut known = Self {
            longs: vec![("help".to_string(), false), ("version".to_string(), false)],
            shorts: vec![('h', false), ('V', false)],
            subcommands: vec![("help".to_string(), true)],
        };
        for sub in cmd.get_subcommands() {
            let takes_positionals = sub.get_positionals().next().is_some();
            known
                .subcommands
                .push((sub.get_name().to_string(), takes_positionals));
            for alias in sub.get_all_aliases() {
                known.subcommands.push((alias.to_string(), takes_positionals));
            }
        }
        known.collect_flags(cmd);
        known
    }

    fn collect_flags(&mut self, cmd: &clap::Command) {
        for arg in cmd.get_arguments() {
            let takes_value = arg.get_action().takes_values();
            if let Some(long) = arg.get_long() {
                self.longs.push((long.to_string(), takes_value));
            }
            if let Some(short) = arg.get_short() {
                self.shorts.push((short, takes_value));
            }
        }
        for sub in cmd.get_subcommands() {
            self.collect_flags(sub);
        }
    }

    fn long(&self, name: &str) -> Option<bool> {
        self.longs.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    fn short(&self, c: char) -> Option<bool> {
        self.shorts.iter().find(|(s, _)| *s == c).map(|(_, v)| *v)
    }

    fn subcommand(&self, name: &str) -> Option<bool> {
        self.subcommands
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// A bare word that can only be the value of a preceding unknown flag.
    fn is_stray_value(&self, arg: &OsStr) -> bool {
        let text = arg.to_string_lossy();
        !text.starts_with('-') && self.subcommand(&text).is_none()
    }
}
