use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `lab` binary.
#[derive(Debug, Parser)]
#[command(name = "lab", version, about = "lab - study and result lifecycle management")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max entries to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Act as the user with this email
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    pub actor: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            actor: self.actor.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{ComponentCommands, StudyCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "lab",
            "--format",
            "raw",
            "--as",
            "ada@example.org",
            "--verbose",
            "study",
            "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(cli.actor.as_deref(), Some("ada@example.org"));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Study {
                action: StudyCommands::List
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["lab", "study", "lock", "stu-1", "--quiet", "--as", "a@b.c"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.global_flags().actor.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn output_format_rejects_table() {
        let parsed = Cli::try_parse_from(["lab", "--format", "table", "user", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn direction_is_validated() {
        let cli = Cli::try_parse_from(["lab", "component", "move", "stu-1", "cmp-1", "up"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Component {
                action: ComponentCommands::Move { .. }
            }
        ));
        assert!(Cli::try_parse_from(["lab", "component", "move", "stu-1", "cmp-1", "left"]).is_err());
    }

    #[test]
    fn members_take_several_emails() {
        let cli = Cli::try_parse_from([
            "lab",
            "study",
            "members",
            "stu-1",
            "a@example.org",
            "b@example.org",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Study {
                action: StudyCommands::Members { emails, .. },
            } => assert_eq!(emails.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn study_try_takes_an_id() {
        let cli = Cli::try_parse_from(["lab", "study", "try", "stu-1", "--as", "a@b.c"])
            .expect("cli should parse");
        match cli.command {
            Commands::Study {
                action: StudyCommands::Try { id },
            } => assert_eq!(id, "stu-1"),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["lab", "study", "try"]).is_err());
    }
}
