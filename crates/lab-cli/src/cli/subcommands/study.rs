use std::path::PathBuf;

use clap::Subcommand;

/// Study lifecycle commands. Each acts as the user named by `--as`, who
/// must be a member of the study unless creating or importing one.
#[derive(Clone, Debug, Subcommand)]
pub enum StudyCommands {
    /// Create a study with the acting user as its only member.
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// JSON configuration blob.
        #[arg(long)]
        json_data: Option<String>,
    },
    /// Get a study with its components and members.
    Get { id: String },
    /// List the acting user's studies.
    List,
    /// Edit title, description or configuration.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_json_data")]
        json_data: Option<String>,
        /// Remove the JSON configuration.
        #[arg(long)]
        clear_json_data: bool,
    },
    /// Toggle the lock flag.
    Lock { id: String },
    /// Remove a study with all its results and its asset directory.
    Remove { id: String },
    /// Copy a study's definition, components and assets.
    Clone { id: String },
    /// Replace the member list.
    Members { id: String, emails: Vec<String> },
    /// Write the study archive into a directory.
    Export {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Import a study archive.
    Import { path: PathBuf },
    /// Start a trial run under the acting user's maintenance worker.
    Try { id: String },
    /// Remove every result of the study.
    DiscardResults { id: String },
    /// Recreate a missing asset directory.
    Assets { id: String },
}
