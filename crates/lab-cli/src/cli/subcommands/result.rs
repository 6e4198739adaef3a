use clap::Subcommand;

/// Result commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ResultCommands {
    /// Start a run of a study by a worker.
    Start { study_id: String, worker_id: String },
    /// Record a component run inside a study result.
    Record {
        study_result_id: String,
        component_id: String,
        #[arg(long)]
        data: Option<String>,
    },
    /// List a study's results.
    List {
        study_id: String,
        /// Include maintenance runs.
        #[arg(long)]
        all: bool,
    },
    /// Show a study result with its component results and group.
    Get { id: String },
    /// Count a study's results.
    Count { study_id: String },
    /// Remove one study result.
    Remove { id: String },
    /// Open a group session for a study.
    Group { study_id: String },
    /// List a study's group results.
    Groups { study_id: String },
    /// Add a study result to a group.
    Join {
        group_result_id: String,
        study_result_id: String,
    },
}
