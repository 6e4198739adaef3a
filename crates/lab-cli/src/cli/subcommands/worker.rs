use clap::Subcommand;

/// Worker commands.
#[derive(Clone, Debug, Subcommand)]
pub enum WorkerCommands {
    /// Register a worker.
    ///
    /// Maintenance workers belong to the acting user.
    Create {
        /// plain, mturk, mturk-sandbox, group or maintenance
        worker_type: String,
    },
    /// List the acting user's workers.
    List,
    /// Show a worker and its results.
    Get { id: String },
}
