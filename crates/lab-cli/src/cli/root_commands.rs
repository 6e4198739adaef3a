use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    ComponentCommands, ResultCommands, StudyCommands, UserCommands, WorkerCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// User directory.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Studies.
    Study {
        #[command(subcommand)]
        action: StudyCommands,
    },
    /// Components of a study.
    Component {
        #[command(subcommand)]
        action: ComponentCommands,
    },
    /// Workers.
    Worker {
        #[command(subcommand)]
        action: WorkerCommands,
    },
    /// Study, component and group results.
    Result {
        #[command(subcommand)]
        action: ResultCommands,
    },
    /// View audit trail.
    Audit(AuditArgs),
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    /// Only entries by this actor id.
    #[arg(long)]
    pub actor_id: Option<String>,
}
