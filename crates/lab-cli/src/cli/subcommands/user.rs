use clap::Subcommand;

/// User directory commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Register a user.
    Add {
        email: String,
        #[arg(long)]
        name: String,
    },
    /// List all users.
    List,
}
