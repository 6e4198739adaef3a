use clap::{Subcommand, ValueEnum};
use lab_core::enums::Direction;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(value: MoveDirection) -> Self {
        match value {
            MoveDirection::Up => Self::Up,
            MoveDirection::Down => Self::Down,
        }
    }
}

/// Component commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ComponentCommands {
    /// Append a component to a study.
    Add {
        study_id: String,
        title: String,
        /// HTML entry page, relative to the study's asset directory.
        #[arg(long)]
        html_file_path: Option<String>,
        #[arg(long)]
        json_data: Option<String>,
        #[arg(long)]
        reloadable: bool,
        #[arg(long)]
        inactive: bool,
    },
    /// Move a component one step up or down.
    Move {
        study_id: String,
        component_id: String,
        direction: MoveDirection,
    },
    /// Remove a component and its component results.
    Remove {
        study_id: String,
        component_id: String,
    },
    /// Show one component.
    Get { study_id: String, component_id: String },
    /// List a study's components in order.
    List { study_id: String },
}
