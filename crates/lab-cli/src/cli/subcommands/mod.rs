mod component;
mod result;
mod study;
mod user;
mod worker;

pub use component::{ComponentCommands, MoveDirection};
pub use result::ResultCommands;
pub use study::StudyCommands;
pub use user::UserCommands;
pub use worker::WorkerCommands;
