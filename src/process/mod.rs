//! External process execution
//!
//! Commands run one at a time with an explicit working directory. A
//! non-zero exit is a value, not an error; failing to spawn or running
//! past the timeout is.

mod command;
mod runner;

pub use command::{CommandResult, CommandSpec};
pub use runner::{CommandRunner, ProcessRunner};
