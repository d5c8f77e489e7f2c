//! Line-oriented CLI protocol for the lattice decision engine.

mod command;
mod driver;
mod error;

pub use command::{parse_command, Command};
pub use driver::run;
pub use error::DriverError;
