mod command_registry;
mod parser;

pub use command_registry::help_lines;
pub use parser::{parse_command, ShellCommand};
