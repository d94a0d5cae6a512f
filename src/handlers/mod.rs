pub mod commands;

pub use commands::{handle_command, handle_line, parse_command, Command, CommandAction};
