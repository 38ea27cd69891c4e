// server/src/cli/mod.rs

pub mod cli;
pub mod handlers;

pub use cli::{start_cli, CliArgs, Commands};
