pub mod cli;
pub mod load_config;
pub mod oauth;
pub mod publish;

pub use cli::{run, Cli, Commands};
