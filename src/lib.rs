pub mod cli;
pub mod load_config;
pub mod pages;
pub mod synchronise;

pub use cli::{run, Cli, Commands};
