pub mod cli;
#[cfg(feature = "cli")]
mod cli_config;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;
