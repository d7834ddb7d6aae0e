pub mod app;
pub mod chat;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod output;
pub mod run;
pub mod runtime;

pub use env::CliArgs;
pub use output::OutputFormat;
