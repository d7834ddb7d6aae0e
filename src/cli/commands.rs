use clap::Subcommand;

use super::chat::ChatArgs;
use super::config::ConfigArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Execute one goal and print the task report
    Run(RunArgs),

    /// Interactive goal loop against one browsing session
    Chat(ChatArgs),

    /// Manage PagePilot configuration
    Config(ConfigArgs),

    /// Show version, build and configuration details
    Info,
}
