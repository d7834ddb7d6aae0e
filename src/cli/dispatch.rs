use anyhow::Result;

use super::chat::cmd_chat;
use super::commands::Commands;
use super::config::cmd_config;
use super::context::CliContext;
use super::env::CliArgs;
use super::info::cmd_info;
use super::run::cmd_run;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx, cli.output).await,
        Commands::Chat(args) => cmd_chat(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
        Commands::Info => cmd_info(ctx).await,
    }
}
