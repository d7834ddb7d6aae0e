use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::cli::context::CliContext;
use crate::config::AppConfig;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as YAML
    Show,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            let path = ctx.config_path();
            if path.exists() && !force {
                bail!(
                    "config file {} already exists; use --force to overwrite",
                    path.display()
                );
            }
            AppConfig::default().save(path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            println!("# {}", ctx.config_path().display());
            print!("{}", ctx.config().to_yaml()?);
            Ok(())
        }
    }
}
