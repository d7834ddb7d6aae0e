use anyhow::Result;

use crate::cli::context::CliContext;

pub async fn cmd_info(ctx: &CliContext) -> Result<()> {
    println!("PagePilot v{}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", env!("BUILD_DATE"));
    println!("Git Commit: {}", env!("GIT_HASH"));
    println!();

    let config = ctx.config();
    println!("Config: {}", ctx.config_path().display());
    println!("Model: {} @ {}", config.llm.model, config.llm.base_url);
    match &config.llm.vision_model {
        Some(model) => println!("Vision model: {model}"),
        None => println!("Vision model: none (text-only resolution)"),
    }
    println!("Max steps per task: {}", config.agent.max_steps);
    println!(
        "Recording: {}",
        if config.recording.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(())
}
