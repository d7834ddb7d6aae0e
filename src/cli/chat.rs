use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::cli::run::{build_driver, build_session, print_report};
use crate::session::SessionError;

#[derive(Args, Clone, Debug)]
pub struct ChatArgs {
    /// Serve pages from a replay fixture instead of a live engine
    #[arg(long, value_name = "FIXTURE")]
    pub replay: Option<PathBuf>,
}

/// Interactive loop: each input line is one goal run through the session
/// gate. Ctrl-C cancels the in-flight task; `quit` or `exit` leaves.
pub async fn cmd_chat(args: ChatArgs, ctx: &CliContext) -> Result<()> {
    let driver = build_driver(args.replay.as_deref())?;
    let start_url = driver.start_url();
    let session = Arc::new(build_session(ctx.config(), driver)?);

    let stopper = session.clone();
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            stopper.stop();
        }
    });

    println!("Type a goal and press enter. Ctrl-C stops the current task; 'quit' leaves.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut first_goal = true;
    loop {
        print!("goal> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let goal = line.trim();
        if goal.is_empty() {
            continue;
        }
        if goal.eq_ignore_ascii_case("quit") || goal.eq_ignore_ascii_case("exit") {
            break;
        }

        // Only the first goal opens the fixture's start page; later goals
        // continue from wherever the last one ended.
        let url = if first_goal { start_url.as_deref() } else { None };
        match session.submit(goal, url).await {
            Ok(report) => {
                first_goal = false;
                print_report(&report, OutputFormat::Human)?;
            }
            Err(SessionError::Busy) => warn!("previous task is still running"),
        }
    }
    Ok(())
}
