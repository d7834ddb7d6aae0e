use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use agent_loop::{TaskOrchestrator, TaskReport};
use element_resolver::ElementResolver;
use page_driver::ScreenshotSource;
use page_model::SessionId;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::config::AppConfig;
use crate::driver::ReplayDriver;
use crate::llm::{OllamaConfig, OllamaProvider};
use crate::recording::{FsRecordingSink, SessionRecorder};
use crate::session::AgentSession;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Natural-language goal for the agent
    #[arg(long)]
    pub goal: String,

    /// Page to open before the first step
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Serve pages from a replay fixture instead of a live engine
    #[arg(long, value_name = "FIXTURE")]
    pub replay: Option<PathBuf>,

    /// Record screenshots of the run into this directory
    #[arg(long, value_name = "DIR")]
    pub record: Option<PathBuf>,

    /// Step budget override
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u32>,

    /// Model budget per planning call, e.g. "45s"
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub step_timeout: Option<Duration>,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let mut config = ctx.config().clone();
    if let Some(steps) = args.max_steps {
        config.agent.max_steps = steps;
    }
    if let Some(timeout) = args.step_timeout {
        config.llm.timeout_secs = timeout.as_secs().max(1);
    }
    if let Some(dir) = &args.record {
        config.recording.enabled = true;
        config.recording.output_dir = dir.clone();
    }

    let driver = build_driver(args.replay.as_deref())?;
    let start_url = args.url.clone().or_else(|| driver.start_url());

    let recorder = if config.recording.enabled {
        let session_id = SessionId::new();
        let sink = FsRecordingSink::create(&config.recording.output_dir, &session_id).await?;
        info!("Recording session to {}", sink.dir().display());
        Some(SessionRecorder::start(
            driver.clone() as Arc<dyn ScreenshotSource>,
            Arc::new(sink),
            session_id,
            args.goal.clone(),
            config.recording.frame_interval(),
        ))
    } else {
        None
    };

    let session = build_session(&config, driver)?;
    let report = session.submit(&args.goal, start_url.as_deref()).await?;

    if let Some(recorder) = recorder {
        let frames = recorder.stop().await;
        info!(frames, "recording finished");
    }

    print_report(&report, output)?;
    if !report.is_success() {
        bail!("task {}: {}", report.outcome, report.message);
    }
    Ok(())
}

pub(crate) fn build_driver(replay: Option<&Path>) -> Result<Arc<ReplayDriver>> {
    match replay {
        Some(path) => Ok(Arc::new(ReplayDriver::from_file(path)?)),
        None => bail!(
            "no rendering engine is attached in this build; point --replay at a fixture file"
        ),
    }
}

pub(crate) fn build_session(config: &AppConfig, driver: Arc<ReplayDriver>) -> Result<AgentSession> {
    let llm = Arc::new(OllamaProvider::new(OllamaConfig::from(&config.llm))?);
    let orchestrator = TaskOrchestrator::new(driver, llm, config.agent, config.navigation)
        .with_resolver(ElementResolver::new(config.resolver));
    Ok(AgentSession::new(orchestrator))
}

pub(crate) fn print_report(report: &TaskReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
        OutputFormat::Human => {
            println!("Outcome: {}", report.outcome);
            println!("Steps:   {}", report.steps);
            println!("Message: {}", report.message);
            if !report.history.is_empty() {
                println!("History:");
                for (idx, entry) in report.history.iter().enumerate() {
                    println!(
                        "  {}. {} {} on {}",
                        idx + 1,
                        entry.action,
                        entry.target,
                        entry.url
                    );
                }
            }
            if let Some(extracted) = &report.extracted {
                println!(
                    "Extracted: {} section(s), {} code block(s), {} result link(s)",
                    extracted.sections.sections.len(),
                    extracted.sections.code_blocks.len(),
                    extracted.top_results.len()
                );
                for scored in extracted.top_results.iter().take(3) {
                    println!(
                        "  [{:.2}] {} ({})",
                        scored.score, scored.result.title, scored.result.url
                    );
                }
                if let Some(query) = &extracted.suggested_query {
                    println!("Suggested query: {query}");
                }
                if let Some(next) = &extracted.next_link {
                    println!("Next link: {} ({})", next.text, next.href);
                }
            }
        }
    }
    Ok(())
}
