//! CLI `generate` command: run one story job in-process and print the result.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use keepsake::config::KeepsakeConfig;
use keepsake::server::build_state;
use keepsake::story::types::JobStatus;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub async fn generate(config: &KeepsakeConfig, seed: Option<u64>) -> Result<()> {
    let mut config = config.clone();
    if seed.is_some() {
        config.story.seed = seed;
    }

    let state = build_state(&config)?;
    let job_id = state.orchestrator.start()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("  {spinner} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let job = loop {
        let job = state.orchestrator.status(&job_id)?;
        pb.set_message(job.message.clone());
        if job.status.is_terminal() {
            break job;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };
    pb.finish_and_clear();

    match job.status {
        JobStatus::Complete => {
            let artifact = job.result.context("completed job carries no story")?;
            println!("{}", serde_json::to_string_pretty(&artifact)?);
            Ok(())
        }
        _ => {
            let reason = job.error.unwrap_or(job.message);
            anyhow::bail!("story generation failed: {reason}")
        }
    }
}
