//! Tracelens worker: runs one analysis job from a job file.
//!
//! The task queue that decides *when* to analyze an event is an external
//! collaborator; this binary is the unit of work it dispatches. It reads
//! the error event (and the project's repo config, when present) from a
//! JSON job file, runs the pipeline, and prints the outcome as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, Level};

use tracelens_core::{
    init_tracing, AnalysisOrchestrator, ErrorEvent, JobState, MemoryStore, OpenAiClient,
    RepoConfig,
};

/// One dispatched analysis job.
#[derive(Debug, Deserialize)]
struct JobFile {
    event: ErrorEvent,
    #[serde(default)]
    repo_config: Option<RepoConfig>,
}

#[derive(Parser, Debug)]
#[command(name = "tracelens-worker", version, about = "Run one Tracelens analysis job")]
struct Args {
    /// Path to the JSON job file ({ "event": ..., "repo_config": ... }).
    job_file: PathBuf,

    /// Emit newline-delimited JSON log lines.
    #[arg(long)]
    json_logs: bool,

    /// Log verbosity when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs, args.log_level);

    let raw = std::fs::read_to_string(&args.job_file)
        .with_context(|| format!("reading job file {}", args.job_file.display()))?;
    let job: JobFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing job file {}", args.job_file.display()))?;

    info!(event_id = %job.event.id, project = %job.event.project_key, "worker picked up job");

    let orchestrator = AnalysisOrchestrator::new(
        Arc::new(OpenAiClient::from_env()),
        Arc::new(MemoryStore::new()),
    );

    let outcome = orchestrator
        .analyze(&job.event, job.repo_config.as_ref())
        .await
        .context("analysis job failed")?;

    match outcome.state {
        JobState::Stored => {
            let analysis = outcome
                .analysis
                .context("stored job is missing its analysis record")?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        JobState::Triggered => {
            info!(
                reason = outcome.skipped_reason.unwrap_or("unknown"),
                "job finished without analysis"
            );
        }
    }

    Ok(())
}
