//! Analysis job orchestration.
//!
//! The driver tying the pipeline together: trigger checks, parsing,
//! context building, the model call, and the analysis write. Parsing and
//! context building cannot fail — they degrade to empty results — so the
//! model call is the only hard-failure edge, surfaced as an error for the
//! dispatching queue to retry. Storing is idempotent, so re-running a job
//! for the same event is always safe.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assemble::{assemble, AssembledContext};
use crate::domain::{AnalysisResult, Confidence, ErrorEvent, RepoConfig, Result};
use crate::fetch::{fetch_snippets, FetchBudget};
use crate::model::ModelClient;
use crate::obs;
use crate::prompt::build_prompt;
use crate::provider::{make_provider, resolve_token, EnvSnapshot, GitProvider};
use crate::select::select_frames;
use crate::store::{AnalysisStore, InsertOutcome};
use crate::trace::parse_stack_trace;

/// Where an analysis job stopped. A failed job surfaces as an error
/// instead, so the dispatching queue can retry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Acknowledged but skipped before any analysis work.
    Triggered,
    /// An analysis record exists for the event.
    Stored,
}

/// Result of running one analysis job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub state: JobState,

    /// The stored analysis, when the job reached `stored`.
    pub analysis: Option<AnalysisResult>,

    /// Why the job did no work, when it was skipped or deduplicated.
    pub skipped_reason: Option<&'static str>,
}

type ProviderFactory =
    Box<dyn Fn(&RepoConfig, Option<String>) -> Box<dyn GitProvider> + Send + Sync>;

/// Coordinates parsing, fetching, prompting, the model call, and the
/// idempotent write of the analysis record.
pub struct AnalysisOrchestrator {
    model: Arc<dyn ModelClient>,
    store: Arc<dyn AnalysisStore>,
    env: EnvSnapshot,
    budget: FetchBudget,
    provider_factory: ProviderFactory,
}

impl AnalysisOrchestrator {
    pub fn new(model: Arc<dyn ModelClient>, store: Arc<dyn AnalysisStore>) -> Self {
        Self {
            model,
            store,
            env: EnvSnapshot::from_process_env(),
            budget: FetchBudget::default(),
            provider_factory: Box::new(|config, token| make_provider(config, token)),
        }
    }

    /// Replace the environment snapshot used for token resolution.
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = env;
        self
    }

    /// Replace the fetch budget.
    pub fn with_budget(mut self, budget: FetchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Replace the Git provider factory (used by tests to script fetches).
    pub fn with_provider_factory(mut self, factory: ProviderFactory) -> Self {
        self.provider_factory = factory;
        self
    }

    /// Run one analysis job. Safe to invoke more than once for the same
    /// event: a second run is a no-op success once a result is stored.
    pub async fn analyze(
        &self,
        event: &ErrorEvent,
        repo_config: Option<&RepoConfig>,
    ) -> Result<JobOutcome> {
        let _span = obs::JobSpan::enter(event.id);
        obs::emit_job_triggered(event.id, &event.project_key);

        // Analysis only covers server-error-class events.
        if !event.is_server_error() {
            obs::emit_job_skipped(event.id, "status_below_500");
            return Ok(JobOutcome {
                state: JobState::Triggered,
                analysis: None,
                skipped_reason: Some("status_below_500"),
            });
        }

        // Duplicate trigger: success, not an error.
        if let Some(existing) = self.store.get(event.id).await? {
            obs::emit_job_skipped(event.id, "analysis_exists");
            return Ok(JobOutcome {
                state: JobState::Stored,
                analysis: Some(existing),
                skipped_reason: Some("analysis_exists"),
            });
        }

        // Parsing cannot fail; empty results are valid.
        let frames = parse_stack_trace(event.stack_trace.as_deref());
        let selected = select_frames(&frames, repo_config);
        obs::emit_job_parsed(event.id, frames.len(), selected.len());

        // Context building degrades to an empty context.
        let context = self
            .build_context(repo_config, &event.project_key, &selected)
            .await;
        obs::emit_context_built(
            event.id,
            context.snippets.len(),
            context.total_lines,
            context.degraded,
        );

        let prompt = build_prompt(&event.message, event.stack_trace.as_deref(), &context);

        // The model call is the only hard-failure edge.
        let output = match self.model.complete(&prompt).await {
            Ok(output) => output,
            Err(err) => {
                obs::emit_model_failed(event.id, &err);
                return Err(err);
            }
        };

        // Idempotent write.
        let confidence = assign_confidence(&context);
        let result = AnalysisResult::new(
            event.id,
            output.text,
            output.model,
            confidence,
            !context.is_empty(),
        );
        let insert = self.store.insert_if_absent(result.clone()).await?;
        let duplicate = insert == InsertOutcome::AlreadyExists;
        obs::emit_job_stored(event.id, confidence_label(confidence), duplicate);

        let analysis = if duplicate {
            self.store.get(event.id).await?.or(Some(result))
        } else {
            Some(result)
        };

        Ok(JobOutcome {
            state: JobState::Stored,
            analysis,
            skipped_reason: duplicate.then_some("analysis_exists"),
        })
    }

    async fn build_context(
        &self,
        repo_config: Option<&RepoConfig>,
        project_key: &str,
        selected: &[crate::select::SelectedFrame],
    ) -> AssembledContext {
        let Some(config) = repo_config else {
            return AssembledContext::default();
        };
        if selected.is_empty() {
            return AssembledContext::default();
        }

        let token = resolve_token(config, project_key, &self.env);
        let provider = (self.provider_factory)(config, token);
        let fetched =
            fetch_snippets(provider.as_ref(), selected, config.ref_name(), &self.budget).await;
        assemble(fetched, selected.len())
    }
}

/// `high` when the top-ranked frame has a snippet, `medium` for any other
/// non-empty context, `low` for trace-only analysis.
fn assign_confidence(context: &AssembledContext) -> Confidence {
    if context.top_frame_included {
        Confidence::High
    } else if !context.is_empty() {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::Low => "low",
        Confidence::Medium => "medium",
        Confidence::High => "high",
    }
}
