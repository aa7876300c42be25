//! Tracelens Core Library
//!
//! The analysis-enrichment pipeline: parse a stack trace, normalize and
//! select source locations, fetch bounded code context from the project's
//! Git provider under strict time budgets, assemble a structured prompt,
//! and record the model's root-cause analysis exactly once per error event.

pub mod assemble;
pub mod domain;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod obs;
pub mod orchestrate;
pub mod prompt;
pub mod provider;
pub mod select;
pub mod store;
pub mod telemetry;
pub mod trace;

pub use assemble::{assemble, AssembledContext, MAX_CONTEXT_FILES, MAX_CONTEXT_LINES};

pub use domain::{
    AnalysisResult, Confidence, ErrorEvent, FetchError, GitProviderKind, RepoConfig, Result,
    TriageError,
};

pub use fetch::{fetch_snippets, CodeSnippet, FetchBudget, FrameSnippet, CONTEXT_LINES};

pub use model::{ModelClient, ModelConfig, ModelOutput, OpenAiClient};

pub use normalize::normalize_path;

pub use orchestrate::{AnalysisOrchestrator, JobOutcome, JobState};

pub use prompt::{build_prompt, NO_CONTEXT_MARKER};

pub use provider::{
    make_provider, resolve_token, EnvSnapshot, GithubProvider, GitlabProvider, GitProvider,
};

pub use select::{select_frames, SelectedFrame, MAX_SELECTED_FRAMES};

pub use store::{AnalysisStore, InsertOutcome, MemoryStore};

pub use obs::JobSpan;
pub use telemetry::init_tracing;

pub use trace::{parse_stack_trace, StackFrame, TraceDialect};

/// Tracelens version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
