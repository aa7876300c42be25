//! Structured observability hooks for analysis job lifecycle events.
//!
//! This module provides:
//! - Job-scoped tracing spans via the `JobSpan` RAII guard
//! - Emission functions for the state transitions of one analysis job
//!
//! Events are emitted at `info!` level; fetch degradation is logged by the
//! fetcher itself at `warn!`.

use tracing::{info, warn};
use uuid::Uuid;

/// RAII guard that enters a job-scoped tracing span for one analysis job.
pub struct JobSpan {
    _span: tracing::span::EnteredSpan,
}

impl JobSpan {
    /// Create and enter a span tagged with the error event id.
    pub fn enter(error_event_id: Uuid) -> Self {
        let span = tracing::info_span!("tracelens.job", event_id = %error_event_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: analysis job triggered for an error event.
pub fn emit_job_triggered(error_event_id: Uuid, project_key: &str) {
    info!(event = "job.triggered", event_id = %error_event_id, project_key = %project_key);
}

/// Emit event: job skipped without analysis (sub-5xx event, duplicate, ...).
pub fn emit_job_skipped(error_event_id: Uuid, reason: &str) {
    info!(event = "job.skipped", event_id = %error_event_id, reason = %reason);
}

/// Emit event: trace parsed and frames selected.
pub fn emit_job_parsed(error_event_id: Uuid, frames: usize, selected: usize) {
    info!(event = "job.parsed", event_id = %error_event_id, frames = frames, selected = selected);
}

/// Emit event: source context assembled.
pub fn emit_context_built(error_event_id: Uuid, files: usize, total_lines: usize, degraded: bool) {
    info!(
        event = "job.context_built",
        event_id = %error_event_id,
        files = files,
        total_lines = total_lines,
        degraded = degraded,
    );
}

/// Emit event: model call failed; the job ends in the failed state.
pub fn emit_model_failed(error_event_id: Uuid, error: &dyn std::fmt::Display) {
    warn!(event = "job.model_failed", event_id = %error_event_id, error = %error);
}

/// Emit event: analysis stored (or found already stored).
pub fn emit_job_stored(error_event_id: Uuid, confidence: &str, duplicate: bool) {
    info!(
        event = "job.stored",
        event_id = %error_event_id,
        confidence = %confidence,
        duplicate = duplicate,
    );
}
