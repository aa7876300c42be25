//! Budgeted code fetching.
//!
//! For each selected frame, pulls a window of source text centered on the
//! error line from the Git provider. The loop carries an explicit deadline:
//! - 5 seconds per file (an over-budget fetch is a miss, not a failure)
//! - 15 seconds across the whole phase
//! - soft early exit once the top frames have produced snippets
//!
//! Every per-file failure degrades the context for that file only; the
//! phase always completes with whatever snippets were obtained.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Instant};
use tracing::{info, warn};

use crate::domain::FetchError;
use crate::provider::GitProvider;
use crate::select::SelectedFrame;

/// Lines of context kept on each side of the error line.
pub const CONTEXT_LINES: u32 = 15;

/// Time and early-exit budgets for one fetch phase.
#[derive(Debug, Clone)]
pub struct FetchBudget {
    /// Per-file fetch timeout.
    pub per_file: Duration,

    /// Wall-clock budget for the whole phase.
    pub total: Duration,

    /// Stop early once this many snippets landed from the top frames.
    pub early_exit_after: usize,
}

impl Default for FetchBudget {
    fn default() -> Self {
        Self {
            per_file: Duration::from_secs(5),
            total: Duration::from_secs(15),
            early_exit_after: 2,
        }
    }
}

/// A window of source text around one stack frame's line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    /// Repository-relative path the content came from.
    pub path: String,

    /// The error line the window is centered on.
    pub center_line: u32,

    /// (line number, source text) pairs, in file order.
    pub lines: Vec<(u32, String)>,
}

impl CodeSnippet {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn start_line(&self) -> u32 {
        self.lines.first().map(|(n, _)| *n).unwrap_or(0)
    }

    pub fn end_line(&self) -> u32 {
        self.lines.last().map(|(n, _)| *n).unwrap_or(0)
    }
}

/// A snippet tied back to the selected frame that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnippet {
    /// Index into the selected-frame slice handed to the fetcher.
    pub frame_index: usize,
    pub snippet: CodeSnippet,
}

/// Fetch context windows for the selected frames, under the given budget.
///
/// Sequential by design: concurrency is an optimization the budgets do not
/// depend on, and a single in-flight request keeps cancellation simple.
pub async fn fetch_snippets(
    provider: &dyn GitProvider,
    frames: &[SelectedFrame],
    ref_name: &str,
    budget: &FetchBudget,
) -> Vec<FrameSnippet> {
    let deadline = Instant::now() + budget.total;
    let mut fetched: Vec<FrameSnippet> = Vec::new();

    for (idx, selected) in frames.iter().enumerate() {
        let now = Instant::now();
        if now >= deadline {
            warn!(
                attempted = idx,
                fetched = fetched.len(),
                "fetch budget exhausted, skipping remaining frames"
            );
            break;
        }

        if idx >= budget.early_exit_after && fetched.len() >= budget.early_exit_after {
            info!(
                fetched = fetched.len(),
                "enough context from top frames, stopping early"
            );
            break;
        }

        let path = selected.fetch_path();
        let attempt_timeout = budget.per_file.min(deadline - now);

        match timeout(attempt_timeout, provider.fetch_file(path, ref_name)).await {
            Err(_) => {
                warn!(path = %path, "per-file fetch timeout, treating as miss");
            }
            Ok(Err(err)) => {
                log_fetch_error(&err);
            }
            Ok(Ok(content)) => {
                let snippet = extract_window(path, &content, selected.frame.line);
                info!(
                    path = %path,
                    start = snippet.start_line(),
                    end = snippet.end_line(),
                    "fetched code window"
                );
                fetched.push(FrameSnippet {
                    frame_index: idx,
                    snippet,
                });
            }
        }
    }

    fetched
}

fn log_fetch_error(err: &FetchError) {
    match err {
        FetchError::NotFound { .. } | FetchError::Unauthorized { .. } => {
            warn!(path = %err.path(), error = %err, "provider rejected fetch")
        }
        _ => warn!(path = %err.path(), error = %err, "fetch failed"),
    }
}

/// Cut the ±[`CONTEXT_LINES`] window around `center_line`, clipped to file
/// bounds. Lines are 1-indexed.
fn extract_window(path: &str, content: &str, center_line: u32) -> CodeSnippet {
    let all: Vec<&str> = content.lines().collect();
    let total = all.len() as u32;

    let start = center_line.saturating_sub(CONTEXT_LINES).max(1);
    let end = center_line.saturating_add(CONTEXT_LINES).min(total);

    let lines = if total == 0 || start > end {
        Vec::new()
    } else {
        (start..=end)
            .map(|n| (n, all[(n - 1) as usize].to_string()))
            .collect()
    };

    CodeSnippet {
        path: path.to_string(),
        center_line,
        lines,
    }
}
