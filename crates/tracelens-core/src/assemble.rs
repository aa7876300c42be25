//! Context budget enforcement.
//!
//! Caps fetched snippets at 5 files and 500 total lines before they reach
//! the prompt. Snippets arrive already ranked (fetch order follows frame
//! rank), so enforcement is a single pass: include until a cap would be
//! exceeded, truncating rather than dropping when the line budget runs out
//! mid-snippet.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fetch::{CodeSnippet, FrameSnippet};

/// Maximum files included in one prompt.
pub const MAX_CONTEXT_FILES: usize = 5;

/// Maximum total source lines across all included snippets.
pub const MAX_CONTEXT_LINES: usize = 500;

/// Partial snippets shorter than this are not worth including unless they
/// are the only context we have.
const MIN_PARTIAL_LINES: usize = 10;

/// The source context that survived budget enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssembledContext {
    /// Included snippets, in rank order.
    pub snippets: Vec<CodeSnippet>,

    /// Total source lines across included snippets. Never exceeds
    /// [`MAX_CONTEXT_LINES`].
    pub total_lines: usize,

    /// True when any originally-selected frame is missing from the output,
    /// whether its fetch failed or a budget cut it.
    pub degraded: bool,

    /// True when the top-ranked frame contributed a snippet.
    pub top_frame_included: bool,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

/// Enforce the file and line budgets over fetched snippets.
///
/// `selected_count` is how many frames were originally selected for
/// fetching; anything missing from the output marks the context degraded.
pub fn assemble(fetched: Vec<FrameSnippet>, selected_count: usize) -> AssembledContext {
    let mut context = AssembledContext {
        top_frame_included: fetched.iter().any(|f| f.frame_index == 0),
        ..Default::default()
    };

    let fetched_count = fetched.len();
    let mut included = 0usize;

    for frame_snippet in fetched {
        if context.snippets.len() >= MAX_CONTEXT_FILES {
            break;
        }

        let snippet = frame_snippet.snippet;
        let remaining = MAX_CONTEXT_LINES - context.total_lines;

        if snippet.line_count() <= remaining {
            context.total_lines += snippet.line_count();
            context.snippets.push(snippet);
            included += 1;
            continue;
        }

        // Line budget exhausted mid-snippet: truncate rather than drop when
        // it is the first snippet or the remainder is still meaningful.
        if context.snippets.is_empty() || remaining > MIN_PARTIAL_LINES {
            let truncated = CodeSnippet {
                path: snippet.path,
                center_line: snippet.center_line,
                lines: snippet.lines.into_iter().take(remaining).collect(),
            };
            debug!(path = %truncated.path, kept = truncated.line_count(), "snippet truncated to line budget");
            context.total_lines += truncated.line_count();
            context.snippets.push(truncated);
            included += 1;
        }
        break;
    }

    // Missing frames: fetch failures plus anything the budgets cut.
    context.degraded = included < fetched_count || fetched_count < selected_count;
    if context.top_frame_included {
        // Top frame only counts if it actually survived assembly.
        context.top_frame_included = context
            .snippets
            .first()
            .map(|s| !s.lines.is_empty())
            .unwrap_or(false);
    }
    context
}
