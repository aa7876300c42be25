//! Frame selection: rank and truncate parsed frames to the subset worth
//! fetching code for.
//!
//! Frames nearest the error origin (earliest in the trace) come first.
//! Dependency and build-artifact frames are filtered on the raw path before
//! any normalization, so `node_modules` is caught even when normalization
//! would strip it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::RepoConfig;
use crate::normalize::normalize_path;
use crate::trace::StackFrame;

/// Maximum frames worth fetching per job.
pub const MAX_SELECTED_FRAMES: usize = 5;

/// Path segments that mark a frame as dependency or tooling code.
const EXCLUDED_SEGMENTS: &[&str] = &[
    // Node.js
    "node_modules",
    ".next",
    ".nuxt",
    // Python
    "venv",
    ".venv",
    "env",
    "__pycache__",
    "site-packages",
    ".pytest_cache",
    // Java
    ".gradle",
    // Build artifacts
    "dist",
    "build",
    ".build",
    "out",
    "target",
    "bin",
    "obj",
    // IDE and VCS
    ".idea",
    ".vscode",
    ".git",
];

/// A frame chosen for fetching, with its best-effort normalized path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFrame {
    pub frame: StackFrame,

    /// Repository-relative path, or `None` when normalization gave nothing.
    /// A `None` here still gets a fetch attempt with the raw path.
    pub normalized: Option<String>,
}

impl SelectedFrame {
    /// The path to hand to the Git provider.
    pub fn fetch_path(&self) -> &str {
        self.normalized.as_deref().unwrap_or(&self.frame.file)
    }
}

/// Select at most [`MAX_SELECTED_FRAMES`] frames in trace order, preferring
/// resolvable frames but keeping unresolved ones when there are too few.
///
/// Deterministic: identical input yields identical selection.
pub fn select_frames(frames: &[StackFrame], config: Option<&RepoConfig>) -> Vec<SelectedFrame> {
    let mut seen: Vec<&str> = Vec::new();
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();

    for frame in frames {
        if is_excluded(&frame.file) {
            debug!(file = %frame.file, "frame filtered (dependency or build path)");
            continue;
        }
        if seen.contains(&frame.file.as_str()) {
            continue;
        }
        seen.push(&frame.file);

        let normalized = normalize_path(&frame.file, config);
        let selected = SelectedFrame {
            frame: frame.clone(),
            normalized: normalized.clone(),
        };
        if normalized.is_some() {
            resolved.push(selected);
        } else {
            unresolved.push(selected);
        }
    }

    // Keep as many resolvable frames as possible, topping up with
    // unresolved ones, then restore trace order.
    let mut picked: Vec<SelectedFrame> = resolved;
    picked.extend(unresolved);
    picked.truncate(MAX_SELECTED_FRAMES);
    picked.sort_by_key(|s| {
        frames
            .iter()
            .position(|f| f.file == s.frame.file && f.line == s.frame.line)
            .unwrap_or(usize::MAX)
    });
    picked
}

fn is_excluded(raw_path: &str) -> bool {
    let lower = raw_path.to_ascii_lowercase().replace('\\', "/");
    lower
        .split('/')
        .any(|segment| EXCLUDED_SEGMENTS.contains(&segment))
}
