//! Domain models for Tracelens.
//!
//! Canonical definitions for the core entities:
//! - `ErrorEvent`: Immutable captured error, produced by the ingestion API
//! - `RepoConfig`: Per-project Git repository configuration
//! - `AnalysisResult`: Unique-per-event AI analysis record
//! - `TriageError` / `FetchError`: Job-level and per-file failure taxonomy

pub mod analysis;
pub mod error;
pub mod event;

// Re-export main types and errors
pub use analysis::{AnalysisResult, Confidence};
pub use error::{FetchError, Result, TriageError};
pub use event::{ErrorEvent, GitProviderKind, RepoConfig};
