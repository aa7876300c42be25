//! Error events and per-project repository configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An application error captured by the ingestion API.
///
/// Immutable once created; the pipeline consumes it read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEvent {
    /// Unique identifier for this event.
    pub id: Uuid,

    /// When the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Key of the owning project (e.g. "checkout-api").
    pub project_key: String,

    /// HTTP method of the failing request.
    pub method: String,

    /// Request path of the failing request.
    pub path: String,

    /// Error message.
    pub message: String,

    /// Raw stack trace text, when the SDK captured one.
    pub stack_trace: Option<String>,

    /// HTTP status code, when known. Analysis only runs for 5xx.
    pub status_code: Option<u16>,
}

impl ErrorEvent {
    /// Whether this event is in the server-error class the pipeline analyzes.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code, Some(code) if code >= 500)
    }
}

/// Supported Git hosting providers.
///
/// Any other value fails at deserialization time, which is the
/// configuration-error path for unsupported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GitProviderKind {
    Github,
    Gitlab,
}

impl GitProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitProviderKind::Github => "github",
            GitProviderKind::Gitlab => "gitlab",
        }
    }
}

impl std::str::FromStr for GitProviderKind {
    type Err = crate::domain::TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(GitProviderKind::Github),
            "gitlab" => Ok(GitProviderKind::Gitlab),
            other => Err(crate::domain::TriageError::UnsupportedProvider(
                other.to_string(),
            )),
        }
    }
}

/// Per-project repository configuration for code fetching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoConfig {
    /// Git hosting provider.
    pub provider: GitProviderKind,

    /// Repository owner or organisation.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Branch name (e.g. "main"). Used when no commit SHA is pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Specific commit SHA; takes precedence over the branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,

    /// Explicit access token for private repositories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Explicit root directory inside the repository (e.g. "backend").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,

    /// Ordered candidate root directory names, tried during normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_hints: Option<Vec<String>>,
}

impl RepoConfig {
    pub fn new(provider: GitProviderKind, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            provider,
            owner: owner.into(),
            repo: repo.into(),
            branch: None,
            commit_sha: None,
            access_token: None,
            root_dir: None,
            root_hints: None,
        }
    }

    /// The ref to fetch at: commit SHA over branch, defaulting to "main".
    pub fn ref_name(&self) -> &str {
        self.commit_sha
            .as_deref()
            .or(self.branch.as_deref())
            .unwrap_or("main")
    }
}
