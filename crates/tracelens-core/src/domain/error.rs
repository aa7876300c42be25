//! Domain-level error taxonomy for Tracelens.

/// Per-file failure during the Git fetch phase.
///
/// These never abort an analysis job; each one degrades the context for a
/// single file and is logged at warn level by the fetcher.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("unauthorized fetching {path} (missing or invalid token)")]
    Unauthorized { path: String },

    #[error("fetch timed out for {path}")]
    Timeout { path: String },

    #[error("could not decode content of {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("provider returned status {status} for {path}")]
    Http { path: String, status: u16 },

    #[error("network error fetching {path}: {reason}")]
    Network { path: String, reason: String },
}

impl FetchError {
    /// The repository path the failure relates to.
    pub fn path(&self) -> &str {
        match self {
            FetchError::NotFound { path }
            | FetchError::Unauthorized { path }
            | FetchError::Timeout { path }
            | FetchError::Decode { path, .. }
            | FetchError::Http { path, .. }
            | FetchError::Network { path, .. } => path,
        }
    }
}

/// Tracelens job-level errors.
///
/// Only failures that end the whole job live here; per-file fetch problems
/// stay inside [`FetchError`] and surface as degraded context instead.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("unsupported git provider: {0}")]
    UnsupportedProvider(String),

    #[error("model call failed: {0}")]
    Model(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Tracelens domain operations.
pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::NotFound {
            path: "src/app.js".to_string(),
        };
        assert!(err.to_string().contains("src/app.js"));

        let err = FetchError::Http {
            path: "src/app.js".to_string(),
            status: 500,
        };
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_fetch_error_path_accessor() {
        let err = FetchError::Timeout {
            path: "lib/db.py".to_string(),
        };
        assert_eq!(err.path(), "lib/db.py");
    }

    #[test]
    fn test_triage_error_display() {
        let err = TriageError::UnsupportedProvider("bitbucket".to_string());
        assert!(err.to_string().contains("bitbucket"));

        let err = TriageError::Model("upstream timeout".to_string());
        assert!(err.to_string().contains("model call failed"));
    }
}
