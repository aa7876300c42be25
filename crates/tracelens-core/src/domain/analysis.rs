//! Stored analysis records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse indicator of how much source context backed an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// AI-generated root-cause analysis for one error event.
///
/// At most one exists per [`ErrorEvent`](crate::domain::ErrorEvent);
/// the storage layer enforces the uniqueness and the orchestrator treats a
/// duplicate insert as a no-op success. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    /// The error event this analysis belongs to (unique key).
    pub error_event_id: Uuid,

    /// The analysis text produced by the model.
    pub analysis_text: String,

    /// Identifier of the model that produced the analysis.
    pub model: String,

    /// How much source context backed the analysis.
    pub confidence: Confidence,

    /// Whether any source code was available when building the prompt.
    pub has_source_code: bool,

    /// When the analysis was recorded.
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(
        error_event_id: Uuid,
        analysis_text: impl Into<String>,
        model: impl Into<String>,
        confidence: Confidence,
        has_source_code: bool,
    ) -> Self {
        Self {
            error_event_id,
            analysis_text: analysis_text.into(),
            model: model.into(),
            confidence,
            has_source_code,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Confidence::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::from_str::<Confidence>("\"low\"").unwrap(),
            Confidence::Low
        );
    }

    #[test]
    fn test_analysis_result_round_trip() {
        let result = AnalysisResult::new(
            Uuid::new_v4(),
            "null pointer in handler",
            "gpt-4o-mini",
            Confidence::Medium,
            true,
        );
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
