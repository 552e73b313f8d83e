use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Plain text joined from the standards page, fed verbatim into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingCriteria(pub String);

/// One database row waiting to be rated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub page_id: String,
    pub prompt: String,
    pub response: String,
}

/// A row as fetched from the database. Rows with missing or malformed
/// properties are carried through the batch so they end up marked 'Error'
/// instead of silently disappearing.
#[derive(Debug, Clone)]
pub enum SourceRow {
    Complete(CandidateResponse),
    Malformed { page_id: String, reason: String },
}

impl SourceRow {
    pub fn page_id(&self) -> &str {
        match self {
            SourceRow::Complete(candidate) => &candidate.page_id,
            SourceRow::Malformed { page_id, .. } => page_id,
        }
    }
}

/// Scores and notes parsed out of the model's JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub scores: BTreeMap<String, f64>,
    pub evaluation_notes: String,
}

impl Rating {
    /// Keeps numeric `*_score` keys and the `evaluation_notes` string;
    /// everything else the model emits is dropped.
    pub fn from_model_output(output: &serde_json::Value) -> Option<Self> {
        let object = output.as_object()?;

        let evaluation_notes = object
            .get("evaluation_notes")
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
            .to_string();

        let mut scores = BTreeMap::new();
        for (key, value) in object {
            if key.ends_with("_score") {
                if let Some(number) = value.as_f64() {
                    scores.insert(key.clone(), number);
                }
            }
        }

        Some(Self {
            scores,
            evaluation_notes,
        })
    }
}

#[derive(Debug, Clone)]
pub enum RatingOutcome {
    Rated(Rating),
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct RatedResponse {
    pub page_id: String,
    pub outcome: RatingOutcome,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub rated: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_numeric_score_keys_and_notes() {
        let output = json!({
            "clarity_score": 8,
            "accuracy_score": 7.5,
            "evaluation_notes": "Clear but slightly off-topic."
        });

        let rating = Rating::from_model_output(&output).unwrap();
        assert_eq!(rating.scores.len(), 2);
        assert_eq!(rating.scores["clarity_score"], 8.0);
        assert_eq!(rating.scores["accuracy_score"], 7.5);
        assert_eq!(rating.evaluation_notes, "Clear but slightly off-topic.");
    }

    #[test]
    fn drops_non_numeric_scores_and_unrelated_keys() {
        let output = json!({
            "clarity_score": "eight",
            "tone_score": true,
            "verdict": "good",
            "helpfulness_score": 9
        });

        let rating = Rating::from_model_output(&output).unwrap();
        assert_eq!(rating.scores.len(), 1);
        assert_eq!(rating.scores["helpfulness_score"], 9.0);
        assert_eq!(rating.evaluation_notes, "N/A");
    }

    #[test]
    fn rejects_non_object_output() {
        assert!(Rating::from_model_output(&json!("just text")).is_none());
        assert!(Rating::from_model_output(&json!([1, 2, 3])).is_none());
    }
}
