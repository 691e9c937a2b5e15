//! AutoRAG `ai-search` request and response types
//!
//! These mirror the hosted API exactly; field names are the wire names.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upper bound the oracle accepts for `max_num_results`
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// Query-shaping parameters bound to a knowledge source
///
/// These are fixed per source and never taken from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryShaping {
    pub rewrite_query: bool,
    pub max_num_results: u32,
    pub score_threshold: Option<f64>,
    pub model: Option<String>,
    pub reranking: Option<Reranking>,
}

impl Default for QueryShaping {
    fn default() -> Self {
        Self {
            rewrite_query: true,
            max_num_results: 8,
            score_threshold: Some(0.65),
            model: None,
            reranking: None,
        }
    }
}

impl QueryShaping {
    /// Check the ranges the oracle enforces
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_num_results) {
            return Err(SearchError::InvalidRequest(format!(
                "max_num_results must be between 1 and {MAX_RESULTS_LIMIT}, got {}",
                self.max_num_results
            )));
        }
        if let Some(threshold) = self.score_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(SearchError::InvalidRequest(format!(
                    "score_threshold must be between 0 and 1, got {threshold}"
                )));
            }
        }
        Ok(())
    }

    /// Build the request body for `query`
    pub fn request(&self, query: impl Into<String>) -> AiSearchRequest {
        AiSearchRequest {
            query: query.into(),
            rewrite_query: self.rewrite_query,
            max_num_results: self.max_num_results,
            ranking_options: self
                .score_threshold
                .map(|score_threshold| RankingOptions { score_threshold }),
            model: self.model.clone(),
            reranking: self.reranking.clone(),
        }
    }
}

/// Reranking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reranking {
    pub enabled: bool,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    pub score_threshold: f64,
}

/// Request body for `POST .../autorag/rags/{name}/ai-search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSearchRequest {
    pub query: String,
    pub rewrite_query: bool,
    pub max_num_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_options: Option<RankingOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranking: Option<Reranking>,
}

/// One retrieved document chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub file_id: String,
    pub filename: String,
    pub score: f64,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// The `result` object of an `ai-search` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSearchResponse {
    #[serde(default)]
    pub search_query: String,
    pub response: String,
    #[serde(default)]
    pub data: Vec<SearchHit>,
}

/// Message entry in the API envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

/// Standard API envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Joined error messages, or `fallback` when the oracle sent none
    pub fn error_message(&self, fallback: &str) -> String {
        if self.errors.is_empty() {
            return fallback.to_string();
        }
        self.errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("{} (code {code})", e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A cited source of a generated answer
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCitation {
    pub filename: String,
    /// Relevance in `[0, 1]`
    pub score: f64,
}

/// Generated answer plus its ordered citations
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub answer_text: String,
    pub sources: Vec<SourceCitation>,
}

impl From<AiSearchResponse> for SearchResult {
    fn from(response: AiSearchResponse) -> Self {
        Self {
            answer_text: response.response,
            sources: response
                .data
                .into_iter()
                .map(|hit| SourceCitation {
                    filename: hit.filename,
                    score: hit.score.clamp(0.0, 1.0),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_shaping_request_body() {
        let body = serde_json::to_value(QueryShaping::default().request("What is SuperBenefit?"))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "query": "What is SuperBenefit?",
                "rewrite_query": true,
                "max_num_results": 8,
                "ranking_options": { "score_threshold": 0.65 },
            })
        );
    }

    #[test]
    fn test_shaping_ranges() {
        assert!(QueryShaping::default().validate().is_ok());

        let too_many = QueryShaping {
            max_num_results: 51,
            ..QueryShaping::default()
        };
        assert!(matches!(too_many.validate(), Err(SearchError::InvalidRequest(_))));

        let bad_threshold = QueryShaping {
            score_threshold: Some(1.5),
            ..QueryShaping::default()
        };
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn test_response_parsing() {
        let envelope: ApiEnvelope<AiSearchResponse> = serde_json::from_value(json!({
            "success": true,
            "errors": [],
            "result": {
                "object": "vector_store.search_results.page",
                "search_query": "superbenefit mission",
                "response": "SuperBenefit exists to...",
                "data": [
                    {
                        "file_id": "f-1",
                        "filename": "mission.md",
                        "score": 0.81,
                        "attributes": { "folder": "about/" },
                        "content": [{ "type": "text", "text": "..." }]
                    }
                ],
                "has_more": false,
                "next_page": null
            }
        }))
        .unwrap();

        let result: SearchResult = envelope.result.unwrap().into();
        assert_eq!(result.answer_text, "SuperBenefit exists to...");
        assert_eq!(
            result.sources,
            vec![SourceCitation {
                filename: "mission.md".to_string(),
                score: 0.81
            }]
        );
    }

    #[test]
    fn test_envelope_error_message() {
        let envelope: ApiEnvelope<AiSearchResponse> = serde_json::from_value(json!({
            "success": false,
            "errors": [{ "code": 7003, "message": "Could not route" }],
            "result": null
        }))
        .unwrap();

        assert_eq!(envelope.error_message("fallback"), "Could not route (code 7003)");
    }
}
