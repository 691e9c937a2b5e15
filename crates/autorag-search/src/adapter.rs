//! Knowledge-source search adapter
//!
//! One [`KnowledgeSearch`] per configured source. Both search tools are
//! instances of the same adapter; they differ only in the bound source id
//! and the description the model sees.

use crate::oracle::SearchOracle;
use crate::types::{QueryShaping, SearchResult};
use autorag_tools::{Field, InputSchema, ToolDescriptor, ToolOutput, executor_fn, parse_args};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Tool name of the general knowledge search
pub const SEARCH_KNOWLEDGE: &str = "searchKnowledge";

/// Tool name of the governance search
pub const SEARCH_GOVERNANCE: &str = "searchGovernance";

/// Rendered in place of the citation list when nothing was cited
pub const NO_SOURCES: &str = "No sources available";

/// Static description of one knowledge source tool
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeSource {
    /// Oracle-side identifier of the document collection
    pub source_id: String,
    /// Tool name shown to the model
    pub tool_name: String,
    /// Tool description shown to the model
    pub description: String,
    /// Short noun phrase used in apology messages
    pub label: String,
    pub shaping: QueryShaping,
}

impl KnowledgeSource {
    /// The general SuperBenefit knowledge base
    pub fn general(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            tool_name: SEARCH_KNOWLEDGE.to_string(),
            description: "Search the SuperBenefit knowledge base for information about \
                          SuperBenefit, its mission, projects, concepts, tools and resources. \
                          Use this for general questions."
                .to_string(),
            label: "knowledge base".to_string(),
            shaping: QueryShaping::default(),
        }
    }

    /// Governance documents: policies, agreements, proposals, decisions
    pub fn governance(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            tool_name: SEARCH_GOVERNANCE.to_string(),
            description: "Search SuperBenefit governance documents: policies, agreements, \
                          proposals, decision records and governance processes. Use this for \
                          questions about how SuperBenefit is governed or makes decisions."
                .to_string(),
            label: "governance documents".to_string(),
            shaping: QueryShaping::default(),
        }
    }

    /// Replace the query shaping
    pub fn with_shaping(mut self, shaping: QueryShaping) -> Self {
        self.shaping = shaping;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

/// Search adapter bound to one knowledge source
#[derive(Clone)]
pub struct KnowledgeSearch {
    oracle: Arc<dyn SearchOracle>,
    source: KnowledgeSource,
}

impl KnowledgeSearch {
    pub fn new(oracle: Arc<dyn SearchOracle>, source: KnowledgeSource) -> Self {
        Self { oracle, source }
    }

    pub fn source(&self) -> &KnowledgeSource {
        &self.source
    }

    /// Issue one oracle request for `query`
    pub async fn search(&self, query: &str) -> autorag_core::Result<SearchResult> {
        self.source.shaping.validate()?;
        let request = self.source.shaping.request(query);
        let response = self.oracle.ai_search(&self.source.source_id, &request).await?;
        Ok(response.into())
    }

    /// Search and render for the transcript; failures become an apology
    pub async fn answer(&self, query: &str) -> String {
        info!(
            source_id = %self.source.source_id,
            query = %query,
            "Searching knowledge source"
        );
        match self.search(query).await {
            Ok(result) => {
                info!(
                    source_id = %self.source.source_id,
                    sources = result.sources.len(),
                    "Knowledge search succeeded"
                );
                format_answer(&result)
            }
            Err(e) => {
                warn!(
                    source_id = %self.source.source_id,
                    error = %e,
                    "Knowledge search failed"
                );
                format!(
                    "I'm sorry, I encountered an error while searching the {}: {e}",
                    self.source.label
                )
            }
        }
    }

    /// Auto-executing tool descriptor for this source
    pub fn descriptor(&self) -> ToolDescriptor {
        let schema = InputSchema::empty().field(Field::string(
            "query",
            "The search query to find relevant information",
        ));

        let adapter = self.clone();
        let tool_name = self.source.tool_name.clone();
        ToolDescriptor::new(&self.source.tool_name, &self.source.description, schema).with_executor(
            executor_fn(move |args| {
                let adapter = adapter.clone();
                let tool_name = tool_name.clone();
                async move {
                    let args: SearchArgs = parse_args(&tool_name, args)?;
                    Ok(ToolOutput::Text(adapter.answer(&args.query).await))
                }
            }),
        )
    }
}

/// `"<answer>\n\nSources:\n- <file> (score: 0.81)..."`
pub fn format_answer(result: &SearchResult) -> String {
    let mut out = format!("{}\n\nSources:\n", result.answer_text);
    if result.sources.is_empty() {
        out.push_str(NO_SOURCES);
        return out;
    }

    let lines: Vec<String> = result
        .sources
        .iter()
        .map(|s| format!("- {} (score: {:.2})", s.filename, s.score))
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SearchError};
    use crate::types::{AiSearchRequest, AiSearchResponse, SearchHit, SourceCitation};
    use async_trait::async_trait;
    use autorag_tools::{Dispatch, Dispatcher, Invocation, ResolutionKind, requires_confirmation};
    use serde_json::json;
    use std::sync::Mutex;

    /// Oracle returning a canned response and recording requests
    struct CannedOracle {
        response: Option<AiSearchResponse>,
        calls: Mutex<Vec<(String, AiSearchRequest)>>,
    }

    impl CannedOracle {
        fn answering(response: &str, hits: &[(&str, f64)]) -> Arc<Self> {
            Arc::new(Self {
                response: Some(AiSearchResponse {
                    search_query: String::new(),
                    response: response.to_string(),
                    data: hits
                        .iter()
                        .map(|(f, s)| SearchHit {
                            file_id: String::new(),
                            filename: (*f).to_string(),
                            score: *s,
                            attributes: serde_json::Map::new(),
                        })
                        .collect(),
                }),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchOracle for CannedOracle {
        async fn ai_search(
            &self,
            source_id: &str,
            request: &AiSearchRequest,
        ) -> Result<AiSearchResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((source_id.to_string(), request.clone()));
            self.response.clone().ok_or_else(|| SearchError::Api {
                status: 500,
                message: "index unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_format_answer_with_sources() {
        let result = SearchResult {
            answer_text: "Answer".to_string(),
            sources: vec![
                SourceCitation { filename: "a.md".to_string(), score: 0.9 },
                SourceCitation { filename: "b.md".to_string(), score: 0.666 },
            ],
        };
        assert_eq!(
            format_answer(&result),
            "Answer\n\nSources:\n- a.md (score: 0.90)\n- b.md (score: 0.67)"
        );
    }

    #[test]
    fn test_format_answer_without_sources() {
        let result = SearchResult {
            answer_text: "Nothing matched.".to_string(),
            sources: vec![],
        };
        assert_eq!(
            format_answer(&result),
            "Nothing matched.\n\nSources:\nNo sources available"
        );
    }

    #[tokio::test]
    async fn test_mission_scenario() {
        let oracle = CannedOracle::answering("SuperBenefit exists to...", &[("mission.md", 0.81)]);
        let search = KnowledgeSearch::new(oracle.clone(), KnowledgeSource::general("sb-knowledge"));

        let text = search.answer("What is SuperBenefit's mission?").await;
        assert_eq!(text, "SuperBenefit exists to...\n\nSources:\n- mission.md (score: 0.81)");

        let calls = oracle.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "sb-knowledge");
        assert_eq!(calls[0].1.query, "What is SuperBenefit's mission?");
        assert!(calls[0].1.rewrite_query);
        assert_eq!(calls[0].1.max_num_results, 8);
        assert_eq!(calls[0].1.ranking_options.unwrap().score_threshold, 0.65);
    }

    #[tokio::test]
    async fn test_oracle_failure_becomes_apology() {
        let search = KnowledgeSearch::new(
            CannedOracle::failing(),
            KnowledgeSource::governance("sb-governance"),
        );

        let text = search.answer("How are proposals ratified?").await;
        assert!(text.starts_with(
            "I'm sorry, I encountered an error while searching the governance documents"
        ));
        assert!(text.contains("index unavailable"));
    }

    #[tokio::test]
    async fn test_invalid_shaping_never_calls_oracle() {
        let oracle = CannedOracle::answering("unused", &[]);
        let source = KnowledgeSource::general("sb-knowledge").with_shaping(QueryShaping {
            max_num_results: 0,
            ..QueryShaping::default()
        });
        let search = KnowledgeSearch::new(oracle.clone(), source);

        let text = search.answer("anything").await;
        assert!(text.contains("max_num_results"));
        assert!(oracle.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_descriptor_is_auto_executing() {
        let oracle = CannedOracle::answering("Votes pass by consent.", &[]);
        let governance = KnowledgeSearch::new(oracle.clone(), KnowledgeSource::governance("gov"));
        let general = KnowledgeSearch::new(oracle.clone(), KnowledgeSource::general("kb"));

        let descriptor = governance.descriptor();
        assert_eq!(descriptor.name(), SEARCH_GOVERNANCE);
        assert!(!requires_confirmation(&descriptor));

        let dispatcher = Dispatcher::builder()
            .tool(descriptor)
            .tool(general.descriptor())
            .build()
            .unwrap();

        let Dispatch::Resolved(result) = dispatcher
            .dispatch(Invocation::new("g1", SEARCH_GOVERNANCE, json!({"query": "voting"})))
            .await
        else {
            panic!("expected resolved");
        };
        assert_eq!(result.kind, ResolutionKind::Completed);
        assert_eq!(result.content, "Votes pass by consent.\n\nSources:\nNo sources available");
        assert_eq!(oracle.calls.lock().unwrap()[0].0, "gov");
    }
}
