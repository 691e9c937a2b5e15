//! AutoRAG knowledge-source search for autorag-agent
//!
//! Wraps the hosted retrieval-augmented-generation service as two
//! auto-executing tools, `searchKnowledge` and `searchGovernance`. Each call
//! issues exactly one `ai-search` request with fixed query shaping and
//! renders the generated answer with its cited sources.

pub mod adapter;
pub mod error;
pub mod oracle;
pub mod types;

pub use adapter::{
    KnowledgeSearch, KnowledgeSource, NO_SOURCES, SEARCH_GOVERNANCE, SEARCH_KNOWLEDGE,
    format_answer,
};
pub use error::{Result, SearchError};
pub use oracle::{HttpSearchOracle, SearchOracle};
pub use types::{
    AiSearchRequest, AiSearchResponse, QueryShaping, Reranking, SearchHit, SearchResult,
    SourceCitation,
};
