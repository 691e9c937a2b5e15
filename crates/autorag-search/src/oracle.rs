//! Remote AutoRAG oracle
//!
//! [`SearchOracle`] is the seam between the search tools and the hosted
//! service; [`HttpSearchOracle`] is the production implementation. One
//! request per query, no automatic retries.

use crate::error::{Result, SearchError};
use crate::types::{AiSearchRequest, AiSearchResponse, ApiEnvelope};
use async_trait::async_trait;
use autorag_utils::AppConfig;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Answers a free-text query against one knowledge source
#[async_trait]
pub trait SearchOracle: Send + Sync {
    async fn ai_search(
        &self,
        source_id: &str,
        request: &AiSearchRequest,
    ) -> Result<AiSearchResponse>;
}

/// HTTP client for the hosted AutoRAG `ai-search` endpoint
pub struct HttpSearchOracle {
    client: Client,
    base_url: Url,
    account_id: String,
    api_token: String,
}

impl HttpSearchOracle {
    /// Create a client
    ///
    /// `timeout` of `None` leaves request duration unbounded here; the
    /// platform's own limits still apply.
    pub fn new(
        base_url: &str,
        account_id: impl Into<String>,
        api_token: impl Into<String>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        let base_url = Url::parse(&format!("{base}/")).map_err(|e| {
            SearchError::Configuration(format!("invalid base URL '{base_url}': {e}"))
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            account_id: account_id.into(),
            api_token: api_token.into(),
        })
    }

    /// Create a client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let (account_id, api_token) = config.credentials()?;
        Self::new(&config.base_url, account_id, api_token, config.request_timeout)
    }

    /// Endpoint URL for a knowledge source
    pub fn endpoint(&self, source_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SearchError::Configuration("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "accounts",
                self.account_id.as_str(),
                "autorag",
                "rags",
                source_id,
                "ai-search",
            ]);
        Ok(url)
    }
}

#[async_trait]
impl SearchOracle for HttpSearchOracle {
    #[instrument(skip(self, request))]
    async fn ai_search(
        &self,
        source_id: &str,
        request: &AiSearchRequest,
    ) -> Result<AiSearchResponse> {
        let url = self.endpoint(source_id)?;
        debug!(url = %url, query = %request.query, "Sending ai-search request");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let envelope: Option<ApiEnvelope<AiSearchResponse>> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = envelope.map_or_else(
                || body.chars().take(500).collect(),
                |e| e.error_message(status.canonical_reason().unwrap_or("request failed")),
            );
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = envelope.ok_or_else(|| {
            SearchError::UnexpectedResponse(format!(
                "body is not an AutoRAG envelope: {}",
                body.chars().take(200).collect::<String>()
            ))
        })?;

        if !envelope.success {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: envelope.error_message("success=false without errors"),
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| SearchError::UnexpectedResponse("missing result".to_string()))?;

        debug!(
            hits = result.data.len(),
            search_query = %result.search_query,
            "Received ai-search response"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryShaping;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oracle_for(server: &MockServer) -> HttpSearchOracle {
        HttpSearchOracle::new(&format!("{}/client/v4", server.uri()), "acct", "tok", None).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let oracle =
            HttpSearchOracle::new("https://api.cloudflare.com/client/v4/", "acct", "tok", None)
                .unwrap();
        assert_eq!(
            oracle.endpoint("superbenefit-knowledge").unwrap().as_str(),
            concat!(
                "https://api.cloudflare.com/client/v4/accounts/acct/autorag/rags/",
                "superbenefit-knowledge/ai-search"
            )
        );
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let result = HttpSearchOracle::from_config(&AppConfig::default());
        assert!(matches!(result, Err(SearchError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_successful_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/client/v4/accounts/acct/autorag/rags/kb/ai-search"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({
                "query": "mission",
                "rewrite_query": true,
                "max_num_results": 8,
                "ranking_options": { "score_threshold": 0.65 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": {
                    "search_query": "mission",
                    "response": "SuperBenefit exists to...",
                    "data": [{
                        "file_id": "1",
                        "filename": "mission.md",
                        "score": 0.81,
                        "attributes": {}
                    }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = QueryShaping::default().request("mission");
        let response = oracle_for(&server).ai_search("kb", &request).await.unwrap();

        assert_eq!(response.response, "SuperBenefit exists to...");
        assert_eq!(response.data[0].filename, "mission.md");
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "errors": [{ "code": 7002, "message": "AutoRAG not found" }],
                "result": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = QueryShaping::default().request("anything");
        let err = oracle_for(&server).ai_search("missing", &request).await.unwrap_err();

        match err {
            SearchError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "AutoRAG not found (code 7002)");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let request = QueryShaping::default().request("anything");
        let err = oracle_for(&server).ai_search("kb", &request).await.unwrap_err();
        assert!(matches!(err, SearchError::UnexpectedResponse(_)));
    }
}
