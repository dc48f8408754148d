//! Solr select client over Spin outbound HTTP.

use async_trait::async_trait;
use shop_search::solr;
use shop_search::{FacetRegistry, ListingError, ListingManager, ListingService, QueryExecutor, SearchRequest, SearchResponse};

/// Listing store backed by a Solr core.
pub struct SolrClient {
    select_url: String,
    registry: FacetRegistry,
}

impl SolrClient {
    /// Create a client for a select endpoint, e.g.
    /// `http://localhost:8983/solr/listings/select`.
    pub fn new(select_url: impl Into<String>) -> Self {
        Self {
            select_url: select_url.into(),
            registry: FacetRegistry::standard(),
        }
    }

    async fn select(&self, request: &SearchRequest) -> Result<SearchResponse, ListingError> {
        let url = solr::select_url(&self.select_url, request);
        tracing::debug!(%url, "solr select");

        let req = spin_sdk::http::Request::get(&url);
        let resp: spin_sdk::http::Response = spin_sdk::http::send(req)
            .await
            .map_err(|e| ListingError::Backend(e.to_string()))?;

        let status = *resp.status();
        let parsed = solr::parse_response(resp.body(), request, &self.registry);
        if status >= 400 {
            // Prefer Solr's own error message when the body carries one.
            return Err(match parsed {
                Err(e) => e,
                Ok(_) => ListingError::Backend(format!("HTTP {} from {}", status, self.select_url)),
            });
        }
        parsed
    }
}

#[async_trait(?Send)]
impl QueryExecutor for SolrClient {
    async fn query(&self, request: &SearchRequest) -> Result<SearchResponse, ListingError> {
        self.select(request).await
    }
}

#[async_trait(?Send)]
impl ListingService for SolrClient {
    async fn find_listings(&self, request: &SearchRequest) -> Result<Option<SearchResponse>, ListingError> {
        self.select(request).await.map(Some)
    }
}

impl ListingManager for SolrClient {
    fn query_executor(&self) -> Option<&dyn QueryExecutor> {
        Some(self)
    }
}
