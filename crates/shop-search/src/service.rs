//! Search collaborator interfaces.
//!
//! Both handlers delegate the actual search to a backend handed to them at
//! construction. Spin components run single-threaded, so the futures are not
//! required to be `Send`.

use async_trait::async_trait;

use crate::error::ListingError;
use crate::query::SearchRequest;
use crate::result::SearchResponse;

/// High-level listing search used by the JSON handler.
#[async_trait(?Send)]
pub trait ListingService {
    /// Run a request. `Ok(None)` means the service produced no result.
    async fn find_listings(&self, request: &SearchRequest) -> Result<Option<SearchResponse>, ListingError>;
}

/// Raw query execution used by the HTML handler.
#[async_trait(?Send)]
pub trait QueryExecutor {
    async fn query(&self, request: &SearchRequest) -> Result<SearchResponse, ListingError>;
}

/// Listing storage that may or may not support raw query execution.
pub trait ListingManager {
    /// The query executor, if this storage offers one.
    fn query_executor(&self) -> Option<&dyn QueryExecutor>;
}

#[async_trait(?Send)]
impl<T: ListingService + ?Sized> ListingService for &T {
    async fn find_listings(&self, request: &SearchRequest) -> Result<Option<SearchResponse>, ListingError> {
        (**self).find_listings(request).await
    }
}

impl<T: ListingManager + ?Sized> ListingManager for &T {
    fn query_executor(&self) -> Option<&dyn QueryExecutor> {
        (**self).query_executor()
    }
}
