//! Listing request handlers.
//!
//! Handlers are transport-agnostic: they take a mounted [`RequestContext`]
//! and produce a [`ListingResponse`]. The HTTP component owns the wire.

use futures::future::try_join_all;
use http::StatusCode;
use shop_core::{LogLevel, Method, RequestContext, RequestLog, ShopConfig};

use crate::error::ListingError;
use crate::facets::FacetRegistry;
use crate::price::PriceFormat;
use crate::render::{help_text, HtmlRenderer, JsonRenderer, ListingPage};
use crate::service::{ListingManager, ListingService};
use crate::translate::{translate_html, translate_json, variations_of};

pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";

/// A rendered handler response.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl ListingResponse {
    pub fn ok(content_type: &'static str, body: String) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            body,
        }
    }

    /// Plain-text error response with the error's status.
    pub fn from_error(error: &ListingError) -> Self {
        Self {
            status: error.status(),
            content_type: TEXT_PLAIN,
            body: format!("{}\n", error),
        }
    }
}

fn require_get(ctx: &RequestContext) -> Result<(), ListingError> {
    match ctx.method {
        Method::Get => Ok(()),
        other => Err(ListingError::MethodNotAllowed(other.to_string())),
    }
}

fn log_failure(log: &RequestLog, error: &ListingError) {
    let level = if error.status().is_server_error() {
        LogLevel::Error
    } else {
        LogLevel::Warn
    };
    log.event(level, "listing request failed")
        .field("status", error.status().as_u16())
        .field("error", error.to_string())
        .emit();
}

/// Serves listings as JSON envelopes.
pub struct JsonListingHandler<S> {
    service: S,
    registry: FacetRegistry,
    price_format: PriceFormat,
}

impl<S: ListingService> JsonListingHandler<S> {
    pub fn new(service: S, config: &ShopConfig) -> Result<Self, ListingError> {
        Ok(Self {
            service,
            registry: FacetRegistry::standard(),
            price_format: PriceFormat::from_config(&config.presentation)?,
        })
    }

    pub async fn handle(&self, ctx: &RequestContext, log: &RequestLog) -> ListingResponse {
        match self.respond(ctx, log).await {
            Ok(response) => response,
            Err(e) => {
                log_failure(log, &e);
                ListingResponse::from_error(&e)
            }
        }
    }

    async fn respond(&self, ctx: &RequestContext, log: &RequestLog) -> Result<ListingResponse, ListingError> {
        require_get(ctx)?;
        if ctx.query.contains("help") {
            return Ok(ListingResponse::ok(TEXT_PLAIN, help_text(&ctx.base_url())));
        }

        let translation = translate_json(&ctx.query, ctx.path_info.as_deref(), &self.registry)?;
        let response = self
            .service
            .find_listings(&translation.request)
            .await?
            .ok_or(ListingError::NotFound)?;

        log.event(LogLevel::Info, "listing query")
            .field("single", translation.single_listing)
            .field("numFound", response.num_found)
            .field("qtime_ms", response.query_time_ms)
            .emit();

        let pretty = ctx.query.contains("text");
        let renderer = JsonRenderer::new(ctx.base_url(), self.price_format);
        let body = if translation.single_listing {
            renderer.render_single(&response, pretty)?
        } else {
            renderer.render_list(&response, pretty)?
        };

        let content_type = if pretty { TEXT_PLAIN } else { APPLICATION_JSON };
        Ok(ListingResponse::ok(content_type, body))
    }
}

/// Serves listings as HTML pages.
pub struct HtmlListingHandler<M> {
    manager: M,
    registry: FacetRegistry,
    price_format: PriceFormat,
}

impl<M: ListingManager> HtmlListingHandler<M> {
    pub fn new(manager: M, config: &ShopConfig) -> Result<Self, ListingError> {
        Ok(Self {
            manager,
            registry: FacetRegistry::standard(),
            price_format: PriceFormat::from_config(&config.presentation)?,
        })
    }

    pub async fn handle(&self, ctx: &RequestContext, log: &RequestLog) -> ListingResponse {
        match self.respond(ctx, log).await {
            Ok(response) => response,
            Err(e) => {
                log_failure(log, &e);
                ListingResponse::from_error(&e)
            }
        }
    }

    async fn respond(&self, ctx: &RequestContext, log: &RequestLog) -> Result<ListingResponse, ListingError> {
        require_get(ctx)?;
        let executor = self
            .manager
            .query_executor()
            .ok_or(ListingError::BackendUnavailable)?;

        let translation = translate_html(&ctx.query, ctx.path_info.as_deref(), &self.registry)?;
        let response = executor.query(&translation.request).await?;

        // Detail pages list the variations of every matched listing.
        let variations = if translation.single_listing {
            let requests: Vec<_> = response.documents.iter().map(|doc| variations_of(&doc.id)).collect();
            tracing::debug!(count = requests.len(), "querying variations");
            try_join_all(requests.iter().map(|request| executor.query(request))).await?
        } else {
            Vec::new()
        };

        log.event(LogLevel::Info, "listing page")
            .field("single", translation.single_listing)
            .field("numFound", response.num_found)
            .field("variationQueries", variations.len())
            .emit();

        let page = ListingPage::new(ctx.path_info.clone(), response)
            .with_selected_facets(translation.selected_facets)
            .with_variations(variations);
        let body = HtmlRenderer::new(ctx.base_url(), self.price_format).render(&page);

        Ok(ListingResponse::ok(TEXT_HTML, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use async_trait::async_trait;
    use shop_core::{PresentationConfig, RequestId};

    use crate::query::{ResultDimension, SearchRequest};
    use crate::result::{ListingDocument, SearchResponse};
    use crate::service::QueryExecutor;

    struct FakeService {
        documents: Option<Vec<ListingDocument>>,
        seen: RefCell<Vec<SearchRequest>>,
    }

    impl FakeService {
        fn with(documents: Option<Vec<ListingDocument>>) -> Self {
            Self {
                documents,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl ListingService for FakeService {
        async fn find_listings(&self, request: &SearchRequest) -> Result<Option<SearchResponse>, ListingError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.documents.clone().map(|docs| {
                let mut response = SearchResponse::empty(request.clone());
                response.num_found = docs.len() as u64;
                response.documents = docs;
                response
            }))
        }
    }

    struct FakeExecutor {
        queries: RefCell<Vec<SearchRequest>>,
    }

    #[async_trait(?Send)]
    impl QueryExecutor for FakeExecutor {
        async fn query(&self, request: &SearchRequest) -> Result<SearchResponse, ListingError> {
            self.queries.borrow_mut().push(request.clone());
            let mut response = SearchResponse::empty(request.clone());
            let doc = match request.advanced_query() {
                Some(_) => ListingDocument::new("v-1").with_title("Variation"),
                None => ListingDocument::new("p-1").with_title("Sneaker"),
            };
            response.documents.push(doc);
            response.num_found = 1;
            Ok(response)
        }
    }

    struct FakeManager(Option<FakeExecutor>);

    impl ListingManager for FakeManager {
        fn query_executor(&self) -> Option<&dyn QueryExecutor> {
            self.0.as_ref().map(|e| e as &dyn QueryExecutor)
        }
    }

    fn ctx(path: &str, servlet: &str) -> RequestContext {
        RequestContext::new(Method::Get, path).mount("", servlet).unwrap()
    }

    fn log() -> RequestLog {
        RequestLog::new(RequestId::from_string("test")).with_min_level(LogLevel::Error)
    }

    #[tokio::test]
    async fn test_json_list() {
        let service = FakeService::with(Some(vec![ListingDocument::new("p-1")]));
        let handler = JsonListingHandler::new(&service, &ShopConfig::default()).unwrap();
        let response = handler.handle(&ctx("/listings?q=tee&r=5", "/listings"), &log()).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, APPLICATION_JSON);
        let value: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(value["products"][0]["id"], "p-1");
        assert_eq!(service.seen.borrow()[0].max_results(), 5);
    }

    #[tokio::test]
    async fn test_json_single_pretty() {
        let service = FakeService::with(Some(vec![ListingDocument::new("p-1")]));
        let handler = JsonListingHandler::new(&service, &ShopConfig::default()).unwrap();
        let response = handler.handle(&ctx("/listings/_id/p-1?text", "/listings"), &log()).await;

        assert_eq!(response.content_type, TEXT_PLAIN);
        assert!(response.body.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(value["product"]["id"], "p-1");
        assert_eq!(service.seen.borrow()[0].dimension(), ResultDimension::Full);
    }

    #[tokio::test]
    async fn test_json_help_skips_search() {
        let service = FakeService::with(None);
        let handler = JsonListingHandler::new(&service, &ShopConfig::default()).unwrap();
        let response = handler.handle(&ctx("/listings?help", "/listings"), &log()).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, TEXT_PLAIN);
        assert!(response.body.contains("http://localhost/listings/"));
        assert!(service.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_json_no_result_is_not_found() {
        let handler = JsonListingHandler::new(FakeService::with(None), &ShopConfig::default()).unwrap();
        let response = handler.handle(&ctx("/listings", "/listings"), &log()).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_json_invalid_rows() {
        let service = FakeService::with(Some(Vec::new()));
        let handler = JsonListingHandler::new(&service, &ShopConfig::default()).unwrap();
        let response = handler.handle(&ctx("/listings?r=0", "/listings"), &log()).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("'r'"));
        assert!(service.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_non_get_rejected() {
        let service = FakeService::with(Some(Vec::new()));
        let handler = JsonListingHandler::new(&service, &ShopConfig::default()).unwrap();
        let post = RequestContext::new(Method::Post, "/listings?q=tee").mount("", "/listings").unwrap();
        let response = handler.handle(&post, &log()).await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.body, "Method POST not allowed\n");
        assert!(service.seen.borrow().is_empty());

        let manager = FakeManager(Some(FakeExecutor { queries: RefCell::new(Vec::new()) }));
        let handler = HtmlListingHandler::new(&manager, &ShopConfig::default()).unwrap();
        let delete = RequestContext::new(Method::Delete, "/listings.html").mount("", "/listings.html").unwrap();
        let response = handler.handle(&delete, &log()).await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(manager.0.as_ref().unwrap().queries.borrow().is_empty());
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let config = ShopConfig {
            presentation: PresentationConfig {
                currency: "XXX".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(JsonListingHandler::new(FakeService::with(None), &config).is_err());
    }

    #[tokio::test]
    async fn test_html_without_executor() {
        let handler = HtmlListingHandler::new(FakeManager(None), &ShopConfig::default()).unwrap();
        let response = handler.handle(&ctx("/listings.html", "/listings.html"), &log()).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_html_list_skips_variations() {
        let manager = FakeManager(Some(FakeExecutor { queries: RefCell::new(Vec::new()) }));
        let handler = HtmlListingHandler::new(&manager, &ShopConfig::default()).unwrap();
        let response = handler.handle(&ctx("/listings.html?q=sneaker", "/listings.html"), &log()).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, TEXT_HTML);
        assert!(response.body.contains("<strong>Sneaker</strong>"));
        assert!(!response.body.contains("variations available"));
        assert_eq!(manager.0.as_ref().unwrap().queries.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_html_detail_queries_variations() {
        let manager = FakeManager(Some(FakeExecutor { queries: RefCell::new(Vec::new()) }));
        let handler = HtmlListingHandler::new(&manager, &ShopConfig::default()).unwrap();
        let response = handler
            .handle(&ctx("/listings.html/red-sneaker", "/listings.html"), &log())
            .await;

        assert!(response.body.contains("There are 1 variations available."));
        assert!(response.body.contains("<strong>Variation</strong>"));

        let queries = manager.0.as_ref().unwrap().queries.borrow();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].filters(), ["uripath:red\\-sneaker"]);
        assert_eq!(queries[1].advanced_query(), Some("parentid:p\\-1"));
    }
}
