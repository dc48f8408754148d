//! Query translation and result projection for shop listings.
//!
//! Two handlers front the same listing store:
//!
//! - **JSON listings** (`JsonListingHandler`): query parameters become a
//!   [`SearchRequest`], the [`ListingService`] answers it, and the response is
//!   rendered as a versioned JSON envelope.
//! - **HTML listings** (`HtmlListingHandler`): the same parameters plus facet
//!   narrowing run against a [`QueryExecutor`], rendered as a plain HTML page
//!   with a variation pass for single-listing lookups.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_core::QueryParams;
//! use shop_search::prelude::*;
//!
//! let params = QueryParams::parse("q=shirt&c=men&r=20");
//! let translation = translate_json(&params, None, &FacetRegistry::standard())?;
//! assert_eq!(translation.request.max_results(), 20);
//! ```

pub mod error;
pub mod escape;
pub mod facets;
pub mod handler;
pub mod price;
pub mod query;
pub mod render;
pub mod result;
pub mod service;
pub mod solr;
pub mod translate;

pub use error::ListingError;
pub use escape::escape_query_chars;
pub use facets::{FacetFilter, FacetRegistry};
pub use handler::{HtmlListingHandler, JsonListingHandler, ListingResponse};
pub use price::{Currency, Price, PriceFormat};
pub use query::{FacetRequest, ResultDimension, SearchRequest, SortDirection};
pub use result::{AttributeValue, FacetValue, ListingAttribute, ListingDocument, ResultFacet, SearchResponse};
pub use service::{ListingManager, ListingService, QueryExecutor};
pub use translate::{translate_html, translate_json, Translation};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::ListingError;
    pub use crate::facets::{FacetFilter, FacetRegistry};
    pub use crate::handler::{HtmlListingHandler, JsonListingHandler, ListingResponse};
    pub use crate::price::{Currency, Price, PriceFormat};
    pub use crate::query::{FacetRequest, ResultDimension, SearchRequest, SortDirection};
    pub use crate::result::{
        AttributeValue, FacetValue, ListingAttribute, ListingDocument, ResultFacet, SearchResponse,
    };
    pub use crate::service::{ListingManager, ListingService, QueryExecutor};
    pub use crate::translate::{translate_html, translate_json, Translation};
}
