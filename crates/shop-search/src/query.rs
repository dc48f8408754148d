//! Search request model.

use serde::{Deserialize, Serialize};

use crate::error::ListingError;

/// Largest page a single request may ask for.
pub const MAX_RESULTS_LIMIT: u32 = 100;

/// Page size when the request does not say.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// How much of each listing the backend returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultDimension {
    /// Summary fields for result lists.
    #[default]
    Compact,
    /// Every stored field, for detail pages.
    Full,
}

impl ResultDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultDimension::Compact => "compact",
            ResultDimension::Full => "full",
        }
    }
}

/// Sort direction for a sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// A facet the backend should count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetRequest {
    /// Count every distinct value of a field.
    Field(String),
    /// Count matches of a query expression, e.g. `price:[10 TO 20]`.
    Query(String),
}

impl FacetRequest {
    /// Facet id the counts are grouped under: the field name.
    pub fn facet_id(&self) -> &str {
        match self {
            FacetRequest::Field(name) => name,
            FacetRequest::Query(expr) => expr.split(':').next().unwrap_or(expr),
        }
    }
}

/// A search request against the listing store.
///
/// Filter clauses are append-only: once added they are neither edited nor
/// removed, and all of them must match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    query: Option<String>,
    advanced_query: Option<String>,
    filters: Vec<String>,
    dimension: ResultDimension,
    start: u64,
    max_results: u32,
    sort_fields: Vec<(String, SortDirection)>,
    facets: Vec<FacetRequest>,
    fields: Vec<String>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchRequest {
    /// Create an empty request matching everything.
    pub fn new() -> Self {
        Self {
            query: None,
            advanced_query: None,
            filters: Vec::new(),
            dimension: ResultDimension::Compact,
            start: 0,
            max_results: DEFAULT_MAX_RESULTS,
            sort_fields: Vec::new(),
            facets: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Set the free-text query. Clears any advanced query.
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.set_query(q);
        self
    }

    /// Set the free-text query in place. Clears any advanced query.
    pub fn set_query(&mut self, q: impl Into<String>) {
        self.query = Some(q.into());
        self.advanced_query = None;
    }

    /// Set a raw query-syntax query. Clears any free-text query.
    pub fn with_advanced_query(mut self, q: impl Into<String>) -> Self {
        self.advanced_query = Some(q.into());
        self.query = None;
        self
    }

    /// Append a filter clause.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.add_filter(filter);
        self
    }

    /// Append a filter clause in place.
    pub fn add_filter(&mut self, filter: impl Into<String>) {
        self.filters.push(filter.into());
    }

    /// Set the result dimension.
    pub fn with_dimension(mut self, dimension: ResultDimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the zero-based start offset.
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Set the page size, rejecting values outside `1..=100`.
    pub fn set_max_results(&mut self, max_results: u32) -> Result<(), ListingError> {
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(ListingError::invalid(
                "r",
                "rows must be greater than zero and less than or equal to 100",
            ));
        }
        self.max_results = max_results;
        Ok(())
    }

    /// Builder form of [`SearchRequest::set_max_results`].
    pub fn with_max_results(mut self, max_results: u32) -> Result<Self, ListingError> {
        self.set_max_results(max_results)?;
        Ok(self)
    }

    /// Append a sort field. A field sorted twice keeps its first position
    /// and takes the new direction.
    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        match self.sort_fields.iter_mut().find(|(f, _)| *f == field) {
            Some(existing) => existing.1 = direction,
            None => self.sort_fields.push((field, direction)),
        }
        self
    }

    /// Request facet counts.
    pub fn with_facets(mut self, facets: impl IntoIterator<Item = FacetRequest>) -> Self {
        self.facets.extend(facets);
        self
    }

    /// Restrict the stored fields returned per listing.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn advanced_query(&self) -> Option<&str> {
        self.advanced_query.as_deref()
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn dimension(&self) -> ResultDimension {
        self.dimension
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn sort_fields(&self) -> &[(String, SortDirection)] {
        &self.sort_fields
    }

    pub fn facets(&self) -> &[FacetRequest] {
        &self.facets
    }

    /// Requested stored fields; empty means the dimension decides.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}
