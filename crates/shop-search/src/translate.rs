//! Query parameter translation.
//!
//! Recognized parameters:
//!
//! | Parameter | Meaning |
//! |---|---|
//! | `q` | free-text query |
//! | `f` | raw filter clause (repeatable) |
//! | `c` | category, AND-combined (repeatable) |
//! | `t` | tag, AND-combined (repeatable) |
//! | `s` | zero-based start offset |
//! | `r` | rows per page, 1 to 100 |
//! | `narrow` | `name:value` facet refinement (repeatable) |
//!
//! A non-empty path below the handler mount switches to single-listing
//! lookup and ignores everything else.

use shop_core::QueryParams;

use crate::error::ListingError;
use crate::escape::escape_query_chars;
use crate::facets::FacetRegistry;
use crate::query::{ResultDimension, SearchRequest};

/// Path prefix addressing a listing by id instead of URI path.
pub const ID_PATH_PREFIX: &str = "/_id/";

/// Filter applied to list queries so variations only show on detail pages.
pub const EXCLUDE_VARIATIONS: &str = "-type:variation";

const LIST_FIELDS: &[&str] = &["id", "title", "price", "name", "score", "img48", "uripath"];
const DETAIL_FIELDS: &[&str] = &["id", "title", "price", "name", "score", "img480", "uripath", "description"];
const VARIATION_FIELDS: &[&str] = &["id", "title", "price", "name", "score", "img48", "uripath", "color", "size"];

/// Result of translating one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// The request to run.
    pub request: SearchRequest,
    /// Whether this is a single-listing lookup.
    pub single_listing: bool,
    /// Accepted `narrow` refinements, as `name:value`.
    pub selected_facets: Vec<String>,
}

/// Translate parameters for the JSON listing handler.
pub fn translate_json(
    params: &QueryParams,
    path_info: Option<&str>,
    registry: &FacetRegistry,
) -> Result<Translation, ListingError> {
    if let Some(path) = lookup_path(path_info) {
        let filter = match path.strip_prefix(ID_PATH_PREFIX) {
            Some(id) => format!("id:{}", escape_query_chars(id)),
            None => format!("uripath:{}", escape_query_chars(&path[1..])),
        };
        let mut request = SearchRequest::new()
            .with_filter(filter)
            .with_dimension(ResultDimension::Full);
        request.set_max_results(1)?;

        return Ok(Translation {
            request,
            single_listing: true,
            selected_facets: Vec::new(),
        });
    }

    let mut request = SearchRequest::new();
    if let Some(q) = non_blank(params.get("q")) {
        request.set_query(q);
    }

    request.add_filter(EXCLUDE_VARIATIONS);

    for filter in params.get_all("f").into_iter().filter(|v| !is_blank(v)) {
        request.add_filter(filter);
    }
    for category in params.get_all("c").into_iter().filter(|v| !is_blank(v)) {
        request.add_filter(format!("+category:{}", escape_query_chars(category)));
    }
    for tag in params.get_all("t").into_iter().filter(|v| !is_blank(v)) {
        request.add_filter(format!("+tags:{}", escape_query_chars(tag)));
    }

    if let Some(start) = params.get("s") {
        let start = lenient_i64(start);
        if start < 0 {
            return Err(ListingError::invalid(
                "s",
                "startIndex must be greater than or equal to zero",
            ));
        }
        request = request.with_start(start as u64);
    }

    if let Some(rows) = params.get("r") {
        let rows = u32::try_from(lenient_i64(rows)).unwrap_or(0);
        request.set_max_results(rows)?;
    }

    let selected_facets = apply_narrowing(&mut request, params, registry);
    let request = request.with_facets(registry.definitions());

    Ok(Translation {
        request,
        single_listing: false,
        selected_facets,
    })
}

/// Translate parameters for the HTML listing handler.
///
/// Differs from the JSON variant: a single `f` replaces the variation filter
/// instead of adding to it, `c`/`t`/`s`/`r` are not read, and the stored
/// fields are fixed per mode.
pub fn translate_html(
    params: &QueryParams,
    path_info: Option<&str>,
    registry: &FacetRegistry,
) -> Result<Translation, ListingError> {
    if let Some(path) = lookup_path(path_info) {
        let request = SearchRequest::new()
            .with_filter(format!("uripath:{}", escape_query_chars(&path[1..])))
            .with_fields(DETAIL_FIELDS.iter().copied());

        return Ok(Translation {
            request,
            single_listing: true,
            selected_facets: Vec::new(),
        });
    }

    let mut request = SearchRequest::new().with_fields(LIST_FIELDS.iter().copied());
    if let Some(q) = non_blank(params.get("q")) {
        request.set_query(q);
    }

    match non_blank(params.get("f")) {
        Some(filter) => request.add_filter(filter),
        None => request.add_filter(EXCLUDE_VARIATIONS),
    }

    let selected_facets = apply_narrowing(&mut request, params, registry);
    let request = request.with_facets(registry.definitions());

    Ok(Translation {
        request,
        single_listing: false,
        selected_facets,
    })
}

/// Request listing the variations of a parent listing.
pub fn variations_of(parent_id: &str) -> SearchRequest {
    SearchRequest::new()
        .with_advanced_query(format!("parentid:{}", escape_query_chars(parent_id)))
        .with_fields(VARIATION_FIELDS.iter().copied())
}

fn apply_narrowing(request: &mut SearchRequest, params: &QueryParams, registry: &FacetRegistry) -> Vec<String> {
    let mut selected = Vec::new();
    for narrow in params.get_all("narrow").into_iter().filter(|v| !is_blank(v)) {
        if let Some((clause, echo)) = registry.narrow(narrow) {
            request.add_filter(clause);
            selected.push(echo);
        }
    }
    selected
}

fn lookup_path(path_info: Option<&str>) -> Option<&str> {
    path_info.filter(|p| p.len() > 1 && p.starts_with('/'))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}

/// Parse an integer, treating anything unparsable as zero.
fn lenient_i64(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}
