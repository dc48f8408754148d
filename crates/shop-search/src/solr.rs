//! Solr wire adapter: select parameters out, JSON response in.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ListingError;
use crate::escape::escape_query_chars;
use crate::facets::FacetRegistry;
use crate::query::{FacetRequest, ResultDimension, SearchRequest};
use crate::result::{AttributeValue, FacetValue, ListingAttribute, ListingDocument, ResultFacet, SearchResponse};

/// Stored fields returned for compact results when none are requested.
const COMPACT_FIELDS: &str = "id,name,title,uripath,category,price,type,parentid,score";

/// Stored fields returned for full results when none are requested.
const FULL_FIELDS: &str = "*,score";

/// Parser used for free-text queries.
const FREE_TEXT_PARSER: &str = "dismax";

/// Select handler parameters for a request, in a stable order.
pub fn select_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    match (request.advanced_query(), request.query()) {
        (Some(advanced), _) => params.push(("q", advanced.to_string())),
        (None, Some(q)) => {
            params.push(("q", q.to_string()));
            params.push(("defType", FREE_TEXT_PARSER.to_string()));
        }
        (None, None) => params.push(("q", "*:*".to_string())),
    }

    for filter in request.filters() {
        params.push(("fq", filter.clone()));
    }

    params.push(("start", request.start().to_string()));
    params.push(("rows", request.max_results().to_string()));

    if !request.sort_fields().is_empty() {
        let sort = request
            .sort_fields()
            .iter()
            .map(|(field, dir)| format!("{} {}", field, dir.as_str()))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("sort", sort));
    }

    let fields = if request.fields().is_empty() {
        match request.dimension() {
            ResultDimension::Compact => COMPACT_FIELDS.to_string(),
            ResultDimension::Full => FULL_FIELDS.to_string(),
        }
    } else {
        request.fields().join(",")
    };
    params.push(("fl", fields));

    if !request.facets().is_empty() {
        params.push(("facet", "true".to_string()));
        for facet in request.facets() {
            match facet {
                FacetRequest::Field(name) => params.push(("facet.field", name.clone())),
                FacetRequest::Query(expr) => params.push(("facet.query", expr.clone())),
            }
        }
    }

    params.push(("wt", "json".to_string()));
    params
}

/// Full select URL for a request.
pub fn select_url(select_endpoint: &str, request: &SearchRequest) -> String {
    let query = select_params(request)
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", select_endpoint, query)
}

#[derive(Debug, Deserialize)]
struct SolrEnvelope {
    #[serde(rename = "responseHeader", default)]
    header: SolrHeader,
    response: Option<SolrResult>,
    facet_counts: Option<SolrFacetCounts>,
    error: Option<SolrErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct SolrHeader {
    #[serde(rename = "QTime", default)]
    qtime: u64,
}

#[derive(Debug, Deserialize)]
struct SolrResult {
    #[serde(rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    start: u64,
    #[serde(default)]
    docs: Vec<serde_json::Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct SolrFacetCounts {
    #[serde(default)]
    facet_queries: HashMap<String, u64>,
    #[serde(default)]
    facet_fields: HashMap<String, Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SolrErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    code: Option<u16>,
}

/// Parse a select response body for the request that produced it.
pub fn parse_response(
    body: &[u8],
    request: &SearchRequest,
    registry: &FacetRegistry,
) -> Result<SearchResponse, ListingError> {
    let envelope: SolrEnvelope =
        serde_json::from_slice(body).map_err(|e| ListingError::Backend(format!("unreadable response: {}", e)))?;

    if let Some(error) = envelope.error {
        return Err(ListingError::Backend(format!(
            "solr error {}: {}",
            error.code.unwrap_or(500),
            error.msg.unwrap_or_default()
        )));
    }

    let result = envelope
        .response
        .ok_or_else(|| ListingError::Backend("response section missing".to_string()))?;

    let documents = result.docs.into_iter().map(parse_document).collect();
    let facets = match envelope.facet_counts {
        Some(counts) => collect_facets(request, &counts, registry),
        None => Vec::new(),
    };

    Ok(SearchResponse {
        request: request.clone(),
        num_found: result.num_found,
        start_offset: result.start,
        query_time_ms: envelope.header.qtime,
        documents,
        facets,
    })
}

fn parse_document(fields: serde_json::Map<String, Value>) -> ListingDocument {
    let mut doc = ListingDocument::default();

    for (name, value) in fields {
        match name.as_str() {
            "id" => doc.id = scalar_text(&value).unwrap_or_default(),
            "name" => doc.name = scalar_text(&value),
            "title" => doc.title = scalar_text(&value),
            "description" => doc.description = scalar_text(&value),
            "uripath" => doc.uri_path = scalar_text(&value),
            "score" => doc.score = value.as_f64(),
            _ if name.starts_with('_') => {}
            _ => {
                let values = match value {
                    Value::Array(items) => items.into_iter().map(AttributeValue::from_json).collect(),
                    other => vec![AttributeValue::from_json(other)],
                };
                doc.attributes.push(ListingAttribute { name, values });
            }
        }
    }

    doc
}

/// First value of a possibly multi-valued field, as text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(scalar_text),
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn collect_facets(request: &SearchRequest, counts: &SolrFacetCounts, registry: &FacetRegistry) -> Vec<ResultFacet> {
    let mut facets: Vec<ResultFacet> = Vec::new();

    for facet in request.facets() {
        let id = facet.facet_id();
        let values = match facet {
            FacetRequest::Field(name) => field_values(name, counts.facet_fields.get(name)),
            FacetRequest::Query(expr) => {
                let value = expr.strip_prefix(id).and_then(|v| v.strip_prefix(':')).unwrap_or(expr);
                vec![FacetValue {
                    value: value.to_string(),
                    count: counts.facet_queries.get(expr).copied().unwrap_or(0),
                    filter: expr.clone(),
                }]
            }
        };

        match facets.iter_mut().find(|f| f.id == id) {
            Some(existing) => existing.values.extend(values),
            None => facets.push(ResultFacet {
                id: id.to_string(),
                label: registry.label_for(id).to_string(),
                values,
            }),
        }
    }

    facets
}

/// Solr returns field facets as a flat `[value, count, value, count, ...]` list.
fn field_values(field: &str, flat: Option<&Vec<Value>>) -> Vec<FacetValue> {
    let Some(flat) = flat else {
        return Vec::new();
    };

    flat.chunks(2)
        .filter_map(|pair| match pair {
            [value, count] => {
                let value = scalar_text(value)?;
                Some(FacetValue {
                    filter: format!("{}:{}", field, escape_query_chars(&value)),
                    count: count.as_u64().unwrap_or(0),
                    value,
                })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Vec<&'a str> {
        params.iter().filter(|(k, _)| *k == key).map(|(_, v)| v.as_str()).collect()
    }

    #[test]
    fn test_select_params_free_text() {
        let request = SearchRequest::new()
            .with_query("red shirt")
            .with_filter("-type:variation")
            .with_filter("+category:shirts")
            .with_start(20)
            .with_sort("price", SortDirection::Descending)
            .with_sort("title", SortDirection::Ascending);
        let params = select_params(&request);

        assert_eq!(param(&params, "q"), vec!["red shirt"]);
        assert_eq!(param(&params, "defType"), vec!["dismax"]);
        assert_eq!(param(&params, "fq"), vec!["-type:variation", "+category:shirts"]);
        assert_eq!(param(&params, "start"), vec!["20"]);
        assert_eq!(param(&params, "rows"), vec!["10"]);
        assert_eq!(param(&params, "sort"), vec!["price desc,title asc"]);
        assert_eq!(param(&params, "fl"), vec![COMPACT_FIELDS]);
        assert!(param(&params, "facet").is_empty());
        assert_eq!(param(&params, "wt"), vec!["json"]);
    }

    #[test]
    fn test_select_params_match_all_and_facets() {
        let request = SearchRequest::new()
            .with_dimension(ResultDimension::Full)
            .with_facets(FacetRegistry::standard().definitions());
        let params = select_params(&request);

        assert_eq!(param(&params, "q"), vec!["*:*"]);
        assert!(param(&params, "defType").is_empty());
        assert_eq!(param(&params, "fl"), vec!["*,score"]);
        assert_eq!(param(&params, "facet"), vec!["true"]);
        assert_eq!(param(&params, "facet.field").len(), 9);
        assert_eq!(param(&params, "facet.query")[1], "price:[10 TO 20]");
    }

    #[test]
    fn test_select_params_advanced_query_and_fields() {
        let request = SearchRequest::new()
            .with_advanced_query("parentid:p\\-1")
            .with_fields(["id", "title"]);
        let params = select_params(&request);

        assert_eq!(param(&params, "q"), vec!["parentid:p\\-1"]);
        assert!(param(&params, "defType").is_empty());
        assert_eq!(param(&params, "fl"), vec!["id,title"]);
    }

    #[test]
    fn test_select_url_encodes() {
        let request = SearchRequest::new().with_filter("price:[10 TO 20]");
        let url = select_url("http://solr:8983/solr/listings/select", &request);
        assert!(url.starts_with("http://solr:8983/solr/listings/select?q=%2A%3A%2A&fq=price%3A%5B10%20TO%2020%5D"));
    }

    #[test]
    fn test_parse_response() {
        let request = SearchRequest::new().with_facets(FacetRegistry::standard().definitions());
        let body = br#"{
            "responseHeader": {"status": 0, "QTime": 7},
            "response": {"numFound": 42, "start": 10, "docs": [
                {"id": "p-1", "title": "Tee", "uripath": "shirts/tee", "score": 1.5,
                 "price": 19.9, "color": ["red", "blue"], "_version_": 1}
            ]},
            "facet_counts": {
                "facet_queries": {"price:[* TO 10]": 0, "price:[10 TO 20]": 5},
                "facet_fields": {"color_n": ["red", 3, "blue", 1]}
            }
        }"#;

        let response = parse_response(body, &request, &FacetRegistry::standard()).unwrap();
        assert_eq!(response.num_found, 42);
        assert_eq!(response.start_offset, 10);
        assert_eq!(response.query_time_ms, 7);
        assert_eq!(response.request, request);

        let doc = &response.documents[0];
        assert_eq!(doc.id, "p-1");
        assert_eq!(doc.uri_path.as_deref(), Some("shirts/tee"));
        assert_eq!(doc.score, Some(1.5));
        assert_eq!(doc.price(), Some(19.9));
        assert_eq!(doc.attribute("color").unwrap().values.len(), 2);
        assert!(doc.attribute("_version_").is_none());

        let color = response.facets.iter().find(|f| f.id == "color_n").unwrap();
        assert_eq!(color.label, "Color");
        assert_eq!(color.values[0].value, "red");
        assert_eq!(color.values[0].count, 3);
        assert_eq!(color.values[0].filter, "color_n:red");

        let price = response.facets.iter().find(|f| f.id == "price").unwrap();
        assert_eq!(price.values.len(), 5);
        assert_eq!(price.values[1].value, "[10 TO 20]");
        assert_eq!(price.values[1].count, 5);
        assert_eq!(price.values[1].filter, "price:[10 TO 20]");

        let ids: Vec<&str> = response.facets.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"style_n"));
        assert_eq!(ids.last(), Some(&"price"));
    }

    #[test]
    fn test_parse_response_keeps_field_order() {
        let request = SearchRequest::new();
        let body = br#"{
            "response": {"numFound": 1, "docs": [
                {"id": "p-1", "zeta": ["z"], "price": 10.0, "alpha": ["a"]}
            ]}
        }"#;

        let response = parse_response(body, &request, &FacetRegistry::standard()).unwrap();
        let names: Vec<&str> = response.documents[0].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "price", "alpha"]);
    }

    #[test]
    fn test_parse_error_body() {
        let body = br#"{"responseHeader": {"status": 400}, "error": {"msg": "undefined field foo", "code": 400}}"#;
        let err = parse_response(body, &SearchRequest::new(), &FacetRegistry::standard()).unwrap_err();
        assert!(matches!(err, ListingError::Backend(ref m) if m.contains("undefined field foo")));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_response(b"<html>", &SearchRequest::new(), &FacetRegistry::standard()).unwrap_err();
        assert!(matches!(err, ListingError::Backend(_)));
    }
}
