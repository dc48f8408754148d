//! JSON listing envelopes.
//!
//! Envelopes are versioned and typed so clients can tell a listing page from
//! a single-listing lookup without inspecting the payload.

use serde::{Deserialize, Serialize, Serializer};
use shop_core::BaseUrl;

use crate::error::ListingError;
use crate::price::PriceFormat;
use crate::query::{ResultDimension, SearchRequest, SortDirection};
use crate::result::{ListingAttribute, ListingDocument, ResultFacet, SearchResponse};

/// Envelope format version.
pub const ENVELOPE_VERSION: &str = "1.0";

/// Envelope type of a listing page.
pub const LIST_TYPE: &str = "application/x-gyrex-fanshop-products-json";

/// Envelope type of a single-listing lookup.
pub const SINGLE_TYPE: &str = "application/x-gyrex-fanshop-product-json";

/// Echo of the request that produced a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "sort_fields")]
    pub sort_fields: Vec<(String, SortDirection)>,
    #[serde(default)]
    pub dimension: ResultDimension,
}

impl QueryBlock {
    pub fn from_request(request: &SearchRequest) -> Self {
        // Only one of the two is ever set on a request.
        let (advanced_query, query) = match request.advanced_query() {
            Some(advanced) => (non_blank(advanced), None),
            None => (None, request.query().and_then(non_blank)),
        };

        Self {
            advanced_query,
            query,
            filters: request.filters().to_vec(),
            sort_fields: request.sort_fields().to_vec(),
            dimension: request.dimension(),
        }
    }

    /// Rebuild the echoed parts of a request.
    pub fn to_request(&self) -> SearchRequest {
        let mut request = SearchRequest::new().with_dimension(self.dimension);
        if let Some(query) = &self.query {
            request.set_query(query.clone());
        }
        if let Some(advanced) = &self.advanced_query {
            request = request.with_advanced_query(advanced.clone());
        }
        for filter in &self.filters {
            request.add_filter(filter.clone());
        }
        for (field, direction) in &self.sort_fields {
            request = request.with_sort(field.clone(), *direction);
        }
        request
    }
}

/// `sortFields` is a JSON object whose key order is the sort order.
mod sort_fields {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use crate::query::SortDirection;

    pub fn serialize<S: Serializer>(fields: &[(String, SortDirection)], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (field, direction) in fields {
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, SortDirection)>, D::Error> {
        struct OrderedSort;

        impl<'de> Visitor<'de> for OrderedSort {
            type Value = Vec<(String, SortDirection)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to \"asc\" or \"desc\"")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::new();
                while let Some(entry) = access.next_entry::<String, SortDirection>()? {
                    fields.push(entry);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(OrderedSort)
    }
}

/// Stored attributes as `name -> [values]`, in listing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap(pub Vec<ListingAttribute>);

impl AttributeMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attribute in &self.0 {
            map.serialize_entry(&attribute.name, &attribute.values)?;
        }
        map.end()
    }
}

/// One listing as emitted to clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uripath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "shopPrice", skip_serializing_if = "Option::is_none")]
    pub shop_price: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parentid: Option<String>,
    #[serde(skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListEnvelope<'a> {
    version: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    query: QueryBlock,
    query_time: u64,
    num_found: u64,
    start_offset: u64,
    facets: &'a [ResultFacet],
    products: Vec<ProductJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SingleEnvelope {
    version: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    query: QueryBlock,
    query_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<ProductJson>,
}

/// Renders search responses as JSON envelopes.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    base_url: BaseUrl,
    price_format: PriceFormat,
}

impl JsonRenderer {
    pub fn new(base_url: BaseUrl, price_format: PriceFormat) -> Self {
        Self { base_url, price_format }
    }

    /// Project one listing.
    pub fn product(&self, doc: &ListingDocument) -> ProductJson {
        let uripath = doc.uri_path.as_deref().and_then(non_blank);
        ProductJson {
            id: non_blank(&doc.id),
            name: doc.name.as_deref().and_then(non_blank),
            title: doc.title.as_deref().and_then(non_blank),
            description: doc.description.as_deref().and_then(non_blank),
            uri: uripath.as_deref().map(|p| self.base_url.join(p)),
            uripath,
            category: doc.category().as_deref().and_then(non_blank),
            shop_price: doc.price().map(|p| self.price_format.format(p)),
            kind: doc.doc_type().as_deref().and_then(non_blank),
            parentid: doc.parent_id().as_deref().and_then(non_blank),
            attributes: AttributeMap(doc.attributes.clone()),
        }
    }

    /// Render a listing page.
    pub fn render_list(&self, response: &SearchResponse, pretty: bool) -> Result<String, ListingError> {
        let envelope = ListEnvelope {
            version: ENVELOPE_VERSION,
            kind: LIST_TYPE,
            query: QueryBlock::from_request(&response.request),
            query_time: response.query_time_ms,
            num_found: response.num_found,
            start_offset: response.start_offset,
            facets: &response.facets,
            products: response.documents.iter().map(|d| self.product(d)).collect(),
        };
        to_string(&envelope, pretty)
    }

    /// Render a single-listing lookup. The product is only included when
    /// exactly one listing matched.
    pub fn render_single(&self, response: &SearchResponse, pretty: bool) -> Result<String, ListingError> {
        let product = match response.documents.as_slice() {
            [doc] => Some(self.product(doc)),
            _ => None,
        };
        let envelope = SingleEnvelope {
            version: ENVELOPE_VERSION,
            kind: SINGLE_TYPE,
            query: QueryBlock::from_request(&response.request),
            query_time: response.query_time_ms,
            product,
        };
        to_string(&envelope, pretty)
    }
}

fn to_string<T: Serialize>(value: &T, pretty: bool) -> Result<String, ListingError> {
    let body = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(body)
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{AttributeValue, FacetValue};
    use serde_json::{json, Value};
    use shop_core::Locale;

    use crate::price::Currency;

    fn renderer() -> JsonRenderer {
        JsonRenderer::new(
            BaseUrl::new("http", "shop.local", 8080).with_servlet_path("/listings"),
            PriceFormat::new(Locale::German, Currency::EUR),
        )
    }

    fn parse(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    fn tee() -> ListingDocument {
        ListingDocument::new("p-1")
            .with_title("Tee")
            .with_name(" ")
            .with_uri_path("shirts/tee")
            .with_attribute("category", vec![AttributeValue::Text("shirts".into())])
            .with_attribute("price", vec![AttributeValue::Float(1234.5)])
            .with_attribute("color", vec![AttributeValue::Text("red".into()), AttributeValue::Text("blue".into())])
    }

    #[test]
    fn test_empty_list() {
        let request = SearchRequest::new().with_filter("-type:variation");
        let body = renderer().render_list(&SearchResponse::empty(request), false).unwrap();
        let value = parse(&body);

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["type"], LIST_TYPE);
        assert_eq!(value["numFound"], 0);
        assert_eq!(value["products"], json!([]));
        assert_eq!(value["facets"], json!([]));
        assert_eq!(value["query"], json!({"filters": ["-type:variation"], "dimension": "compact"}));
    }

    #[test]
    fn test_list_with_products_and_facets() {
        let mut response = SearchResponse::empty(SearchRequest::new().with_query("tee"));
        response.num_found = 7;
        response.query_time_ms = 12;
        response.documents.push(tee());
        response.facets.push(ResultFacet {
            id: "color_n".into(),
            label: "Color".into(),
            values: vec![FacetValue {
                value: "red".into(),
                count: 3,
                filter: "color_n:red".into(),
            }],
        });

        let value = parse(&renderer().render_list(&response, false).unwrap());
        assert_eq!(value["queryTime"], 12);
        assert_eq!(value["query"]["query"], "tee");
        assert_eq!(value["facets"][0], json!({"id": "color_n", "label": "Color", "values": [{"value": "red", "count": 3, "filter": "color_n:red"}]}));

        let product = &value["products"][0];
        assert_eq!(product["id"], "p-1");
        assert_eq!(product["uri"], "http://shop.local:8080/listings/shirts/tee");
        assert_eq!(product["category"], "shirts");
        assert_eq!(product["shopPrice"], "1.234,50\u{a0}\u{20ac}");
        assert!(product.get("name").is_none());
        assert!(product.get("type").is_none());
        assert_eq!(product["attributes"]["color"], json!(["red", "blue"]));
    }

    #[test]
    fn test_attribute_order_kept() {
        let body = serde_json::to_string(&renderer().product(&tee())).unwrap();
        let category = body.find("\"category\":[").unwrap();
        let price = body.find("\"price\":[").unwrap();
        let color = body.find("\"color\":[").unwrap();
        assert!(category < price && price < color);
    }

    #[test]
    fn test_single_envelope() {
        let request = SearchRequest::new().with_dimension(ResultDimension::Full);
        let mut response = SearchResponse::empty(request);
        response.documents.push(tee());

        let value = parse(&renderer().render_single(&response, false).unwrap());
        assert_eq!(value["type"], SINGLE_TYPE);
        assert_eq!(value["product"]["title"], "Tee");
        assert!(value.get("numFound").is_none());

        response.documents.push(ListingDocument::new("p-2"));
        let value = parse(&renderer().render_single(&response, false).unwrap());
        assert!(value.get("product").is_none());
    }

    #[test]
    fn test_pretty_output() {
        let response = SearchResponse::empty(SearchRequest::new());
        let compact = renderer().render_list(&response, false).unwrap();
        let pretty = renderer().render_list(&response, true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains("\n  \"version\""));
    }

    #[test]
    fn test_query_block_reproduces_request() {
        let request = SearchRequest::new()
            .with_advanced_query("parentid:p\\-1")
            .with_filter("-type:variation")
            .with_filter("+category:shirts")
            .with_sort("title", SortDirection::Descending)
            .with_sort("price", SortDirection::Ascending)
            .with_dimension(ResultDimension::Full);

        let block = QueryBlock::from_request(&request);
        let text = serde_json::to_string(&block).unwrap();
        assert!(text.contains(r#""sortFields":{"title":"desc","price":"asc"}"#));

        let echoed: QueryBlock = serde_json::from_str(&text).unwrap();
        assert_eq!(echoed, block);
        let rebuilt = echoed.to_request();
        assert_eq!(rebuilt.filters(), request.filters());
        assert_eq!(rebuilt.sort_fields(), request.sort_fields());
        assert_eq!(rebuilt.dimension(), request.dimension());
        assert_eq!(rebuilt.advanced_query(), request.advanced_query());
    }
}
