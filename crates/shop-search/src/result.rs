//! Search response model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::SearchRequest;

/// A single attribute value of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Anything else the backend stores, serialized as-is.
    Other(serde_json::Value),
}

impl AttributeValue {
    /// Classify a raw backend value.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => AttributeValue::Bool(b),
            serde_json::Value::String(s) => AttributeValue::Text(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => match n.as_f64() {
                    Some(f) => AttributeValue::Float(f),
                    None => AttributeValue::Other(serde_json::Value::Number(n)),
                },
            },
            other => AttributeValue::Other(other),
        }
    }

    /// Numeric value, if the attribute is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// A named, multi-valued listing attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingAttribute {
    pub name: String,
    pub values: Vec<AttributeValue>,
}

impl ListingAttribute {
    pub fn new(name: impl Into<String>, values: Vec<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn first(&self) -> Option<&AttributeValue> {
        self.values.first()
    }
}

/// A searchable listing (product, variation, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDocument {
    pub id: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub uri_path: Option<String>,
    /// Relevance score, when the backend reports one.
    pub score: Option<f64>,
    /// Remaining stored fields, in backend order.
    pub attributes: Vec<ListingAttribute>,
}

impl ListingDocument {
    /// Create a listing with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_uri_path(mut self, uri_path: impl Into<String>) -> Self {
        self.uri_path = Some(uri_path.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Append an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, values: Vec<AttributeValue>) -> Self {
        self.attributes.push(ListingAttribute::new(name, values));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&ListingAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// First value of an attribute.
    pub fn first_value(&self, name: &str) -> Option<&AttributeValue> {
        self.attribute(name).and_then(|a| a.first())
    }

    /// First value of any stored field as display text.
    pub fn field_text(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "name" => self.name.clone(),
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "uripath" => self.uri_path.clone(),
            "score" => self.score.map(|s| s.to_string()),
            _ => self.first_value(name).map(|v| v.to_string()),
        }
    }

    pub fn category(&self) -> Option<String> {
        self.first_value("category").map(|v| v.to_string())
    }

    /// Numeric price, if the first `price` value is a number.
    pub fn price(&self) -> Option<f64> {
        self.first_value("price").and_then(|v| v.as_f64())
    }

    pub fn doc_type(&self) -> Option<String> {
        self.first_value("type").map(|v| v.to_string())
    }

    pub fn parent_id(&self) -> Option<String> {
        self.first_value("parentid").map(|v| v.to_string())
    }
}

/// One counted value of a facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
    /// Filter clause selecting this value, usable as an `f` parameter.
    pub filter: String,
}

/// Counts for one facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFacet {
    pub id: String,
    pub label: String,
    pub values: Vec<FacetValue>,
}

/// Result of running a [`SearchRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// The request that produced this response.
    pub request: SearchRequest,
    pub num_found: u64,
    pub start_offset: u64,
    pub query_time_ms: u64,
    pub documents: Vec<ListingDocument>,
    pub facets: Vec<ResultFacet>,
}

impl SearchResponse {
    /// Create an empty response for a request.
    pub fn empty(request: SearchRequest) -> Self {
        let start_offset = request.start();
        Self {
            request,
            num_found: 0,
            start_offset,
            query_time_ms: 0,
            documents: Vec::new(),
            facets: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether only part of the matches are included.
    pub fn is_partial(&self) -> bool {
        (self.documents.len() as u64) < self.num_found
    }
}
