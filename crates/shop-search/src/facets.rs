//! Facet filter registry.
//!
//! The registry is fixed per deployment. Each entry both defines a facet the
//! backend counts and accepts `narrow=<name>:<value>` refinements.

use crate::query::FacetRequest;

/// Price buckets offered by the standard registry.
pub const PRICE_RANGES: &[&str] = &["[* TO 10]", "[10 TO 20]", "[20 TO 30]", "[30 TO 50]", "[50 TO *]"];

/// A facet the shop offers for narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetFilter {
    /// Facet over the distinct values of a field; any value narrows.
    Field {
        name: &'static str,
        label: &'static str,
    },
    /// Facet over fixed query expressions; only those expressions narrow.
    Range {
        name: &'static str,
        label: &'static str,
        ranges: &'static [&'static str],
    },
}

impl FacetFilter {
    pub fn name(&self) -> &'static str {
        match self {
            FacetFilter::Field { name, .. } | FacetFilter::Range { name, .. } => name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FacetFilter::Field { label, .. } | FacetFilter::Range { label, .. } => label,
        }
    }

    /// Filter clause for a narrowing value, or `None` if the value is not
    /// accepted.
    pub fn apply(&self, value: &str) -> Option<String> {
        match self {
            FacetFilter::Field { name, .. } => Some(format!("{}:{}", name, value)),
            FacetFilter::Range { name, ranges, .. } => ranges
                .iter()
                .find(|range| **range == value)
                .map(|range| format!("{}:{}", name, range)),
        }
    }

    /// Facet counts to request from the backend.
    pub fn define(&self) -> Vec<FacetRequest> {
        match self {
            FacetFilter::Field { name, .. } => vec![FacetRequest::Field(name.to_string())],
            FacetFilter::Range { name, ranges, .. } => ranges
                .iter()
                .map(|range| FacetRequest::Query(format!("{}:{}", name, range)))
                .collect(),
        }
    }
}

const STANDARD_FILTERS: &[FacetFilter] = &[
    FacetFilter::Field { name: "style_n", label: "Style" },
    FacetFilter::Field { name: "color_n", label: "Color" },
    FacetFilter::Field { name: "source_n", label: "Source" },
    FacetFilter::Field { name: "size_n", label: "Size" },
    FacetFilter::Field { name: "category", label: "Category" },
    FacetFilter::Field { name: "thickness", label: "Thickness" },
    FacetFilter::Field { name: "fit", label: "Fit" },
    FacetFilter::Field { name: "paper", label: "Paper" },
    FacetFilter::Field { name: "finish", label: "Finish" },
    FacetFilter::Range {
        name: "price",
        label: "Price",
        ranges: PRICE_RANGES,
    },
];

/// Immutable, ordered set of facet filters.
#[derive(Debug, Clone, Copy)]
pub struct FacetRegistry {
    filters: &'static [FacetFilter],
}

impl Default for FacetRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FacetRegistry {
    /// The shop's standard facets: style, color, source, size, category,
    /// thickness, fit, paper, finish and price buckets.
    pub fn standard() -> Self {
        Self {
            filters: STANDARD_FILTERS,
        }
    }

    /// Look up a filter by name.
    pub fn get(&self, name: &str) -> Option<&FacetFilter> {
        self.filters.iter().find(|f| f.name() == name)
    }

    /// Label for a facet id, falling back to the id itself.
    pub fn label_for<'a>(&self, id: &'a str) -> &'a str {
        self.get(id).map(|f| f.label()).unwrap_or(id)
    }

    /// Facet requests for every entry, in registry order.
    pub fn definitions(&self) -> Vec<FacetRequest> {
        self.filters.iter().flat_map(|f| f.define()).collect()
    }

    /// Resolve one `name:value` narrowing.
    ///
    /// Returns the filter clause and the selected-facet echo, or `None` when
    /// the pair is malformed, the name is unknown, or the value is rejected.
    pub fn narrow(&self, narrow: &str) -> Option<(String, String)> {
        let pieces: Vec<&str> = narrow.split(':').filter(|p| !p.is_empty()).collect();
        let [name, value] = pieces.as_slice() else {
            tracing::debug!(narrow, "skipping malformed narrowing");
            return None;
        };
        if name.trim().is_empty() || value.trim().is_empty() {
            tracing::debug!(narrow, "skipping blank narrowing");
            return None;
        }

        let Some(filter) = self.get(name) else {
            tracing::debug!(name = *name, "skipping narrowing on unknown facet");
            return None;
        };

        let Some(clause) = filter.apply(value) else {
            tracing::debug!(name = *name, value = *value, "skipping rejected narrowing value");
            return None;
        };
        Some((clause, format!("{}:{}", name, value)))
    }
}
