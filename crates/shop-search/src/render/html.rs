//! HTML listing pages.

use html_escape::{encode_double_quoted_attribute, encode_text};
use shop_core::BaseUrl;

use crate::price::PriceFormat;
use crate::result::{ListingDocument, ResultFacet, SearchResponse};

/// Everything one HTML page shows.
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Path below the handler mount, if any.
    pub path: Option<String>,
    pub response: SearchResponse,
    /// Accepted narrowing refinements, as `name:value`.
    pub selected_facets: Vec<String>,
    /// Variations per listing, index-aligned with `response.documents`.
    /// Empty unless this is a single-listing lookup.
    pub variations: Vec<SearchResponse>,
}

impl ListingPage {
    pub fn new(path: Option<String>, response: SearchResponse) -> Self {
        Self {
            path,
            response,
            selected_facets: Vec::new(),
            variations: Vec::new(),
        }
    }

    pub fn with_selected_facets(mut self, selected: Vec<String>) -> Self {
        self.selected_facets = selected;
        self
    }

    pub fn with_variations(mut self, variations: Vec<SearchResponse>) -> Self {
        self.variations = variations;
        self
    }
}

/// Renders listing pages as plain HTML.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    base_url: BaseUrl,
    price_format: PriceFormat,
}

impl HtmlRenderer {
    pub fn new(base_url: BaseUrl, price_format: PriceFormat) -> Self {
        Self { base_url, price_format }
    }

    pub fn render(&self, page: &ListingPage) -> String {
        let response = &page.response;
        let title = page.path.as_deref().unwrap_or("/");

        let mut body = String::new();
        body.push_str(&render_summary(response));
        body.push_str(&render_selected(&page.selected_facets));
        body.push_str(&render_facets(&response.facets));

        body.push_str("<p>\n");
        if response.documents.is_empty() {
            body.push_str("No listings found!\n");
        }
        for (i, doc) in response.documents.iter().enumerate() {
            body.push_str(&self.render_listing(doc));
            if let Some(variations) = page.variations.get(i).filter(|v| !v.documents.is_empty()) {
                body.push_str(&format!(
                    "There are {} variations available.\n",
                    variations.documents.len()
                ));
                for variation in &variations.documents {
                    body.push_str(&self.render_listing(variation));
                }
            }
        }
        body.push_str("</p>\n");

        format!(
            r#"<html><head>
<meta charset="utf-8">
<title>{} - Shop Listings</title>
</head><body>
<h1>Found Listings</h1>
{}</body></html>
"#,
            encode_text(title),
            body
        )
    }

    fn render_listing(&self, doc: &ListingDocument) -> String {
        let thumb = doc
            .field_text("img48")
            .or_else(|| doc.field_text("img480"))
            .unwrap_or_default();
        let image = format!(
            r#"<img border="0" src="{}" alt="{}">"#,
            encode_double_quoted_attribute(&thumb),
            encode_double_quoted_attribute(doc.title.as_deref().unwrap_or_default())
        );
        let image = match doc.uri_path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => format!(
                r#"<a href="{}">{}</a>"#,
                encode_double_quoted_attribute(&self.base_url.join(path)),
                image
            ),
            None => image,
        };

        let mut details = String::new();
        if let Some(score) = doc.score {
            details.push_str(&format!("Score: {}<br/>\n", score));
        }
        if let Some(size) = doc.field_text("size") {
            details.push_str(&format!("Size: {}<br/>\n", encode_text(&size)));
        }
        if let Some(color) = doc.field_text("color") {
            details.push_str(&format!("Color: {}<br/>\n", encode_text(&color)));
        }

        let price = doc
            .price()
            .map(|p| {
                format!(
                    "<span class=\"price\" style=\"font-size: 2em;\">{}</span><br/>\n",
                    encode_text(&self.price_format.format(p))
                )
            })
            .unwrap_or_default();

        let description = doc
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| format!("<blockquote>{}</blockquote>\n", encode_text(d)))
            .unwrap_or_default();

        format!(
            r#"<div class="listing" data-listing-id="{}">
<div style="float:left;">{}</div>
<br/>
<strong>{}</strong><br/>
<small>
{}</small>
{}{}<div style="clear:both;">&nbsp;</div>
</div>
"#,
            encode_double_quoted_attribute(&doc.id),
            image,
            encode_text(doc.title.as_deref().unwrap_or_default()),
            details,
            price,
            description
        )
    }
}

fn render_summary(response: &SearchResponse) -> String {
    let timing = if response.query_time_ms < 1000 {
        "less than a second.".to_string()
    } else {
        format!("{}ms.", response.query_time_ms)
    };

    let mut html = format!(
        "<p>\nFound <strong>{}</strong> listings in {}\n",
        response.num_found, timing
    );

    if response.is_partial() {
        let shown = response.documents.len() as u64;
        html.push_str("<br/>\n");
        if response.start_offset == 0 {
            html.push_str(&format!("Only the first {} listings are shown.\n", shown));
        } else {
            html.push_str(&format!(
                "Only listings {} till {} are shown.\n",
                response.start_offset,
                response.start_offset + shown
            ));
        }
    }

    html.push_str("</p>\n");
    html
}

fn render_selected(selected: &[String]) -> String {
    if selected.is_empty() {
        return String::new();
    }

    let items: String = selected
        .iter()
        .map(|s| format!("<li>{}</li>", encode_text(s)))
        .collect();
    format!("<p>\nSelected filters:\n<ul class=\"selected\">{}</ul>\n</p>\n", items)
}

fn render_facets(facets: &[ResultFacet]) -> String {
    let facets: Vec<&ResultFacet> = facets.iter().filter(|f| !f.values.is_empty()).collect();
    if facets.is_empty() {
        return String::new();
    }

    let mut html = String::from("<p>\nYou can filter the results by:<br/>\n");
    for facet in facets {
        let items: String = facet
            .values
            .iter()
            .filter(|v| v.count > 0)
            .map(|v| format!("<li>{} ({})</li>", encode_text(&v.value), v.count))
            .collect();
        let items = if items.is_empty() {
            "<li>none</li>".to_string()
        } else {
            items
        };

        html.push_str(&format!(
            "<div class=\"facet\" style=\"float:left;\"><em>{}</em>\n<ul style=\"margin:0;\">{}</ul>\n</div>\n",
            encode_text(&facet.label),
            items
        ));
    }
    html.push_str("<div style=\"clear:both;\">&nbsp;</div>\n</p>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::Currency;
    use crate::query::SearchRequest;
    use crate::result::{AttributeValue, FacetValue};
    use shop_core::Locale;

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(
            BaseUrl::new("http", "shop.local", 80).with_servlet_path("/listings.html"),
            PriceFormat::new(Locale::German, Currency::EUR),
        )
    }

    fn sneaker() -> ListingDocument {
        ListingDocument::new("p-1")
            .with_title("Red <Sneaker>")
            .with_uri_path("red-sneaker")
            .with_score(2.5)
            .with_description("Runs & jumps")
            .with_attribute("img480", vec![AttributeValue::Text("/img/big.png".into())])
            .with_attribute("price", vec![AttributeValue::Float(59.9)])
    }

    #[test]
    fn test_empty_page() {
        let page = ListingPage::new(None, SearchResponse::empty(SearchRequest::new()));
        let html = renderer().render(&page);
        assert!(html.contains("<title>/ - Shop Listings</title>"));
        assert!(html.contains("<h1>Found Listings</h1>"));
        assert!(html.contains("Found <strong>0</strong> listings in less than a second."));
        assert!(html.contains("No listings found!"));
        assert!(!html.contains("You can filter"));
    }

    #[test]
    fn test_listing_escaped_and_linked() {
        let mut response = SearchResponse::empty(SearchRequest::new());
        response.num_found = 1;
        response.documents.push(sneaker());
        let html = renderer().render(&ListingPage::new(Some("/red-sneaker".into()), response));

        assert!(html.contains("<title>/red-sneaker - Shop Listings</title>"));
        assert!(html.contains("<strong>Red &lt;Sneaker&gt;</strong>"));
        assert!(html.contains(r#"<a href="http://shop.local/listings.html/red-sneaker">"#));
        assert!(html.contains(r#"src="/img/big.png""#));
        assert!(html.contains("Score: 2.5"));
        assert!(html.contains("59,90\u{a0}\u{20ac}"));
        assert!(html.contains("<blockquote>Runs &amp; jumps</blockquote>"));
        assert!(!html.contains("No listings found!"));
    }

    #[test]
    fn test_slow_query_and_paging_note() {
        let mut response = SearchResponse::empty(SearchRequest::new().with_start(10));
        response.num_found = 30;
        response.start_offset = 10;
        response.query_time_ms = 1500;
        response.documents.push(ListingDocument::new("a"));
        response.documents.push(ListingDocument::new("b"));
        let html = renderer().render(&ListingPage::new(None, response));

        assert!(html.contains("listings in 1500ms."));
        assert!(html.contains("Only listings 10 till 12 are shown."));
    }

    #[test]
    fn test_facets_and_selection() {
        let mut response = SearchResponse::empty(SearchRequest::new());
        response.facets = vec![
            ResultFacet {
                id: "color_n".into(),
                label: "Color".into(),
                values: vec![
                    FacetValue { value: "red".into(), count: 3, filter: "color_n:red".into() },
                    FacetValue { value: "blue".into(), count: 0, filter: "color_n:blue".into() },
                ],
            },
            ResultFacet {
                id: "fit".into(),
                label: "fit".into(),
                values: vec![FacetValue { value: "slim".into(), count: 0, filter: "fit:slim".into() }],
            },
        ];
        let page = ListingPage::new(None, response).with_selected_facets(vec!["color_n:red".into()]);
        let html = renderer().render(&page);

        assert!(html.contains("<li>color_n:red</li>"));
        assert!(html.contains("<em>Color</em>"));
        assert!(html.contains("<li>red (3)</li>"));
        assert!(!html.contains("blue"));
        assert!(html.contains("<em>fit</em>\n<ul style=\"margin:0;\"><li>none</li>"));
    }

    #[test]
    fn test_variations() {
        let mut response = SearchResponse::empty(SearchRequest::new());
        response.documents.push(sneaker());

        let mut variations = SearchResponse::empty(SearchRequest::new());
        variations.documents.push(
            ListingDocument::new("v-1")
                .with_title("Red Sneaker 42")
                .with_attribute("size", vec![AttributeValue::Integer(42)])
                .with_attribute("color", vec![AttributeValue::Text("red".into())]),
        );

        let page = ListingPage::new(Some("/red-sneaker".into()), response).with_variations(vec![variations]);
        let html = renderer().render(&page);

        assert!(html.contains("There are 1 variations available."));
        assert!(html.contains("Size: 42<br/>"));
        assert!(html.contains("Color: red<br/>"));
    }
}
