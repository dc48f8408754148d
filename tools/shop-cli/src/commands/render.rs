//! Render a stored Solr response.

use std::fs;

use anyhow::{Context as _, Result};
use shop_core::BaseUrl;
use shop_search::render::{HtmlRenderer, JsonRenderer, ListingPage};
use shop_search::{solr, FacetRegistry, PriceFormat};

use super::RenderArgs;
use crate::context::Context;

/// Run the render command.
pub async fn run(args: RenderArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.response);
    let body = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    ctx.output.debug(&format!("Read {} bytes from {}", body.len(), path.display()));

    let translation = super::translate(&args.query, args.path.as_deref(), args.html)?;
    let response = solr::parse_response(&body, &translation.request, &FacetRegistry::standard())
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    ctx.output.debug(&format!(
        "{} of {} listings, {} facets",
        response.documents.len(),
        response.num_found,
        response.facets.len()
    ));

    let price_format = PriceFormat::from_config(&ctx.config.presentation)?;
    let mounts = &ctx.config.mounts;
    let servlet_path = if args.html { &mounts.html_path } else { &mounts.json_path };
    let base_url = BaseUrl::new(&args.scheme, &args.host, args.port)
        .with_context_path(&mounts.context_path)
        .with_servlet_path(servlet_path);

    let rendered = if args.html {
        if translation.single_listing {
            ctx.output.warn("Variations are not rendered from a stored response");
        }
        let page = ListingPage::new(args.path.clone(), response).with_selected_facets(translation.selected_facets);
        HtmlRenderer::new(base_url, price_format).render(&page)
    } else {
        let renderer = JsonRenderer::new(base_url, price_format);
        if translation.single_listing {
            renderer.render_single(&response, true)?
        } else {
            renderer.render_list(&response, true)?
        }
    };

    ctx.output.document(&rendered);
    Ok(())
}
