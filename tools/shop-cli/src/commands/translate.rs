//! Show the search request built from a query string.

use anyhow::Result;
use serde_json::json;
use shop_search::render::QueryBlock;
use shop_search::solr;

use super::TranslateArgs;
use crate::context::Context;

/// Run the translate command.
pub async fn run(args: TranslateArgs, ctx: &Context) -> Result<()> {
    let translation = super::translate(&args.query, args.path.as_deref(), args.html)?;
    let request = &translation.request;
    let block = QueryBlock::from_request(request);
    let select = solr::select_params(request);

    if ctx.output.is_json() {
        let mut value = json!({
            "single": translation.single_listing,
            "query": block,
            "start": request.start(),
            "rows": request.max_results(),
            "selectedFacets": translation.selected_facets,
        });
        if args.solr {
            value["select"] = select
                .iter()
                .map(|(k, v)| json!([k, v]))
                .collect::<Vec<_>>()
                .into();
        }
        ctx.output.json(&value);
        return Ok(());
    }

    ctx.output.header("Search request");
    let mode = if translation.single_listing { "single listing" } else { "listing page" };
    ctx.output.kv("mode", mode);
    ctx.output.kv("start", &request.start().to_string());
    ctx.output.kv("rows", &request.max_results().to_string());
    ctx.output.kv("facets", &request.facets().len().to_string());
    if !request.fields().is_empty() {
        ctx.output.kv("fields", &request.fields().join(","));
    }

    ctx.output.header("Query block");
    ctx.output.document(&serde_json::to_string_pretty(&block)?);

    if !translation.selected_facets.is_empty() {
        ctx.output.header("Selected facets");
        for facet in &translation.selected_facets {
            ctx.output.list_item(facet);
        }
    }

    if args.solr {
        ctx.output.header("Solr select");
        for (name, value) in &select {
            ctx.output.kv(name, value);
        }
        ctx.output.kv("url", &solr::select_url(&ctx.config.solr.select_url(), request));
    }

    Ok(())
}
