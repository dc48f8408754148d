//! Shop listings component.
//!
//! Serves two handlers from one Spin component:
//! - JSON listings at `mounts.json_path` (default `/listings`)
//! - HTML listings at `mounts.html_path` (default `/listings.html`)
//!
//! Configuration is read from the `shop_config` Spin variable as a TOML
//! document. Without it the defaults apply. Both handlers answer non-GET
//! requests with 405.

mod solr_client;

use std::sync::Once;

use anyhow::{anyhow, Context};
use futures::SinkExt;
use http::StatusCode;
use spin_sdk::http::{Fields, IncomingRequest, Method, OutgoingResponse, ResponseOutparam};
use spin_sdk::http_component;

use shop_core::{LogLevel, RequestContext, RequestId, RequestLog, ShopConfig};
use shop_search::handler::TEXT_PLAIN;
use shop_search::{HtmlListingHandler, JsonListingHandler, ListingResponse};

use solr_client::SolrClient;

/// Spin variable holding the TOML configuration.
const CONFIG_VARIABLE: &str = "shop_config";

static TRACING: Once = Once::new();

/// Listing request handler.
#[http_component]
async fn handle_listings(req: IncomingRequest, response_out: ResponseOutparam) {
    let path_with_query = req.path_with_query().unwrap_or_default();
    let ctx = RequestContext::new(request_method(&req), &path_with_query);
    let request_id = ctx.request_id.clone();

    let listing = match route(&req, ctx).await {
        Ok(listing) => listing,
        Err(e) => {
            RequestLog::new(request_id.clone())
                .event(LogLevel::Error, "request failed")
                .field("error", format!("{:#}", e))
                .emit();
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    };

    if let Err(e) = send_response(response_out, &request_id, listing).await {
        eprintln!("[{}] Failed to write response: {:#}", request_id, e);
    }
}

/// Dispatch to the handler mounted at the request path.
async fn route(req: &IncomingRequest, ctx: RequestContext) -> anyhow::Result<ListingResponse> {
    let config = load_config()?;
    init_tracing(config.logging.level);

    let mut ctx = ctx;
    for (name, value) in req.headers().entries() {
        ctx = ctx.with_header(name, String::from_utf8_lossy(&value).into_owned());
    }
    let scheme = ctx.header("x-forwarded-proto").unwrap_or("http").to_string();
    let host = ctx.header("host").map(str::to_string);
    let ctx = match host {
        Some(host) => ctx.with_host_header(&scheme, &host)?,
        None => ctx,
    };

    let client = SolrClient::new(config.solr.select_url());
    let mounts = &config.mounts;

    if let Some(mounted) = ctx.clone().mount(&mounts.context_path, &mounts.json_path) {
        let log = RequestLog::for_request(&mounted, &config.logging);
        let handler = JsonListingHandler::new(&client, &config)?;
        return Ok(handler.handle(&mounted, &log).await);
    }

    if let Some(mounted) = ctx.mount(&mounts.context_path, &mounts.html_path) {
        let log = RequestLog::for_request(&mounted, &config.logging);
        let handler = HtmlListingHandler::new(&client, &config)?;
        return Ok(handler.handle(&mounted, &log).await);
    }

    Ok(plain(StatusCode::NOT_FOUND, "Not found"))
}

fn request_method(req: &IncomingRequest) -> shop_core::Method {
    match req.method() {
        Method::Get => shop_core::Method::Get,
        Method::Post => shop_core::Method::Post,
        Method::Put => shop_core::Method::Put,
        Method::Delete => shop_core::Method::Delete,
        Method::Patch => shop_core::Method::Patch,
        Method::Head => shop_core::Method::Head,
        Method::Options => shop_core::Method::Options,
        _ => shop_core::Method::Other,
    }
}

/// Install the stderr subscriber for library `tracing` events.
fn init_tracing(level: LogLevel) {
    TRACING.call_once(|| {
        let installed = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_max_level(tracing_level(level))
            .try_init();
        if let Err(e) = installed {
            eprintln!("tracing subscriber not installed: {}", e);
        }
    });
}

fn tracing_level(level: LogLevel) -> tracing::Level {
    match level {
        LogLevel::Trace => tracing::Level::TRACE,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Error => tracing::Level::ERROR,
    }
}

fn load_config() -> anyhow::Result<ShopConfig> {
    match spin_sdk::variables::get(CONFIG_VARIABLE) {
        Ok(toml) if !toml.trim().is_empty() => {
            ShopConfig::from_toml(&toml).context("invalid shop_config variable")
        }
        _ => Ok(ShopConfig::default()),
    }
}

fn plain(status: StatusCode, message: &str) -> ListingResponse {
    ListingResponse {
        status,
        content_type: TEXT_PLAIN,
        body: format!("{}\n", message),
    }
}

async fn send_response(
    response_out: ResponseOutparam,
    request_id: &RequestId,
    listing: ListingResponse,
) -> anyhow::Result<()> {
    let header_list: Vec<(String, Vec<u8>)> = vec![
        ("content-type".to_owned(), listing.content_type.into()),
        ("x-request-id".to_owned(), request_id.to_string().into()),
    ];

    let headers = Fields::from_list(&header_list).map_err(|e| anyhow!("invalid response headers: {:?}", e))?;
    let response = OutgoingResponse::new(headers);
    response
        .set_status_code(listing.status.as_u16())
        .map_err(|_| anyhow!("invalid status code {}", listing.status))?;

    let mut body = response.take_body();
    response_out.set(response);
    body.send(listing.body.into_bytes())
        .await
        .map_err(|e| anyhow!("failed to stream body: {:?}", e))?;

    Ok(())
}
