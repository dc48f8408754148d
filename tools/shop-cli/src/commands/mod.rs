//! CLI command implementations.

pub mod config;
pub mod render;
pub mod translate;

use anyhow::Result;
use clap::{Args, Subcommand};
use shop_core::QueryParams;
use shop_search::{translate_html, translate_json, FacetRegistry, Translation};

/// Arguments for the translate command.
#[derive(Args)]
pub struct TranslateArgs {
    /// Query string, e.g. "q=shirt&c=men&r=20".
    #[arg(default_value = "")]
    pub query: String,

    /// Path below the handler mount, e.g. "/red-sneaker" or "/_id/42".
    #[arg(short, long)]
    pub path: Option<String>,

    /// Translate as the HTML handler does.
    #[arg(long)]
    pub html: bool,

    /// Also show the Solr select parameters.
    #[arg(long)]
    pub solr: bool,
}

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// File holding a Solr select response (wt=json).
    pub response: String,

    /// Query string the response was produced for.
    #[arg(default_value = "")]
    pub query: String,

    /// Path below the handler mount.
    #[arg(short, long)]
    pub path: Option<String>,

    /// Render HTML instead of JSON.
    #[arg(long)]
    pub html: bool,

    /// Scheme used for absolute listing links.
    #[arg(long, default_value = "http")]
    pub scheme: String,

    /// Host used for absolute listing links.
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port used for absolute listing links.
    #[arg(long, default_value = "80")]
    pub port: u16,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Write a config file with default values.
    Init {
        /// Output file.
        #[arg(default_value = "shop.toml")]
        path: String,
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}

/// Translate a query string the way the selected handler would.
fn translate(query: &str, path: Option<&str>, html: bool) -> Result<Translation> {
    let params = QueryParams::parse(query);
    let registry = FacetRegistry::standard();
    let translation = if html {
        translate_html(&params, path, &registry)?
    } else {
        translate_json(&params, path, &registry)?
    };
    Ok(translation)
}
