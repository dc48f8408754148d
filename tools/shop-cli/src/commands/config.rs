//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use shop_core::ShopConfig;
use shop_search::{Currency, ListingError, PriceFormat};

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { path, force } => init_config(&path, force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.section("solr");
    ctx.output.kv("url", &ctx.config.solr.url);
    ctx.output.kv("handler", &ctx.config.solr.handler);
    ctx.output.kv("select", &ctx.config.solr.select_url());

    ctx.output.section("mounts");
    ctx.output.kv("context_path", &ctx.config.mounts.context_path);
    ctx.output.kv("json_path", &ctx.config.mounts.json_path);
    ctx.output.kv("html_path", &ctx.config.mounts.html_path);

    ctx.output.section("presentation");
    ctx.output.kv("locale", &format!("{:?}", ctx.config.presentation.locale));
    ctx.output.kv("currency", &ctx.config.presentation.currency);
    if let Ok(format) = PriceFormat::from_config(&ctx.config.presentation) {
        ctx.output.kv("sample", &format.format(1234.5));
    }

    ctx.output.section("logging");
    ctx.output.kv("format", &format!("{:?}", ctx.config.logging.format));
    ctx.output.kv("level", &ctx.config.logging.level.to_string());

    Ok(())
}

async fn init_config(path: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path(path);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let defaults = ShopConfig::default();
    let content = if path.ends_with(".json") {
        serde_json::to_string_pretty(&defaults)?
    } else {
        defaults.to_toml()?
    };
    fs::write(&config_path, content)?;

    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let errors = validation_errors(&ctx.config);
    if errors.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }
    bail!("Configuration has {} error(s)", errors.len());
}

fn validation_errors(config: &ShopConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if !config.solr.url.starts_with("http://") && !config.solr.url.starts_with("https://") {
        errors.push(format!("solr.url '{}' must be an http(s) URL", config.solr.url));
    }

    let mounts = &config.mounts;
    for (key, path) in [("mounts.json_path", &mounts.json_path), ("mounts.html_path", &mounts.html_path)] {
        if !path.starts_with('/') {
            errors.push(format!("{} must start with '/'", key));
        }
    }
    if !mounts.context_path.is_empty() && !mounts.context_path.starts_with('/') {
        errors.push("mounts.context_path must be empty or start with '/'".to_string());
    }
    if mounts.json_path == mounts.html_path {
        errors.push("mounts.json_path and mounts.html_path must differ".to_string());
    }

    if let Err(ListingError::Config(message)) = PriceFormat::from_config(&config.presentation) {
        let supported: Vec<&str> = [Currency::EUR, Currency::USD, Currency::GBP, Currency::CHF, Currency::JPY]
            .iter()
            .map(|c| c.code())
            .collect();
        errors.push(format!("{} (supported: {})", message, supported.join(", ")));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validation_errors(&ShopConfig::default()).is_empty());
    }

    #[test]
    fn test_bad_config_reported() {
        let mut config = ShopConfig::default();
        config.solr.url = "localhost:8983".into();
        config.mounts.html_path = "listings.html".into();
        config.presentation.currency = "DOGE".into();

        let errors = validation_errors(&config);
        assert_eq!(errors.len(), 3);
        assert!(errors[2].contains("supported: EUR"));
    }
}
