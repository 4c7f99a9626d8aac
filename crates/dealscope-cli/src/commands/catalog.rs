use anyhow::{Context, Result};
use colored::Colorize;
use dealscope_core::{ApiError, CatalogQuery};

use super::print_json;
use crate::auth::{anonymous_client, client};
use crate::settings::Settings;
use crate::{block_on, render, spinner};

const PAGE_SIZE: u32 = 20;

pub fn deals(settings: &Settings, mut query: CatalogQuery, json: bool, no_spinner: bool) -> Result<()> {
    query.limit = query.limit.or(Some(PAGE_SIZE));
    let client = anonymous_client(settings)?;
    let result = spinner::run("Fetching deals...", no_spinner, || {
        block_on(client.products(&query))
    })?;
    let page = result.context("Failed to fetch deals")?;

    if json {
        return print_json(&page);
    }

    if page.items.is_empty() {
        println!("\n  {}\n", "No deals match your filters.".yellow());
        return Ok(());
    }

    println!("{}", render::deals_table(&page));
    let shown = page.items.len() as u64;
    println!(
        "\nPage {} | Showing {} of {} deals",
        page.page,
        shown,
        page.total.max(shown)
    );
    println!("{}", "  Run 'dealscope deal <ID>' for details.".bright_black());
    Ok(())
}

/// Shows one product and, when signed in, records the view in history.
pub fn deal(settings: &Settings, id: &str, json: bool, no_spinner: bool) -> Result<()> {
    let client = client(settings)?;
    let result = spinner::run("Fetching deal...", no_spinner, || {
        block_on(async {
            let product = client.product(id).await?;
            let recorded = if client.is_authenticated() {
                client.record_view(&product.id).await.map(|_| ())
            } else {
                Ok(())
            };
            Ok::<_, ApiError>((product, recorded))
        })
    })?;

    let (product, recorded) = match result {
        Ok(found) => found,
        Err(ApiError::NotFound(_)) => anyhow::bail!("Deal not found: {}", id),
        Err(e) => return Err(e).context("Failed to fetch deal"),
    };
    if let Err(e) = recorded {
        tracing::warn!("could not record view of {}: {}", product.id, e);
    }

    if json {
        return print_json(&product);
    }

    println!("\n{}\n", render::product_text(&product));
    Ok(())
}

pub fn categories(settings: &Settings, json: bool, no_spinner: bool) -> Result<()> {
    let client = anonymous_client(settings)?;
    let result = spinner::run("Fetching categories...", no_spinner, || {
        block_on(client.categories())
    })?;
    let categories = result.context("Failed to fetch categories")?;

    if json {
        return print_json(&categories);
    }

    println!("{}", render::categories_table(&categories));
    Ok(())
}
