use anyhow::Result;
use colored::Colorize;
use dealscope_core::Cart;
use serde::Serialize;

use super::print_json;
use crate::auth::{self, authenticated_client};
use crate::settings::Settings;
use crate::{block_on, render, spinner};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartJson<'a> {
    items: &'a [dealscope_core::CartItem],
    item_count: u32,
    subtotal: f64,
    savings: f64,
}

fn print_cart(cart: &Cart, json: bool) -> Result<()> {
    if json {
        return print_json(&CartJson {
            items: &cart.items,
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
            savings: cart.savings(),
        });
    }

    if cart.is_empty() {
        println!("\n  {}", "Your cart is empty.".yellow());
        println!("{}", "  Browse with 'dealscope deals' and add with 'dealscope cart add <ID>'.\n".bright_black());
        return Ok(());
    }

    println!("{}", render::cart_table(cart));
    println!("\n{}", render::cart_summary(cart));
    Ok(())
}

pub fn show(settings: &Settings, json: bool, no_spinner: bool) -> Result<()> {
    let client = authenticated_client(settings)?;
    let result = spinner::run("Loading cart...", no_spinner, || block_on(client.cart()))?;
    print_cart(&result.map_err(auth::explain)?, json)
}

pub fn add(settings: &Settings, product_id: &str, quantity: u32, json: bool, no_spinner: bool) -> Result<()> {
    let client = authenticated_client(settings)?;
    let result = spinner::run("Adding to cart...", no_spinner, || {
        block_on(client.add_to_cart(product_id, quantity))
    })?;
    let cart = result.map_err(auth::explain)?;

    if !json {
        println!("\n  {}", format!("Added {} x {} to your cart.", quantity, product_id.bold()).green());
    }
    print_cart(&cart, json)
}

pub fn update(settings: &Settings, item_id: &str, quantity: u32, json: bool, no_spinner: bool) -> Result<()> {
    let client = authenticated_client(settings)?;
    let result = spinner::run("Updating cart...", no_spinner, || {
        block_on(client.update_cart_item(item_id, quantity))
    })?;
    let cart = result.map_err(auth::explain)?;

    if !json {
        println!("\n  {}", format!("Set quantity of {} to {}.", item_id.bold(), quantity).green());
    }
    print_cart(&cart, json)
}

pub fn remove(settings: &Settings, item_id: &str, json: bool, no_spinner: bool) -> Result<()> {
    let client = authenticated_client(settings)?;
    let result = spinner::run("Removing from cart...", no_spinner, || {
        block_on(client.remove_from_cart(item_id))
    })?;
    let cart = result.map_err(auth::explain)?;

    if !json {
        println!("\n  {}", format!("Removed {} from your cart.", item_id.bold()).green());
    }
    print_cart(&cart, json)
}
