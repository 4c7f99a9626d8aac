mod auth;
mod commands;
mod render;
mod settings;
mod spinner;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dealscope_core::{CatalogQuery, SortOrder, TimeFilter};
use settings::Settings;
use std::future::Future;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dealscope")]
#[command(author, version, about = "Browse deals, manage your cart and review what you've viewed")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[arg(long, global = true, help = "Disable the loading spinner")]
    no_spinner: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign in to your account")]
    Login {
        #[arg(long, help = "Account email (prompted when omitted)")]
        email: Option<String>,
    },
    #[command(about = "Create an account")]
    Register,
    #[command(about = "Sign out and forget the stored session")]
    Logout,
    #[command(about = "Show the signed-in account")]
    Whoami,
    #[command(about = "Show your viewing history grouped by day, month or year")]
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        #[arg(short, long, help = "Time filter: day, week, month, year, all")]
        filter: Option<TimeFilter>,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, value_name = "FILE", help = "Read a saved history response instead of calling the API")]
        input: Option<PathBuf>,
    },
    #[command(about = "List current deals")]
    Deals {
        #[arg(short, long, help = "Search text")]
        search: Option<String>,

        #[arg(short, long, help = "Category slug")]
        category: Option<String>,

        #[arg(long, help = "Sort: newest, price-asc, price-desc, discount")]
        sort: Option<SortOrder>,

        #[arg(short, long, help = "Page number (starting at 1)", value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Show one deal (recorded in your history when signed in)")]
    Deal {
        id: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "List product categories")]
    Categories {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Show or change your cart")]
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,

        #[arg(long, global = true, help = "Output as JSON")]
        json: bool,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    #[command(about = "Remove one entry from your history")]
    Delete { id: String },
    #[command(about = "Remove every entry from your history")]
    Clear {
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    #[command(about = "Add a product to the cart")]
    Add {
        product: String,

        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    #[command(about = "Change the quantity of a cart item")]
    Update {
        item: String,

        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    #[command(about = "Remove an item from the cart")]
    Remove { item: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let settings = Settings::load();
    tracing::debug!(api_url = settings.api_url.as_str(), "settings loaded");
    let no_spinner = cli.no_spinner;

    match cli.command {
        Commands::Login { email } => auth::login(&settings, email, no_spinner),
        Commands::Register => auth::register(&settings, no_spinner),
        Commands::Logout => auth::logout(&settings),
        Commands::Whoami => auth::whoami(&settings, no_spinner),
        Commands::History {
            action,
            filter,
            json,
            input,
        } => match action {
            Some(HistoryAction::Delete { id }) => commands::history::delete(&settings, &id, no_spinner),
            Some(HistoryAction::Clear { yes }) => commands::history::clear(&settings, yes, no_spinner),
            None => commands::history::show(&settings, filter, json, input.as_deref(), no_spinner),
        },
        Commands::Deals {
            search,
            category,
            sort,
            page,
            json,
        } => {
            let query = CatalogQuery {
                search,
                category,
                sort,
                page,
                limit: None,
            };
            commands::catalog::deals(&settings, query, json, no_spinner)
        }
        Commands::Deal { id, json } => commands::catalog::deal(&settings, &id, json, no_spinner),
        Commands::Categories { json } => commands::catalog::categories(&settings, json, no_spinner),
        Commands::Cart { action, json } => match action {
            None => commands::cart::show(&settings, json, no_spinner),
            Some(CartAction::Add { product, quantity }) => {
                commands::cart::add(&settings, &product, quantity, json, no_spinner)
            }
            Some(CartAction::Update { item, quantity }) => {
                commands::cart::update(&settings, &item, quantity, json, no_spinner)
            }
            Some(CartAction::Remove { item }) => commands::cart::remove(&settings, &item, json, no_spinner),
        },
    }
}

/// `RUST_LOG` wins; otherwise `debug` with `--debug` and `warn` without.
fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs one future to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(future))
}
