//! Text rendering for terminal output.

use chrono::TimeZone;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use dealscope_core::{
    Calendar, Cart, Category, DaySection, HistoryRecord, HistoryView, Product, ProductPage,
    TimeFilter,
};
use std::fmt;

const EXPANDED: &str = "▾";
const COLLAPSED: &str = "▸";

pub fn format_currency(n: f64) -> String {
    let cents = (n.abs() * 100.0).round() as u64;
    let sign = if n < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, with_commas(cents / 100), cents % 100)
}

fn with_commas(n: u64) -> String {
    let s = n.to_string();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(b as char);
    }
    result
}

fn items_label(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{} items", n)
    }
}

fn price_text(price: f64, original_price: Option<f64>) -> String {
    match original_price {
        Some(original) if original > price => format!(
            "{} {}",
            format_currency(price).green(),
            format!("(was {})", format_currency(original)).bright_black()
        ),
        _ => format_currency(price),
    }
}

/// `with_day` prefixes the day label for records not from today, for views
/// that mix days under one heading.
fn record_line<Tz>(record: &HistoryRecord, calendar: &Calendar<Tz>, indent: usize, with_day: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut stamp = record
        .timestamp
        .with_timezone(calendar.zone())
        .format("%H:%M")
        .to_string();
    let day = calendar.date_key(&record.timestamp);
    if with_day && !calendar.is_today(day) {
        stamp = format!("{} {}", calendar.format_day_of_week(day), stamp);
    }
    let mut line = format!(
        "{:indent$}{}  {}  {}",
        "",
        stamp.bright_black(),
        record.title,
        price_text(record.price, record.original_price),
        indent = indent
    );
    if let Some(store) = &record.store {
        line.push_str(&format!("  {}", store.cyan()));
    }
    line
}

fn section_header(title: &str, count: usize, expanded: bool, indent: usize) -> String {
    let marker = if expanded { EXPANDED } else { COLLAPSED };
    format!(
        "{:indent$}{} {} {}",
        "",
        marker,
        title.bold(),
        format!("({})", count).bright_black(),
        indent = indent
    )
}

fn push_day<Tz>(lines: &mut Vec<String>, day: &DaySection<HistoryRecord>, calendar: &Calendar<Tz>, indent: usize)
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    lines.push(section_header(&day.title, day.count(), !day.collapsed(), indent));
    if day.collapsed() {
        lines.push(format!(
            "{:indent$}{}",
            "",
            "No items viewed on this day".bright_black(),
            indent = indent + 4
        ));
        return;
    }
    for record in &day.records {
        lines.push(record_line(record, calendar, indent + 4, false));
    }
}

/// Render a history view as indented text sections.
pub fn history_text<Tz>(filter: TimeFilter, view: &HistoryView<HistoryRecord>, calendar: &Calendar<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut lines = vec![
        format!(
            "  {} {}",
            filter.label().cyan().bold(),
            format!("· {}", items_label(view.total())).bright_black()
        ),
        String::new(),
    ];

    match view {
        HistoryView::Today { title, records } => {
            lines.push(section_header(title, records.len(), true, 2));
            if records.is_empty() {
                lines.push(format!("      {}", "No items viewed today".bright_black()));
            }
            for record in records {
                lines.push(record_line(record, calendar, 6, true));
            }
        }
        HistoryView::Days { sections } => {
            for day in sections {
                push_day(&mut lines, day, calendar, 2);
            }
        }
        HistoryView::Years { years } => {
            if years.is_empty() {
                lines.push(format!("  {}", "No viewing history yet".bright_black()));
            }
            for (i, year) in years.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                lines.push(format!(
                    "  {} {}",
                    year.year.to_string().bold().underline(),
                    format!("({})", year.count()).bright_black()
                ));
                for month in &year.months {
                    lines.push(section_header(&month.title, month.count(), true, 4));
                    for day in &month.days {
                        push_day(&mut lines, day, calendar, 6);
                    }
                }
            }
        }
    }

    lines.join("\n")
}

pub fn deals_table(page: &ProductPage) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Product", "Store", "Price", "Was", "Off"]);

    for product in &page.items {
        table.add_row(vec![
            Cell::new(&product.id),
            Cell::new(&product.title),
            Cell::new(product.store.as_deref().unwrap_or("-")),
            Cell::new(format_currency(product.price)).set_alignment(CellAlignment::Right),
            Cell::new(product.original_price.map(format_currency).unwrap_or_default())
                .set_alignment(CellAlignment::Right),
            Cell::new(
                product
                    .discount_percent()
                    .map(|p| format!("-{}%", p))
                    .unwrap_or_default(),
            )
            .set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

pub fn categories_table(categories: &[Category]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slug", "Name"]);
    for category in categories {
        table.add_row(vec![category.slug.clone(), category.name.clone()]);
    }
    table
}

pub fn product_text(product: &Product) -> String {
    let mut lines = vec![format!("  {}", product.title.bold())];
    let mut meta = Vec::new();
    if let Some(store) = &product.store {
        meta.push(store.clone());
    }
    if let Some(category) = &product.category {
        meta.push(category.clone());
    }
    if !meta.is_empty() {
        lines.push(format!("  {}", meta.join(" · ").bright_black()));
    }
    lines.push(String::new());

    let mut price = format!("  Price:  {}", price_text(product.price, product.original_price));
    if let Some(off) = product.discount_percent() {
        price.push_str(&format!("  {}", format!("-{}%", off).green().bold()));
    }
    lines.push(price);
    if let Some(rating) = product.rating {
        lines.push(format!("  Rating: {:.1}/5", rating));
    }
    if let Some(url) = &product.url {
        lines.push(format!("  Link:   {}", url.underline()));
    }
    lines.push(format!("  {}", format!("ID: {}", product.id).bright_black()));
    lines.join("\n")
}

pub fn cart_table(cart: &Cart) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Item", "Product", "Qty", "Price", "Total"]);

    for item in &cart.items {
        table.add_row(vec![
            Cell::new(&item.id),
            Cell::new(&item.product.title),
            Cell::new(item.quantity).set_alignment(CellAlignment::Right),
            Cell::new(format_currency(item.product.price)).set_alignment(CellAlignment::Right),
            Cell::new(format_currency(item.line_total())).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

pub fn cart_summary(cart: &Cart) -> String {
    let mut summary = format!(
        "Items: {} | Subtotal: {}",
        cart.item_count(),
        format_currency(cart.subtotal())
    );
    let savings = cart.savings();
    if savings > 0.0 {
        summary.push_str(&format!(" | You save: {}", format_currency(savings)));
    }
    summary
}
