pub mod cart;
pub mod catalog;
pub mod history;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use dealscope_core::Calendar;
use std::io::{self, BufRead, Write};

const NOW_ENV: &str = "DEALSCOPE_NOW";

/// Local calendar, pinned to `$DEALSCOPE_NOW` (RFC 3339) when set.
pub fn calendar() -> Result<Calendar<Local>> {
    match std::env::var(NOW_ENV) {
        Ok(raw) if !raw.trim().is_empty() => {
            let now = DateTime::parse_from_rfc3339(raw.trim())
                .with_context(|| format!("Invalid {}: {}", NOW_ENV, raw))?;
            tracing::debug!("clock pinned to {}", now);
            Ok(Calendar::at(Local, now.with_timezone(&Utc)))
        }
        _ => Ok(Calendar::local()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("  {} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
