use anyhow::{Context, Result};
use colored::Colorize;
use dealscope_core::{ApiError, Session, StoreClient};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::settings::{config_dir, Settings};
use crate::{block_on, spinner};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl Credentials {
    fn from_session(session: Session) -> Self {
        Self {
            token: session.token,
            user_id: session.user.id,
            name: session.user.name,
            email: session.user.email,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn get_credentials_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("credentials.json"))
}

fn ensure_config_dir() -> Result<()> {
    let dir = config_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}

pub fn save_credentials(credentials: &Credentials) -> Result<()> {
    ensure_config_dir()?;
    let path = get_credentials_path()?;
    let json = serde_json::to_string_pretty(credentials)?;
    fs::write(&path, json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub fn load_credentials() -> Option<Credentials> {
    let path = get_credentials_path().ok()?;
    if !path.exists() {
        return None;
    }

    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            tracing::warn!("ignoring unreadable credentials at {}: {}", path.display(), e);
            None
        }
    }
}

pub fn clear_credentials() -> Result<bool> {
    let path = get_credentials_path()?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Client without a session, for public endpoints.
pub fn anonymous_client(settings: &Settings) -> Result<StoreClient> {
    StoreClient::with_timeout(&settings.api_url, settings.request_timeout())
        .context("Failed to build HTTP client")
}

/// Client carrying the stored session token, if any.
pub fn client(settings: &Settings) -> Result<StoreClient> {
    let client = anonymous_client(settings)?;
    Ok(match load_credentials() {
        Some(creds) => client.with_token(creds.token),
        None => client,
    })
}

/// Client for endpoints that need a session; fails before any request when logged out.
pub fn authenticated_client(settings: &Settings) -> Result<StoreClient> {
    let Some(creds) = load_credentials() else {
        anyhow::bail!("Not logged in. Run 'dealscope login' first.");
    };
    Ok(anonymous_client(settings)?.with_token(creds.token))
}

/// Maps an expired session to a hint instead of a bare status.
pub fn explain(err: ApiError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::anyhow!("Session expired or invalid. Run 'dealscope login' to sign in again.")
    } else {
        anyhow::Error::new(err)
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("  {}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} is required", label.trim_end_matches(": "));
    }
    Ok(value)
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("  Password: ")?;
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}

pub fn login(settings: &Settings, email: Option<String>, no_spinner: bool) -> Result<()> {
    if let Some(creds) = load_credentials() {
        println!("\n  {}", format!("Already logged in as {}", creds.email.bold()).yellow());
        println!("{}", "  Run 'dealscope logout' to sign out first.\n".bright_black());
        return Ok(());
    }

    println!("\n  {}\n", "Dealscope - Login".cyan());

    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = prompt_password()?;

    let client = anonymous_client(settings)?;
    let result = spinner::run("Signing in...", no_spinner, || {
        block_on(client.login(&email, &password))
    })?;

    let session = match result {
        Ok(session) => session,
        Err(e) if e.is_unauthorized() => anyhow::bail!("Invalid email or password."),
        Err(e) => return Err(e).context("Login failed"),
    };

    let credentials = Credentials::from_session(session);
    save_credentials(&credentials)?;

    println!("\n  {}", format!("Success! Logged in as {}", credentials.name.bold()).green());
    println!("{}", "  Your cart and viewing history are now available.\n".bright_black());
    Ok(())
}

pub fn register(settings: &Settings, no_spinner: bool) -> Result<()> {
    if let Some(creds) = load_credentials() {
        println!("\n  {}", format!("Already logged in as {}", creds.email.bold()).yellow());
        println!("{}", "  Run 'dealscope logout' to sign out first.\n".bright_black());
        return Ok(());
    }

    println!("\n  {}\n", "Dealscope - Create account".cyan());

    let name = prompt("Name: ")?;
    let email = prompt("Email: ")?;
    let password = prompt_password()?;
    let confirm = rpassword::prompt_password("  Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match.");
    }

    let client = anonymous_client(settings)?;
    let result = spinner::run("Creating account...", no_spinner, || {
        block_on(client.register(&name, &email, &password))
    })?;

    let credentials = Credentials::from_session(result.context("Registration failed")?);
    save_credentials(&credentials)?;

    println!("\n  {}\n", format!("Welcome, {}! You are now logged in.", credentials.name.bold()).green());
    Ok(())
}

pub fn logout(settings: &Settings) -> Result<()> {
    let Some(credentials) = load_credentials() else {
        println!("\n  {}\n", "Not logged in.".yellow());
        return Ok(());
    };

    // Server-side revocation is best effort; the local session goes either way.
    let client = anonymous_client(settings)?.with_token(credentials.token.clone());
    if let Err(e) = block_on(client.logout())? {
        tracing::debug!("server logout failed: {}", e);
    }

    if clear_credentials()? {
        println!("\n  {}\n", format!("Logged out from {}", credentials.email.bold()).green());
    } else {
        anyhow::bail!("Failed to clear credentials.");
    }

    Ok(())
}

pub fn whoami(settings: &Settings, no_spinner: bool) -> Result<()> {
    let Some(creds) = load_credentials() else {
        println!("\n  {}", "Not logged in.".yellow());
        println!("{}", "  Run 'dealscope login' to authenticate.\n".bright_black());
        return Ok(());
    };

    println!("\n  {}\n", "Dealscope - Account Info".cyan());
    println!("{}", format!("  Name:      {}", creds.name.bold()).white());
    println!("{}", format!("  Email:     {}", creds.email).white());

    if let Ok(created) = chrono::DateTime::parse_from_rfc3339(&creds.created_at) {
        println!("{}", format!("  Logged in: {}", created.format("%Y-%m-%d")).bright_black());
    }

    let client = anonymous_client(settings)?.with_token(creds.token);
    let result = spinner::run("Checking session...", no_spinner, || block_on(client.me()))?;

    match result {
        Ok(_) => println!("{}", "  Session:   active".bright_black()),
        Err(e) if e.is_unauthorized() => {
            println!("{}", "  Session:   expired (run 'dealscope login')".yellow())
        }
        Err(e) => {
            tracing::debug!("session check failed: {}", e);
            println!("{}", "  Session:   unknown (server unreachable)".bright_black());
        }
    }

    println!();
    Ok(())
}
