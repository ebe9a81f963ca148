//! `sfapprove configure` — the config page handoff.
//!
//! Flow:
//!   1. Show (and try to open) the config page URL
//!   2. The page hands back a URL-encoded JSON payload `{"un":..,"pw":..}`
//!   3. The payload is pasted here, decoded and written to the settings store
//!
//! `--response` skips the prompt; `--username`/`--password` skip the page.

use crate::api::Credentials;
use crate::config::{AppPaths, SettingsStore};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

#[derive(Debug, Default, Clone)]
pub struct ConfigureOptions {
    pub response: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub open_browser: bool,
}

/// Run the `sfapprove configure` command.
pub fn run_configure(paths: &AppPaths, options: ConfigureOptions) -> Result<Credentials> {
    let mut store = paths.open_settings()?;

    let credentials = match (&options.response, &options.username, &options.password) {
        (Some(response), _, _) => store.apply_config_response(response)?,
        (None, Some(username), Some(password)) => {
            let credentials = Credentials {
                username: username.clone(),
                password: password.clone(),
            };
            store.set_credentials(&credentials)?;
            credentials
        }
        (None, Some(_), None) | (None, None, Some(_)) => {
            bail!("--username and --password must be given together")
        }
        (None, None, None) => {
            let config = paths.load_config()?;
            interactive(&mut store, config.config_url.as_deref(), options.open_browser)?
        }
    };

    println!();
    println!(
        "  {} Credentials saved for {}",
        "✓".green().bold(),
        credentials.username.cyan()
    );
    println!(
        "  Settings: {}",
        store.path().display().to_string().dimmed()
    );
    println!();
    Ok(credentials)
}

fn interactive(
    store: &mut SettingsStore,
    config_url: Option<&str>,
    open_browser: bool,
) -> Result<Credentials> {
    println!();
    match config_url {
        Some(url) => {
            println!("  {} Open the configuration page:", "1".cyan().bold());
            println!("    {}", url.underline());
            if open_browser {
                if let Err(e) = open::that(url) {
                    tracing::debug!(error = %e, "Could not launch a browser");
                }
            }
            println!();
            println!(
                "  {} Paste the response the page gives you (or leave empty to type credentials):",
                "2".cyan().bold()
            );
            let response = prompt("")?;
            if !response.is_empty() {
                return store.apply_config_response(&response);
            }
        }
        None => {
            println!(
                "  {} No config page set (config_url), enter credentials directly.",
                "ℹ".blue()
            );
        }
    }

    let username = prompt("Username:")?;
    if username.is_empty() {
        bail!("No username given");
    }
    let password = prompt("Password:")?;
    let credentials = Credentials { username, password };
    store
        .set_credentials(&credentials)
        .context("Failed to save credentials")?;
    Ok(credentials)
}

fn prompt(label: &str) -> Result<String> {
    if label.is_empty() {
        print!("  {} ", "→".blue());
    } else {
        print!("  {} {} ", "→".blue(), label);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
