pub mod configure;
pub mod items;

use crate::api::{AuthClient, Credentials, HttpBackend, ServiceClient};
use crate::config::{AppConfig, AppPaths};
use crate::controller::Controller;
use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

/// Build the HTTP backend from validated config.
pub fn build_backend(config: &AppConfig) -> Result<HttpBackend> {
    config.validate()?;
    let http = reqwest::Client::builder()
        .user_agent(concat!("sfapprove/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let auth = AuthClient::new(
        http.clone(),
        config.login_url.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
    );
    let service = ServiceClient::new(http, config.service_url_prefix.clone());
    Ok(HttpBackend::new(auth, service))
}

/// Stored credentials, or an error telling the user to configure.
pub fn require_credentials(paths: &AppPaths) -> Result<Credentials> {
    paths.open_settings()?.credentials().with_context(|| {
        format!(
            "No credentials stored in {}. Run `sfapprove configure` first.",
            paths.settings_file().display()
        )
    })
}

/// Run the interactive client (the default command).
pub async fn run_client(paths: &AppPaths) -> Result<()> {
    let config = paths.load_config()?;
    let backend = build_backend(&config)?;

    let credentials = match paths.open_settings()?.credentials() {
        Some(credentials) => credentials,
        None => {
            println!();
            println!(
                "  {} No credentials stored yet. Let's set them up first!",
                "ℹ".blue()
            );
            configure::run_configure(
                paths,
                configure::ConfigureOptions {
                    open_browser: true,
                    ..Default::default()
                },
            )?
        }
    };

    tracing::info!(username = %credentials.username, "Starting interactive client");
    crate::ui::run_interactive(Controller::new(credentials), Arc::new(backend)).await
}

/// Run `sfapprove config`: show where things live and what is set.
pub fn run_show_config(paths: &AppPaths) -> Result<()> {
    let config = paths.load_config()?;
    let settings = paths.open_settings()?;

    println!();
    println!("  {}", "sfapprove configuration".bold());
    println!(
        "  {}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed()
    );
    println!(
        "  Config:   {}",
        paths.config_file().display().to_string().dimmed()
    );
    println!(
        "  Settings: {}",
        paths.settings_file().display().to_string().dimmed()
    );
    println!(
        "  Logs:     {}",
        paths.log_dir().display().to_string().dimmed()
    );
    println!();
    for (key, value) in config.describe() {
        let value = if value.is_empty() {
            "(not set)".red().to_string()
        } else {
            value.cyan().to_string()
        };
        println!("  {:<20} {}", key, value);
    }
    let user = match settings.credentials() {
        Some(c) => c.username.cyan().to_string(),
        None => "(not configured)".red().to_string(),
    };
    println!("  {:<20} {}", "username", user);

    if let Err(e) = config.validate() {
        println!();
        println!("  {} {}", "⚠".yellow(), e);
    }
    println!();
    Ok(())
}
