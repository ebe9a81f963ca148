//! Headless commands: `sfapprove list`, `approve ID`, `reject ID`.
//!
//! Same login and service calls as the interactive client, printed to
//! stdout instead of drawn.

use crate::api::{ApprovalBackend, ApprovalItem, Credentials, Decision};
use anyhow::{Context, Result};
use colored::Colorize;

/// Run `sfapprove list`.
pub async fn run_list(backend: &dyn ApprovalBackend, credentials: &Credentials) -> Result<()> {
    let token = backend
        .login(credentials)
        .await
        .context("Login failed")?;
    let items = backend
        .list_items(&token, &credentials.username)
        .await
        .context("Loading work items failed")?;

    println!();
    if items.is_empty() {
        println!("  {} Nothing to approve.", "✓".green().bold());
        println!();
        return Ok(());
    }

    println!(
        "  {} ({})",
        "Approval List".bold(),
        items.len().to_string().cyan()
    );
    println!();
    for item in &items {
        print_item(item);
    }
    Ok(())
}

/// Run `sfapprove approve ID` / `sfapprove reject ID`.
pub async fn run_decide(
    backend: &dyn ApprovalBackend,
    credentials: &Credentials,
    item_id: &str,
    decision: Decision,
) -> Result<()> {
    let token = backend
        .login(credentials)
        .await
        .context("Login failed")?;
    backend
        .decide(&token, item_id, decision.approve())
        .await
        .with_context(|| format!("Could not record decision for {}", item_id))?;

    let mark = match decision {
        Decision::Approve => "✓".green().bold(),
        Decision::Reject => "✗".red().bold(),
    };
    println!();
    println!("  {} {} {}", mark, item_id.cyan(), decision);
    println!();
    Ok(())
}

fn print_item(item: &ApprovalItem) {
    println!(
        "  {} {}  {}",
        "•".cyan(),
        item.object_name.bold(),
        item.id.dimmed()
    );
    println!("    {}", item.title);
    for field in &item.fields {
        println!("      {}: {}", field.name.dimmed(), field.value);
    }
    println!();
}
