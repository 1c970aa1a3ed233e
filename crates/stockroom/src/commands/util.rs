//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;

use stockroom_core::{Catalog, Product, ProductId};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Environment variable read before prompting for a password.
pub const PASSWORD_ENV: &str = "STOCKROOM_PASSWORD";

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, the operation is refused rather than
/// assumed.
pub fn confirm(message: &str, action: &str, global: &GlobalOpts) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Password from `STOCKROOM_PASSWORD`, else an interactive prompt.
pub fn read_password(prompt: &str) -> Result<SecretString, CliError> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }
    let pw = rpassword::prompt_password(prompt)?;
    if pw.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pw))
}

/// Await `fut` behind a stderr spinner when interactive.
pub async fn with_spinner<F, T>(message: &str, global: &GlobalOpts, fut: F) -> T
where
    F: Future<Output = T>,
{
    if global.quiet || !std::io::stderr().is_terminal() {
        return fut.await;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

/// Fetch the product list into the catalog.
pub async fn load_products(catalog: &Catalog, global: &GlobalOpts) -> Result<(), CliError> {
    with_spinner("Loading products", global, catalog.refresh_products()).await?;
    Ok(())
}

/// A product from the loaded list, falling back to a direct fetch.
pub async fn resolve_product(catalog: &Catalog, id: &str) -> Result<Product, CliError> {
    let id = ProductId::from(id);
    if id.is_empty() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "cannot be empty".into(),
        });
    }
    match catalog.cached_product(&id) {
        Some(p) => Ok(p),
        None => Ok(catalog.product(&id).await?),
    }
}
