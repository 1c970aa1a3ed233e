//! Login, register and logout.

use stockroom_core::Catalog;

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn login(catalog: &Catalog, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let password = util::read_password("Password: ")?;
    util::with_spinner("Logging in", global, catalog.login(&args.email, &password)).await?;
    output::success(
        &format!("Logged in as {}", args.email),
        &global.color,
        global.quiet,
    );
    Ok(())
}

pub async fn register(
    catalog: &Catalog,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.name.trim().is_empty() {
        return Err(CliError::Validation {
            field: "name".into(),
            reason: "cannot be empty".into(),
        });
    }
    let password = util::read_password("Choose a password: ")?;
    util::with_spinner(
        "Creating account",
        global,
        catalog.register(&args.name, &args.email, &password),
    )
    .await?;
    output::success(
        &format!("Registered and logged in as {}", args.email),
        &global.color,
        global.quiet,
    );
    Ok(())
}

pub fn logout(catalog: &Catalog, global: &GlobalOpts) -> Result<(), CliError> {
    let was_logged_in = catalog.is_authenticated();
    catalog.logout()?;
    let message = if was_logged_in {
        "Logged out"
    } else {
        "Already logged out"
    };
    output::success(message, &global.color, global.quiet);
    Ok(())
}
