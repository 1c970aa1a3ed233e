//! Command dispatch: bridges CLI args -> catalog operations -> output.

pub mod auth;
pub mod config_cmd;
pub mod favorites;
pub mod products;
pub mod search;
pub mod util;

use stockroom_core::Catalog;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a catalog-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    catalog: &Catalog,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(catalog, args, global).await,
        Command::Register(args) => auth::register(catalog, args, global).await,
        Command::Logout => auth::logout(catalog, global),
        Command::Products(args) => products::handle(catalog, args, global).await,
        Command::Favorites(args) => favorites::handle(catalog, args, global).await,
        Command::Search(args) => search::handle(catalog, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
