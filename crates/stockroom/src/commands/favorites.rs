//! Favorites command handlers.

use serde::Serialize;
use tabled::Tabled;

use stockroom_core::{Catalog, Favorite, FavoriteSet, FavoriteToggle};

use crate::cli::{FavoritesArgs, FavoritesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

/// Serialized form of one favorite; `product` is the cached snapshot.
#[derive(Serialize)]
struct FavoriteRecord<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<&'a stockroom_core::Product>,
}

impl<'a> From<&'a Favorite> for FavoriteRecord<'a> {
    fn from(f: &'a Favorite) -> Self {
        Self {
            id: f.id.as_str(),
            name: f.label(),
            product: f.snapshot.as_ref(),
        }
    }
}

#[derive(Tabled)]
struct FavoriteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl From<&FavoriteRecord<'_>> for FavoriteRow {
    fn from(r: &FavoriteRecord<'_>) -> Self {
        Self {
            id: r.id.to_owned(),
            name: r.name.to_owned(),
            sku: r.product.map(|p| p.sku.clone()).unwrap_or_default(),
            price: r.product.map(stockroom_core::Product::display_price).unwrap_or_default(),
        }
    }
}

fn print_set(set: &FavoriteSet, global: &GlobalOpts) {
    let records: Vec<FavoriteRecord<'_>> = set.iter().map(FavoriteRecord::from).collect();
    let out = output::render_list(
        &global.output,
        &records,
        |r| FavoriteRow::from(r),
        |r| r.id.to_owned(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    catalog: &Catalog,
    args: FavoritesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FavoritesCommand::List { sync } => {
            let set = if sync {
                sync_set(catalog, global).await?
            } else {
                catalog.load_cached_favorites()
            };
            print_set(&set, global);
            Ok(())
        }

        FavoritesCommand::Toggle { id } => {
            catalog.load_cached_favorites();
            let product = util::resolve_product(catalog, &id).await?;
            let outcome =
                util::with_spinner("Updating favorites", global, catalog.toggle_favorite(&product))
                    .await?;
            let (verb, preposition) = match outcome {
                FavoriteToggle::Added => ("Added", "to"),
                FavoriteToggle::Removed => ("Removed", "from"),
            };
            output::success(
                &format!("{verb} '{}' {preposition} favorites", product.name),
                &global.color,
                global.quiet,
            );
            Ok(())
        }

        FavoritesCommand::Sync => {
            let set = sync_set(catalog, global).await?;
            output::success(
                &format!("{} favorites synced", set.len()),
                &global.color,
                global.quiet,
            );
            Ok(())
        }
    }
}

/// Load products for snapshots, then adopt the server's favorites.
async fn sync_set(
    catalog: &Catalog,
    global: &GlobalOpts,
) -> Result<std::sync::Arc<FavoriteSet>, CliError> {
    util::load_products(catalog, global).await?;
    let set = util::with_spinner("Syncing favorites", global, catalog.sync_favorites()).await?;
    Ok(set)
}
