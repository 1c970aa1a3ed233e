//! `stockroom search <term>`: the same bounded suggestion list the TUI
//! search bar shows.

use stockroom_core::Catalog;

use crate::cli::{GlobalOpts, SearchArgs};
use crate::error::CliError;
use crate::output;

use super::products::ProductRow;
use super::util;

pub async fn handle(catalog: &Catalog, args: SearchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.term.is_empty() {
        return Err(CliError::Validation {
            field: "term".into(),
            reason: "cannot be empty".into(),
        });
    }

    util::load_products(catalog, global).await?;
    let favs = catalog.load_cached_favorites();
    let hits = catalog.search(&args.term);
    tracing::debug!(term = %args.term, hits = hits.len(), "search");

    let out = output::render_list(
        &global.output,
        &hits,
        |p| ProductRow::new(p, &favs),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
