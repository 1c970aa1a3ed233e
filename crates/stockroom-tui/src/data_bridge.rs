//! Forwards the catalog's `watch` channels into the action loop.
//!
//! Sends the current products, favorites and session state once, then one
//! action per change until cancelled or until the catalog goes away.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use stockroom_core::Catalog;

use crate::action::Action;

pub async fn spawn_data_bridge(
    catalog: Catalog,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut products = catalog.subscribe_products();
    let mut favorites = catalog.subscribe_favorites();
    let mut session = catalog.session().subscribe();

    let _ = action_tx.send(Action::ProductsUpdated(products.borrow_and_update().clone()));
    let _ = action_tx.send(Action::FavoritesUpdated(favorites.borrow_and_update().clone()));
    let _ = action_tx.send(Action::SessionChanged(session.borrow_and_update().is_some()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = products.changed() => {
                let list = products.borrow_and_update().clone();
                debug!(count = list.len(), "products changed");
                let _ = action_tx.send(Action::ProductsUpdated(list));
            }
            Ok(()) = favorites.changed() => {
                let set = favorites.borrow_and_update().clone();
                debug!(count = set.len(), "favorites changed");
                let _ = action_tx.send(Action::FavoritesUpdated(set));
            }
            Ok(()) = session.changed() => {
                let logged_in = session.borrow_and_update().is_some();
                debug!(logged_in, "session changed");
                let _ = action_tx.send(Action::SessionChanged(logged_in));
            }
            else => break,
        }
    }

    debug!("data bridge shut down");
}
