//! Application state and user-facing operations.
//!
//! `App` owns the merged catalog, the selection state, and the current view
//! mode, and routes every mutation through the persistent store so the state
//! on disk always matches the state in memory. The purchase history stays in
//! the store and is loaded per operation rather than held here.

use crate::config::DecrementPolicy;
use crate::core::catalog::{self, Product};
use crate::core::history::{self, Snapshot};
use crate::core::normalize::{parse_qty, title_case, to_price};
use crate::core::selection::SelectionState;
use crate::core::view::{self, Mode, ShoppingView, Totals, ViewRow};
use crate::errors::{Error, Result};
use crate::store::Store;
use tracing::{debug, info};

/// The list to render, depending on the active mode.
#[derive(Debug)]
pub enum CurrentView<'a> {
    /// Catalog mode: all products, filterable
    Catalog(Vec<ViewRow<'a>>),
    /// Shopping mode: checked products, pending/purchased
    Shopping(ShoppingView<'a>),
}

/// The whole application state, plus its persistence handle.
#[derive(Debug)]
pub struct App {
    store: Store,
    catalog: Vec<Product>,
    local_products: Vec<Product>,
    state: SelectionState,
    mode: Mode,
    filter: String,
    hide_purchased: bool,
    policy: DecrementPolicy,
}

impl App {
    /// Builds the application state from the static catalog source and the
    /// persisted stores.
    ///
    /// The base catalog is merged with the persisted local products, the
    /// selection state is loaded and repaired (checked products are
    /// guaranteed a quantity), and the initial mode is Shopping when a run
    /// is already underway, Catalog otherwise.
    pub async fn load(store: Store, catalog_json: &str, policy: DecrementPolicy) -> Result<Self> {
        let base = catalog::parse_base_catalog(catalog_json)?;
        let local_products = store.load_local_products().await?;
        let merged = catalog::merge(&base, &local_products);

        let mut state = store.load_selection().await?;
        state.repair();

        let mode = if state.checked_count() > 0 {
            Mode::Shopping
        } else {
            Mode::Catalog
        };
        info!(
            products = merged.len(),
            local = local_products.len(),
            checked = state.checked_count(),
            "catalog loaded"
        );

        Ok(Self {
            store,
            catalog: merged,
            local_products,
            state,
            mode,
            filter: String::new(),
            hide_purchased: false,
            policy,
        })
    }

    /// The merged, sorted catalog.
    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// The selection state of the active run.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The active view mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The active catalog-mode text filter.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Display aggregates for the active run.
    #[must_use]
    pub fn totals(&self) -> Totals {
        view::compute_totals(&self.catalog, &self.state)
    }

    /// The item list for the active mode.
    #[must_use]
    pub fn current_view(&self) -> CurrentView<'_> {
        match self.mode {
            Mode::Catalog => {
                CurrentView::Catalog(view::catalog_view(&self.catalog, &self.state, &self.filter))
            }
            Mode::Shopping => CurrentView::Shopping(view::shopping_view(
                &self.catalog,
                &self.state,
                self.hide_purchased,
            )),
        }
    }

    /// Switches the view mode. Resets the text filter; never touches the
    /// selection state.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.filter.clear();
    }

    /// Sets the catalog-mode text filter.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_owned();
    }

    /// Shows or hides the purchased group in shopping mode.
    pub fn set_hide_purchased(&mut self, hide: bool) {
        self.hide_purchased = hide;
    }

    /// Adds or removes a product from the run.
    pub async fn set_checked(&mut self, id: i64, value: bool) -> Result<()> {
        self.state.set_checked(id, value);
        self.store.save_selection(&self.state).await
    }

    /// Toggles a product in or out of the run.
    pub async fn toggle(&mut self, id: i64) -> Result<()> {
        let next = !self.state.is_checked(id);
        self.set_checked(id, next).await
    }

    /// Sets the requested quantity (clamped to at least 1).
    pub async fn set_qty(&mut self, id: i64, qty: u32) -> Result<()> {
        self.state.set_qty(id, qty);
        self.store.save_selection(&self.state).await
    }

    /// Quantity "plus": checks the product when needed, otherwise adds one.
    pub async fn increment(&mut self, id: i64) -> Result<()> {
        if self.state.is_checked(id) {
            let qty = self.state.qty_of(id);
            self.state.set_qty(id, qty.saturating_add(1));
        } else {
            self.state.set_checked(id, true);
        }
        self.store.save_selection(&self.state).await
    }

    /// Quantity "minus": below 1 the configured policy decides between
    /// unchecking the product and clamping at 1.
    pub async fn decrement(&mut self, id: i64) -> Result<()> {
        let current = self.state.qty_of(id);
        if current <= 1 {
            match self.policy {
                DecrementPolicy::UncheckAtZero => self.state.set_checked(id, false),
                DecrementPolicy::ClampAtOne => self.state.set_qty(id, 1),
            }
        } else {
            self.state.set_qty(id, current - 1);
        }
        self.store.save_selection(&self.state).await
    }

    /// Marks or unmarks a product as purchased in the cart.
    pub async fn set_done(&mut self, id: i64, value: bool) -> Result<()> {
        self.state.set_done(id, value);
        self.store.save_selection(&self.state).await
    }

    /// Stores the price entered for a product as this run's override.
    /// Empty or unparseable input records an explicit "no price".
    pub async fn edit_price(&mut self, id: i64, raw: &str) -> Result<()> {
        self.state.set_price_override(id, to_price(raw));
        self.store.save_selection(&self.state).await
    }

    /// Adds a free-text product to the run, creating a local product when
    /// the name matches nothing in the catalog. Returns the product id, or
    /// `None` when the name was blank. Switches to shopping mode.
    pub async fn add_item(
        &mut self,
        name: &str,
        qty_raw: &str,
        price_raw: &str,
    ) -> Result<Option<i64>> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        let qty = parse_qty(qty_raw);
        let price = to_price(price_raw);

        let id = match catalog::find_by_name(&self.catalog, name) {
            Some(p) => p.id,
            None => self.create_local_product(name).await?,
        };

        self.state.set_checked(id, true);
        self.state.set_qty(id, qty);
        if price.is_some() {
            self.state.set_price_override(id, price);
        }
        self.store.save_selection(&self.state).await?;

        self.set_mode(Mode::Shopping);
        Ok(Some(id))
    }

    /// Creates a user product with a freshly allocated id and a title-cased
    /// display name, persists it, and inserts it into the sorted catalog.
    pub async fn create_local_product(&mut self, name: &str) -> Result<i64> {
        let product = Product {
            id: catalog::next_id(&self.catalog, &self.local_products),
            name: title_case(name),
            price: None,
        };
        debug!(id = product.id, name = %product.name, "creating local product");

        self.local_products.push(product.clone());
        self.store.save_local_products(&self.local_products).await?;

        self.catalog.push(product.clone());
        catalog::sort_by_name(&mut self.catalog);

        Ok(product.id)
    }

    /// Removes a user-created product from both the local store and the
    /// catalog, dropping any run state it had. Products from the static
    /// source are left alone.
    pub async fn remove_local_product(&mut self, id: i64) -> Result<bool> {
        let before = self.local_products.len();
        self.local_products.retain(|p| p.id != id);
        if self.local_products.len() == before {
            return Ok(false);
        }

        self.store.save_local_products(&self.local_products).await?;
        self.catalog.retain(|p| p.id != id);

        self.state.set_checked(id, false);
        self.state.price_override.remove(&id);
        self.store.save_selection(&self.state).await?;

        Ok(true)
    }

    /// The persisted purchase history, most recent first.
    pub async fn history(&self) -> Result<Vec<Snapshot>> {
        self.store.load_history().await
    }

    /// Finalizes the run: snapshots the checked products into history,
    /// clears the run, and returns to catalog mode.
    ///
    /// # Errors
    /// [`Error::EmptyRun`] when nothing is checked; no state changes.
    pub async fn finalize(&mut self) -> Result<Snapshot> {
        let mut entries = self.store.load_history().await?;

        // The timestamp doubles as the history key; keep it unique even for
        // back-to-back finalizes within the same millisecond.
        let mut ts = chrono::Utc::now().timestamp_millis();
        while history::find(&entries, ts).is_some() {
            ts += 1;
        }

        let snapshot = history::build_snapshot(&self.catalog, &self.state, ts);
        if snapshot.count == 0 {
            return Err(Error::EmptyRun);
        }

        history::prepend(&mut entries, snapshot.clone());
        self.store.save_history(&entries).await?;

        self.state.clear_run();
        self.store.save_selection(&self.state).await?;

        self.set_mode(Mode::Catalog);
        info!(ts, count = snapshot.count, total = snapshot.total, "run finalized");
        Ok(snapshot)
    }

    /// Restores a past run into the selection state.
    ///
    /// Each snapshot line is resolved by product id, then by name, then by
    /// creating a new local product. Quantities are re-clamped, and a price
    /// override is re-established only where the snapshot recorded a
    /// non-null price. Switches to shopping mode. Returns `false` (and does
    /// nothing) when the timestamp matches no history entry.
    pub async fn restore(&mut self, ts: i64) -> Result<bool> {
        let entries = self.store.load_history().await?;
        let Some(snapshot) = history::find(&entries, ts) else {
            debug!(ts, "no history entry to restore");
            return Ok(false);
        };
        let items = snapshot.items.clone();

        self.state.clear_run();
        for item in &items {
            let id = if self.catalog.iter().any(|p| p.id == item.id) {
                item.id
            } else if let Some(p) = catalog::find_by_name(&self.catalog, &item.name) {
                p.id
            } else {
                self.create_local_product(&item.name).await?
            };

            self.state.set_checked(id, true);
            self.state.set_qty(id, item.qty.max(1));
            if let Some(price) = item.price {
                self.state.set_price_override(id, Some(price));
            }
        }
        self.store.save_selection(&self.state).await?;

        self.set_mode(Mode::Shopping);
        info!(ts, count = items.len(), "run restored from history");
        Ok(true)
    }

    /// Deletes one history entry by exact timestamp. Irreversible.
    pub async fn delete_history(&mut self, ts: i64) -> Result<bool> {
        let mut entries = self.store.load_history().await?;
        let removed = history::delete(&mut entries, ts);
        if removed {
            self.store.save_history(&entries).await?;
        }
        Ok(removed)
    }

    /// Deletes the entire history. Irreversible.
    pub async fn clear_history(&mut self) -> Result<()> {
        self.store.save_history(&[]).await
    }

    /// Unchecks everything and returns to catalog mode without touching
    /// history.
    pub async fn reset_run(&mut self) -> Result<()> {
        self.state.clear_run();
        self.store.save_selection(&self.state).await?;
        self.set_mode(Mode::Catalog);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{SAMPLE_CATALOG, setup_test_app, setup_test_app_with_policy, setup_test_store};

    #[tokio::test]
    async fn test_load_merges_and_starts_in_catalog_mode() -> Result<()> {
        let app = setup_test_app().await?;

        assert_eq!(app.catalog().len(), 3);
        assert_eq!(app.mode(), Mode::Catalog);
        // Sorted by normalized name: Leche, Pan, Queso
        assert_eq!(app.catalog()[0].name, "Leche");

        Ok(())
    }

    #[tokio::test]
    async fn test_load_resumes_shopping_mode_with_active_run() -> Result<()> {
        let store = setup_test_store().await?;
        {
            let mut app =
                App::load(store.clone(), SAMPLE_CATALOG, DecrementPolicy::default()).await?;
            app.set_checked(1, true).await?;
        }

        let app = App::load(store, SAMPLE_CATALOG, DecrementPolicy::default()).await?;
        assert_eq!(app.mode(), Mode::Shopping);
        assert!(app.state().is_checked(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_scenario_check_and_quantity_totals() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?; // Leche, 1.10
        app.set_qty(1, 2).await?;

        let totals = app.totals();
        assert_eq!(totals.marked, 1);
        assert_eq!(totals.units, 2);
        assert_eq!(crate::core::normalize::round2(totals.total), 2.20);

        Ok(())
    }

    #[tokio::test]
    async fn test_scenario_null_override_counts_units_only() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        app.edit_price(1, "").await?; // explicit "no price"
        app.set_qty(1, 3).await?;

        let totals = app.totals();
        assert_eq!(totals.units, 3);
        assert_eq!(totals.total, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_price_parses_comma_decimal() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(2, true).await?;
        app.edit_price(2, "1,35").await?;

        let product = app.catalog().iter().find(|p| p.id == 2).unwrap().clone();
        assert_eq!(app.state().effective_price(2, &product), Some(1.35));

        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_persist_across_reload() -> Result<()> {
        let store = setup_test_store().await?;
        {
            let mut app =
                App::load(store.clone(), SAMPLE_CATALOG, DecrementPolicy::default()).await?;
            app.set_checked(2, true).await?;
            app.set_qty(2, 4).await?;
            app.edit_price(2, "0,80").await?;
        }

        let app = App::load(store, SAMPLE_CATALOG, DecrementPolicy::default()).await?;
        assert!(app.state().is_checked(2));
        assert_eq!(app.state().qty_of(2), 4);
        assert_eq!(app.state().price_override.get(&2), Some(&Some(0.80)));

        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_uncheck_at_zero_policy() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        app.set_qty(1, 2).await?;
        app.decrement(1).await?;
        assert_eq!(app.state().qty_of(1), 1);

        app.decrement(1).await?;
        assert!(!app.state().is_checked(1));
        assert!(app.state().qty.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_clamp_at_one_policy() -> Result<()> {
        let mut app = setup_test_app_with_policy(DecrementPolicy::ClampAtOne).await?;

        app.set_checked(1, true).await?;
        app.decrement(1).await?;

        assert!(app.state().is_checked(1));
        assert_eq!(app.state().qty_of(1), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_increment_checks_then_counts() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.increment(1).await?;
        assert!(app.state().is_checked(1));
        assert_eq!(app.state().qty_of(1), 1);

        app.increment(1).await?;
        assert_eq!(app.state().qty_of(1), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_mode_switch_resets_filter_and_keeps_state() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        app.set_filter("lech");

        app.set_mode(Mode::Shopping);
        assert_eq!(app.filter(), "");
        assert!(app.state().is_checked(1));

        app.set_mode(Mode::Catalog);
        assert!(app.state().is_checked(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_current_view_partitions_in_shopping_mode() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        app.set_checked(2, true).await?;
        app.set_done(2, true).await?;
        app.set_mode(Mode::Shopping);

        match app.current_view() {
            CurrentView::Shopping(view) => {
                assert_eq!(view.pending.len(), 1);
                assert_eq!(view.purchased.len(), 1);
            }
            CurrentView::Catalog(_) => panic!("expected shopping view"),
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_creates_persisted_local_product() -> Result<()> {
        let store = setup_test_store().await?;
        let mut app =
            App::load(store.clone(), SAMPLE_CATALOG, DecrementPolicy::default()).await?;

        let id = app.add_item("  aceite de oliva ", "2", "4,50").await?.unwrap();

        assert_eq!(id, 4); // one past the highest catalog id
        assert_eq!(app.mode(), Mode::Shopping);
        assert!(app.state().is_checked(id));
        assert_eq!(app.state().qty_of(id), 2);
        assert_eq!(app.state().price_override.get(&id), Some(&Some(4.50)));

        let product = app.catalog().iter().find(|p| p.id == id).unwrap();
        assert_eq!(product.name, "Aceite de oliva");
        assert_eq!(product.price, None);

        // The local product survives a reload
        let app = App::load(store, SAMPLE_CATALOG, DecrementPolicy::default()).await?;
        assert!(app.catalog().iter().any(|p| p.id == id));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_reuses_existing_product_by_name() -> Result<()> {
        let mut app = setup_test_app().await?;

        let id = app.add_item("  LECHE ", "3", "").await?.unwrap();

        assert_eq!(id, 1);
        assert_eq!(app.catalog().len(), 3);
        assert_eq!(app.state().qty_of(1), 3);
        // No price given: the catalog price still governs
        assert!(!app.state().price_override.contains_key(&1));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_blank_name_is_a_no_op() -> Result<()> {
        let mut app = setup_test_app().await?;

        assert!(app.add_item("   ", "2", "1").await?.is_none());
        assert_eq!(app.mode(), Mode::Catalog);
        assert!(app.state().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_local_product() -> Result<()> {
        let mut app = setup_test_app().await?;

        let id = app.add_item("Miel", "1", "").await?.unwrap();
        assert!(app.remove_local_product(id).await?);
        assert!(!app.catalog().iter().any(|p| p.id == id));
        assert!(!app.state().is_checked(id));

        // Static products cannot be removed this way
        assert!(!app.remove_local_product(1).await?);
        assert!(app.catalog().iter().any(|p| p.id == 1));

        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_snapshots_and_clears_run() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?; // Leche 1.10
        app.set_qty(1, 2).await?;

        let snapshot = app.finalize().await?;

        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.total, 2.20);
        assert_eq!(app.mode(), Mode::Catalog);
        assert!(app.state().checked.is_empty());
        assert!(app.state().qty.is_empty());
        assert!(app.state().done.is_empty());

        let entries = app.history().await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], snapshot);

        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_empty_run_refuses_without_changes() -> Result<()> {
        let mut app = setup_test_app().await?;

        let result = app.finalize().await;
        assert!(matches!(result, Err(Error::EmptyRun)));
        assert!(app.history().await?.is_empty());
        assert_eq!(app.mode(), Mode::Catalog);

        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        let first = app.finalize().await?;

        app.set_checked(2, true).await?;
        let second = app.finalize().await?;

        let entries = app.history().await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].items[0].id, second.items[0].id);
        assert_eq!(entries[1].items[0].id, first.items[0].id);

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_round_trips_the_run() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        app.set_qty(1, 2).await?;
        app.set_checked(3, true).await?;
        app.edit_price(3, "2,10").await?;

        let snapshot = app.finalize().await?;
        assert!(app.state().checked.is_empty());

        assert!(app.restore(snapshot.ts).await?);

        assert_eq!(app.mode(), Mode::Shopping);
        assert!(app.state().is_checked(1));
        assert_eq!(app.state().qty_of(1), 2);
        assert!(app.state().is_checked(3));
        // The snapshot recorded 2.10 for id 3, so the override is back
        assert_eq!(app.state().price_override.get(&3), Some(&Some(2.10)));
        // Id 1 had a plain catalog price: no override reinstated
        assert_eq!(app.state().price_override.get(&1), None);

        // History is untouched by restore
        assert_eq!(app.history().await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_missing_timestamp_is_a_no_op() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        assert!(!app.restore(123_456).await?);

        // Nothing changed
        assert!(app.state().is_checked(1));
        assert_eq!(app.mode(), Mode::Catalog);

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_recreates_vanished_product_as_local() -> Result<()> {
        let store = setup_test_store().await?;

        // Finalize a run against a catalog that contains "Turrón"
        let bigger = r#"[
            {"id": 1, "name": "Leche", "price": 1.10},
            {"id": 9, "name": "Turrón", "price": 3.0}
        ]"#;
        let ts = {
            let mut app =
                App::load(store.clone(), bigger, DecrementPolicy::default()).await?;
            app.set_checked(9, true).await?;
            app.finalize().await?.ts
        };

        // Reload against a catalog where that product no longer exists
        let smaller = r#"[{"id": 1, "name": "Leche", "price": 1.10}]"#;
        let mut app = App::load(store, smaller, DecrementPolicy::default()).await?;
        assert!(app.restore(ts).await?);

        let recreated = catalog::find_by_name(app.catalog(), "turrón").unwrap();
        assert!(app.state().is_checked(recreated.id));
        // The historical price comes back as an override, not a catalog price
        assert_eq!(recreated.price, None);
        assert_eq!(
            app.state().price_override.get(&recreated.id),
            Some(&Some(3.0))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_and_clear_history() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        let first = app.finalize().await?;
        app.set_checked(2, true).await?;
        app.finalize().await?;

        assert!(app.delete_history(first.ts).await?);
        assert!(!app.delete_history(first.ts).await?);
        assert_eq!(app.history().await?.len(), 1);

        app.clear_history().await?;
        assert!(app.history().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_reset_run_unchecks_everything() -> Result<()> {
        let mut app = setup_test_app().await?;

        app.set_checked(1, true).await?;
        app.set_checked(2, true).await?;
        app.set_mode(Mode::Shopping);

        app.reset_run().await?;

        assert_eq!(app.state().checked_count(), 0);
        assert_eq!(app.mode(), Mode::Catalog);
        assert!(app.history().await?.is_empty());

        Ok(())
    }
}
