//! View projection - display-ready aggregates and per-mode item lists.
//!
//! Everything here is a pure derivation from the catalog and the selection
//! state; nothing in this module mutates either.

use crate::core::catalog::Product;
use crate::core::normalize::normalize_name;
use crate::core::selection::SelectionState;
use serde::Serialize;

/// The two top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Mode {
    /// Browsing the full catalog
    #[default]
    Catalog,
    /// Working through the active run in the store
    Shopping,
}

/// Display aggregates for the active run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// Number of checked products
    pub marked: usize,
    /// Sum of requested units over checked products
    pub units: u64,
    /// Monetary total over checked products with a known effective price.
    /// Unrounded; round at the presentation boundary.
    pub total: f64,
}

/// One renderable row: a product joined with its run state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow<'a> {
    /// The underlying catalog product
    pub product: &'a Product,
    /// Whether it is part of the active run
    pub checked: bool,
    /// Requested units (1 when not checked)
    pub qty: u32,
    /// Effective price (override-aware)
    pub price: Option<f64>,
    /// `price * qty` when the price is known; unrounded
    pub subtotal: Option<f64>,
    /// Purchased-in-cart flag
    pub done: bool,
}

/// The shopping-mode list, partitioned by purchase status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingView<'a> {
    /// Checked products not yet in the cart
    pub pending: Vec<ViewRow<'a>>,
    /// Checked products already in the cart; empty when hidden
    pub purchased: Vec<ViewRow<'a>>,
}

/// Derives the run aggregates from the full catalog.
///
/// Only checked products contribute. A product without an effective price
/// still counts toward `marked` and `units` but never toward `total`.
#[must_use]
pub fn compute_totals(catalog: &[Product], state: &SelectionState) -> Totals {
    let mut marked = 0;
    let mut units: u64 = 0;
    let mut total = 0.0;

    for product in catalog {
        if !state.is_checked(product.id) {
            continue;
        }
        marked += 1;

        let qty = state.qty_of(product.id);
        units += u64::from(qty);

        if let Some(price) = state.effective_price(product.id, product) {
            total += price * f64::from(qty);
        }
    }

    Totals { marked, units, total }
}

fn row<'a>(product: &'a Product, state: &SelectionState) -> ViewRow<'a> {
    let checked = state.is_checked(product.id);
    let qty = state.qty_of(product.id);
    let price = state.effective_price(product.id, product);

    ViewRow {
        product,
        checked,
        qty,
        price,
        subtotal: price.map(|p| p * f64::from(qty)),
        done: state.is_done(product.id),
    }
}

/// Catalog-mode list: every product, optionally filtered by a normalized
/// substring match against the name.
#[must_use]
pub fn catalog_view<'a>(
    catalog: &'a [Product],
    state: &SelectionState,
    filter: &str,
) -> Vec<ViewRow<'a>> {
    let query = normalize_name(filter);

    catalog
        .iter()
        .filter(|p| query.is_empty() || normalize_name(&p.name).contains(&query))
        .map(|p| row(p, state))
        .collect()
}

/// Shopping-mode list: checked products only, split into pending and
/// purchased. Text filtering does not apply in this mode - the shopping view
/// is meant to be exhaustive. `hide_purchased` drops the purchased group
/// from the result without touching any state.
#[must_use]
pub fn shopping_view<'a>(
    catalog: &'a [Product],
    state: &SelectionState,
    hide_purchased: bool,
) -> ShoppingView<'a> {
    let mut pending = Vec::new();
    let mut purchased = Vec::new();

    for product in catalog {
        if !state.is_checked(product.id) {
            continue;
        }
        let r = row(product, state);
        if r.done {
            if !hide_purchased {
                purchased.push(r);
            }
        } else {
            pending.push(r);
        }
    }

    ShoppingView { pending, purchased }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, clippy::unwrap_used)]
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product { id: 1, name: "Leche".to_owned(), price: Some(1.10) },
            Product { id: 2, name: "Pan".to_owned(), price: Some(0.95) },
            Product { id: 3, name: "Queso curado".to_owned(), price: None },
        ]
    }

    #[test]
    fn test_totals_for_single_checked_product() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_checked(1, true);
        state.set_qty(1, 2);

        let totals = compute_totals(&catalog, &state);

        assert_eq!(totals.marked, 1);
        assert_eq!(totals.units, 2);
        // Accumulation is unrounded; round only when comparing for display
        assert_eq!(crate::core::normalize::round2(totals.total), 2.20);
    }

    #[test]
    fn test_totals_ignore_unchecked_products() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_qty(2, 5); // qty without checked contributes nothing

        let totals = compute_totals(&catalog, &state);

        assert_eq!(totals.marked, 0);
        assert_eq!(totals.units, 0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn test_null_override_counts_units_but_not_total() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_checked(1, true);
        state.set_qty(1, 3);
        state.set_price_override(1, None);

        let totals = compute_totals(&catalog, &state);

        assert_eq!(totals.marked, 1);
        assert_eq!(totals.units, 3);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn test_totals_use_override_price() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_checked(2, true);
        state.set_qty(2, 2);
        state.set_price_override(2, Some(1.00));

        let totals = compute_totals(&catalog, &state);
        assert_eq!(totals.total, 2.00);
    }

    #[test]
    fn test_catalog_view_shows_everything_unfiltered() {
        let catalog = catalog();
        let state = SelectionState::default();

        let rows = catalog_view(&catalog, &state, "");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_catalog_view_filters_by_normalized_substring() {
        let catalog = catalog();
        let state = SelectionState::default();

        let rows = catalog_view(&catalog, &state, "  QUESO ");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product.id, 3);

        let rows = catalog_view(&catalog, &state, "zz");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_shopping_view_partitions_by_done() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_checked(1, true);
        state.set_checked(2, true);
        state.set_done(2, true);

        let view = shopping_view(&catalog, &state, false);

        assert_eq!(view.pending.len(), 1);
        assert_eq!(view.pending[0].product.id, 1);
        assert_eq!(view.purchased.len(), 1);
        assert_eq!(view.purchased[0].product.id, 2);
    }

    #[test]
    fn test_shopping_view_hide_purchased_drops_group() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_checked(1, true);
        state.set_done(1, true);

        let view = shopping_view(&catalog, &state, true);

        assert!(view.pending.is_empty());
        assert!(view.purchased.is_empty());
        // Underlying state is untouched
        assert!(state.is_done(1));
    }

    #[test]
    fn test_shopping_view_excludes_unchecked() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_checked(3, true);

        let view = shopping_view(&catalog, &state, false);

        assert_eq!(view.pending.len(), 1);
        assert_eq!(view.pending[0].product.id, 3);
        assert_eq!(view.pending[0].price, None);
        assert_eq!(view.pending[0].subtotal, None);
    }
}
