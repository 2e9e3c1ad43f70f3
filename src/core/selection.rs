//! Selection state - the authority for "what is in the current shopping run".
//!
//! Four sparse maps keyed by product id. Absent key means "not selected";
//! unchecking removes keys rather than storing false/zero entries. The
//! `price_override` map distinguishes a key holding an explicit `None`
//! ("treat as priceless") from an absent key ("use the catalog price").
//!
//! Invariants held after every operation:
//! - `done` is set only for checked products
//! - `qty` exists only for checked products, and is always >= 1

use crate::core::catalog::Product;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-product state of the active shopping run.
///
/// Every field defaults independently, so a persisted blob missing a map
/// (an older version, say) still loads the maps it does carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Products included in the active run
    #[serde(default)]
    pub checked: BTreeMap<i64, bool>,
    /// Requested units per checked product, always >= 1
    #[serde(default)]
    pub qty: BTreeMap<i64, u32>,
    /// Per-run price overrides; an entry holding `None` means "no price",
    /// which is distinct from no entry ("use the catalog price")
    #[serde(default, rename = "priceOverride")]
    pub price_override: BTreeMap<i64, Option<f64>>,
    /// Purchased-in-cart flags, meaningful only while checked
    #[serde(default)]
    pub done: BTreeMap<i64, bool>,
}

impl SelectionState {
    /// Whether the product is part of the active run.
    #[must_use]
    pub fn is_checked(&self, id: i64) -> bool {
        self.checked.get(&id).copied().unwrap_or(false)
    }

    /// Requested units for the product, defaulting to 1.
    #[must_use]
    pub fn qty_of(&self, id: i64) -> u32 {
        self.qty.get(&id).copied().filter(|&q| q >= 1).unwrap_or(1)
    }

    /// Whether the product has been marked purchased in the cart.
    #[must_use]
    pub fn is_done(&self, id: i64) -> bool {
        self.done.get(&id).copied().unwrap_or(false)
    }

    /// Adds or removes the product from the run.
    ///
    /// Checking initializes the quantity to 1 when none is recorded.
    /// Unchecking removes the quantity and the purchased flag - neither
    /// outlives the selection.
    pub fn set_checked(&mut self, id: i64, value: bool) {
        if value {
            self.checked.insert(id, true);
            self.qty.entry(id).or_insert(1);
        } else {
            self.checked.remove(&id);
            self.qty.remove(&id);
            self.done.remove(&id);
        }
    }

    /// Stores the requested quantity, clamped to at least 1.
    /// Does not implicitly check the product.
    pub fn set_qty(&mut self, id: i64, qty: u32) {
        self.qty.insert(id, qty.max(1));
    }

    /// Sets or clears the purchased flag. Ignored while the product is not
    /// checked, so `done` can never exist without `checked`.
    pub fn set_done(&mut self, id: i64, value: bool) {
        if value {
            if self.is_checked(id) {
                self.done.insert(id, true);
            }
        } else {
            self.done.remove(&id);
        }
    }

    /// Stores an explicit price override for this run.
    ///
    /// `Some(price)` supersedes the catalog price; `None` records "this
    /// product has no price" and also supersedes the catalog price. There is
    /// no operation that removes the key again - only a fresh run starts
    /// without it.
    pub fn set_price_override(&mut self, id: i64, price: Option<f64>) {
        self.price_override.insert(id, price);
    }

    /// The price used for totals: the override when its key exists (even
    /// when it holds `None`), else the catalog price.
    #[must_use]
    pub fn effective_price(&self, id: i64, product: &Product) -> Option<f64> {
        match self.price_override.get(&id) {
            Some(over) => *over,
            None => product.price,
        }
    }

    /// Ends the run: clears checked, quantities, and purchased flags.
    /// Price overrides survive, as in the original apply-to-next-run behavior.
    pub fn clear_run(&mut self) {
        self.checked.clear();
        self.qty.clear();
        self.done.clear();
    }

    /// True when nothing at all is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
            && self.qty.is_empty()
            && self.price_override.is_empty()
            && self.done.is_empty()
    }

    /// Ids currently checked, ascending.
    pub fn checked_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.checked
            .iter()
            .filter(|&(_, &v)| v)
            .map(|(&id, _)| id)
    }

    /// Number of checked products.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.checked_ids().count()
    }

    /// Re-asserts internal invariants after loading a persisted blob:
    /// every checked product gets a quantity, orphaned quantities and
    /// purchased flags are dropped.
    pub fn repair(&mut self) {
        self.checked.retain(|_, v| *v);

        let checked: Vec<i64> = self.checked.keys().copied().collect();
        for id in &checked {
            self.qty.entry(*id).or_insert(1);
        }

        self.qty.retain(|id, q| self.checked.contains_key(id) && *q >= 1);
        self.done.retain(|id, v| *v && self.checked.contains_key(id));
    }
}
