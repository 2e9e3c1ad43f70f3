//! Purchase history - immutable snapshots of finished shopping runs.
//!
//! A snapshot is built from the checked products at finalize time and never
//! mutated afterwards. The history list is most-recent-first; entries are
//! removed only by explicit user action.

use crate::core::catalog::Product;
use crate::core::normalize::round2;
use crate::core::selection::SelectionState;
use serde::{Deserialize, Serialize};

/// One line of a purchase snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    /// Product id at snapshot time
    pub id: i64,
    /// Product display name at snapshot time
    pub name: String,
    /// Units purchased
    pub qty: u32,
    /// Effective unit price at snapshot time, if known
    pub price: Option<f64>,
    /// `round2(price * qty)` when the price was known
    pub subtotal: Option<f64>,
}

/// An immutable record of one finalized shopping run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Creation time, milliseconds since the Unix epoch; doubles as the
    /// history lookup key
    pub ts: i64,
    /// Number of purchased lines
    pub count: usize,
    /// Sum of known subtotals, rounded to cents
    pub total: f64,
    /// The purchased lines, in catalog order
    pub items: Vec<SnapshotItem>,
}

/// Builds a snapshot of the currently checked products.
///
/// Lines follow catalog order. Priceless lines carry a null subtotal and do
/// not contribute to the total.
#[must_use]
pub fn build_snapshot(catalog: &[Product], state: &SelectionState, ts: i64) -> Snapshot {
    let mut items = Vec::new();
    let mut total = 0.0;

    for product in catalog {
        if !state.is_checked(product.id) {
            continue;
        }

        let qty = state.qty_of(product.id);
        let price = state.effective_price(product.id, product);
        let subtotal = price.map(|p| round2(p * f64::from(qty)));

        if let Some(sub) = subtotal {
            total += sub;
        }

        items.push(SnapshotItem {
            id: product.id,
            name: product.name.clone(),
            qty,
            price,
            subtotal,
        });
    }

    Snapshot { ts, count: items.len(), total: round2(total), items }
}

/// Prepends a snapshot: history is kept most-recent-first.
pub fn prepend(history: &mut Vec<Snapshot>, snapshot: Snapshot) {
    history.insert(0, snapshot);
}

/// Looks up a snapshot by exact timestamp.
#[must_use]
pub fn find(history: &[Snapshot], ts: i64) -> Option<&Snapshot> {
    history.iter().find(|h| h.ts == ts)
}

/// Removes the snapshot with the given timestamp, if present.
/// Returns whether anything was removed.
pub fn delete(history: &mut Vec<Snapshot>, ts: i64) -> bool {
    let before = history.len();
    history.retain(|h| h.ts != ts);
    history.len() != before
}
