//! Catalog merging - the static base catalog plus user-created products.
//!
//! The base catalog comes from a static JSON source read once at startup.
//! User-created ("local") products are persisted separately and merged in by
//! normalized-name de-duplication. Ids are never reassigned once issued.

use crate::core::normalize::{normalize_name, round2, to_price};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One catalog product. `price` is `None` for products without a known price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier within the merged catalog
    pub id: i64,
    /// Display name, free text
    pub name: String,
    /// Catalog price in currency units, if known
    pub price: Option<f64>,
}

/// Parses the static catalog source.
///
/// A document that is not valid JSON is fatal ([`Error::CatalogLoad`]). A
/// valid document that is not an array yields an empty catalog. Entries that
/// are not objects or lack a `name` are silently dropped; a missing `id`
/// defaults to the positional index plus one; `price` accepts a number or a
/// numeric string and is normalized like user input.
pub fn parse_base_catalog(json: &str) -> Result<Vec<Product>> {
    let data: Value = serde_json::from_str(json).map_err(|e| Error::CatalogLoad {
        message: format!("catalog source is not valid JSON: {e}"),
    })?;

    let Value::Array(entries) = data else {
        return Ok(Vec::new());
    };

    let mut base = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let Value::Object(obj) = entry else { continue };

        let Some(name) = obj.get("name").and_then(Value::as_str) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        #[allow(clippy::cast_possible_wrap)]
        let id = obj
            .get("id")
            .and_then(Value::as_i64)
            .unwrap_or(i as i64 + 1);

        let price = obj.get("price").and_then(price_from_value);

        base.push(Product { id, name: name.to_owned(), price });
    }

    Ok(base)
}

fn price_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => {
            let n = n.as_f64()?;
            if !n.is_finite() || n < 0.0 {
                return None;
            }
            Some(round2(n))
        }
        Value::String(s) => to_price(s),
        _ => None,
    }
}

/// Merges the base catalog with local products into one sorted list.
///
/// Base entries are kept verbatim; a local entry is appended only when no
/// base entry shares its normalized name. The result is sorted by normalized
/// name ascending - order matters only for display stability.
#[must_use]
pub fn merge(base: &[Product], local: &[Product]) -> Vec<Product> {
    let mut merged: Vec<Product> = base.to_vec();

    for lp in local {
        let key = normalize_name(&lp.name);
        if !merged.iter().any(|p| normalize_name(&p.name) == key) {
            merged.push(lp.clone());
        }
    }

    sort_by_name(&mut merged);
    merged
}

/// Sorts a product list by normalized name ascending.
pub fn sort_by_name(products: &mut [Product]) {
    products.sort_by(|a, b| normalize_name(&a.name).cmp(&normalize_name(&b.name)));
}

/// Allocates the next product id: one past the highest id seen in either
/// the merged catalog or the local-products store.
#[must_use]
pub fn next_id(catalog: &[Product], local: &[Product]) -> i64 {
    catalog
        .iter()
        .chain(local)
        .map(|p| p.id)
        .max()
        .unwrap_or(0)
        + 1
}

/// Finds a product by normalized-name equality.
#[must_use]
pub fn find_by_name<'a>(catalog: &'a [Product], name: &str) -> Option<&'a Product> {
    let key = normalize_name(name);
    catalog.iter().find(|p| normalize_name(&p.name) == key)
}
