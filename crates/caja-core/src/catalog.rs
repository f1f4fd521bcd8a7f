//! # Catalog Snapshot
//!
//! In-memory copy of the backend product list.
//!
//! ```text
//! GET /products?limit=N ──► CatalogSnapshot::new(products, now)
//!                                  │
//!          ┌───────────────────────┼─────────────────────────┐
//!          ▼                       ▼                         ▼
//!     get(id) / find_by_code   browse(filter)        categories() / brands()
//!     (cart add, scan)         (product grid)        (filter dropdowns)
//! ```
//!
//! A snapshot is never patched in place. After every commit the terminal
//! fetches a fresh list and swaps the whole snapshot.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Product;

// =============================================================================
// Filter
// =============================================================================

/// Browse criteria. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ProductFilter {
    /// Case-insensitive match against name, code or brand.
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Measure unit (`ml`, `L`, `cc`).
    pub unit: Option<String>,
    pub low_stock_only: bool,
    pub in_stock_only: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.code.to_lowercase().contains(&needle)
                || product
                    .brand
                    .as_deref()
                    .is_some_and(|b| b.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if !matches_exact(self.category.as_deref(), product.category.as_deref()) {
            return false;
        }
        if !matches_exact(self.brand.as_deref(), product.brand.as_deref()) {
            return false;
        }
        if !matches_exact(self.unit.as_deref(), product.unit.as_deref()) {
            return false;
        }

        if self.low_stock_only && !product.is_low_stock() {
            return false;
        }
        if self.in_stock_only && product.stock <= 0 {
            return false;
        }

        true
    }
}

/// `None` or an empty wanted value matches anything.
fn matches_exact(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.filter(|w| !w.is_empty()) {
        None => true,
        Some(wanted) => actual.is_some_and(|a| a.eq_ignore_ascii_case(wanted)),
    }
}

// =============================================================================
// Snapshot
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    products: Vec<Product>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        CatalogSnapshot::empty()
    }
}

impl CatalogSnapshot {
    /// A snapshot that has never been fetched.
    pub fn empty() -> Self {
        CatalogSnapshot {
            products: Vec::new(),
            fetched_at: None,
        }
    }

    pub fn new(products: Vec<Product>, fetched_at: DateTime<Utc>) -> Self {
        CatalogSnapshot {
            products,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Every product, inactive ones included.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Like [`CatalogSnapshot::get`] but fails with `ProductNotFound`.
    pub fn require(&self, id: i64) -> CoreResult<&Product> {
        self.get(id).ok_or(CoreError::ProductNotFound(id))
    }

    /// Exact code lookup, used by the scanner field. Surrounding whitespace is ignored.
    pub fn find_by_code(&self, code: &str) -> Option<&Product> {
        let code = code.trim();
        self.products.iter().find(|p| p.code == code)
    }

    /// Active products matching `filter`, in catalog order.
    pub fn browse(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.active && filter.matches(p))
            .collect()
    }

    /// Distinct categories of active products, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.distinct(|p| p.category.as_deref())
    }

    /// Distinct brands of active products, sorted.
    pub fn brands(&self) -> Vec<String> {
        self.distinct(|p| p.brand.as_deref())
    }

    fn distinct<'a, F>(&'a self, field: F) -> Vec<String>
    where
        F: Fn(&'a Product) -> Option<&'a str>,
    {
        self.products
            .iter()
            .filter(|p| p.active)
            .filter_map(field)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::test_product;

    fn snapshot() -> CatalogSnapshot {
        let mut pisco = test_product(1, 12, 6990);
        pisco.code = "7801234000011".to_string();
        pisco.name = "Pisco Mistral 35° 750ml".to_string();

        let mut beer = test_product(2, 3, 1100);
        beer.name = "Cerveza Kunstmann Torobayo".to_string();
        beer.category = Some("Cervezas".to_string());
        beer.brand = Some("Kunstmann".to_string());
        beer.unit = Some("cc".to_string());

        let mut wine = test_product(3, 0, 4500);
        wine.name = "Vino Carmenere Reserva".to_string();
        wine.category = Some("Vinos".to_string());
        wine.brand = Some("Casillero".to_string());

        let mut hidden = test_product(4, 30, 2000);
        hidden.active = false;
        hidden.category = Some("Descontinuados".to_string());

        CatalogSnapshot::new(vec![pisco, beer, wine, hidden], Utc::now())
    }

    fn ids(products: Vec<&Product>) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_lookup() {
        let catalog = snapshot();
        assert_eq!(catalog.get(2).map(|p| p.stock), Some(3));
        assert!(catalog.get(99).is_none());
        assert_eq!(catalog.require(99), Err(CoreError::ProductNotFound(99)));
        assert_eq!(
            catalog.find_by_code(" 7801234000011 ").map(|p| p.id),
            Some(1)
        );
    }

    #[test]
    fn test_browse_excludes_inactive() {
        let catalog = snapshot();
        assert_eq!(ids(catalog.browse(&ProductFilter::default())), vec![1, 2, 3]);
    }

    #[test]
    fn test_browse_search_name_code_brand() {
        let catalog = snapshot();
        let by = |s: &str| {
            ids(catalog.browse(&ProductFilter {
                search: Some(s.to_string()),
                ..Default::default()
            }))
        };
        assert_eq!(by("torobayo"), vec![2]);
        assert_eq!(by("780123"), vec![1]);
        assert_eq!(by("CASILLERO"), vec![3]);
        assert_eq!(by("   "), vec![1, 2, 3]);
    }

    #[test]
    fn test_browse_structured_filters() {
        let catalog = snapshot();

        let filter = ProductFilter {
            category: Some("vinos".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(catalog.browse(&filter)), vec![3]);

        let filter = ProductFilter {
            unit: Some("cc".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(catalog.browse(&filter)), vec![2]);

        let filter = ProductFilter {
            low_stock_only: true,
            ..Default::default()
        };
        assert_eq!(ids(catalog.browse(&filter)), vec![2, 3]);

        let filter = ProductFilter {
            low_stock_only: true,
            in_stock_only: true,
            ..Default::default()
        };
        assert_eq!(ids(catalog.browse(&filter)), vec![2]);
    }

    #[test]
    fn test_categories_and_brands_sorted_distinct() {
        let catalog = snapshot();
        assert_eq!(catalog.categories(), vec!["Cervezas", "Piscos", "Vinos"]);
        assert_eq!(catalog.brands(), vec!["Casillero", "Kunstmann", "Mistral"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let catalog = CatalogSnapshot::empty();
        assert!(catalog.is_empty());
        assert!(catalog.fetched_at().is_none());
        assert!(catalog.browse(&ProductFilter::default()).is_empty());
    }
}
