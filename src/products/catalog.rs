//! Product catalog loading and budget-aware recommendation.
//!
//! - `default_catalog()` - catalog embedded in the binary
//! - `load_catalog(path)` - custom catalog from a TOML file

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::prefs::{PainPoint, UserPrefs};

/// Loaded from `config/products.toml` at compile time.
const DEFAULT_CATALOG: &str = include_str!("../../config/products.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    /// USD
    pub price: f64,
    pub reason: String,
    #[serde(default)]
    pub concerns: Vec<PainPoint>,
    pub url: String,
}

impl Product {
    pub fn addresses(&self, concern: PainPoint) -> bool {
        self.concerns.contains(&concern)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read product catalog {:?}", path))?;
    let catalog: Catalog = toml::from_str(&content)
        .with_context(|| format!("Invalid product catalog {:?}", path))?;
    Ok(catalog)
}

pub fn default_catalog() -> Result<Catalog> {
    toml::from_str(DEFAULT_CATALOG).context("Embedded product catalog is invalid")
}

/// Products for the user's preferences.
///
/// Products addressing the main concern come first, then the rest, each
/// group in catalog order. Anything above the budget ceiling is dropped.
pub fn recommend(catalog: &Catalog, prefs: &UserPrefs, limit: usize) -> Vec<Product> {
    let ceiling = prefs.budget.and_then(|b| b.price_ceiling());
    let affordable = |p: &&Product| ceiling.map_or(true, |max| p.price <= max);
    let matches = |p: &Product| prefs.main_concern.is_some_and(|c| p.addresses(c));

    let (matching, rest): (Vec<&Product>, Vec<&Product>) = catalog
        .products
        .iter()
        .filter(affordable)
        .partition(|p| matches(*p));

    matching
        .into_iter()
        .chain(rest)
        .take(limit)
        .cloned()
        .collect()
}

/// Total price of a routine.
pub fn routine_cost(products: &[Product]) -> f64 {
    products.iter().map(|p| p.price).sum()
}
