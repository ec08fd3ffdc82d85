//! Command for product recommendations.

use serde::Serialize;
use tracing::info;

use super::AppContext;
use crate::error::Result;
use crate::products::{recommend, routine_cost, Product};

/// Default number of products in a routine.
pub const DEFAULT_ROUTINE_SIZE: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub products: Vec<Product>,
    /// Sum of the listed prices
    pub routine_cost: f64,
}

/// Products for the user's stored preferences.
pub async fn recommend_products(ctx: &AppContext, limit: Option<usize>) -> Result<Recommendations> {
    let prefs = ctx.prefs.app_state().user_prefs;
    let products = recommend(
        &ctx.catalog,
        &prefs,
        limit.unwrap_or(DEFAULT_ROUTINE_SIZE),
    );
    let routine_cost = routine_cost(&products);
    info!(
        "Recommended {} products (routine ${:.2})",
        products.len(),
        routine_cost
    );
    Ok(Recommendations {
        products,
        routine_cost,
    })
}
