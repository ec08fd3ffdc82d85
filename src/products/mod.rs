//! Product recommendations driven by onboarding preferences.

pub mod catalog;

pub use catalog::{default_catalog, load_catalog, recommend, routine_cost, Catalog, Product};
