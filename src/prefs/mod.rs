//! Onboarding preferences and the purchase/onboarding gates.

pub mod store;
pub mod types;

pub use store::PreferenceStore;
pub use types::{AppState, BudgetTier, PainPoint, PrefsUpdate, UserPrefs};
