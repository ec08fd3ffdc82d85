use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The concern a user picks during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainPoint {
    PersistentBreakouts,
    Scarring,
    Hormonal,
    Blackheads,
    OilySkin,
    Texture,
}

impl PainPoint {
    pub const ALL: [PainPoint; 6] = [
        PainPoint::PersistentBreakouts,
        PainPoint::Scarring,
        PainPoint::Hormonal,
        PainPoint::Blackheads,
        PainPoint::OilySkin,
        PainPoint::Texture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PainPoint::PersistentBreakouts => "persistent_breakouts",
            PainPoint::Scarring => "scarring",
            PainPoint::Hormonal => "hormonal",
            PainPoint::Blackheads => "blackheads",
            PainPoint::OilySkin => "oily_skin",
            PainPoint::Texture => "texture",
        }
    }
}

impl fmt::Display for PainPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PainPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown concern: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetTier {
    #[serde(rename = "under_50")]
    Under50,
    #[serde(rename = "50_150")]
    From50To150,
    #[serde(rename = "150_plus")]
    Over150,
    #[serde(rename = "flexible")]
    Flexible,
}

impl BudgetTier {
    pub const ALL: [BudgetTier; 4] = [
        BudgetTier::Under50,
        BudgetTier::From50To150,
        BudgetTier::Over150,
        BudgetTier::Flexible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Under50 => "under_50",
            BudgetTier::From50To150 => "50_150",
            BudgetTier::Over150 => "150_plus",
            BudgetTier::Flexible => "flexible",
        }
    }

    /// Highest product price allowed for this tier, if any.
    pub fn price_ceiling(&self) -> Option<f64> {
        match self {
            BudgetTier::Under50 => Some(50.0),
            BudgetTier::From50To150 => Some(150.0),
            BudgetTier::Over150 | BudgetTier::Flexible => None,
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("Unknown budget tier: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPrefs {
    pub main_concern: Option<PainPoint>,
    pub budget: Option<BudgetTier>,
}

/// Partial update. Fields that are `Some` overwrite the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrefsUpdate {
    pub main_concern: Option<PainPoint>,
    pub budget: Option<BudgetTier>,
}

impl UserPrefs {
    pub fn merge(&mut self, update: PrefsUpdate) {
        if let Some(concern) = update.main_concern {
            self.main_concern = Some(concern);
        }
        if let Some(budget) = update.budget {
            self.budget = Some(budget);
        }
    }
}

/// Navigation gates plus onboarding answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub has_seen_onboarding: bool,
    pub has_purchased: bool,
    pub user_prefs: UserPrefs,
}
