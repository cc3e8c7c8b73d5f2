use crate::crops::CropProfile;
use crate::model::Lot;
use crate::types::{FacilityKind, LotCondition};
use crate::weather::Weather;
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StorageConditions
// ---------------------------------------------------------------------------

/// Estimated conditions inside a facility, derived from ambient weather and
/// the facility type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageConditions {
    pub temp_c: f64,
    pub humidity_pct: f64,
}

// ---------------------------------------------------------------------------
// ConditionEstimator
// ---------------------------------------------------------------------------

pub trait ConditionEstimator: Send + Sync {
    fn derive_conditions(&self, ambient: &Weather, kind: FacilityKind) -> StorageConditions;

    /// Spoilage likelihood, 0..=100, from shelf-life consumed, threshold
    /// breaches, and the lot's recorded condition.
    fn risk_score(
        &self,
        lot: &Lot,
        profile: &CropProfile,
        conditions: &StorageConditions,
    ) -> u8;
}

/// Threshold breaches for a crop under the given conditions, for display
/// alongside the score.
pub fn breaches(profile: &CropProfile, conditions: &StorageConditions) -> Vec<&'static str> {
    let mut out = Vec::new();
    if conditions.temp_c > profile.max_temp_c {
        out.push("temperature");
    }
    if conditions.humidity_pct > profile.max_humidity_pct {
        out.push("humidity");
    }
    out
}

// ---------------------------------------------------------------------------
// DefaultEstimator
// ---------------------------------------------------------------------------

pub struct DefaultEstimator;

impl ConditionEstimator for DefaultEstimator {
    fn derive_conditions(&self, ambient: &Weather, kind: FacilityKind) -> StorageConditions {
        match kind {
            // Refrigeration holds a setpoint regardless of ambient.
            FacilityKind::Cold => StorageConditions {
                temp_c: 4.0,
                humidity_pct: 65.0,
            },
            FacilityKind::Ventilated => StorageConditions {
                temp_c: (ambient.temp_c - 4.0).max(10.0),
                humidity_pct: (ambient.humidity_pct - 10.0).max(30.0),
            },
            FacilityKind::Dry => StorageConditions {
                temp_c: (ambient.temp_c - 2.0).max(10.0),
                humidity_pct: (ambient.humidity_pct - 5.0).max(30.0),
            },
        }
    }

    fn risk_score(
        &self,
        lot: &Lot,
        profile: &CropProfile,
        conditions: &StorageConditions,
    ) -> u8 {
        if lot.condition == LotCondition::Spoiled {
            return 100;
        }

        let mut score = 0.0;

        // Up to 50 points for shelf life consumed.
        let elapsed_days = (Utc::now() - lot.created_at).num_days().max(0) as f64;
        let shelf = f64::from(lot.shelf_life_days.max(1));
        score += (elapsed_days / shelf).min(1.0) * 50.0;

        // Threshold breaches, weighted by how far past the ceiling.
        let temp_over = conditions.temp_c - profile.max_temp_c;
        if temp_over > 0.0 {
            score += 20.0;
            if temp_over > 5.0 {
                score += 10.0;
            }
        }
        let humidity_over = conditions.humidity_pct - profile.max_humidity_pct;
        if humidity_over > 0.0 {
            score += 15.0;
            if humidity_over > 15.0 {
                score += 10.0;
            }
        }

        score += match lot.condition {
            LotCondition::Good => 0.0,
            LotCondition::Watch => 10.0,
            LotCondition::AtRisk => 25.0,
            LotCondition::Spoiled => unreachable!("handled above"),
        };

        score.round().clamp(0.0, 100.0) as u8
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
