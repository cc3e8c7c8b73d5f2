use crate::types::{AlertSeverity, EventKind, FacilityKind, LotCondition, LotStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Facility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub kind: FacilityKind,
    pub city: String,
    pub capacity_quintals: f64,
    pub used_capacity_quintals: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Facility {
    pub fn free_capacity_quintals(&self) -> f64 {
        (self.capacity_quintals - self.used_capacity_quintals).max(0.0)
    }

    /// Percentage of capacity in use, rounded to the nearest whole percent.
    pub fn fill_percent(&self) -> u32 {
        if self.capacity_quintals <= 0.0 {
            return 0;
        }
        let pct = self.used_capacity_quintals / self.capacity_quintals * 100.0;
        pct.round().clamp(0.0, 100.0) as u32
    }

    pub fn is_near_capacity(&self) -> bool {
        self.fill_percent() >= 90
    }
}

/// Fields supplied when registering a new facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFacility {
    pub owner_id: String,
    pub name: String,
    pub kind: FacilityKind,
    pub city: String,
    pub capacity_quintals: f64,
}

// ---------------------------------------------------------------------------
// Lot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub id: String,
    /// Short human-readable identifier, e.g. `LOT-4F2A9C`.
    pub code: String,
    pub owner_id: String,
    pub facility_id: String,
    pub crop: String,
    pub quantity_quintals: f64,
    pub status: LotStatus,
    pub condition: LotCondition,
    pub shelf_life_days: u32,
    pub sell_by: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Lot {
    /// Days remaining until the recommended sell-by date, floored at zero.
    pub fn days_to_sell_by(&self, now: DateTime<Utc>) -> i64 {
        (self.sell_by - now).num_days().max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLot {
    pub owner_id: String,
    pub facility_id: String,
    pub crop: String,
    pub quantity_quintals: f64,
    pub shelf_life_days: u32,
    pub sell_by: DateTime<Utc>,
}

/// Partial update applied to a lot. `None` fields are left untouched; a
/// status change and a condition change target different fields and are
/// never combined by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotPatch {
    pub status: Option<LotStatus>,
    pub condition: Option<LotCondition>,
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub facility_id: String,
    pub lot_id: Option<String>,
    pub crop: Option<String>,
    pub severity: AlertSeverity,
    pub message: String,
    pub recommendation: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// StockEvent
// ---------------------------------------------------------------------------

/// Audit trail entry appended on every applied mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEvent {
    pub id: String,
    pub owner_id: String,
    pub facility_id: String,
    pub lot_id: Option<String>,
    pub kind: EventKind,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub owner_id: String,
    pub facility_id: String,
    pub lot_id: Option<String>,
    pub kind: EventKind,
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn facility(capacity: f64, used: f64) -> Facility {
        Facility {
            id: "f1".into(),
            owner_id: "u1".into(),
            name: "Central Godown".into(),
            kind: FacilityKind::Dry,
            city: "Nashik".into(),
            capacity_quintals: capacity,
            used_capacity_quintals: used,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fill_percent_rounds() {
        assert_eq!(facility(300.0, 100.0).fill_percent(), 33);
        assert_eq!(facility(200.0, 199.0).fill_percent(), 100);
        assert_eq!(facility(0.0, 10.0).fill_percent(), 0);
    }

    #[test]
    fn near_capacity_at_ninety_percent() {
        assert!(facility(100.0, 90.0).is_near_capacity());
        assert!(!facility(100.0, 89.0).is_near_capacity());
    }

    #[test]
    fn days_to_sell_by_floors_at_zero() {
        let now = Utc::now();
        let lot = Lot {
            id: "l1".into(),
            code: "LOT-AAAA01".into(),
            owner_id: "u1".into(),
            facility_id: "f1".into(),
            crop: "Onion".into(),
            quantity_quintals: 10.0,
            status: LotStatus::Stored,
            condition: LotCondition::Good,
            shelf_life_days: 30,
            sell_by: now - Duration::days(3),
            created_at: now - Duration::days(30),
        };
        assert_eq!(lot.days_to_sell_by(now), 0);
    }
}
