use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ConfirmAction,
    RejectAction,
    AddLot,
    AddWarehouse,
    UpdateLotStatus,
    DeleteLot,
    ViewLots,
    ViewWarehouses,
    ViewAlerts,
    ViewSummary,
    ViewConditions,
    General,
}

impl Intent {
    pub fn all() -> &'static [Intent] {
        &[
            Intent::ConfirmAction,
            Intent::RejectAction,
            Intent::AddLot,
            Intent::AddWarehouse,
            Intent::UpdateLotStatus,
            Intent::DeleteLot,
            Intent::ViewLots,
            Intent::ViewWarehouses,
            Intent::ViewAlerts,
            Intent::ViewSummary,
            Intent::ViewConditions,
            Intent::General,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::ConfirmAction => "confirm_action",
            Intent::RejectAction => "reject_action",
            Intent::AddLot => "add_lot",
            Intent::AddWarehouse => "add_warehouse",
            Intent::UpdateLotStatus => "update_lot_status",
            Intent::DeleteLot => "delete_lot",
            Intent::ViewLots => "view_lots",
            Intent::ViewWarehouses => "view_warehouses",
            Intent::ViewAlerts => "view_alerts",
            Intent::ViewSummary => "view_summary",
            Intent::ViewConditions => "view_conditions",
            Intent::General => "general",
        }
    }

    /// Mutation intents are consent-gated: they never execute without an
    /// explicit confirming message.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Intent::AddLot | Intent::AddWarehouse | Intent::UpdateLotStatus | Intent::DeleteLot
        )
    }

    pub fn is_view(self) -> bool {
        matches!(
            self,
            Intent::ViewLots
                | Intent::ViewWarehouses
                | Intent::ViewAlerts
                | Intent::ViewSummary
                | Intent::ViewConditions
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Intent::all()
            .iter()
            .find(|i| i.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown intent: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// LotStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Stored,
    Sold,
    Dispatched,
    PartiallyDispatched,
}

impl LotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LotStatus::Stored => "stored",
            LotStatus::Sold => "sold",
            LotStatus::Dispatched => "dispatched",
            LotStatus::PartiallyDispatched => "partially_dispatched",
        }
    }

    /// A lot still occupying shelf space and worth monitoring.
    pub fn is_active(self) -> bool {
        matches!(self, LotStatus::Stored | LotStatus::PartiallyDispatched)
    }
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LotCondition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotCondition {
    Good,
    Watch,
    AtRisk,
    Spoiled,
}

impl LotCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            LotCondition::Good => "good",
            LotCondition::Watch => "watch",
            LotCondition::AtRisk => "at_risk",
            LotCondition::Spoiled => "spoiled",
        }
    }

    pub fn is_degraded(self) -> bool {
        matches!(self, LotCondition::AtRisk | LotCondition::Spoiled)
    }
}

impl fmt::Display for LotCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FacilityKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    #[default]
    Dry,
    Cold,
    Ventilated,
}

impl FacilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FacilityKind::Dry => "dry",
            FacilityKind::Cold => "cold",
            FacilityKind::Ventilated => "ventilated",
        }
    }
}

impl fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FacilityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dry" => Ok(FacilityKind::Dry),
            "cold" => Ok(FacilityKind::Cold),
            "ventilated" => Ok(FacilityKind::Ventilated),
            _ => Err(format!("unknown facility kind: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// AlertSeverity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LotCreated,
    StatusChanged,
    ConditionChanged,
    LotDeleted,
    FacilityCreated,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::LotCreated => "lot_created",
            EventKind::StatusChanged => "status_changed",
            EventKind::ConditionChanged => "condition_changed",
            EventKind::LotDeleted => "lot_deleted",
            EventKind::FacilityCreated => "facility_created",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn intent_roundtrip() {
        for intent in Intent::all() {
            let parsed = Intent::from_str(intent.as_str()).unwrap();
            assert_eq!(*intent, parsed);
        }
    }

    #[test]
    fn mutation_and_view_sets_are_disjoint() {
        for intent in Intent::all() {
            assert!(
                !(intent.is_mutation() && intent.is_view()),
                "{intent} is both mutation and view"
            );
        }
    }

    #[test]
    fn mutation_set_matches_consent_gated_intents() {
        let mutations: Vec<_> = Intent::all().iter().filter(|i| i.is_mutation()).collect();
        assert_eq!(mutations.len(), 4);
        assert!(Intent::AddLot.is_mutation());
        assert!(Intent::DeleteLot.is_mutation());
        assert!(!Intent::ViewLots.is_mutation());
        assert!(!Intent::ConfirmAction.is_mutation());
    }

    #[test]
    fn lot_status_active() {
        assert!(LotStatus::Stored.is_active());
        assert!(LotStatus::PartiallyDispatched.is_active());
        assert!(!LotStatus::Sold.is_active());
        assert!(!LotStatus::Dispatched.is_active());
    }

    #[test]
    fn severity_ordering() {
        assert!(AlertSeverity::Critical > AlertSeverity::Warning);
        assert!(AlertSeverity::Warning > AlertSeverity::Info);
    }

    #[test]
    fn facility_kind_default_is_dry() {
        assert_eq!(FacilityKind::default(), FacilityKind::Dry);
    }
}
