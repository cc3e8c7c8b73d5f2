use crate::crops;
use crate::error::{GodownError, Result};
use crate::model::{Alert, Facility, Lot, LotPatch, NewEvent, NewFacility, NewLot, StockEvent};
use crate::store::{AlertStore, EventStore, FacilityStore, LotFilter, LotStore};
use crate::types::{LotCondition, LotStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory backend implementing every collaborator seam. Backs the
/// single-node server and the test suites; a deployment can swap in a real
/// database behind the same traits without touching the core.
#[derive(Default)]
pub struct MemoryStore {
    facilities: RwLock<HashMap<String, Facility>>,
    lots: RwLock<HashMap<String, Lot>>,
    alerts: RwLock<Vec<Alert>>,
    events: RwLock<Vec<StockEvent>>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn lot_code(id: &str) -> String {
    let tail: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(6)
        .collect();
    format!("LOT-{}", tail.to_uppercase())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an alert directly; alerts are produced by the threshold
    /// evaluator, which lives behind the seam.
    pub async fn push_alert(&self, alert: Alert) {
        self.alerts.write().await.push(alert);
    }

    pub async fn events(&self) -> Vec<StockEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl FacilityStore for MemoryStore {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Facility>> {
        let facilities = self.facilities.read().await;
        let mut out: Vec<Facility> = facilities
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    async fn find_by_id(&self, id: &str, owner_id: &str) -> Result<Option<Facility>> {
        let facilities = self.facilities.read().await;
        Ok(facilities
            .get(id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn create(&self, fields: NewFacility) -> Result<Facility> {
        if fields.capacity_quintals <= 0.0 {
            return Err(GodownError::InvalidCapacity(fields.capacity_quintals));
        }
        let facility = Facility {
            id: new_id(),
            owner_id: fields.owner_id,
            name: fields.name,
            kind: fields.kind,
            city: fields.city,
            capacity_quintals: fields.capacity_quintals,
            used_capacity_quintals: 0.0,
            active: true,
            created_at: Utc::now(),
        };
        self.facilities
            .write()
            .await
            .insert(facility.id.clone(), facility.clone());
        Ok(facility)
    }

    async fn adjust_used_capacity(&self, id: &str, delta_quintals: f64) -> Result<()> {
        let mut facilities = self.facilities.write().await;
        let facility = facilities
            .get_mut(id)
            .ok_or_else(|| GodownError::FacilityNotFound(id.to_string()))?;
        facility.used_capacity_quintals =
            (facility.used_capacity_quintals + delta_quintals).max(0.0);
        Ok(())
    }
}

#[async_trait]
impl LotStore for MemoryStore {
    async fn find_by_facilities(
        &self,
        facility_ids: &[String],
        filter: &LotFilter,
    ) -> Result<Vec<Lot>> {
        let lots = self.lots.read().await;
        let mut out: Vec<Lot> = lots
            .values()
            .filter(|l| facility_ids.contains(&l.facility_id))
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn create(&self, fields: NewLot) -> Result<Lot> {
        if crops::by_name(&fields.crop).is_none() {
            return Err(GodownError::UnknownCrop(fields.crop));
        }
        let id = new_id();
        let lot = Lot {
            code: lot_code(&id),
            id,
            owner_id: fields.owner_id,
            facility_id: fields.facility_id,
            crop: fields.crop,
            quantity_quintals: fields.quantity_quintals,
            status: LotStatus::Stored,
            condition: LotCondition::Good,
            shelf_life_days: fields.shelf_life_days,
            sell_by: fields.sell_by,
            created_at: Utc::now(),
        };
        self.lots.write().await.insert(lot.id.clone(), lot.clone());
        Ok(lot)
    }

    async fn update(&self, id: &str, patch: LotPatch) -> Result<Lot> {
        let mut lots = self.lots.write().await;
        let lot = lots
            .get_mut(id)
            .ok_or_else(|| GodownError::LotNotFound(id.to_string()))?;
        if let Some(status) = patch.status {
            lot.status = status;
        }
        if let Some(condition) = patch.condition {
            lot.condition = condition;
        }
        Ok(lot.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut lots = self.lots.write().await;
        lots.remove(id)
            .map(|_| ())
            .ok_or_else(|| GodownError::LotNotFound(id.to_string()))
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn find_unresolved(&self, facility_ids: &[String]) -> Result<Vec<Alert>> {
        let alerts = self.alerts.read().await;
        let mut out: Vec<Alert> = alerts
            .iter()
            .filter(|a| !a.resolved && facility_ids.contains(&a.facility_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn count_unresolved(&self, facility_ids: &[String]) -> Result<usize> {
        Ok(self.find_unresolved(facility_ids).await?.len())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append(&self, fields: NewEvent) -> Result<StockEvent> {
        let event = StockEvent {
            id: new_id(),
            owner_id: fields.owner_id,
            facility_id: fields.facility_id,
            lot_id: fields.lot_id,
            kind: fields.kind,
            detail: fields.detail,
            created_at: Utc::now(),
        };
        self.events.write().await.push(event.clone());
        Ok(event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FacilityKind;

    fn new_facility(owner: &str, name: &str) -> NewFacility {
        NewFacility {
            owner_id: owner.into(),
            name: name.into(),
            kind: FacilityKind::Dry,
            city: "Nashik".into(),
            capacity_quintals: 500.0,
        }
    }

    async fn seeded_lot(store: &MemoryStore, facility_id: &str, crop: &str) -> Lot {
        let profile = crops::by_name(crop).unwrap();
        LotStore::create(
            store,
            NewLot {
                owner_id: "u1".into(),
                facility_id: facility_id.into(),
                crop: crop.into(),
                quantity_quintals: 10.0,
                shelf_life_days: profile.shelf_life_days,
                sell_by: crops::sell_by(Utc::now(), profile),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn facility_ownership_is_enforced_on_lookup() {
        let store = MemoryStore::new();
        let f = FacilityStore::create(&store, new_facility("u1", "Central"))
            .await
            .unwrap();

        assert!(store.find_by_id(&f.id, "u1").await.unwrap().is_some());
        assert!(store.find_by_id(&f.id, "u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_nonpositive_capacity() {
        let store = MemoryStore::new();
        let mut fields = new_facility("u1", "Central");
        fields.capacity_quintals = 0.0;
        assert!(matches!(
            FacilityStore::create(&store, fields).await,
            Err(GodownError::InvalidCapacity(_))
        ));
    }

    #[tokio::test]
    async fn used_capacity_clamps_at_zero() {
        let store = MemoryStore::new();
        let f = FacilityStore::create(&store, new_facility("u1", "Central"))
            .await
            .unwrap();
        store.adjust_used_capacity(&f.id, 30.0).await.unwrap();
        store.adjust_used_capacity(&f.id, -50.0).await.unwrap();

        let loaded = store.find_by_id(&f.id, "u1").await.unwrap().unwrap();
        assert_eq!(loaded.used_capacity_quintals, 0.0);
    }

    #[tokio::test]
    async fn lot_create_assigns_code_and_defaults() {
        let store = MemoryStore::new();
        let f = FacilityStore::create(&store, new_facility("u1", "Central"))
            .await
            .unwrap();
        let lot = seeded_lot(&store, &f.id, "Onion").await;

        assert!(lot.code.starts_with("LOT-"));
        assert_eq!(lot.status, LotStatus::Stored);
        assert_eq!(lot.condition, LotCondition::Good);
    }

    #[tokio::test]
    async fn lot_create_rejects_unknown_crop() {
        let store = MemoryStore::new();
        let result = LotStore::create(
            &store,
            NewLot {
                owner_id: "u1".into(),
                facility_id: "f1".into(),
                crop: "Durian".into(),
                quantity_quintals: 10.0,
                shelf_life_days: 10,
                sell_by: Utc::now(),
            },
        )
        .await;
        assert!(matches!(result, Err(GodownError::UnknownCrop(_))));
    }

    #[tokio::test]
    async fn lots_filter_by_crop_and_sort_newest_first() {
        let store = MemoryStore::new();
        let f = FacilityStore::create(&store, new_facility("u1", "Central"))
            .await
            .unwrap();
        seeded_lot(&store, &f.id, "Onion").await;
        seeded_lot(&store, &f.id, "Wheat").await;

        let ids = vec![f.id.clone()];
        let all = store
            .find_by_facilities(&ids, &LotFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let onions = store
            .find_by_facilities(&ids, &LotFilter::for_crop("onion"))
            .await
            .unwrap();
        assert_eq!(onions.len(), 1);
        assert_eq!(onions[0].crop, "Onion");
    }

    #[tokio::test]
    async fn update_patches_only_requested_fields() {
        let store = MemoryStore::new();
        let f = FacilityStore::create(&store, new_facility("u1", "Central"))
            .await
            .unwrap();
        let lot = seeded_lot(&store, &f.id, "Onion").await;

        let updated = store
            .update(
                &lot.id,
                LotPatch {
                    status: Some(LotStatus::Sold),
                    condition: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, LotStatus::Sold);
        assert_eq!(updated.condition, LotCondition::Good);
    }

    #[tokio::test]
    async fn delete_missing_lot_errors() {
        let store = MemoryStore::new();
        assert!(matches!(
            LotStore::delete(&store, "nope").await,
            Err(GodownError::LotNotFound(_))
        ));
    }

    #[tokio::test]
    async fn events_append_in_order() {
        let store = MemoryStore::new();
        for detail in ["first", "second"] {
            store
                .append(NewEvent {
                    owner_id: "u1".into(),
                    facility_id: "f1".into(),
                    lot_id: None,
                    kind: crate::types::EventKind::LotCreated,
                    detail: detail.into(),
                })
                .await
                .unwrap();
        }
        let events = store.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].detail, "first");
        assert_eq!(events[1].detail, "second");
    }
}
