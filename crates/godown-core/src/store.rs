use crate::error::Result;
use crate::model::{Alert, Facility, Lot, LotPatch, NewEvent, NewFacility, NewLot, StockEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------
//
// The conversational core never touches a database directly; it talks to
// these traits. Single-document operations are assumed atomic by the
// implementation behind the seam.

/// Filter applied when listing lots across facilities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotFilter {
    pub crop: Option<String>,
}

impl LotFilter {
    pub fn for_crop(crop: impl Into<String>) -> Self {
        Self {
            crop: Some(crop.into()),
        }
    }

    pub fn matches(&self, lot: &Lot) -> bool {
        match &self.crop {
            Some(crop) => lot.crop.eq_ignore_ascii_case(crop),
            None => true,
        }
    }
}

#[async_trait]
pub trait FacilityStore: Send + Sync {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Facility>>;
    async fn find_by_id(&self, id: &str, owner_id: &str) -> Result<Option<Facility>>;
    async fn create(&self, fields: NewFacility) -> Result<Facility>;
    /// Adjust used capacity by a signed delta in quintals, clamped at zero.
    async fn adjust_used_capacity(&self, id: &str, delta_quintals: f64) -> Result<()>;
}

#[async_trait]
pub trait LotStore: Send + Sync {
    async fn find_by_facilities(&self, facility_ids: &[String], filter: &LotFilter)
        -> Result<Vec<Lot>>;
    async fn create(&self, fields: NewLot) -> Result<Lot>;
    async fn update(&self, id: &str, patch: LotPatch) -> Result<Lot>;
    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn find_unresolved(&self, facility_ids: &[String]) -> Result<Vec<Alert>>;
    async fn count_unresolved(&self, facility_ids: &[String]) -> Result<usize>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append(&self, fields: NewEvent) -> Result<StockEvent>;
}
