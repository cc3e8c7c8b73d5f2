use crate::extract::TargetChange;
use crate::types::FacilityKind;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// How long a pending action stays confirmable.
pub const DEFAULT_TTL_MINUTES: i64 = 5;

// ---------------------------------------------------------------------------
// PendingAction
// ---------------------------------------------------------------------------

/// One not-yet-applied mutation awaiting explicit confirmation. At most one
/// exists per user at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub user_id: String,
    pub kind: PendingKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PendingKind {
    AddLot {
        facility_id: String,
        facility_name: String,
        crop: String,
        quantity_quintals: f64,
    },
    AddWarehouse {
        name: String,
        kind: FacilityKind,
        capacity_quintals: f64,
        city: String,
    },
    UpdateLot {
        lot_id: String,
        lot_code: String,
        facility_id: String,
        crop: String,
        change: TargetChange,
    },
    DeleteLot {
        lot_id: String,
        lot_code: String,
        facility_id: String,
        crop: String,
        quantity_quintals: f64,
        facility_name: String,
    },
}

impl PendingAction {
    pub fn new(user_id: impl Into<String>, kind: PendingKind) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    /// Test constructor: backdate `created_at` to exercise TTL expiry.
    pub fn with_created_at(
        user_id: impl Into<String>,
        kind: PendingKind,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            created_at,
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.created_at > ttl
    }
}

// ---------------------------------------------------------------------------
// PendingStore
// ---------------------------------------------------------------------------

/// Per-user, single-slot holder for the consent state machine. `take` removes
/// and returns the slot under one lock acquisition, so two concurrent
/// confirmations can never both observe the same action.
pub trait PendingStore: Send + Sync {
    fn contains(&self, user_id: &str) -> bool;
    fn get(&self, user_id: &str) -> Option<PendingAction>;
    fn set(&self, action: PendingAction);
    /// Returns true if a slot was cleared.
    fn clear(&self, user_id: &str) -> bool;
    /// Remove and return the slot, expired or not; the caller decides how to
    /// report expiry.
    fn take(&self, user_id: &str) -> Option<PendingAction>;
}

// ---------------------------------------------------------------------------
// MemoryPendingStore
// ---------------------------------------------------------------------------

/// Process-memory backing map. Not persisted and does not survive a restart.
/// No sweeper thread: `get`/`contains` purge expired entries lazily, which
/// bounds residency by active-user count.
pub struct MemoryPendingStore {
    slots: Mutex<HashMap<String, PendingAction>>,
    ttl: Duration,
}

impl Default for MemoryPendingStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}

impl MemoryPendingStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl PendingStore for MemoryPendingStore {
    fn contains(&self, user_id: &str) -> bool {
        self.get(user_id).is_some()
    }

    fn get(&self, user_id: &str) -> Option<PendingAction> {
        let mut slots = self.slots.lock().expect("pending store lock");
        match slots.get(user_id) {
            Some(action) if action.is_expired(self.ttl) => {
                slots.remove(user_id);
                None
            }
            Some(action) => Some(action.clone()),
            None => None,
        }
    }

    fn set(&self, action: PendingAction) {
        let mut slots = self.slots.lock().expect("pending store lock");
        slots.insert(action.user_id.clone(), action);
    }

    fn clear(&self, user_id: &str) -> bool {
        let mut slots = self.slots.lock().expect("pending store lock");
        slots.remove(user_id).is_some()
    }

    fn take(&self, user_id: &str) -> Option<PendingAction> {
        let mut slots = self.slots.lock().expect("pending store lock");
        slots.remove(user_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
