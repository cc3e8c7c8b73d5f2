use crate::config::GodownConfig;
use crate::crops;
use crate::error::Result;
use crate::extract::{
    extract_city, extract_crop, extract_facility_name, extract_quantity, extract_target_change,
    TargetChange,
};
use crate::model::{Facility, LotPatch, NewEvent, NewFacility, NewLot};
use crate::pending::{PendingAction, PendingKind, PendingStore};
use crate::store::{EventStore, FacilityStore, LotFilter, LotStore};
use crate::types::{EventKind, FacilityKind, Intent};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

/// User-facing result of a consent-gate interaction. Failures are carried in
/// `message`, never as an error: nothing from this component propagates as a
/// fault to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub requires_consent: bool,
    pub message: String,
}

fn refused(message: impl Into<String>) -> ActionOutcome {
    ActionOutcome {
        success: false,
        requires_consent: false,
        message: message.into(),
    }
}

fn consent(message: impl Into<String>) -> ActionOutcome {
    ActionOutcome {
        success: true,
        requires_consent: true,
        message: message.into(),
    }
}

fn done(message: impl Into<String>) -> ActionOutcome {
    ActionOutcome {
        success: true,
        requires_consent: false,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// ConsentOrchestrator
// ---------------------------------------------------------------------------

/// Builds pending actions from mutation intents and resolves them on an
/// explicit confirm or reject. State machine per user:
/// none -> pending -> (executed | rejected | expired) -> none.
pub struct ConsentOrchestrator {
    facilities: Arc<dyn FacilityStore>,
    lots: Arc<dyn LotStore>,
    events: Arc<dyn EventStore>,
    pending: Arc<dyn PendingStore>,
    config: GodownConfig,
}

impl ConsentOrchestrator {
    pub fn new(
        facilities: Arc<dyn FacilityStore>,
        lots: Arc<dyn LotStore>,
        events: Arc<dyn EventStore>,
        pending: Arc<dyn PendingStore>,
        config: GodownConfig,
    ) -> Self {
        Self {
            facilities,
            lots,
            events,
            pending,
            config,
        }
    }

    fn store_failure(&self, err: crate::error::GodownError) -> ActionOutcome {
        tracing::warn!(error = %err, "store operation failed");
        refused("Something went wrong while reading your data. Please try again.")
    }

    // -----------------------------------------------------------------------
    // create
    // -----------------------------------------------------------------------

    /// Build a pending action from a mutation intent. Every failure path
    /// leaves the slot untouched and creates no side effects.
    pub async fn create(&self, intent: Intent, message: &str, user_id: &str) -> ActionOutcome {
        match intent {
            Intent::AddLot => self.prepare_add_lot(message, user_id).await,
            Intent::AddWarehouse => self.prepare_add_warehouse(message, user_id),
            Intent::UpdateLotStatus => self.prepare_update_lot(message, user_id).await,
            Intent::DeleteLot => self.prepare_delete_lot(message, user_id).await,
            other => refused(format!("'{other}' is not a confirmable action.")),
        }
    }

    async fn owned_facilities(
        &self,
        user_id: &str,
    ) -> std::result::Result<Vec<Facility>, ActionOutcome> {
        match self.facilities.find_by_owner(user_id).await {
            Ok(facilities) => Ok(facilities),
            Err(e) => Err(self.store_failure(e)),
        }
    }

    async fn prepare_add_lot(&self, message: &str, user_id: &str) -> ActionOutcome {
        let Some(profile) = extract_crop(message) else {
            return refused(
                "I couldn't tell which crop you mean. Try something like \
                 \"add 200 quintals of onion\".",
            );
        };
        let Some(quantity) = extract_quantity(message) else {
            return refused(format!(
                "How much {}? Include a quantity, e.g. \"200 quintals\" or \"5000 kg\".",
                profile.name
            ));
        };
        let facilities = match self.owned_facilities(user_id).await {
            Ok(f) => f,
            Err(outcome) => return outcome,
        };
        if facilities.is_empty() {
            return refused(
                "You don't have a warehouse yet. Create one first, e.g. \
                 \"add a warehouse called Central in Nashik\".",
            );
        }

        let facility = if let Some(name) = extract_facility_name(message) {
            match facilities.iter().find(|f| f.name.eq_ignore_ascii_case(&name)) {
                Some(f) => f.clone(),
                None => {
                    return refused(format!(
                        "I couldn't find a warehouse called '{}'. Your warehouses: {}.",
                        name,
                        facility_names(&facilities)
                    ))
                }
            }
        } else if facilities.len() == 1 {
            facilities[0].clone()
        } else {
            // Never guess between facilities for a mutation.
            return refused(format!(
                "Which warehouse should this go to? You have: {}. Name one in your message.",
                facility_names(&facilities)
            ));
        };

        self.pending.set(PendingAction::new(
            user_id,
            PendingKind::AddLot {
                facility_id: facility.id.clone(),
                facility_name: facility.name.clone(),
                crop: profile.name.to_string(),
                quantity_quintals: quantity,
            },
        ));
        consent(format!(
            "Add {} quintals of {} to '{}'? Reply 'yes' to confirm or 'no' to cancel.",
            quantity, profile.name, facility.name
        ))
    }

    fn prepare_add_warehouse(&self, message: &str, user_id: &str) -> ActionOutcome {
        let Some(name) = extract_facility_name(message) else {
            return refused(
                "What should the warehouse be called? Try \
                 \"add a warehouse called Central in Nashik\".",
            );
        };
        let lower = message.to_lowercase();
        let kind = if lower.contains("cold") {
            FacilityKind::Cold
        } else if lower.contains("ventilated") {
            FacilityKind::Ventilated
        } else {
            self.config.default_facility_kind
        };
        let capacity = extract_quantity(message).unwrap_or(self.config.default_capacity_quintals);
        let city = extract_city(message).unwrap_or_else(|| "Unknown".to_string());

        self.pending.set(PendingAction::new(
            user_id,
            PendingKind::AddWarehouse {
                name: name.clone(),
                kind,
                capacity_quintals: capacity,
                city: city.clone(),
            },
        ));
        consent(format!(
            "Register {kind} warehouse '{name}' in {city} with a capacity of {capacity} \
             quintals? Reply 'yes' to confirm or 'no' to cancel.",
        ))
    }

    /// First lot across the user's facilities, optionally narrowed by crop.
    async fn first_matching_lot(
        &self,
        message: &str,
        user_id: &str,
    ) -> std::result::Result<(crate::model::Lot, Vec<Facility>), ActionOutcome> {
        let facilities = self.owned_facilities(user_id).await?;
        if facilities.is_empty() {
            return Err(refused(
                "You don't have any warehouses or lots yet. Add a warehouse first.",
            ));
        }
        let ids: Vec<String> = facilities.iter().map(|f| f.id.clone()).collect();
        let crop = extract_crop(message);
        let filter = crop
            .map(|p| LotFilter::for_crop(p.name))
            .unwrap_or_default();
        let lots = match self.lots.find_by_facilities(&ids, &filter).await {
            Ok(lots) => lots,
            Err(e) => return Err(self.store_failure(e)),
        };
        match lots.into_iter().next() {
            Some(lot) => Ok((lot, facilities)),
            None => Err(refused(match crop {
                Some(p) => format!("No {} lot found in your warehouses.", p.name),
                None => "No lots found in your warehouses.".to_string(),
            })),
        }
    }

    async fn prepare_update_lot(&self, message: &str, user_id: &str) -> ActionOutcome {
        let Some(change) = extract_target_change(message) else {
            return refused(
                "What should the lot be marked as? Try 'sold', 'dispatched', or a \
                 condition like 'spoiled'.",
            );
        };
        let (lot, _) = match self.first_matching_lot(message, user_id).await {
            Ok(found) => found,
            Err(outcome) => return outcome,
        };

        self.pending.set(PendingAction::new(
            user_id,
            PendingKind::UpdateLot {
                lot_id: lot.id.clone(),
                lot_code: lot.code.clone(),
                facility_id: lot.facility_id.clone(),
                crop: lot.crop.clone(),
                change,
            },
        ));
        consent(format!(
            "Set {} lot {} to {}? Reply 'yes' to confirm or 'no' to cancel.",
            lot.crop,
            lot.code,
            change.describe()
        ))
    }

    async fn prepare_delete_lot(&self, message: &str, user_id: &str) -> ActionOutcome {
        let (lot, facilities) = match self.first_matching_lot(message, user_id).await {
            Ok(found) => found,
            Err(outcome) => return outcome,
        };
        let facility_name = facilities
            .iter()
            .find(|f| f.id == lot.facility_id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "unknown facility".to_string());

        self.pending.set(PendingAction::new(
            user_id,
            PendingKind::DeleteLot {
                lot_id: lot.id.clone(),
                lot_code: lot.code.clone(),
                facility_id: lot.facility_id.clone(),
                crop: lot.crop.clone(),
                quantity_quintals: lot.quantity_quintals,
                facility_name: facility_name.clone(),
            },
        ));
        consent(format!(
            "This will permanently delete lot {}: {} quintals of {} stored in '{}'. \
             This cannot be undone. Reply 'yes' to confirm or 'no' to keep it.",
            lot.code, lot.quantity_quintals, lot.crop, facility_name
        ))
    }

    // -----------------------------------------------------------------------
    // execute
    // -----------------------------------------------------------------------

    /// Apply the user's pending action. The slot is taken before anything
    /// else so a duplicated confirmation can never double-apply; a downstream
    /// failure does not restore it.
    pub async fn execute(&self, user_id: &str) -> ActionOutcome {
        let Some(action) = self.pending.take(user_id) else {
            return refused("There's no pending action to confirm.");
        };
        if action.is_expired(self.config.pending_ttl()) {
            return refused(format!(
                "That confirmation window has expired ({} minutes). Please send the \
                 command again.",
                self.config.pending_ttl_minutes
            ));
        }

        match self.apply(&action).await {
            Ok(message) => {
                tracing::info!(user = %action.user_id, "pending action executed");
                done(message)
            }
            Err(e) => {
                tracing::warn!(user = %action.user_id, error = %e, "pending action failed");
                refused(
                    "Something went wrong while applying the change. Please send the \
                     command again.",
                )
            }
        }
    }

    async fn apply(&self, action: &PendingAction) -> Result<String> {
        let user_id = action.user_id.as_str();
        match &action.kind {
            PendingKind::AddLot {
                facility_id,
                facility_name,
                crop,
                quantity_quintals,
            } => {
                let profile = crops::by_name(crop)
                    .ok_or_else(|| crate::error::GodownError::UnknownCrop(crop.clone()))?;
                let now = Utc::now();
                let lot = self
                    .lots
                    .create(NewLot {
                        owner_id: user_id.to_string(),
                        facility_id: facility_id.clone(),
                        crop: profile.name.to_string(),
                        quantity_quintals: *quantity_quintals,
                        shelf_life_days: profile.shelf_life_days,
                        sell_by: crops::sell_by(now, profile),
                    })
                    .await?;
                self.facilities
                    .adjust_used_capacity(facility_id, *quantity_quintals)
                    .await?;
                self.events
                    .append(NewEvent {
                        owner_id: user_id.to_string(),
                        facility_id: facility_id.clone(),
                        lot_id: Some(lot.id.clone()),
                        kind: EventKind::LotCreated,
                        detail: format!(
                            "stored {} quintals of {} as {}",
                            quantity_quintals, profile.name, lot.code
                        ),
                    })
                    .await?;
                Ok(format!(
                    "Done — {} quintals of {} stored as {} in '{}'. Recommended sell-by: {}.",
                    quantity_quintals,
                    profile.name,
                    lot.code,
                    facility_name,
                    lot.sell_by.format("%d %b %Y")
                ))
            }
            PendingKind::AddWarehouse {
                name,
                kind,
                capacity_quintals,
                city,
            } => {
                let facility = self
                    .facilities
                    .create(NewFacility {
                        owner_id: user_id.to_string(),
                        name: name.clone(),
                        kind: *kind,
                        city: city.clone(),
                        capacity_quintals: *capacity_quintals,
                    })
                    .await?;
                self.events
                    .append(NewEvent {
                        owner_id: user_id.to_string(),
                        facility_id: facility.id.clone(),
                        lot_id: None,
                        kind: EventKind::FacilityCreated,
                        detail: format!("registered {kind} warehouse '{name}' in {city}"),
                    })
                    .await?;
                Ok(format!(
                    "Warehouse '{}' ({}) registered in {} with a capacity of {} quintals.",
                    facility.name, facility.kind, facility.city, facility.capacity_quintals
                ))
            }
            PendingKind::UpdateLot {
                lot_id,
                lot_code,
                facility_id,
                crop,
                change,
            } => {
                let (patch, event_kind) = match change {
                    TargetChange::Status(status) => (
                        LotPatch {
                            status: Some(*status),
                            condition: None,
                        },
                        EventKind::StatusChanged,
                    ),
                    TargetChange::Condition(condition) => (
                        LotPatch {
                            status: None,
                            condition: Some(*condition),
                        },
                        EventKind::ConditionChanged,
                    ),
                };
                self.lots.update(lot_id, patch).await?;
                self.events
                    .append(NewEvent {
                        owner_id: user_id.to_string(),
                        facility_id: facility_id.clone(),
                        lot_id: Some(lot_id.clone()),
                        kind: event_kind,
                        detail: format!("{lot_code} set to {}", change.describe()),
                    })
                    .await?;
                Ok(format!(
                    "Lot {} ({}) set to {}.",
                    lot_code,
                    crop,
                    change.describe()
                ))
            }
            PendingKind::DeleteLot {
                lot_id,
                lot_code,
                facility_id,
                crop,
                quantity_quintals,
                facility_name,
            } => {
                // Audit first, while the lot id still resolves.
                self.events
                    .append(NewEvent {
                        owner_id: user_id.to_string(),
                        facility_id: facility_id.clone(),
                        lot_id: Some(lot_id.clone()),
                        kind: EventKind::LotDeleted,
                        detail: format!(
                            "deleted {lot_code}: {quantity_quintals} quintals of {crop}"
                        ),
                    })
                    .await?;
                self.facilities
                    .adjust_used_capacity(facility_id, -quantity_quintals)
                    .await?;
                self.lots.delete(lot_id).await?;
                Ok(format!(
                    "Lot {} ({} quintals of {}) deleted from '{}'.",
                    lot_code, quantity_quintals, crop, facility_name
                ))
            }
        }
    }

    // -----------------------------------------------------------------------
    // reject
    // -----------------------------------------------------------------------

    /// Discard the pending action, if any. Always succeeds; the message
    /// distinguishes "cancelled" from "nothing to cancel".
    pub fn reject(&self, user_id: &str) -> ActionOutcome {
        if self.pending.clear(user_id) {
            done("Cancelled — no changes were made.")
        } else {
            done("There was nothing to cancel.")
        }
    }
}

fn facility_names(facilities: &[Facility]) -> String {
    facilities
        .iter()
        .map(|f| format!("'{}'", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
