use axum::extract::{Query, State};
use axum::Json;
use std::str::FromStr;

use crate::error::AppError;
use crate::state::AppState;
use godown_core::model::NewFacility;
use godown_core::store::FacilityStore;
use godown_core::types::FacilityKind;

#[derive(serde::Deserialize)]
pub struct OwnerParams {
    pub user_id: String,
}

/// GET /api/facilities?user_id=<id> — list the user's facilities.
pub async fn list_facilities(
    State(app): State<AppState>,
    Query(params): Query<OwnerParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let facilities = app.store.find_by_owner(&params.user_id).await?;
    let list: Vec<serde_json::Value> = facilities
        .iter()
        .map(|f| {
            serde_json::json!({
                "id": f.id,
                "name": f.name,
                "kind": f.kind,
                "city": f.city,
                "capacity_quintals": f.capacity_quintals,
                "used_capacity_quintals": f.used_capacity_quintals,
                "fill_percent": f.fill_percent(),
                "active": f.active,
                "created_at": f.created_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!(list)))
}

#[derive(serde::Deserialize)]
pub struct CreateFacilityBody {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub capacity_quintals: Option<f64>,
}

/// POST /api/facilities — register a facility directly (no consent gate
/// outside the chat path).
pub async fn create_facility(
    State(app): State<AppState>,
    Json(body): Json<CreateFacilityBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind = match body.kind.as_deref() {
        Some(s) => FacilityKind::from_str(s).map_err(AppError::bad_request)?,
        None => app.config.default_facility_kind,
    };
    let facility = app
        .store
        .create(NewFacility {
            owner_id: body.user_id,
            name: body.name,
            kind,
            city: body.city.unwrap_or_else(|| "Unknown".to_string()),
            capacity_quintals: body
                .capacity_quintals
                .unwrap_or(app.config.default_capacity_quintals),
        })
        .await?;

    Ok(Json(serde_json::json!({
        "id": facility.id,
        "name": facility.name,
        "kind": facility.kind,
        "city": facility.city,
        "capacity_quintals": facility.capacity_quintals,
        "active": facility.active,
    })))
}
