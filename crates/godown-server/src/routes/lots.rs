use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;

use crate::error::AppError;
use crate::state::AppState;
use godown_core::store::{FacilityStore, LotFilter, LotStore};

#[derive(serde::Deserialize)]
pub struct LotParams {
    pub user_id: String,
    #[serde(default)]
    pub crop: Option<String>,
}

/// GET /api/lots?user_id=<id>&crop=<name> — list lots across the user's
/// facilities, optionally narrowed by crop.
pub async fn list_lots(
    State(app): State<AppState>,
    Query(params): Query<LotParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let facilities = app.store.find_by_owner(&params.user_id).await?;
    let ids: Vec<String> = facilities.iter().map(|f| f.id.clone()).collect();
    let filter = LotFilter {
        crop: params.crop.clone(),
    };
    let lots = app.store.find_by_facilities(&ids, &filter).await?;

    let now = Utc::now();
    let list: Vec<serde_json::Value> = lots
        .iter()
        .map(|l| {
            serde_json::json!({
                "id": l.id,
                "code": l.code,
                "facility_id": l.facility_id,
                "crop": l.crop,
                "quantity_quintals": l.quantity_quintals,
                "status": l.status,
                "condition": l.condition,
                "shelf_life_days": l.shelf_life_days,
                "sell_by": l.sell_by,
                "days_to_sell_by": l.days_to_sell_by(now),
                "created_at": l.created_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!(list)))
}
