use axum::extract::{Query, State};
use axum::Json;

use crate::error::AppError;
use crate::routes::facilities::OwnerParams;
use crate::state::AppState;
use godown_core::store::{AlertStore, FacilityStore, LotFilter, LotStore};

/// GET /api/summary?user_id=<id> — aggregate counts across the account.
pub async fn get_summary(
    State(app): State<AppState>,
    Query(params): Query<OwnerParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let facilities = app.store.find_by_owner(&params.user_id).await?;
    let ids: Vec<String> = facilities.iter().map(|f| f.id.clone()).collect();
    let lots = app.store.find_by_facilities(&ids, &LotFilter::default()).await?;
    let alert_count = app.store.count_unresolved(&ids).await?;

    let total_capacity: f64 = facilities.iter().map(|f| f.capacity_quintals).sum();
    let used_capacity: f64 = facilities.iter().map(|f| f.used_capacity_quintals).sum();
    let degraded = lots.iter().filter(|l| l.condition.is_degraded()).count();

    Ok(Json(serde_json::json!({
        "facility_count": facilities.len(),
        "total_capacity_quintals": total_capacity,
        "used_capacity_quintals": used_capacity,
        "free_capacity_quintals": (total_capacity - used_capacity).max(0.0),
        "lot_count": lots.len(),
        "lots_good": lots.len() - degraded,
        "lots_at_risk_or_spoiled": degraded,
        "unresolved_alerts": alert_count,
    })))
}
