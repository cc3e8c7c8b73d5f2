use axum::extract::{Query, State};
use axum::Json;

use crate::error::AppError;
use crate::routes::facilities::OwnerParams;
use crate::state::AppState;
use godown_core::store::{AlertStore, FacilityStore};

/// GET /api/alerts?user_id=<id> — unresolved alerts across the user's
/// facilities.
pub async fn list_alerts(
    State(app): State<AppState>,
    Query(params): Query<OwnerParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let facilities = app.store.find_by_owner(&params.user_id).await?;
    let ids: Vec<String> = facilities.iter().map(|f| f.id.clone()).collect();
    let alerts = app.store.find_unresolved(&ids).await?;

    let list: Vec<serde_json::Value> = alerts
        .iter()
        .map(|a| {
            serde_json::json!({
                "id": a.id,
                "facility_id": a.facility_id,
                "lot_id": a.lot_id,
                "crop": a.crop,
                "severity": a.severity,
                "message": a.message,
                "recommendation": a.recommendation,
                "created_at": a.created_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!(list)))
}
