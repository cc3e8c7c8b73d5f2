use crate::conditions::{breaches, ConditionEstimator};
use crate::config::GodownConfig;
use crate::crops;
use crate::error::Result;
use crate::model::{Facility, Lot};
use crate::store::{AlertStore, FacilityStore, LotFilter, LotStore};
use crate::types::Intent;
use crate::weather::WeatherProvider;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ContextBuilder
// ---------------------------------------------------------------------------

/// Formats current facility/lot/alert data as a bounded text block for the
/// view intents. Mutation and consent intents never reach this component.
pub struct ContextBuilder {
    facilities: Arc<dyn FacilityStore>,
    lots: Arc<dyn LotStore>,
    alerts: Arc<dyn AlertStore>,
    weather: Arc<dyn WeatherProvider>,
    estimator: Arc<dyn ConditionEstimator>,
    config: GodownConfig,
}

const NO_FACILITIES_HINT: &str =
    "You don't have any warehouses yet. Add one to start tracking your stock, e.g. \
     \"add a warehouse called Central in Nashik\".";

impl ContextBuilder {
    pub fn new(
        facilities: Arc<dyn FacilityStore>,
        lots: Arc<dyn LotStore>,
        alerts: Arc<dyn AlertStore>,
        weather: Arc<dyn WeatherProvider>,
        estimator: Arc<dyn ConditionEstimator>,
        config: GodownConfig,
    ) -> Self {
        Self {
            facilities,
            lots,
            alerts,
            weather,
            estimator,
            config,
        }
    }

    /// `Ok(None)` for any intent outside the view set.
    pub async fn build(&self, intent: Intent, user_id: &str) -> Result<Option<String>> {
        let context = match intent {
            Intent::ViewLots => self.lots_context(user_id).await?,
            Intent::ViewWarehouses => self.warehouses_context(user_id).await?,
            Intent::ViewAlerts => self.alerts_context(user_id).await?,
            Intent::ViewSummary => self.summary_context(user_id).await?,
            Intent::ViewConditions => self.conditions_context(user_id).await?,
            _ => return Ok(None),
        };
        Ok(Some(context))
    }

    async fn owned(&self, user_id: &str) -> Result<(Vec<Facility>, Vec<String>)> {
        let facilities = self.facilities.find_by_owner(user_id).await?;
        let ids = facilities.iter().map(|f| f.id.clone()).collect();
        Ok((facilities, ids))
    }

    // -----------------------------------------------------------------------
    // Formatters
    // -----------------------------------------------------------------------

    async fn lots_context(&self, user_id: &str) -> Result<String> {
        let (facilities, ids) = self.owned(user_id).await?;
        if facilities.is_empty() {
            return Ok(NO_FACILITIES_HINT.to_string());
        }
        let mut lots = self.lots.find_by_facilities(&ids, &LotFilter::default()).await?;
        if lots.is_empty() {
            return Ok(
                "No lots stored yet. Say \"add 200 quintals of onion\" to record one."
                    .to_string(),
            );
        }
        lots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        lots.truncate(self.config.max_context_lots);

        let names = facility_names_by_id(&facilities);
        let now = Utc::now();
        let mut out = vec!["Your lots (most recent first):".to_string()];
        for lot in &lots {
            out.push(format!(
                "- {} ({}): {} qtl at '{}' — condition {}, {} day(s) to sell-by, status {}",
                lot.crop,
                lot.code,
                lot.quantity_quintals,
                names.get(&lot.facility_id).map_or("unknown", |n| n),
                lot.condition,
                lot.days_to_sell_by(now),
                lot.status
            ));
        }
        Ok(out.join("\n"))
    }

    async fn warehouses_context(&self, user_id: &str) -> Result<String> {
        let (facilities, _) = self.owned(user_id).await?;
        if facilities.is_empty() {
            return Ok(NO_FACILITIES_HINT.to_string());
        }
        let mut out = vec!["Your warehouses:".to_string()];
        for f in &facilities {
            out.push(format!(
                "- {} ({}) in {} — {}/{} qtl used ({}%), {}",
                f.name,
                f.kind,
                f.city,
                f.used_capacity_quintals,
                f.capacity_quintals,
                f.fill_percent(),
                if f.active { "active" } else { "inactive" }
            ));
        }
        Ok(out.join("\n"))
    }

    async fn alerts_context(&self, user_id: &str) -> Result<String> {
        let (facilities, ids) = self.owned(user_id).await?;
        if facilities.is_empty() {
            return Ok(NO_FACILITIES_HINT.to_string());
        }
        let mut alerts = self.alerts.find_unresolved(&ids).await?;
        if alerts.is_empty() {
            return Ok("No active alerts. Your stock looks fine.".to_string());
        }
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts.truncate(self.config.max_context_alerts);

        let names = facility_names_by_id(&facilities);
        let mut out = vec!["Active alerts (most recent first):".to_string()];
        for alert in &alerts {
            let subject = alert.crop.as_deref().unwrap_or("stock");
            out.push(format!(
                "- [{}] {} — {} at '{}'. {}",
                alert.severity,
                alert.message,
                subject,
                names.get(&alert.facility_id).map_or("unknown", |n| n),
                alert.recommendation
            ));
        }
        Ok(out.join("\n"))
    }

    async fn summary_context(&self, user_id: &str) -> Result<String> {
        let (facilities, ids) = self.owned(user_id).await?;
        if facilities.is_empty() {
            return Ok(NO_FACILITIES_HINT.to_string());
        }
        let lots = self.lots.find_by_facilities(&ids, &LotFilter::default()).await?;
        let alert_count = self.alerts.count_unresolved(&ids).await?;

        let total: f64 = facilities.iter().map(|f| f.capacity_quintals).sum();
        let used: f64 = facilities.iter().map(|f| f.used_capacity_quintals).sum();
        let free = (total - used).max(0.0);
        let degraded = lots.iter().filter(|l| l.condition.is_degraded()).count();
        let good = lots.len() - degraded;

        Ok(format!(
            "Summary: {} warehouse(s) with {} qtl total capacity ({} used, {} free). \
             {} lot(s) stored: {} in good shape, {} at risk or spoiled. \
             {} unresolved alert(s).",
            facilities.len(),
            total,
            used,
            free,
            lots.len(),
            good,
            degraded,
            alert_count
        ))
    }

    async fn conditions_context(&self, user_id: &str) -> Result<String> {
        let (facilities, _) = self.owned(user_id).await?;
        if facilities.is_empty() {
            return Ok(NO_FACILITIES_HINT.to_string());
        }

        let mut out = vec!["Storage conditions:".to_string()];
        for facility in &facilities {
            let ambient = self.weather.get_weather(&facility.city).await?;
            let inside = self.estimator.derive_conditions(&ambient, facility.kind);
            out.push(format!(
                "{} ({}, {}): ~{:.1}°C, {:.0}% RH inside (ambient {:.1}°C, {}).",
                facility.name,
                facility.kind,
                facility.city,
                inside.temp_c,
                inside.humidity_pct,
                ambient.temp_c,
                ambient.description
            ));
            if facility.is_near_capacity() {
                out.push(format!("  near capacity ({}% full)", facility.fill_percent()));
            }

            let lots = self
                .lots
                .find_by_facilities(&[facility.id.clone()], &LotFilter::default())
                .await?;
            for lot in lots.iter().filter(|l| l.status.is_active()) {
                out.push(self.lot_risk_line(lot, &inside));
            }
        }
        Ok(out.join("\n"))
    }

    fn lot_risk_line(&self, lot: &Lot, inside: &crate::conditions::StorageConditions) -> String {
        let Some(profile) = crops::by_name(&lot.crop) else {
            return format!("  - {} {}: unknown crop profile", lot.crop, lot.code);
        };
        let score = self.estimator.risk_score(lot, profile, inside);
        let breached = breaches(profile, inside);
        let mut line = format!("  - {} {}: risk {}/100", lot.crop, lot.code, score);
        if !breached.is_empty() {
            line.push_str(&format!(", threshold breach: {}", breached.join(", ")));
        }
        line
    }
}

fn facility_names_by_id(facilities: &[Facility]) -> HashMap<String, String> {
    facilities
        .iter()
        .map(|f| (f.id.clone(), f.name.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::DefaultEstimator;
    use crate::memstore::MemoryStore;
    use crate::model::{Alert, NewFacility, NewLot};
    use crate::types::{AlertSeverity, FacilityKind};
    use crate::weather::StaticWeather;

    struct Fixture {
        store: Arc<MemoryStore>,
        builder: ContextBuilder,
    }

    fn fixture_with_config(config: GodownConfig) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let builder = ContextBuilder::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(StaticWeather),
            Arc::new(DefaultEstimator),
            config,
        );
        Fixture { store, builder }
    }

    fn fixture() -> Fixture {
        fixture_with_config(GodownConfig::default())
    }

    async fn seed_facility(fx: &Fixture, name: &str, city: &str) -> Facility {
        FacilityStore::create(
            fx.store.as_ref(),
            NewFacility {
                owner_id: "u1".into(),
                name: name.into(),
                kind: FacilityKind::Dry,
                city: city.into(),
                capacity_quintals: 100.0,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_lot(fx: &Fixture, facility_id: &str, crop: &str, quantity: f64) -> Lot {
        let profile = crops::by_name(crop).unwrap();
        LotStore::create(
            fx.store.as_ref(),
            NewLot {
                owner_id: "u1".into(),
                facility_id: facility_id.into(),
                crop: crop.into(),
                quantity_quintals: quantity,
                shelf_life_days: profile.shelf_life_days,
                sell_by: crops::sell_by(Utc::now(), profile),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn non_view_intents_return_none() {
        let fx = fixture();
        for intent in [Intent::AddLot, Intent::ConfirmAction, Intent::General] {
            assert!(fx.builder.build(intent, "u1").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn summary_with_no_facilities_suggests_creation() {
        let fx = fixture();
        let text = fx
            .builder
            .build(Intent::ViewSummary, "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("add a warehouse"), "{text}");
    }

    #[tokio::test]
    async fn summary_aggregates_counts() {
        let fx = fixture();
        let f = seed_facility(&fx, "Central", "Nashik").await;
        let lot = seed_lot(&fx, &f.id, "Onion", 40.0).await;
        seed_lot(&fx, &f.id, "Wheat", 10.0).await;
        fx.store.adjust_used_capacity(&f.id, 50.0).await.unwrap();
        fx.store
            .update(
                &lot.id,
                crate::model::LotPatch {
                    status: None,
                    condition: Some(crate::types::LotCondition::AtRisk),
                },
            )
            .await
            .unwrap();

        let text = fx
            .builder
            .build(Intent::ViewSummary, "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("1 warehouse(s)"), "{text}");
        assert!(text.contains("2 lot(s)"), "{text}");
        assert!(text.contains("1 in good shape"), "{text}");
        assert!(text.contains("1 at risk or spoiled"), "{text}");
    }

    #[tokio::test]
    async fn lots_context_lists_recent_lots_bounded() {
        let mut config = GodownConfig::default();
        config.max_context_lots = 2;
        let fx = fixture_with_config(config);
        let f = seed_facility(&fx, "Central", "Nashik").await;
        seed_lot(&fx, &f.id, "Onion", 10.0).await;
        seed_lot(&fx, &f.id, "Wheat", 10.0).await;
        seed_lot(&fx, &f.id, "Rice", 10.0).await;

        let text = fx
            .builder
            .build(Intent::ViewLots, "u1")
            .await
            .unwrap()
            .unwrap();
        let lot_lines = text.lines().filter(|l| l.starts_with("- ")).count();
        assert_eq!(lot_lines, 2, "{text}");
        assert!(text.contains("LOT-"), "{text}");
        assert!(text.contains("day(s) to sell-by"), "{text}");
    }

    #[tokio::test]
    async fn warehouses_context_shows_fill_percentage() {
        let fx = fixture();
        let f = seed_facility(&fx, "Central", "Nashik").await;
        fx.store.adjust_used_capacity(&f.id, 25.0).await.unwrap();

        let text = fx
            .builder
            .build(Intent::ViewWarehouses, "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("25/100 qtl used (25%)"), "{text}");
        assert!(text.contains("active"), "{text}");
    }

    #[tokio::test]
    async fn alerts_context_lists_unresolved() {
        let fx = fixture();
        let f = seed_facility(&fx, "Central", "Nashik").await;
        fx.store
            .push_alert(Alert {
                id: "a1".into(),
                facility_id: f.id.clone(),
                lot_id: None,
                crop: Some("Onion".into()),
                severity: AlertSeverity::Warning,
                message: "Humidity above safe range".into(),
                recommendation: "Ventilate the stack.".into(),
                resolved: false,
                created_at: Utc::now(),
            })
            .await;

        let text = fx
            .builder
            .build(Intent::ViewAlerts, "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("[warning]"), "{text}");
        assert!(text.contains("Humidity above safe range"), "{text}");
        assert!(text.contains("Ventilate"), "{text}");
    }

    #[tokio::test]
    async fn alerts_context_empty_is_reassuring() {
        let fx = fixture();
        seed_facility(&fx, "Central", "Nashik").await;
        let text = fx
            .builder
            .build(Intent::ViewAlerts, "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("No active alerts"), "{text}");
    }

    #[tokio::test]
    async fn conditions_context_scores_active_lots() {
        let fx = fixture();
        let f = seed_facility(&fx, "Central", "Nashik").await;
        seed_lot(&fx, &f.id, "Onion", 95.0).await;
        fx.store.adjust_used_capacity(&f.id, 95.0).await.unwrap();

        let text = fx
            .builder
            .build(Intent::ViewConditions, "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("Central (dry, Nashik)"), "{text}");
        assert!(text.contains("near capacity (95% full)"), "{text}");
        assert!(text.contains("risk "), "{text}");
    }
}
