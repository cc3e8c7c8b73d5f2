use anyhow::Context;
use chrono::Utc;
use godown_core::crops;
use godown_core::memstore::MemoryStore;
use godown_core::model::{NewFacility, NewLot};
use godown_core::store::{FacilityStore, LotStore};
use godown_core::types::FacilityKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// SeedFixture
// ---------------------------------------------------------------------------

/// YAML fixture for `chat --seed` / `repl --seed`: facilities by name, lots
/// referencing them.
///
/// ```yaml
/// user: local
/// facilities:
///   - name: Central
///     city: Nashik
///     capacity_quintals: 1000
/// lots:
///   - facility: Central
///     crop: Onion
///     quantity_quintals: 200
/// ```
#[derive(Debug, Deserialize)]
pub struct SeedFixture {
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub facilities: Vec<SeedFacility>,
    #[serde(default)]
    pub lots: Vec<SeedLot>,
}

fn default_user() -> String {
    "local".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SeedFacility {
    pub name: String,
    #[serde(default)]
    pub kind: FacilityKind,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_capacity")]
    pub capacity_quintals: f64,
}

fn default_city() -> String {
    "Unknown".to_string()
}

fn default_capacity() -> f64 {
    500.0
}

#[derive(Debug, Deserialize)]
pub struct SeedLot {
    pub facility: String,
    pub crop: String,
    pub quantity_quintals: f64,
}

impl SeedFixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed fixture {}", path.display()))?;
        serde_yaml::from_str(&data).context("parsing seed fixture")
    }

    pub async fn apply(&self, store: &MemoryStore) -> anyhow::Result<()> {
        let mut ids: HashMap<String, String> = HashMap::new();
        for f in &self.facilities {
            let created = FacilityStore::create(
                store,
                NewFacility {
                    owner_id: self.user.clone(),
                    name: f.name.clone(),
                    kind: f.kind,
                    city: f.city.clone(),
                    capacity_quintals: f.capacity_quintals,
                },
            )
            .await?;
            ids.insert(f.name.clone(), created.id);
        }
        for lot in &self.lots {
            let facility_id = ids
                .get(&lot.facility)
                .with_context(|| format!("lot references unknown facility '{}'", lot.facility))?;
            let profile = crops::by_name(&lot.crop)
                .with_context(|| format!("unknown crop '{}' in fixture", lot.crop))?;
            LotStore::create(
                store,
                NewLot {
                    owner_id: self.user.clone(),
                    facility_id: facility_id.clone(),
                    crop: profile.name.to_string(),
                    quantity_quintals: lot.quantity_quintals,
                    shelf_life_days: profile.shelf_life_days,
                    sell_by: crops::sell_by(Utc::now(), profile),
                },
            )
            .await?;
            store
                .adjust_used_capacity(facility_id, lot.quantity_quintals)
                .await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
