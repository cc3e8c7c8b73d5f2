use chrono::{DateTime, Duration, Utc};

// ---------------------------------------------------------------------------
// CropProfile
// ---------------------------------------------------------------------------

/// Storage profile for one crop in the fixed vocabulary. Shelf life and the
/// safe temperature/humidity ceilings drive sell-by derivation and risk
/// scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropProfile {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub shelf_life_days: u32,
    pub max_temp_c: f64,
    pub max_humidity_pct: f64,
}

/// Fixed crop vocabulary. Extraction scans this table in order and the first
/// match wins, so more specific names must precede substrings of themselves.
pub const CROPS: &[CropProfile] = &[
    CropProfile {
        name: "Onion",
        aliases: &["onion", "onions", "pyaz", "kanda"],
        shelf_life_days: 30,
        max_temp_c: 30.0,
        max_humidity_pct: 70.0,
    },
    CropProfile {
        name: "Potato",
        aliases: &["potato", "potatoes", "aloo", "batata"],
        shelf_life_days: 90,
        max_temp_c: 12.0,
        max_humidity_pct: 90.0,
    },
    CropProfile {
        name: "Tomato",
        aliases: &["tomato", "tomatoes", "tamatar"],
        shelf_life_days: 14,
        max_temp_c: 22.0,
        max_humidity_pct: 90.0,
    },
    CropProfile {
        name: "Wheat",
        aliases: &["wheat", "gehu", "gehun"],
        shelf_life_days: 180,
        max_temp_c: 34.0,
        max_humidity_pct: 65.0,
    },
    CropProfile {
        name: "Rice",
        aliases: &["rice", "paddy", "chawal", "dhan"],
        shelf_life_days: 270,
        max_temp_c: 34.0,
        max_humidity_pct: 65.0,
    },
    CropProfile {
        name: "Maize",
        aliases: &["maize", "corn", "makka"],
        shelf_life_days: 120,
        max_temp_c: 32.0,
        max_humidity_pct: 70.0,
    },
    CropProfile {
        name: "Soybean",
        aliases: &["soybean", "soyabean", "soya"],
        shelf_life_days: 150,
        max_temp_c: 32.0,
        max_humidity_pct: 65.0,
    },
    CropProfile {
        name: "Groundnut",
        aliases: &["groundnut", "peanut", "moongphali"],
        shelf_life_days: 120,
        max_temp_c: 30.0,
        max_humidity_pct: 70.0,
    },
    CropProfile {
        name: "Garlic",
        aliases: &["garlic", "lahsun", "lasun"],
        shelf_life_days: 150,
        max_temp_c: 30.0,
        max_humidity_pct: 70.0,
    },
    CropProfile {
        name: "Ginger",
        aliases: &["ginger", "adrak"],
        shelf_life_days: 60,
        max_temp_c: 25.0,
        max_humidity_pct: 85.0,
    },
    CropProfile {
        name: "Chilli",
        aliases: &["chilli", "chili", "mirchi"],
        shelf_life_days: 21,
        max_temp_c: 25.0,
        max_humidity_pct: 85.0,
    },
    CropProfile {
        name: "Turmeric",
        aliases: &["turmeric", "haldi"],
        shelf_life_days: 240,
        max_temp_c: 32.0,
        max_humidity_pct: 70.0,
    },
    CropProfile {
        name: "Apple",
        aliases: &["apple", "apples", "seb"],
        shelf_life_days: 45,
        max_temp_c: 10.0,
        max_humidity_pct: 92.0,
    },
    CropProfile {
        name: "Banana",
        aliases: &["banana", "bananas", "kela"],
        shelf_life_days: 7,
        max_temp_c: 20.0,
        max_humidity_pct: 90.0,
    },
    CropProfile {
        name: "Mustard",
        aliases: &["mustard", "sarson"],
        shelf_life_days: 180,
        max_temp_c: 32.0,
        max_humidity_pct: 65.0,
    },
];

/// Look up a profile by canonical name, case-insensitively.
pub fn by_name(name: &str) -> Option<&'static CropProfile> {
    CROPS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Recommended sell-by date: 80% of the shelf life from intake, at least one
/// day out, so the recommendation lands before actual spoilage.
pub fn sell_by(created_at: DateTime<Utc>, profile: &CropProfile) -> DateTime<Utc> {
    let days = ((f64::from(profile.shelf_life_days) * 0.8).floor() as i64).max(1);
    created_at + Duration::days(days)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_name_is_case_insensitive() {
        assert_eq!(by_name("onion").unwrap().name, "Onion");
        assert_eq!(by_name("WHEAT").unwrap().name, "Wheat");
        assert!(by_name("dragonfruit").is_none());
    }

    #[test]
    fn aliases_are_lowercase() {
        for crop in CROPS {
            for alias in crop.aliases {
                assert_eq!(
                    *alias,
                    alias.to_lowercase(),
                    "alias '{alias}' of {} must be lowercase",
                    crop.name
                );
            }
        }
    }

    #[test]
    fn sell_by_is_before_shelf_life_end() {
        let now = Utc::now();
        for crop in CROPS {
            let sell = sell_by(now, crop);
            let expiry = now + Duration::days(i64::from(crop.shelf_life_days));
            assert!(sell <= expiry, "{} sell-by past shelf life", crop.name);
            assert!(sell > now, "{} sell-by not in the future", crop.name);
        }
    }

    #[test]
    fn sell_by_floors_at_one_day() {
        let short = CropProfile {
            name: "Test",
            aliases: &[],
            shelf_life_days: 1,
            max_temp_c: 20.0,
            max_humidity_pct: 80.0,
        };
        let now = Utc::now();
        assert_eq!(sell_by(now, &short), now + Duration::days(1));
    }
}
