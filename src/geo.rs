//! City scoping by latitude/longitude bounding box.

use crate::types::Report;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive rectangular region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl CityBounds {
    pub const fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lng >= self.lng_min && lng <= self.lng_max
    }
}

/// Named city regions, keyed by lowercase city key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityTable(BTreeMap<String, CityBounds>);

impl Default for CityTable {
    fn default() -> Self {
        let mut cities = BTreeMap::new();
        cities.insert("delhi".to_string(), CityBounds::new(28.4, 28.9, 76.8, 77.4));
        cities.insert(
            "gwalior".to_string(),
            CityBounds::new(26.1, 26.35, 78.05, 78.3),
        );
        Self(cities)
    }
}

impl CityTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&CityBounds> {
        self.0.get(&normalize_key(key))
    }

    pub fn insert(&mut self, key: &str, bounds: CityBounds) {
        self.0.insert(normalize_key(key), bounds);
    }

    /// Overlay `other` on top of this table; entries in `other` win.
    pub fn merge(&mut self, other: CityTable) {
        for (key, bounds) in other.0 {
            self.insert(&key, bounds);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// The city selector: either no restriction or one named city.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CityScope {
    #[default]
    All,
    City(String),
}

impl CityScope {
    /// `"all"` and the empty string select everything.
    pub fn parse(s: &str) -> Self {
        let key = normalize_key(s);
        if key.is_empty() || key == "all" {
            Self::All
        } else {
            Self::City(key)
        }
    }
}

/// Keep only the reports inside the scoped city's bounds.
///
/// An unknown city key is treated as no restriction. Reports without both
/// coordinates are dropped whenever a known city restricts the view.
pub fn filter_by_city(reports: &[Report], scope: &CityScope, cities: &CityTable) -> Vec<Report> {
    let bounds = match scope {
        CityScope::All => return reports.to_vec(),
        CityScope::City(key) => match cities.get(key) {
            Some(b) => b,
            None => {
                log::warn!("unknown city '{key}', showing all reports");
                return reports.to_vec();
            }
        },
    };
    let filtered: Vec<Report> = reports
        .iter()
        .filter(|r| {
            r.coordinates()
                .is_some_and(|(lat, lng)| bounds.contains(lat, lng))
        })
        .cloned()
        .collect();
    log::debug!(
        "city filter kept {} of {} reports",
        filtered.len(),
        reports.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(id: &str, lat: Option<f64>, lng: Option<f64>) -> Report {
        Report {
            id: id.into(),
            category: "pothole".into(),
            department: "roads".into(),
            severity: "low".into(),
            status: "open".into(),
            latitude: lat,
            longitude: lng,
            description: String::new(),
            created_at: 0,
            image_url: None,
            assigned_to: None,
            user_id: None,
        }
    }

    #[test]
    fn delhi_bounds_include_and_exclude() {
        let cities = CityTable::default();
        let scope = CityScope::parse("delhi");
        let reports = vec![
            at("in", Some(28.65), Some(77.22)),
            at("south", Some(26.2), Some(77.22)),
        ];
        let kept = filter_by_city(&reports, &scope, &cities);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "in");
    }

    #[test]
    fn bounds_are_inclusive() {
        let b = CityBounds::new(28.4, 28.9, 76.8, 77.4);
        assert!(b.contains(28.4, 76.8));
        assert!(b.contains(28.9, 77.4));
        assert!(!b.contains(28.91, 77.0));
    }

    #[test]
    fn missing_coordinates_are_excluded_when_scoped() {
        let cities = CityTable::default();
        let reports = vec![at("a", None, None), at("b", Some(28.5), None)];
        assert!(filter_by_city(&reports, &CityScope::parse("Delhi"), &cities).is_empty());
        assert_eq!(filter_by_city(&reports, &CityScope::All, &cities).len(), 2);
    }

    #[test]
    fn unknown_city_passes_everything() {
        let cities = CityTable::default();
        let reports = vec![at("a", None, None), at("b", Some(0.0), Some(0.0))];
        let kept = filter_by_city(&reports, &CityScope::parse("atlantis"), &cities);
        assert_eq!(kept, reports);
    }

    #[test]
    fn scope_parsing() {
        assert_eq!(CityScope::parse(" ALL "), CityScope::All);
        assert_eq!(CityScope::parse(""), CityScope::All);
        assert_eq!(
            CityScope::parse("Gwalior"),
            CityScope::City("gwalior".into())
        );
    }

    #[test]
    fn merge_overrides_and_extends() {
        let mut table = CityTable::default();
        let mut extra = CityTable::empty();
        extra.insert("Delhi", CityBounds::new(0.0, 1.0, 0.0, 1.0));
        extra.insert("mumbai", CityBounds::new(18.9, 19.3, 72.7, 73.0));
        table.merge(extra);
        assert_eq!(table.get("delhi").unwrap().lat_max, 1.0);
        assert!(table.get("MUMBAI").is_some());
        assert_eq!(table.keys().count(), 3);
    }

    proptest! {
        #[test]
        fn prop_filter_is_idempotent(
            points in prop::collection::vec(
                (prop::option::of(26.0..30.0f64), prop::option::of(76.0..79.0f64)),
                0..40,
            ),
            city in prop::sample::select(vec!["delhi", "gwalior", "all", "nowhere"]),
        ) {
            let cities = CityTable::default();
            let scope = CityScope::parse(city);
            let reports: Vec<Report> = points
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lng))| at(&i.to_string(), lat, lng))
                .collect();
            let once = filter_by_city(&reports, &scope, &cities);
            let twice = filter_by_city(&once, &scope, &cities);
            prop_assert_eq!(once, twice);
        }
    }
}
