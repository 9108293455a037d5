use crate::types::{CountRow, Report, Severity, Status};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Frequency counts keyed by tag, remembering first-seen order so that
/// ranking ties resolve the same way on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMap {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl CountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `keys` with zero counts, fixing their order up front.
    pub fn with_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::new();
        for key in keys {
            map.add(key, 0);
        }
        map
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    fn add(&mut self, key: &str, n: usize) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), n));
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), *n))
    }

    /// Highest counts first; equal counts keep first-seen order.
    pub fn top_n(&self, n: usize) -> Vec<CountRow> {
        let mut rows: Vec<CountRow> = self
            .iter()
            .map(|(key, count)| CountRow {
                key: key.to_string(),
                count,
            })
            .collect();
        // `sort_by` is stable, which is what carries the tie-break.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(n);
        rows
    }

    pub fn rows(&self) -> Vec<CountRow> {
        self.top_n(usize::MAX)
    }
}

impl Serialize for CountMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, n) in &self.entries {
            map.serialize_entry(k, n)?;
        }
        map.end()
    }
}

/// Status buckets as the dashboards display them: `assigned` folds into
/// in-progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub total: usize,
}

impl StatusBreakdown {
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut out = Self {
            total: reports.len(),
            ..Self::default()
        };
        for r in reports {
            match r.lifecycle() {
                Some(Status::Open) => out.pending += 1,
                Some(Status::Assigned | Status::InProgress) => out.in_progress += 1,
                Some(Status::Resolved) => out.resolved += 1,
                Some(Status::Completed) | None => {}
            }
        }
        out
    }

    /// Percentage of reports resolved, 0 for an empty collection.
    pub fn resolution_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.resolved as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    pub by_status: CountMap,
    pub by_severity: CountMap,
    pub by_category: CountMap,
    pub by_department: CountMap,
    pub status: StatusBreakdown,
}

impl Aggregates {
    pub fn top_categories(&self, n: usize) -> Vec<CountRow> {
        self.by_category.top_n(n)
    }
}

/// Compute every breakdown over an (already city-scoped) collection.
///
/// Status and severity track only their enumerated tags; anything else is
/// left out of those two maps but still counted by category, department
/// and the overall total.
pub fn aggregate(reports: &[Report]) -> Aggregates {
    let mut by_status = CountMap::with_keys(Status::LIFECYCLE.iter().map(|s| s.as_str()));
    let mut by_severity = CountMap::with_keys(Severity::ALL.iter().map(|s| s.as_str()));
    let mut by_category = CountMap::new();
    let mut by_department = CountMap::new();

    for r in reports {
        if let Some(s) = r.lifecycle().filter(|s| Status::LIFECYCLE.contains(s)) {
            by_status.increment(s.as_str());
        }
        if let Some(sev) = r.severity_level() {
            by_severity.increment(sev.as_str());
        }
        by_category.increment(&r.category);
        by_department.increment(&r.department);
    }

    Aggregates {
        by_status,
        by_severity,
        by_category,
        by_department,
        status: StatusBreakdown::from_reports(reports),
    }
}

/// The first `n` reports in collection order.
pub fn recent(reports: &[Report], n: usize) -> Vec<Report> {
    reports.iter().take(n).cloned().collect()
}
