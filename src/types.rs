use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

use crate::util::{lenient_f64, lenient_string};

/// A report record as delivered by the backend transport, before
/// normalization. Every field is optional and lenient: a value of the
/// wrong JSON type degrades to `None` (or to text, for numbers) instead of
/// rejecting the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Creation time in seconds since the epoch.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub timestamp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
}

/// Canonical report. `created_at` is always populated, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub category: String,
    pub department: String,
    pub severity: String,
    pub status: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub created_at: i64,
    pub image_url: Option<String>,
    pub assigned_to: Option<String>,
    pub user_id: Option<String>,
}

impl Report {
    pub fn severity_level(&self) -> Option<Severity> {
        Severity::parse(&self.severity)
    }

    pub fn lifecycle(&self) -> Option<Status> {
        Status::parse(&self.status)
    }

    /// Both coordinates, or `None` if either is missing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Strict lifecycle check used by the admin views.
    pub fn is_resolved(&self) -> bool {
        self.lifecycle() == Some(Status::Resolved)
    }

    /// Resolution as the personal dashboard counts it: `completed` is a
    /// synonym of `resolved`.
    pub fn counts_as_resolved(&self) -> bool {
        matches!(self.lifecycle(), Some(Status::Resolved | Status::Completed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Display order used by the severity breakdown.
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    Assigned,
    InProgress,
    Resolved,
    /// Legacy tag some backends emit for resolved work.
    Completed,
}

impl Status {
    /// The four lifecycle stages tracked by the status breakdown.
    pub const LIFECYCLE: [Status; 4] = [
        Status::Open,
        Status::Assigned,
        Status::InProgress,
        Status::Resolved,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "assigned" => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar day of the rolling trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TrendBucket {
    #[serde(rename = "date")]
    #[tabled(rename = "Date")]
    pub date_label: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub day: chrono::NaiveDate,
    #[tabled(rename = "Total")]
    pub total: usize,
    #[tabled(rename = "Resolved")]
    pub resolved: usize,
    #[tabled(rename = "Active")]
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct CountRow {
    #[serde(rename = "name")]
    #[tabled(rename = "Name")]
    pub key: String,
    #[serde(rename = "value")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Row of the console report browser.
#[derive(Debug, Clone, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Severity")]
    pub severity: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

/// Row of the CSV export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Severity")]
    pub severity: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Location")]
    pub location: String,
}
