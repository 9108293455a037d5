use crate::error::{ReportError, Result};
use crate::types::{RawReport, Report};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub generated_ids: usize,
    pub defaulted_timestamps: usize,
    pub missing_coords: usize,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.total_rows - self.parse_errors
    }

    /// Count, parse and normalize one transport element into `reports`.
    fn ingest(&mut self, item: Value, now_ms: i64, reports: &mut Vec<Report>) {
        self.total_rows += 1;
        let raw: RawReport = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                log::debug!("skipping malformed report: {e}");
                self.parse_errors += 1;
                return;
            }
        };
        self.record(&raw);
        reports.push(normalize(raw, now_ms));
    }

    fn record(&mut self, raw: &RawReport) {
        if raw.id.as_deref().map_or(true, str::is_empty) {
            self.generated_ids += 1;
        }
        if source_millis(raw.timestamp).is_none() {
            self.defaulted_timestamps += 1;
        }
        if raw.latitude.is_none() || raw.longitude.is_none() {
            self.missing_coords += 1;
        }
    }
}

/// Seconds-since-epoch to milliseconds. Zero counts as "not supplied".
fn source_millis(timestamp: Option<f64>) -> Option<i64> {
    timestamp
        .filter(|t| *t != 0.0)
        .map(|t| (t * 1000.0).round() as i64)
}

/// Turn one transport record into a canonical [`Report`].
///
/// `now_ms` is the ingestion instant used when the record carries no
/// timestamp, so normalizing the same incomplete record twice at different
/// times yields different `created_at` values.
pub fn normalize(raw: RawReport, now_ms: i64) -> Report {
    let created_at = source_millis(raw.timestamp).unwrap_or(now_ms);
    let id = match raw.id {
        Some(id) if !id.is_empty() => id,
        _ => format!("temp-{}", uuid::Uuid::new_v4()),
    };
    Report {
        id,
        category: raw.category.unwrap_or_default(),
        department: raw.department.unwrap_or_default(),
        severity: raw.severity.unwrap_or_default(),
        status: raw.status.unwrap_or_default(),
        latitude: raw.latitude,
        longitude: raw.longitude,
        description: raw.description.unwrap_or_default(),
        created_at,
        image_url: raw.image_url,
        assigned_to: raw.assigned_to,
        user_id: raw.user_id,
    }
}

/// Parse a JSON payload, either the `{"reports": [...]}` envelope the
/// backend returns or a bare array. Elements that are not report-shaped
/// objects are counted as parse errors and skipped.
pub fn parse_json(text: &str, now_ms: i64) -> Result<(Vec<Report>, LoadReport)> {
    let value: Value = serde_json::from_str(text)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("reports") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(ReportError::Format(
                    "\"reports\" is not an array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ReportError::Format(
                "expected a report array or envelope".to_string(),
            ))
        }
    };

    let mut load_report = LoadReport::default();
    let mut reports = Vec::with_capacity(items.len());
    for item in items {
        load_report.ingest(item, now_ms, &mut reports);
    }
    Ok((reports, load_report))
}

/// Read a CSV export whose header uses the transport field names.
///
/// Cells are handed to the record parser as text so values such as `007`
/// or `true` keep their spelling; empty cells count as absent.
pub fn parse_csv<R: std::io::Read>(rdr: R, now_ms: i64) -> Result<(Vec<Report>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = rdr.headers()?.clone();
    let mut load_report = LoadReport::default();
    let mut reports = Vec::new();

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("skipping malformed row: {e}");
                load_report.total_rows += 1;
                load_report.parse_errors += 1;
                continue;
            }
        };
        let fields: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        load_report.ingest(Value::Object(fields), now_ms, &mut reports);
    }
    Ok((reports, load_report))
}

/// Load and normalize a report snapshot from disk. The format is chosen by
/// extension: `.json` or `.csv`.
pub fn load_reports(path: &Path, now_ms: i64) -> Result<(Vec<Report>, LoadReport)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let (reports, load_report) = match ext.as_deref() {
        Some("json") => parse_json(&std::fs::read_to_string(path)?, now_ms)?,
        Some("csv") => parse_csv(std::fs::File::open(path)?, now_ms)?,
        _ => return Err(ReportError::Format(path.display().to_string())),
    };
    log::info!(
        "loaded {} of {} reports from {} ({} skipped)",
        load_report.loaded(),
        load_report.total_rows,
        path.display(),
        load_report.parse_errors
    );
    if load_report.defaulted_timestamps > 0 {
        log::debug!(
            "{} reports had no timestamp; used ingestion time",
            load_report.defaulted_timestamps
        );
    }
    Ok((reports, load_report))
}
