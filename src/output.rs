use crate::error::Result;
use crate::trend::local_day;
use crate::types::{ExportRow, Report, ReportRow};
use crate::util::truncate;
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv_to<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    write_csv_to(std::fs::File::create(path)?, rows)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

fn date_in<Tz: TimeZone>(tz: &Tz, millis: i64) -> String {
    local_day(tz, millis)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Flatten reports into the admin CSV export layout.
pub fn export_rows<Tz: TimeZone>(reports: &[Report], tz: &Tz) -> Vec<ExportRow> {
    reports
        .iter()
        .map(|r| ExportRow {
            id: r.id.clone(),
            date: date_in(tz, r.created_at),
            category: r.category.clone(),
            department: r.department.clone(),
            description: r.description.clone(),
            severity: r.severity.clone(),
            status: r.status.clone(),
            location: r
                .coordinates()
                .map(|(lat, lng)| format!("{lat}, {lng}"))
                .unwrap_or_default(),
        })
        .collect()
}

pub fn export_reports_csv(path: &Path, reports: &[Report]) -> Result<()> {
    write_csv(path, &export_rows(reports, &Local))?;
    log::info!("exported {} reports to {}", reports.len(), path.display());
    Ok(())
}

/// Rows for the console browser: short ids, local dates, clipped text.
pub fn report_rows<'a>(reports: impl IntoIterator<Item = &'a Report>) -> Vec<ReportRow> {
    reports
        .into_iter()
        .map(|r| ReportRow {
            id: format!("#{}", truncate_id(&r.id)),
            date: date_in(&Local, r.created_at),
            category: r.category.clone(),
            severity: r.severity.clone(),
            status: r.status.replace('_', " "),
            description: truncate(&r.description, 30),
        })
        .collect()
}

fn truncate_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(id: &str, lat: Option<f64>, description: &str) -> Report {
        Report {
            id: id.into(),
            category: "pothole".into(),
            department: "roads".into(),
            severity: "high".into(),
            status: "in_progress".into(),
            latitude: lat,
            longitude: lat.map(|_| 77.22),
            description: description.into(),
            created_at: 1_700_000_000_000,
            image_url: None,
            assigned_to: None,
            user_id: None,
        }
    }

    #[test]
    fn export_quotes_and_formats_location() {
        let reports = vec![
            report("a", Some(28.65), "says \"help\", please"),
            report("b", None, ""),
        ];
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &export_rows(&reports, &Utc)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "ID,Date,Category,Department,Description,Severity,Status,Location"
        );
        assert_eq!(
            lines[1],
            r#"a,2023-11-14,pothole,roads,"says ""help"", please",high,in_progress,"28.65, 77.22""#
        );
        assert_eq!(lines[2], "b,2023-11-14,pothole,roads,,high,in_progress,");
    }

    #[test]
    fn browser_rows_are_clipped() {
        let long_id = "0123456789abcdef";
        let rows = report_rows(&[report(long_id, None, "a very long description of a broken streetlight")]);
        assert_eq!(rows[0].id, "#01234567");
        assert_eq!(rows[0].status, "in progress");
        assert!(rows[0].description.ends_with("..."));
    }

    #[test]
    fn json_and_csv_files_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("analytics.json");
        write_json(&json, &vec![1, 2, 3]).unwrap();
        assert!(std::fs::read_to_string(&json).unwrap().contains('2'));

        let csv_path = dir.path().join("export.csv");
        export_reports_csv(&csv_path, &[report("a", None, "")]).unwrap();
        assert_eq!(std::fs::read_to_string(&csv_path).unwrap().lines().count(), 2);
    }
}
