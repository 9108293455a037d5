//! Role-specific dashboard views over one immutable report snapshot.
//!
//! Every role shares the same analytics functions; only the selection of
//! views differs. Nothing here is cached: each call builds fresh output.

use crate::aggregate::{aggregate, recent, Aggregates, StatusBreakdown};
use crate::config::AppConfig;
use crate::geo::{filter_by_city, CityScope, CityTable};
use crate::score::{impact_score, ImpactScore};
use crate::search::{paginate, Page, SearchQuery};
use crate::trend::build_trend;
use crate::types::{CountRow, Report, Status, TrendBucket};
use chrono::{DateTime, TimeZone};
use serde::Serialize;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Civilian,
    SuperAdmin,
    GovAdmin,
    DeptHead,
    FieldOfficer,
}

impl Role {
    /// Backend role tag; unknown tags get the least-privileged view.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "super_admin" => Self::SuperAdmin,
            "gov_admin" => Self::GovAdmin,
            "dept_head" => Self::DeptHead,
            "field_officer" => Self::FieldOfficer,
            _ => Self::Civilian,
        }
    }
}

/// Who is looking and with which admin filters.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub user_id: Option<String>,
    pub city: CityScope,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminAnalytics {
    pub aggregates: Aggregates,
    pub top_categories: Vec<CountRow>,
    pub trend: Vec<TrendBucket>,
    pub recent: Vec<Report>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeptHeadView {
    pub status: StatusBreakdown,
    pub awaiting_assignment: Vec<Report>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOfficerView {
    pub status: StatusBreakdown,
    pub tasks: Vec<Report>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardView {
    Admin(AdminAnalytics),
    DeptHead(DeptHeadView),
    FieldOfficer(FieldOfficerView),
    Civilian(ImpactScore),
}

/// Immutable report collection plus the settings the views need.
#[derive(Debug, Clone)]
pub struct Snapshot {
    reports: Vec<Report>,
    cities: CityTable,
    trend_days: usize,
    page_size: usize,
    top_n: usize,
}

impl Snapshot {
    pub fn new(reports: Vec<Report>, config: &AppConfig) -> Self {
        Self {
            reports,
            cities: config.city_table(),
            trend_days: config.trend_days,
            page_size: config.page_size,
            top_n: config.top_n,
        }
    }

    /// Stand-in for a failed fetch: every view is zeroed.
    pub fn empty(config: &AppConfig) -> Self {
        Self::new(Vec::new(), config)
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn scoped(&self, city: &CityScope) -> Vec<Report> {
        filter_by_city(&self.reports, city, &self.cities)
    }

    pub fn admin_analytics<Tz: TimeZone>(
        &self,
        city: &CityScope,
        now: &DateTime<Tz>,
    ) -> AdminAnalytics {
        let scoped = self.scoped(city);
        let aggregates = aggregate(&scoped);
        let top_categories = aggregates.top_categories(self.top_n);
        AdminAnalytics {
            top_categories,
            trend: build_trend(&scoped, self.trend_days, now),
            recent: recent(&scoped, RECENT_LIMIT),
            aggregates,
        }
    }

    /// The snapshot is expected to be department-scoped already.
    pub fn dept_head(&self) -> DeptHeadView {
        DeptHeadView {
            status: StatusBreakdown::from_reports(&self.reports),
            awaiting_assignment: self
                .reports
                .iter()
                .filter(|r| r.lifecycle() == Some(Status::Open))
                .take(RECENT_LIMIT)
                .cloned()
                .collect(),
        }
    }

    pub fn field_officer(&self, officer_id: &str) -> FieldOfficerView {
        let assigned: Vec<Report> = self
            .reports
            .iter()
            .filter(|r| r.assigned_to.as_deref() == Some(officer_id))
            .cloned()
            .collect();
        FieldOfficerView {
            status: StatusBreakdown::from_reports(&assigned),
            tasks: assigned.into_iter().filter(|r| !r.is_resolved()).collect(),
        }
    }

    pub fn reports_of(&self, user_id: &str) -> Vec<Report> {
        self.reports
            .iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    /// The backend's "my reports" listing is already scoped to the caller
    /// and carries no `user_id`; such a snapshot is scored whole, like the
    /// department snapshot in [`Snapshot::dept_head`].
    pub fn civilian(&self, user_id: &str) -> ImpactScore {
        if self.reports.iter().all(|r| r.user_id.is_none()) {
            return impact_score(&self.reports);
        }
        impact_score(&self.reports_of(user_id))
    }

    pub fn browse(&self, query: &SearchQuery) -> Page<'_> {
        paginate(&self.reports, query, self.page_size)
    }

    pub fn view<Tz: TimeZone>(
        &self,
        role: Role,
        ctx: &ViewContext,
        now: &DateTime<Tz>,
    ) -> DashboardView {
        let user = ctx.user_id.as_deref().unwrap_or_default();
        let view = match role {
            Role::SuperAdmin | Role::GovAdmin => {
                DashboardView::Admin(self.admin_analytics(&ctx.city, now))
            }
            Role::DeptHead => DashboardView::DeptHead(self.dept_head()),
            Role::FieldOfficer => DashboardView::FieldOfficer(self.field_officer(user)),
            Role::Civilian => DashboardView::Civilian(self.civilian(user)),
        };
        log::debug!("built {role:?} view over {} reports", self.reports.len());
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(id: &str, status: &str, user: &str, officer: Option<&str>, lat: f64) -> Report {
        Report {
            id: id.into(),
            category: "pothole".into(),
            department: "roads".into(),
            severity: "medium".into(),
            status: status.into(),
            latitude: Some(lat),
            longitude: Some(77.0),
            description: String::new(),
            created_at: Utc::now().timestamp_millis(),
            image_url: None,
            assigned_to: officer.map(str::to_string),
            user_id: Some(user.into()),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                report("1", "open", "u1", None, 28.6),
                report("2", "assigned", "u1", Some("fo1"), 28.6),
                report("3", "resolved", "u2", Some("fo1"), 28.6),
                report("4", "completed", "u1", None, 10.0),
                report("5", "in_progress", "u2", Some("fo1"), 10.0),
            ],
            &AppConfig::default(),
        )
    }

    #[test]
    fn role_tags() {
        assert_eq!(Role::parse("gov_admin"), Role::GovAdmin);
        assert_eq!(Role::parse("field_officer"), Role::FieldOfficer);
        assert_eq!(Role::parse("ngo"), Role::Civilian);
    }

    #[test]
    fn admin_view_applies_city_scope() {
        let snap = snapshot();
        let ctx = ViewContext {
            user_id: None,
            city: CityScope::parse("delhi"),
        };
        let DashboardView::Admin(view) = snap.view(Role::SuperAdmin, &ctx, &Utc::now()) else {
            panic!("expected admin view");
        };
        assert_eq!(view.aggregates.status.total, 3);
        assert_eq!(view.recent.len(), 3);
        assert_eq!(view.trend.len(), 7);
        assert_eq!(view.trend.iter().map(|b| b.total).sum::<usize>(), 3);
        assert_eq!(view.top_categories[0].count, 3);
    }

    #[test]
    fn civilian_view_scores_own_reports() {
        let ctx = ViewContext {
            user_id: Some("u1".into()),
            city: CityScope::All,
        };
        let view = snapshot().view(Role::Civilian, &ctx, &Utc::now());
        assert_eq!(view, DashboardView::Civilian(ImpactScore::from_counts(3, 1)));
    }

    #[test]
    fn civilian_view_scores_server_scoped_listing() {
        let text = r#"{"success": true, "reports": [
            {"id": "a", "category": "pothole", "status": "resolved", "timestamp": 1700000000},
            {"id": "b", "category": "garbage", "status": "open", "timestamp": 1700000100}
        ]}"#;
        let (reports, _) = crate::loader::parse_json(text, 0).unwrap();
        let snap = Snapshot::new(reports, &AppConfig::default());
        let ctx = ViewContext {
            user_id: Some("u1".into()),
            city: CityScope::All,
        };
        assert_eq!(
            snap.view(Role::Civilian, &ctx, &Utc::now()),
            DashboardView::Civilian(ImpactScore {
                total: 2,
                resolved: 1,
                impact: 25,
            })
        );
    }

    #[test]
    fn field_officer_sees_unresolved_assignments() {
        let view = snapshot().field_officer("fo1");
        let ids: Vec<&str> = view.tasks.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["2", "5"]);
        assert_eq!(view.status.total, 3);
        assert_eq!(view.status.resolved, 1);
    }

    #[test]
    fn dept_head_sees_open_queue() {
        let view = snapshot().dept_head();
        assert_eq!(view.awaiting_assignment.len(), 1);
        assert_eq!(view.status.pending, 1);
        assert_eq!(view.status.in_progress, 2);
    }

    #[test]
    fn empty_snapshot_yields_zeroed_views() {
        let snap = Snapshot::empty(&AppConfig::default());
        let analytics = snap.admin_analytics(&CityScope::All, &Utc::now());
        assert_eq!(analytics.aggregates.status, StatusBreakdown::default());
        assert!(analytics.trend.iter().all(|b| b.total == 0));
        assert_eq!(analytics.trend.len(), 7);
        let page = snap.browse(&SearchQuery::default());
        assert!(page.items.is_empty());
        assert_eq!(page.total_matched, 0);
    }
}
