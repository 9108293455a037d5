use crate::types::{Report, Status};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// `"all"` or one of the lifecycle tags; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "all" | "" => Some(Self::All),
            other => Status::parse(other)
                .filter(|s| Status::LIFECYCLE.contains(s))
                .map(Self::Only),
        }
    }

    fn accepts(&self, report: &Report) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => report.status == status.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: String,
    pub status: StatusFilter,
    /// 1-based; values below 1 are read as 1.
    pub page: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a> {
    pub items: Vec<&'a Report>,
    pub total_matched: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

fn matches_text(report: &Report, needle: &str) -> bool {
    needle.is_empty()
        || report.description.to_lowercase().contains(needle)
        || report.category.to_lowercase().contains(needle)
}

/// All reports matching `query`, in collection order.
pub fn filter_reports<'a>(reports: &'a [Report], query: &SearchQuery) -> Vec<&'a Report> {
    let needle = query.text.to_lowercase();
    reports
        .iter()
        .filter(|r| query.status.accepts(r) && matches_text(r, &needle))
        .collect()
}

/// Filter then slice one page. A page past the end is empty, not an error.
pub fn paginate<'a>(reports: &'a [Report], query: &SearchQuery, page_size: usize) -> Page<'a> {
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let page = query.page.max(1);
    let matched = filter_reports(reports, query);
    let total_matched = matched.len();
    let items = matched
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    Page {
        items,
        total_matched,
        page,
        page_size,
        total_pages: total_matched.div_ceil(page_size),
    }
}
