use crate::types::Report;
use serde::Serialize;

const RESOLVED_POINTS: u64 = 15;
const REPORT_POINTS: u64 = 5;

/// A civilian's own activity summary, the "XP" on their dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImpactScore {
    pub total: usize,
    pub resolved: usize,
    pub impact: u64,
}

impl ImpactScore {
    pub fn from_counts(total: usize, resolved: usize) -> Self {
        Self {
            total,
            resolved,
            impact: resolved as u64 * RESOLVED_POINTS + total as u64 * REPORT_POINTS,
        }
    }
}

/// Score over the reports one user filed.
pub fn impact_score(reports: &[Report]) -> ImpactScore {
    let resolved = reports.iter().filter(|r| r.counts_as_resolved()).count();
    ImpactScore::from_counts(reports.len(), resolved)
}
