use serde::Serialize;

use crate::model::subject::Subject;
use crate::projector::whole_percentage;

/// One bar of the attendance-vs-target overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectOverview {
    pub name: String,
    pub attendance: u32,
    pub target: u8,
    pub below_target: bool,
}

/// Aggregate figures shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub subject_count: usize,
    /// Whole percent across every subject's classes combined.
    pub overall_attendance: u32,
    pub rows: Vec<SubjectOverview>,
}

impl DashboardSummary {
    #[must_use]
    pub fn from_subjects(subjects: &[Subject]) -> Self {
        let attended: u64 = subjects.iter().map(|s| u64::from(s.attended())).sum();
        let total: u64 = subjects.iter().map(|s| u64::from(s.total())).sum();

        let rows = subjects
            .iter()
            .map(|s| SubjectOverview {
                name: s.name().to_owned(),
                attendance: s.attendance_percentage(),
                target: s.target(),
                below_target: s.is_below_target(),
            })
            .collect();

        Self {
            subject_count: subjects.len(),
            overall_attendance: whole_percentage(attended, total),
            rows,
        }
    }
}
