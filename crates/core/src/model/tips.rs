use serde::{Deserialize, Serialize};

use crate::model::subject::Subject;

/// Attendance figures handed to a tip advisor for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub subject: String,
    pub attended: u32,
    pub total: u32,
    pub target_attendance: u8,
}

impl AttendanceRecord {
    #[must_use]
    pub fn from_subject(subject: &Subject) -> Self {
        Self {
            subject: subject.name().to_owned(),
            attended: subject.attended(),
            total: subject.total(),
            target_attendance: subject.target(),
        }
    }
}

/// Advice generated for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub subject: String,
    pub tip: String,
}

/// Whether a subject is far enough behind to deserve a tip.
///
/// Subjects with no classes held yet never get one.
#[must_use]
pub fn should_provide_tip(record: &AttendanceRecord) -> bool {
    if record.total == 0 {
        return false;
    }
    let percentage = f64::from(record.attended) / f64::from(record.total) * 100.0;
    percentage < f64::from(record.target_attendance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attended: u32, total: u32, target_attendance: u8) -> AttendanceRecord {
        AttendanceRecord {
            subject: "World History".into(),
            attended,
            total,
            target_attendance,
        }
    }

    #[test]
    fn tip_when_below_target() {
        assert!(should_provide_tip(&record(30, 35, 90)));
    }

    #[test]
    fn no_tip_at_or_above_target() {
        assert!(!should_provide_tip(&record(18, 20, 90)));
        assert!(!should_provide_tip(&record(22, 25, 85)));
    }

    #[test]
    fn no_tip_before_any_class() {
        assert!(!should_provide_tip(&record(0, 0, 90)));
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(record(1, 2, 80)).unwrap();
        assert_eq!(json["targetAttendance"], 80);
    }
}
