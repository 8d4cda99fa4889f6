use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SubjectId;
use crate::projector::{self, Projection};

/// Target applied to new subjects when the user does not pick one.
pub const DEFAULT_TARGET: u8 = 85;

const MIN_NAME_CHARS: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("Subject name must be at least 2 characters.")]
    NameTooShort,

    #[error("Target must be at least 1")]
    TargetTooLow,

    #[error("Target cannot exceed 100")]
    TargetTooHigh { provided: u8 },

    #[error("Total classes must be greater than or equal to attended classes.")]
    TotalBelowAttended { attended: u32, total: u32 },
}

impl SubjectError {
    /// Name of the form field the error belongs to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            SubjectError::NameTooShort => "name",
            SubjectError::TargetTooLow | SubjectError::TargetTooHigh { .. } => "target",
            SubjectError::TotalBelowAttended { .. } => "total",
        }
    }
}

fn validate_name(name: &str) -> Result<String, SubjectError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return Err(SubjectError::NameTooShort);
    }
    Ok(trimmed.to_owned())
}

fn validate_target(target: u8) -> Result<u8, SubjectError> {
    match target {
        0 => Err(SubjectError::TargetTooLow),
        t if t > 100 => Err(SubjectError::TargetTooHigh { provided: t }),
        t => Ok(t),
    }
}

fn validate_counts(attended: u32, total: u32) -> Result<(), SubjectError> {
    if total < attended {
        return Err(SubjectError::TotalBelowAttended { attended, total });
    }
    Ok(())
}

//
// ─── DRAFT & PATCH ─────────────────────────────────────────────────────────────
//

/// User input for a brand-new subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDraft {
    pub name: String,
    pub target: u8,
}

impl SubjectDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, target: u8) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// Validate the draft into a subject with no classes recorded yet.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the name is shorter than two characters or the
    /// target is outside `1..=100`.
    pub fn validate(self, id: SubjectId, created_at: DateTime<Utc>) -> Result<Subject, SubjectError> {
        Subject::from_persisted(id, &self.name, 0, 0, self.target, created_at)
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub attended: Option<u32>,
    pub total: Option<u32>,
    pub target: Option<u8>,
}

impl SubjectPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.attended.is_none() && self.total.is_none() && self.target.is_none()
    }
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// A course the user tracks attendance for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    name: String,
    attended: u32,
    total: u32,
    target: u8,
    created_at: DateTime<Utc>,
}

impl Subject {
    /// Rehydrate a subject, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` for a short name, an out-of-range target, or
    /// `total < attended`.
    pub fn from_persisted(
        id: SubjectId,
        name: &str,
        attended: u32,
        total: u32,
        target: u8,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SubjectError> {
        let name = validate_name(name)?;
        let target = validate_target(target)?;
        validate_counts(attended, total)?;

        Ok(Self {
            id,
            name,
            attended,
            total,
            target,
            created_at,
        })
    }

    /// Merge a partial update into a copy of this subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the merged subject breaks an invariant.
    pub fn apply(&self, patch: SubjectPatch) -> Result<Self, SubjectError> {
        let name = patch.name.unwrap_or_else(|| self.name.clone());
        Self::from_persisted(
            self.id,
            &name,
            patch.attended.unwrap_or(self.attended),
            patch.total.unwrap_or(self.total),
            patch.target.unwrap_or(self.target),
            self.created_at,
        )
    }

    /// Record a class the user attended.
    pub fn record_present(&mut self) {
        if self.total == u32::MAX {
            return;
        }
        self.attended += 1;
        self.total += 1;
    }

    /// Record a class the user missed.
    pub fn record_absent(&mut self) {
        self.total = self.total.saturating_add(1);
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attended(&self) -> u32 {
        self.attended
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn target(&self) -> u8 {
        self.target
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whole-number attendance percentage, 0 before any class is held.
    #[must_use]
    pub fn attendance_percentage(&self) -> u32 {
        projector::whole_percentage(u64::from(self.attended), u64::from(self.total))
    }

    /// True once classes have been held and the rounded percentage is under target.
    #[must_use]
    pub fn is_below_target(&self) -> bool {
        self.total > 0 && self.attendance_percentage() < u32::from(self.target)
    }

    #[must_use]
    pub fn projection(&self) -> Projection {
        projector::project(self.attended, self.total, f64::from(self.target))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::NeededToAttend;
    use crate::time::fixed_now;

    fn subject(attended: u32, total: u32, target: u8) -> Subject {
        Subject::from_persisted(
            SubjectId::generate(),
            "Quantum Physics",
            attended,
            total,
            target,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn draft_starts_with_no_classes() {
        let s = SubjectDraft::new("  Advanced AI  ", 85)
            .validate(SubjectId::generate(), fixed_now())
            .unwrap();
        assert_eq!(s.name(), "Advanced AI");
        assert_eq!(s.attended(), 0);
        assert_eq!(s.total(), 0);
        assert_eq!(s.target(), 85);
    }

    #[test]
    fn draft_rejects_short_name() {
        let err = SubjectDraft::new(" A ", 85)
            .validate(SubjectId::generate(), fixed_now())
            .unwrap_err();
        assert_eq!(err, SubjectError::NameTooShort);
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn draft_rejects_out_of_range_target() {
        let err = SubjectDraft::new("Chemistry", 0)
            .validate(SubjectId::generate(), fixed_now())
            .unwrap_err();
        assert_eq!(err, SubjectError::TargetTooLow);

        let err = SubjectDraft::new("Chemistry", 101)
            .validate(SubjectId::generate(), fixed_now())
            .unwrap_err();
        assert_eq!(err, SubjectError::TargetTooHigh { provided: 101 });
        assert_eq!(err.to_string(), "Target cannot exceed 100");
    }

    #[test]
    fn persisted_rejects_total_below_attended() {
        let err = Subject::from_persisted(SubjectId::generate(), "History", 4, 3, 80, fixed_now())
            .unwrap_err();
        assert_eq!(err, SubjectError::TotalBelowAttended { attended: 4, total: 3 });
    }

    #[test]
    fn present_and_absent_update_counts() {
        let mut s = subject(18, 20, 90);
        s.record_present();
        assert_eq!((s.attended(), s.total()), (19, 21));
        s.record_absent();
        assert_eq!((s.attended(), s.total()), (19, 22));
    }

    #[test]
    fn present_at_capacity_is_ignored() {
        let mut s = subject(u32::MAX, u32::MAX, 90);
        s.record_present();
        assert_eq!((s.attended(), s.total()), (u32::MAX, u32::MAX));
        s.record_absent();
        assert_eq!(s.total(), u32::MAX);
    }

    #[test]
    fn apply_merges_only_given_fields() {
        let s = subject(18, 20, 90);
        let updated = s
            .apply(SubjectPatch {
                target: Some(75),
                ..SubjectPatch::default()
            })
            .unwrap();
        assert_eq!(updated.id(), s.id());
        assert_eq!(updated.name(), "Quantum Physics");
        assert_eq!(updated.attended(), 18);
        assert_eq!(updated.total(), 20);
        assert_eq!(updated.target(), 75);
    }

    #[test]
    fn apply_revalidates_merged_counts() {
        let s = subject(18, 20, 90);
        let err = s
            .apply(SubjectPatch {
                attended: Some(25),
                ..SubjectPatch::default()
            })
            .unwrap_err();
        assert_eq!(err, SubjectError::TotalBelowAttended { attended: 25, total: 20 });
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(SubjectPatch::default().is_empty());
        assert!(!SubjectPatch {
            name: Some("Math".into()),
            ..SubjectPatch::default()
        }
        .is_empty());
    }

    #[test]
    fn percentage_is_rounded_to_whole_number() {
        assert_eq!(subject(12, 15, 80).attendance_percentage(), 80);
        assert_eq!(subject(22, 25, 85).attendance_percentage(), 88);
        assert_eq!(subject(30, 35, 90).attendance_percentage(), 86);
        assert_eq!(subject(0, 0, 90).attendance_percentage(), 0);
    }

    #[test]
    fn below_target_requires_held_classes() {
        assert!(subject(30, 35, 90).is_below_target());
        assert!(!subject(18, 20, 90).is_below_target());
        assert!(!subject(0, 0, 90).is_below_target());
    }

    #[test]
    fn below_target_uses_rounded_percentage() {
        // 89.6% rounds to 90%, which is not below a 90% target.
        assert!(!subject(172, 192, 90).is_below_target());
    }

    #[test]
    fn projection_uses_subject_counts() {
        let p = subject(10, 20, 90).projection();
        assert_eq!(p.needed_to_attend, NeededToAttend::Classes(80));
    }
}
