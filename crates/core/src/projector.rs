use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest attendance target a user may set, in percent.
pub const MIN_TARGET: f64 = 1.0;

/// Highest attendance target a user may set, in percent.
pub const MAX_TARGET: f64 = 100.0;

/// Maximum number of ±1 corrections applied to a closed-form result.
const SETTLE_STEPS: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Field-level validation failures for calculator input.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum InputError {
    #[error("Please enter a number.")]
    TargetNotANumber,

    #[error("Target must be at least 1%")]
    TargetTooLow { provided: f64 },

    #[error("Target cannot exceed 100%")]
    TargetTooHigh { provided: f64 },

    #[error("Total classes must be greater than or equal to attended classes.")]
    TotalBelowAttended { attended: u32, total: u32 },
}

impl InputError {
    /// Name of the form field the error belongs to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            InputError::TargetNotANumber
            | InputError::TargetTooLow { .. }
            | InputError::TargetTooHigh { .. } => "target",
            InputError::TotalBelowAttended { .. } => "total",
        }
    }
}

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

/// Validated attendance counts and target.
///
/// Holding one of these guarantees `total >= attended` and a target in `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendanceInput {
    attended: u32,
    total: u32,
    target: f64,
}

impl AttendanceInput {
    /// Validate raw calculator input.
    ///
    /// # Errors
    ///
    /// Returns `InputError` naming the first offending field.
    pub fn new(attended: u32, total: u32, target: f64) -> Result<Self, InputError> {
        if target.is_nan() {
            return Err(InputError::TargetNotANumber);
        }
        if target < MIN_TARGET {
            return Err(InputError::TargetTooLow { provided: target });
        }
        if target > MAX_TARGET {
            return Err(InputError::TargetTooHigh { provided: target });
        }
        if total < attended {
            return Err(InputError::TotalBelowAttended { attended, total });
        }

        Ok(Self {
            attended,
            total,
            target,
        })
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
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Run the projection for this input.
    #[must_use]
    pub fn project(&self) -> Projection {
        project(self.attended, self.total, self.target)
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Classes that must be attended back to back to reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeededToAttend {
    Classes(u64),
    /// No number of attended classes gets there.
    Unreachable,
}

impl NeededToAttend {
    #[must_use]
    pub fn classes(&self) -> Option<u64> {
        match self {
            NeededToAttend::Classes(n) => Some(*n),
            NeededToAttend::Unreachable => None,
        }
    }
}

/// Classes that may still be missed while staying at or above the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanMiss {
    Classes(u64),
    Unbounded,
}

impl CanMiss {
    #[must_use]
    pub fn classes(&self) -> Option<u64> {
        match self {
            CanMiss::Classes(n) => Some(*n),
            CanMiss::Unbounded => None,
        }
    }
}

/// Outcome of projecting attendance against a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Current attendance, rounded to two decimals.
    pub current_percentage: f64,
    pub target_met: bool,
    pub needed_to_attend: NeededToAttend,
    /// Only non-zero when `target_met` holds.
    pub can_miss: CanMiss,
}

impl Projection {
    fn met(current_percentage: f64, can_miss: CanMiss) -> Self {
        Self {
            current_percentage,
            target_met: true,
            needed_to_attend: NeededToAttend::Classes(0),
            can_miss,
        }
    }

    fn not_met(current_percentage: f64, needed_to_attend: NeededToAttend) -> Self {
        Self {
            current_percentage,
            target_met: false,
            needed_to_attend,
            can_miss: CanMiss::Classes(0),
        }
    }
}

//
// ─── PROJECTION ────────────────────────────────────────────────────────────────
//

/// Project attendance against a target percentage.
///
/// Callers are expected to validate input first (see [`AttendanceInput`]), but
/// any combination of values is accepted here and degrades instead of panicking.
///
/// With no classes held yet the percentage is 0, the target counts as not met and
/// the closed form yields `Classes(0)`; that output is returned as is.
///
/// # Examples
///
/// ```
/// # use attend_core::projector::{project, NeededToAttend};
/// let projection = project(10, 20, 90.0);
/// assert!(!projection.target_met);
/// assert_eq!(projection.needed_to_attend, NeededToAttend::Classes(80));
/// ```
#[must_use]
pub fn project(attended: u32, total: u32, target: f64) -> Projection {
    let current_percentage = round2(raw_percentage(attended, total));

    if meets_target(attended, total, target) {
        return Projection::met(current_percentage, can_miss(attended, total, target));
    }

    if target >= MAX_TARGET || MAX_TARGET - target <= 0.0 {
        return Projection::not_met(current_percentage, NeededToAttend::Unreachable);
    }

    let needed =
        (target * f64::from(total) - MAX_TARGET * f64::from(attended)) / (MAX_TARGET - target);
    if needed.is_nan() {
        return Projection::not_met(current_percentage, NeededToAttend::Unreachable);
    }
    if needed < 0.0 {
        return Projection::met(current_percentage, CanMiss::Classes(0));
    }

    let n = saturating_u64(needed.ceil());
    let n = if total == 0 {
        n
    } else {
        settle_needed(attended, total, target, n)
    };

    Projection::not_met(current_percentage, NeededToAttend::Classes(n))
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole-number percentage used on subject cards and the dashboard.
///
/// Returns 0 when nothing has been held yet.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_percentage(attended: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((attended as f64 / total as f64) * 100.0).round() as u32
}

fn raw_percentage(attended: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(attended) / f64::from(total)) * 100.0
}

// Compared as a product so exact hits like 18/20 at 90% are not lost to division.
fn meets_target(attended: u32, total: u32, target: f64) -> bool {
    if total == 0 {
        return 0.0 >= target;
    }
    holds_after(attended, total, target, 0, 0)
}

#[allow(clippy::cast_precision_loss)]
fn holds_after(attended: u32, total: u32, target: f64, extra_attended: u64, extra_total: u64) -> bool {
    let attended = f64::from(attended) + extra_attended as f64;
    let total = f64::from(total) + extra_total as f64;
    attended * MAX_TARGET >= target * total
}

fn can_miss(attended: u32, total: u32, target: f64) -> CanMiss {
    if target <= 0.0 {
        return CanMiss::Unbounded;
    }

    let raw = (f64::from(attended) * MAX_TARGET / target - f64::from(total)).floor();
    if !raw.is_finite() || raw >= u64_ceiling() {
        return CanMiss::Unbounded;
    }
    if raw < 0.0 {
        return CanMiss::Classes(0);
    }

    let mut m = saturating_u64(raw);
    for _ in 0..SETTLE_STEPS {
        if m > 0 && !holds_after(attended, total, target, 0, m) {
            m -= 1;
        } else {
            break;
        }
    }
    for _ in 0..SETTLE_STEPS {
        if holds_after(attended, total, target, 0, m.saturating_add(1)) {
            m = m.saturating_add(1);
        } else {
            break;
        }
    }

    CanMiss::Classes(m)
}

fn settle_needed(attended: u32, total: u32, target: f64, mut n: u64) -> u64 {
    for _ in 0..SETTLE_STEPS {
        if n > 0 && holds_after(attended, total, target, n - 1, n - 1) {
            n -= 1;
        } else {
            break;
        }
    }
    for _ in 0..SETTLE_STEPS {
        if holds_after(attended, total, target, n, n) {
            break;
        }
        n = n.saturating_add(1);
    }
    n
}

#[allow(clippy::cast_precision_loss)]
fn u64_ceiling() -> f64 {
    u64::MAX as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturating_u64(value: f64) -> u64 {
    // `as` saturates at the bounds and maps NaN to 0.
    value as u64
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
