//! Human-readable rendering of a [`Projection`].

use crate::projector::{CanMiss, NeededToAttend, Projection};

/// Pairs a projection with the target it was computed for, ready for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionReport {
    projection: Projection,
    target: f64,
}

impl ProjectionReport {
    #[must_use]
    pub fn new(projection: Projection, target: f64) -> Self {
        Self { projection, target }
    }

    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// One-line summary of where attendance stands now.
    #[must_use]
    pub fn headline(&self) -> String {
        format!(
            "Your current attendance is {}%.",
            format_percentage(self.projection.current_percentage)
        )
    }

    /// What the user can do next: classes to spare, classes to attend, or neither.
    #[must_use]
    pub fn detail(&self) -> String {
        let target = format_percentage(self.target);

        if self.projection.target_met {
            let (count, noun) = match self.projection.can_miss {
                CanMiss::Classes(n) => (n.to_string(), pluralize_classes(n)),
                CanMiss::Unbounded => ("any number of".to_string(), "classes"),
            };
            return format!(
                "Congratulations! You're on track. You can miss {count} more {noun} and still maintain your goal."
            );
        }

        match self.projection.needed_to_attend {
            NeededToAttend::Unreachable => format!(
                "Unfortunately, it's not mathematically possible to reach your target of {target}% from your current standing."
            ),
            NeededToAttend::Classes(n) => format!(
                "To reach your target of {target}%, you need to attend the next {n} {} consecutively.",
                pluralize_classes(n)
            ),
        }
    }
}

/// `"class"` for exactly one, `"classes"` otherwise.
#[must_use]
pub fn pluralize_classes(count: u64) -> &'static str {
    if count == 1 { "class" } else { "classes" }
}

/// Formats a percentage without trailing zeros (`90`, `83.33`, `85.5`).
#[must_use]
pub fn format_percentage(value: f64) -> String {
    format!("{value}")
}
