#![forbid(unsafe_code)]

pub mod model;
pub mod projector;
pub mod report;
pub mod time;

pub use projector::{AttendanceInput, CanMiss, InputError, NeededToAttend, Projection, project};
pub use report::ProjectionReport;
pub use time::Clock;
