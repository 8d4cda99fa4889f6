mod advisor_settings;
mod dashboard;
mod ids;
mod session;
mod subject;
mod tips;

pub use advisor_settings::{AdvisorSettings, AdvisorSettingsDraft, AdvisorSettingsError};
pub use dashboard::{DashboardSummary, SubjectOverview};
pub use ids::{ParseIdError, SubjectId};
pub use session::{Session, SessionError, User, UserKey};
pub use subject::{DEFAULT_TARGET, Subject, SubjectDraft, SubjectError, SubjectPatch};
pub use tips::{AttendanceRecord, Tip, should_provide_tip};
