//! Attendance tips: which subjects deserve advice and who writes it.

use std::sync::Arc;

use async_trait::async_trait;
use attend_core::model::{AttendanceRecord, Session, Tip};
use tracing::error;

use crate::error::{TipError, TipsServiceError};
use crate::subject_service::SubjectService;

mod chat;
mod prompt;

pub use chat::{ChatTipAdvisor, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, render_tip_prompt};

/// Produces tips for the records that fall short of their target.
#[async_trait]
pub trait TipAdvisor: Send + Sync {
    /// # Errors
    ///
    /// Returns `TipError` if the backend is unavailable or a request fails.
    async fn generate_tips(&self, records: &[AttendanceRecord]) -> Result<Vec<Tip>, TipError>;
}

#[derive(Clone)]
pub struct TipsService {
    advisor: Arc<dyn TipAdvisor>,
    subjects: Arc<SubjectService>,
}

impl TipsService {
    #[must_use]
    pub fn new(advisor: Arc<dyn TipAdvisor>, subjects: Arc<SubjectService>) -> Self {
        Self { advisor, subjects }
    }

    /// Generate tips for the session's subjects. Guests get none.
    ///
    /// # Errors
    ///
    /// Returns `TipsServiceError::Unavailable` for any failure along the way.
    pub async fn generate_for(&self, session: &Session) -> Result<Vec<Tip>, TipsServiceError> {
        if !session.is_authenticated() {
            return Ok(Vec::new());
        }

        let subjects = self.subjects.list(session).await.map_err(|err| {
            error!(error = %err, "failed to load subjects for tips");
            TipsServiceError::Unavailable
        })?;
        let records: Vec<_> = subjects.iter().map(AttendanceRecord::from_subject).collect();

        self.advisor.generate_tips(&records).await.map_err(|err| {
            error!(error = %err, "tip generation failed");
            TipsServiceError::Unavailable
        })
    }
}
