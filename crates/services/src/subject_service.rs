use std::sync::Arc;

use attend_core::model::{
    DashboardSummary, Session, Subject, SubjectDraft, SubjectId, SubjectPatch, UserKey,
};
use storage::repository::{StorageError, SubjectRepository};
use tracing::{debug, info};

use crate::Clock;
use crate::error::SubjectServiceError;

/// CRUD over the signed-in user's subjects.
///
/// Guest sessions read an empty list and every write is a no-op.
#[derive(Clone)]
pub struct SubjectService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
}

impl SubjectService {
    #[must_use]
    pub fn new(clock: Clock, subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { clock, subjects }
    }

    /// List the session's subjects in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn list(&self, session: &Session) -> Result<Vec<Subject>, SubjectServiceError> {
        let Some(user) = session.user_key() else {
            return Ok(Vec::new());
        };
        Ok(self.subjects.list_subjects(&user).await?)
    }

    /// Create a subject with no classes recorded.
    ///
    /// Returns `Ok(None)` for guest sessions.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` for validation failures.
    /// Returns `SubjectServiceError::Storage` if persistence fails.
    pub async fn add(
        &self,
        session: &Session,
        draft: SubjectDraft,
    ) -> Result<Option<Subject>, SubjectServiceError> {
        let Some(user) = writable(session, "add") else {
            return Ok(None);
        };

        let subject = draft.validate(SubjectId::generate(), self.clock.now())?;
        self.subjects.insert_subject(&user, &subject).await?;
        info!(subject_id = %subject.id(), name = subject.name(), "subject added");
        Ok(Some(subject))
    }

    /// Merge a partial update into an existing subject.
    ///
    /// Returns `Ok(None)` for guest sessions.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` if the merged subject is invalid.
    /// Returns `SubjectServiceError::Storage` (`NotFound`) if the subject does not exist.
    pub async fn update(
        &self,
        session: &Session,
        id: SubjectId,
        patch: SubjectPatch,
    ) -> Result<Option<Subject>, SubjectServiceError> {
        let Some(user) = writable(session, "update") else {
            return Ok(None);
        };

        let current = self.fetch(&user, id).await?;
        let updated = current.apply(patch)?;
        self.subjects.update_subject(&user, &updated).await?;
        info!(subject_id = %id, "subject updated");
        Ok(Some(updated))
    }

    /// Record an attended class.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if the subject is missing or persistence fails.
    pub async fn mark_present(
        &self,
        session: &Session,
        id: SubjectId,
    ) -> Result<Option<Subject>, SubjectServiceError> {
        self.record(session, id, Subject::record_present, "present").await
    }

    /// Record a missed class.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if the subject is missing or persistence fails.
    pub async fn mark_absent(
        &self,
        session: &Session,
        id: SubjectId,
    ) -> Result<Option<Subject>, SubjectServiceError> {
        self.record(session, id, Subject::record_absent, "absent").await
    }

    /// Remove a subject and its attendance.
    ///
    /// Returns `Ok(false)` for guest sessions.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` (`NotFound`) if the subject does not exist.
    pub async fn delete(&self, session: &Session, id: SubjectId) -> Result<bool, SubjectServiceError> {
        let Some(user) = writable(session, "delete") else {
            return Ok(false);
        };

        self.subjects.delete_subject(&user, id).await?;
        info!(subject_id = %id, "subject deleted");
        Ok(true)
    }

    /// Aggregate figures for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn dashboard(
        &self,
        session: &Session,
    ) -> Result<DashboardSummary, SubjectServiceError> {
        let subjects = self.list(session).await?;
        Ok(DashboardSummary::from_subjects(&subjects))
    }

    async fn record(
        &self,
        session: &Session,
        id: SubjectId,
        apply: fn(&mut Subject),
        mark: &'static str,
    ) -> Result<Option<Subject>, SubjectServiceError> {
        let Some(user) = writable(session, mark) else {
            return Ok(None);
        };

        let mut subject = self.fetch(&user, id).await?;
        apply(&mut subject);
        self.subjects.update_subject(&user, &subject).await?;
        debug!(
            subject_id = %id,
            mark,
            attended = subject.attended(),
            total = subject.total(),
            "attendance recorded"
        );
        Ok(Some(subject))
    }

    async fn fetch(&self, user: &UserKey, id: SubjectId) -> Result<Subject, SubjectServiceError> {
        let subject = self
            .subjects
            .get_subject(user, id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(subject)
    }
}

fn writable(session: &Session, action: &'static str) -> Option<UserKey> {
    let user = session.user_key();
    if user.is_none() {
        debug!(action, "ignoring subject write for guest session");
    }
    user
}
