use std::sync::Arc;

use attend_core::model::AdvisorSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::auth_service::AuthService;
use crate::error::AppServicesError;
use crate::subject_service::SubjectService;
use crate::tips::{ChatTipAdvisor, TipAdvisor, TipsService};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<AuthService>,
    subjects: Arc<SubjectService>,
    tips: Arc<TipsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the chat tip advisor.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        advisor: &AdvisorSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_parts(
            storage,
            clock,
            Arc::new(ChatTipAdvisor::new(advisor)),
        ))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, advisor: Arc<dyn TipAdvisor>) -> Self {
        Self::from_parts(Storage::in_memory(), clock, advisor)
    }

    #[must_use]
    pub fn from_parts(storage: Storage, clock: Clock, advisor: Arc<dyn TipAdvisor>) -> Self {
        let auth = Arc::new(AuthService::new(Arc::clone(&storage.sessions)));
        let subjects = Arc::new(SubjectService::new(clock, Arc::clone(&storage.subjects)));
        let tips = Arc::new(TipsService::new(advisor, Arc::clone(&subjects)));
        Self {
            auth,
            subjects,
            tips,
        }
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn subjects(&self) -> Arc<SubjectService> {
        Arc::clone(&self.subjects)
    }

    #[must_use]
    pub fn tips(&self) -> Arc<TipsService> {
        Arc::clone(&self.tips)
    }
}
