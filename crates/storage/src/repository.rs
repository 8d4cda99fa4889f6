use async_trait::async_trait;
use attend_core::model::{Subject, SubjectId, User, UserKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for a user's subjects.
///
/// Every call is scoped to a `UserKey`; one user never sees another's subjects.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// List subjects in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subjects cannot be read.
    async fn list_subjects(&self, user: &UserKey) -> Result<Vec<Subject>, StorageError>;

    /// Fetch a single subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be read.
    async fn get_subject(
        &self,
        user: &UserKey,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError>;

    /// Persist a new subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is already taken for this user.
    async fn insert_subject(&self, user: &UserKey, subject: &Subject) -> Result<(), StorageError>;

    /// Overwrite an existing subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subject does not exist.
    async fn update_subject(&self, user: &UserKey, subject: &Subject) -> Result<(), StorageError>;

    /// Remove a subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subject does not exist.
    async fn delete_subject(&self, user: &UserKey, id: SubjectId) -> Result<(), StorageError>;
}

/// Persistence for the signed-in user of the mock login.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the stored user cannot be read.
    async fn current_user(&self) -> Result<Option<User>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn save_user(&self, user: &User) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the stored user cannot be removed.
    async fn clear_user(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    subjects: Arc<Mutex<HashMap<UserKey, Vec<Subject>>>>,
    current_user: Arc<Mutex<Option<User>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn list_subjects(&self, user: &UserKey) -> Result<Vec<Subject>, StorageError> {
        let guard = self.subjects.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn get_subject(
        &self,
        user: &UserKey,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError> {
        let guard = self.subjects.lock().map_err(poisoned)?;
        Ok(guard
            .get(user)
            .and_then(|list| list.iter().find(|s| s.id() == id))
            .cloned())
    }

    async fn insert_subject(&self, user: &UserKey, subject: &Subject) -> Result<(), StorageError> {
        let mut guard = self.subjects.lock().map_err(poisoned)?;
        let list = guard.entry(user.clone()).or_default();
        if list.iter().any(|s| s.id() == subject.id()) {
            return Err(StorageError::Conflict);
        }
        list.push(subject.clone());
        Ok(())
    }

    async fn update_subject(&self, user: &UserKey, subject: &Subject) -> Result<(), StorageError> {
        let mut guard = self.subjects.lock().map_err(poisoned)?;
        let slot = guard
            .get_mut(user)
            .and_then(|list| list.iter_mut().find(|s| s.id() == subject.id()))
            .ok_or(StorageError::NotFound)?;
        *slot = subject.clone();
        Ok(())
    }

    async fn delete_subject(&self, user: &UserKey, id: SubjectId) -> Result<(), StorageError> {
        let mut guard = self.subjects.lock().map_err(poisoned)?;
        let list = guard.get_mut(user).ok_or(StorageError::NotFound)?;
        let before = list.len();
        list.retain(|s| s.id() != id);
        if list.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn current_user(&self) -> Result<Option<User>, StorageError> {
        let guard = self.current_user.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self.current_user.lock().map_err(poisoned)?;
        *guard = Some(user.clone());
        Ok(())
    }

    async fn clear_user(&self) -> Result<(), StorageError> {
        let mut guard = self.current_user.lock().map_err(poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub subjects: Arc<dyn SubjectRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let subjects: Arc<dyn SubjectRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo);
        Self { subjects, sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attend_core::time::fixed_now;

    fn build_subject(name: &str) -> Subject {
        Subject::from_persisted(SubjectId::generate(), name, 0, 0, 85, fixed_now()).unwrap()
    }

    fn key(email: &str) -> UserKey {
        User::new(email).unwrap().key()
    }

    #[tokio::test]
    async fn lists_subjects_in_insertion_order() {
        let repo = InMemoryRepository::new();
        let alice = key("alice@example.com");
        let first = build_subject("Physics");
        let second = build_subject("Chemistry");
        repo.insert_subject(&alice, &first).await.unwrap();
        repo.insert_subject(&alice, &second).await.unwrap();

        let listed = repo.list_subjects(&alice).await.unwrap();
        let names: Vec<_> = listed.iter().map(Subject::name).collect();
        assert_eq!(names, ["Physics", "Chemistry"]);
    }

    #[tokio::test]
    async fn subjects_are_isolated_per_user() {
        let repo = InMemoryRepository::new();
        let alice = key("alice@example.com");
        let bob = key("bob@example.com");
        let subject = build_subject("Physics");
        repo.insert_subject(&alice, &subject).await.unwrap();

        assert!(repo.list_subjects(&bob).await.unwrap().is_empty());
        assert!(repo.get_subject(&bob, subject.id()).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_subject(&bob, subject.id()).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let repo = InMemoryRepository::new();
        let alice = key("alice@example.com");
        let subject = build_subject("Physics");
        repo.insert_subject(&alice, &subject).await.unwrap();
        assert!(matches!(
            repo.insert_subject(&alice, &subject).await,
            Err(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let repo = InMemoryRepository::new();
        let alice = key("alice@example.com");
        let mut subject = build_subject("Physics");
        repo.insert_subject(&alice, &subject).await.unwrap();

        subject.record_absent();
        repo.update_subject(&alice, &subject).await.unwrap();
        let fetched = repo.get_subject(&alice, subject.id()).await.unwrap().unwrap();
        assert_eq!(fetched.total(), 1);

        repo.delete_subject(&alice, subject.id()).await.unwrap();
        assert!(repo.list_subjects(&alice).await.unwrap().is_empty());
        assert!(matches!(
            repo.update_subject(&alice, &subject).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn current_user_can_be_saved_and_cleared() {
        let repo = InMemoryRepository::new();
        assert!(repo.current_user().await.unwrap().is_none());

        let user = User::new("m@example.com").unwrap();
        repo.save_user(&user).await.unwrap();
        assert_eq!(repo.current_user().await.unwrap(), Some(user));

        repo.clear_user().await.unwrap();
        assert!(repo.current_user().await.unwrap().is_none());
    }
}
