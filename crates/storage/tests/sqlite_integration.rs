use attend_core::model::{Subject, SubjectDraft, SubjectId, User};
use attend_core::time::fixed_now;
use storage::repository::{SessionRepository, StorageError, SubjectRepository};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_subject(name: &str, target: u8) -> Subject {
    SubjectDraft::new(name, target)
        .validate(SubjectId::generate(), fixed_now())
        .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_subject_fields_and_order() {
    let repo = connect("memdb_subject_roundtrip").await;
    let user = User::new("alice@example.com").unwrap().key();

    let mut physics = build_subject("Quantum Physics", 90);
    let chemistry = build_subject("Organic Chemistry", 85);
    repo.insert_subject(&user, &physics).await.unwrap();
    repo.insert_subject(&user, &chemistry).await.unwrap();

    physics.record_present();
    physics.record_absent();
    repo.update_subject(&user, &physics).await.unwrap();

    let listed = repo.list_subjects(&user).await.expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id(), physics.id());
    assert_eq!(listed[0].attended(), 1);
    assert_eq!(listed[0].total(), 2);
    assert_eq!(listed[0].target(), 90);
    assert_eq!(listed[0].created_at(), fixed_now());
    assert_eq!(listed[1].name(), "Organic Chemistry");

    let fetched = repo.get_subject(&user, chemistry.id()).await.unwrap();
    assert_eq!(fetched, Some(chemistry));
}

#[tokio::test]
async fn sqlite_isolates_users_and_reports_missing_rows() {
    let repo = connect("memdb_subject_isolation").await;
    let alice = User::new("alice@example.com").unwrap().key();
    let bob = User::new("bob@example.com").unwrap().key();

    let subject = build_subject("World History", 90);
    repo.insert_subject(&alice, &subject).await.unwrap();

    assert!(repo.list_subjects(&bob).await.unwrap().is_empty());
    assert!(matches!(
        repo.update_subject(&bob, &subject).await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.delete_subject(&bob, subject.id()).await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.insert_subject(&alice, &subject).await,
        Err(StorageError::Conflict)
    ));

    repo.delete_subject(&alice, subject.id()).await.unwrap();
    assert!(repo.list_subjects(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_remembers_signed_in_user() {
    let repo = connect("memdb_signed_in_user").await;
    assert!(repo.current_user().await.unwrap().is_none());

    repo.save_user(&User::new("first@example.com").unwrap())
        .await
        .unwrap();
    repo.save_user(&User::new("second@example.com").unwrap())
        .await
        .unwrap();
    let current = repo.current_user().await.unwrap().expect("user stored");
    assert_eq!(current.email(), "second@example.com");

    repo.clear_user().await.unwrap();
    assert!(repo.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}
