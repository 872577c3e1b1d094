//! Repository and service tests against a migrated database.
//!
//! These tests require a `PostgreSQL` database with both schemas migrated
//! (sw-cli migrate all) and `DATABASE_URL` pointing at it.
//!
//! Run with: cargo test -p shelfwise-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use sqlx::PgPool;

use shelfwise_admin::db::{BookRepository as AdminBookRepository, ReaderRepository};
use shelfwise_admin::services::{CatalogAdminError, CatalogAdminService};
use shelfwise_core::{BookDetails, BookId, Email, OwnershipType, ReadingStatus, UserId};
use shelfwise_integration_tests::{pool, unique_email, unique_isbn};
use shelfwise_web::db::{
    BookshelfStore, GoalStore, Insertion, PgBookshelfStore, PgGoalStore, RepositoryError,
    UserRepository,
};
use shelfwise_web::models::StatusChange;
use shelfwise_web::services::{AuthError, AuthService, BookshelfService, ShelfError};

async fn create_reader(pool: &PgPool) -> UserId {
    let email = Email::parse(&unique_email("repo")).unwrap();
    UserRepository::new(pool)
        .create_with_password(&email, "Repo Reader", "not-a-real-hash")
        .await
        .unwrap()
        .id
}

async fn create_book(pool: &PgPool, title: &str) -> BookId {
    let details = BookDetails {
        title: title.to_owned(),
        author: "Integration Author".to_owned(),
        isbn: Some(unique_isbn()),
        page_count: Some(320),
        ..BookDetails::default()
    };
    AdminBookRepository::new(pool)
        .create(&details)
        .await
        .unwrap()
        .id
}

async fn cleanup(pool: &PgPool, user_id: UserId, book_id: Option<BookId>) {
    ReaderRepository::new(pool).delete(user_id).await.unwrap();
    if let Some(book_id) = book_id {
        AdminBookRepository::new(pool).delete(book_id).await.unwrap();
    }
}

// ============================================================================
// Goals
// ============================================================================

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_goal_insert_if_absent() {
    let pool = pool().await;
    let user_id = create_reader(&pool).await;
    let store = PgGoalStore::new(pool.clone());

    let first = store.insert_if_absent(user_id, 2031, 12).await.unwrap();
    let Insertion::Created(goal) = first else {
        panic!("first insert should create the goal");
    };
    assert_eq!(goal.target_books, 12);
    assert_eq!(goal.books_read, 0);

    let second = store.insert_if_absent(user_id, 2031, 40).await.unwrap();
    assert!(matches!(second, Insertion::AlreadyExists));

    // The losing insert did not overwrite the stored target
    let stored = store.get(user_id, 2031).await.unwrap().unwrap();
    assert_eq!(stored.target_books, 12);

    cleanup(&pool, user_id, None).await;
}

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_goal_progress_past_target_and_floor() {
    let pool = pool().await;
    let user_id = create_reader(&pool).await;
    let store = PgGoalStore::new(pool.clone());
    store.insert_if_absent(user_id, 2032, 1).await.unwrap();

    let goal = store.adjust_books_read(user_id, 2032, 3).await.unwrap().unwrap();
    assert_eq!(goal.books_read, 3);

    let goal = store.set_books_read(user_id, 2032, 0).await.unwrap().unwrap();
    assert_eq!(goal.books_read, 0);

    assert!(store.delete(user_id, 2032).await.unwrap());
    assert!(store.get(user_id, 2032).await.unwrap().is_none());

    cleanup(&pool, user_id, None).await;
}

// ============================================================================
// Bookshelf
// ============================================================================

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_shelf_insert_if_absent_and_missing_book() {
    let pool = pool().await;
    let user_id = create_reader(&pool).await;
    let book_id = create_book(&pool, "Shelf Insert").await;
    let store = PgBookshelfStore::new(pool.clone());
    let initial = StatusChange {
        status: ReadingStatus::WantToRead,
        date_started: None,
        date_finished: None,
    };

    let first = store
        .insert_if_absent(user_id, book_id, OwnershipType::Ebook, initial)
        .await
        .unwrap();
    assert!(matches!(first, Insertion::Created(ref e) if e.ownership == OwnershipType::Ebook));

    let second = store
        .insert_if_absent(user_id, book_id, OwnershipType::Physical, initial)
        .await
        .unwrap();
    assert!(matches!(second, Insertion::AlreadyExists));

    let missing = store
        .insert_if_absent(user_id, BookId::new(i32::MAX), OwnershipType::Physical, initial)
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));

    cleanup(&pool, user_id, Some(book_id)).await;
}

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_shelf_service_stamps_reading_dates() {
    let pool = pool().await;
    let user_id = create_reader(&pool).await;
    let book_id = create_book(&pool, "Date Stamping").await;
    let shelf = BookshelfService::new(PgBookshelfStore::new(pool.clone()));
    let today = Utc::now().date_naive();

    let entry = shelf
        .add_book_to_shelf(user_id, book_id, ReadingStatus::Reading, OwnershipType::Physical)
        .await
        .unwrap();
    assert_eq!(entry.date_started, Some(today));
    assert_eq!(entry.date_finished, None);

    let entry = shelf
        .update_status(user_id, book_id, ReadingStatus::Read, None, None)
        .await
        .unwrap();
    assert_eq!(entry.status, ReadingStatus::Read);
    assert_eq!(entry.date_started, Some(today));
    assert_eq!(entry.date_finished, Some(today));

    let again = shelf
        .add_book_to_shelf(user_id, book_id, ReadingStatus::WantToRead, OwnershipType::Physical)
        .await;
    assert!(matches!(again, Err(ShelfError::AlreadyOnShelf)));

    cleanup(&pool, user_id, Some(book_id)).await;
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_catalog_duplicate_isbn() {
    let pool = pool().await;
    let catalog = CatalogAdminService::new(&pool);
    let details = BookDetails {
        title: "Duplicate Check".to_owned(),
        author: "Integration Author".to_owned(),
        isbn: Some(unique_isbn()),
        ..BookDetails::default()
    };

    let book = catalog.add_book(details.clone()).await.unwrap();
    let again = catalog.add_book(details).await;
    assert!(matches!(again, Err(CatalogAdminError::DuplicateIsbn)));

    catalog.delete_book(book.id).await.unwrap();
    assert!(matches!(
        catalog.get(book.id).await,
        Err(CatalogAdminError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_restricted_reader_cannot_sign_in() {
    let pool = pool().await;
    let email = unique_email("restricted");
    let auth = AuthService::new(&pool);
    let user = auth
        .register(&email, "Restricted Reader", "long enough password")
        .await
        .unwrap();

    assert!(
        ReaderRepository::new(&pool)
            .set_restricted(user.id, true)
            .await
            .unwrap()
    );

    let login = auth.login(&email, "long enough password").await;
    assert!(matches!(login, Err(AuthError::AccountRestricted)));

    ReaderRepository::new(&pool)
        .set_restricted(user.id, false)
        .await
        .unwrap();
    assert!(auth.login(&email, "long enough password").await.is_ok());

    cleanup(&pool, user.id, None).await;
}
