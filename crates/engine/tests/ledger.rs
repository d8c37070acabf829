use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Engine, EngineError, NewUser, PaymentStatus};
use migration::MigratorTrait;

fn student(email: &str) -> NewUser {
    NewUser {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        phone: None,
        password: "secret1".to_string(),
        role: "student".to_string(),
    }
}

async fn engine_with_db() -> (Engine, String) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .default_total_fee(100_000)
        .build()
        .await
        .unwrap();
    let (user, _token) = engine
        .register_user(student("ada@example.com"))
        .await
        .unwrap();
    (engine, user.id)
}

async fn engine_with_file_db() -> (Engine, String, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .default_total_fee(100_000)
        .build()
        .await
        .unwrap();
    let (user, _token) = engine
        .register_user(student("ada@example.com"))
        .await
        .unwrap();
    (engine, user.id, db, path)
}

#[tokio::test]
async fn fee_account_is_created_once_with_default_total() {
    let (engine, user_id) = engine_with_db().await;

    let first = engine.fee_account(&user_id).await.unwrap();
    let second = engine.fee_account(&user_id).await.unwrap();

    assert_eq!(first.total_fee_minor, 100_000);
    assert_eq!(first.paid_amount_minor, 0);
    assert_eq!(first.remaining_fee_minor, 100_000);
    assert_eq!(first, second);
}

#[tokio::test]
async fn payment_moves_balance_and_records_payment() {
    let (engine, user_id) = engine_with_db().await;

    let receipt = engine
        .apply_payment(&user_id, 30_000, None, None)
        .await
        .unwrap();

    assert_eq!(receipt.account.paid_amount_minor, 30_000);
    assert_eq!(receipt.account.remaining_fee_minor, 70_000);
    assert!(receipt.account.is_consistent());
    assert_eq!(receipt.payment.amount_minor, 30_000);
    assert_eq!(receipt.payment.status, PaymentStatus::Completed);
    assert_eq!(receipt.payment.description, "Fee Payment");
    assert_eq!(receipt.payment.method, "online");

    let payments = engine.payments(&user_id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].id, receipt.payment.id);
    assert_eq!(payments[0].amount_minor, 30_000);

    let account = engine.fee_account(&user_id).await.unwrap();
    assert_eq!(account, receipt.account);
}

#[tokio::test]
async fn payment_keeps_custom_description_and_method() {
    let (engine, user_id) = engine_with_db().await;

    let receipt = engine
        .apply_payment(&user_id, 1_000, Some("Lab fee"), Some("card"))
        .await
        .unwrap();

    assert_eq!(receipt.payment.description, "Lab fee");
    assert_eq!(receipt.payment.method, "card");
}

#[tokio::test]
async fn non_positive_payment_is_rejected_without_side_effects() {
    let (engine, user_id) = engine_with_db().await;
    let before = engine.fee_account(&user_id).await.unwrap();

    for amount in [0, -500] {
        let err = engine
            .apply_payment(&user_id, amount, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    assert!(engine.payments(&user_id).await.unwrap().is_empty());
    assert_eq!(engine.fee_account(&user_id).await.unwrap(), before);
}

#[tokio::test]
async fn payment_above_remaining_fee_is_rejected_without_side_effects() {
    let (engine, user_id) = engine_with_db().await;
    engine
        .apply_payment(&user_id, 90_000, None, None)
        .await
        .unwrap();
    let before = engine.fee_account(&user_id).await.unwrap();

    let err = engine
        .apply_payment(&user_id, 10_001, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExceedsBalance(_)));

    assert_eq!(engine.payments(&user_id).await.unwrap().len(), 1);
    assert_eq!(engine.fee_account(&user_id).await.unwrap(), before);

    // Paying exactly the remaining fee is allowed.
    let receipt = engine
        .apply_payment(&user_id, 10_000, None, None)
        .await
        .unwrap();
    assert_eq!(receipt.account.remaining_fee_minor, 0);
}

#[tokio::test]
async fn fee_structure_overwrites_and_recomputes_remaining() {
    let (engine, user_id) = engine_with_db().await;
    engine
        .apply_payment(&user_id, 5_000, None, None)
        .await
        .unwrap();

    let account = engine
        .update_fee_structure(&user_id, 50_000, 20_000)
        .await
        .unwrap();

    assert_eq!(account.total_fee_minor, 50_000);
    assert_eq!(account.paid_amount_minor, 20_000);
    assert_eq!(account.remaining_fee_minor, 30_000);
    assert_eq!(engine.fee_account(&user_id).await.unwrap(), account);
}

#[tokio::test]
async fn fee_structure_creates_missing_account() {
    let (engine, user_id) = engine_with_db().await;

    let account = engine
        .update_fee_structure(&user_id, 80_000, 0)
        .await
        .unwrap();

    assert_eq!(account.remaining_fee_minor, 80_000);
}

#[tokio::test]
async fn fee_structure_may_leave_negative_remaining_fee() {
    let (engine, user_id) = engine_with_db().await;

    let account = engine
        .update_fee_structure(&user_id, 10_000, 15_000)
        .await
        .unwrap();
    assert_eq!(account.remaining_fee_minor, -5_000);

    let err = engine
        .apply_payment(&user_id, 1, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExceedsBalance(_)));
}

#[tokio::test]
async fn concurrent_payments_cannot_overdraw_the_balance() {
    let (engine, user_id, _db, path) = engine_with_file_db().await;
    engine.fee_account(&user_id).await.unwrap();

    let (first, second) = tokio::join!(
        engine.apply_payment(&user_id, 60_000, None, None),
        engine.apply_payment(&user_id, 60_000, None, None),
    );

    let (paid, rejected) = match (first, second) {
        (Ok(receipt), Err(err)) | (Err(err), Ok(receipt)) => (receipt, err),
        other => panic!("expected exactly one payment to succeed, got {other:?}"),
    };
    assert!(matches!(rejected, EngineError::ExceedsBalance(_)), "{rejected:?}");
    assert_eq!(paid.account.remaining_fee_minor, 40_000);

    let account = engine.fee_account(&user_id).await.unwrap();
    assert!(account.is_consistent());
    assert!(account.paid_amount_minor <= account.total_fee_minor);
    assert_eq!(account.paid_amount_minor, 60_000);
    assert_eq!(engine.payments(&user_id).await.unwrap().len(), 1);

    drop(engine);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn payments_are_paginated_newest_first() {
    let (engine, user_id) = engine_with_db().await;
    for amount in [1_000, 2_000, 3_000] {
        engine
            .apply_payment(&user_id, amount, None, None)
            .await
            .unwrap();
    }

    let (page, cursor) = engine.payments_page(&user_id, 2, None).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].amount_minor, 3_000);
    assert_eq!(page[1].amount_minor, 2_000);
    let cursor = cursor.unwrap();

    let (page, cursor) = engine
        .payments_page(&user_id, 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].amount_minor, 1_000);
    assert!(cursor.is_none());

    let err = engine.payments_page(&user_id, 0, None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn payments_of_other_students_are_not_listed() {
    let (engine, user_id) = engine_with_db().await;
    let (other, _) = engine
        .register_user(student("grace@example.com"))
        .await
        .unwrap();
    engine
        .apply_payment(&other.id, 1_000, None, None)
        .await
        .unwrap();

    assert!(engine.payments(&user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn overview_without_account_does_not_create_one() {
    let (engine, user_id) = engine_with_db().await;

    let overview = engine.financial_overview(&user_id).await.unwrap();
    assert_eq!(overview.total_semester_cost_minor, 0);
    assert_eq!(overview.paid_percentage, 0);

    // The account only appears on first ledger access.
    engine
        .apply_payment(&user_id, 25_000, None, None)
        .await
        .unwrap();
    let overview = engine.financial_overview(&user_id).await.unwrap();
    assert_eq!(overview.total_semester_cost_minor, 100_000);
    assert_eq!(overview.amount_paid_minor, 25_000);
    assert_eq!(overview.pending_payments_minor, 75_000);
    assert_eq!(overview.monthly_budget_minor, 25_000);
    assert_eq!(overview.paid_percentage, 25);
}
