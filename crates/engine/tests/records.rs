use chrono::{TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{Engine, EngineError, ExpenseCategory, NewExpense, NewUser, documents};
use migration::MigratorTrait;

fn new_user(email: &str, password: &str) -> NewUser {
    NewUser {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: email.to_string(),
        phone: Some("555-0100".to_string()),
        password: password.to_string(),
        role: "parent".to_string(),
    }
}

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn engine_with_user() -> (Engine, String) {
    let engine = engine_with_db().await;
    let (user, _) = engine
        .register_user(new_user("grace@example.com", "secret1"))
        .await
        .unwrap();
    (engine, user.id)
}

fn expense(description: &str, amount_minor: i64, category: &str) -> NewExpense {
    NewExpense {
        description: description.to_string(),
        amount_minor,
        category: category.to_string(),
        date: None,
        method: None,
    }
}

#[tokio::test]
async fn register_then_login_and_resolve_token() {
    let engine = engine_with_db().await;

    let (user, token) = engine
        .register_user(new_user("Grace@Example.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(user.email, "grace@example.com");
    assert_eq!(user.role, "parent");
    assert_eq!(engine.user_by_token(&token).await.unwrap(), user);

    let (logged, second_token) = engine.login("grace@example.com", "secret1").await.unwrap();
    assert_eq!(logged, user);
    assert_ne!(second_token, token);
    assert_eq!(engine.user_by_token(&second_token).await.unwrap(), user);
    assert_eq!(engine.user(&user.id).await.unwrap(), user);
}

#[tokio::test]
async fn register_rejects_invalid_and_duplicate_users() {
    let engine = engine_with_db().await;

    let err = engine
        .register_user(new_user("grace@example.com", "short"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let mut missing_role = new_user("grace@example.com", "secret1");
    missing_role.role = " ".to_string();
    let err = engine.register_user(missing_role).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    engine
        .register_user(new_user("grace@example.com", "secret1"))
        .await
        .unwrap();
    let err = engine
        .register_user(new_user("grace@example.com", "secret2"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn bad_credentials_and_tokens_are_unauthorized() {
    let engine = engine_with_db().await;
    engine
        .register_user(new_user("grace@example.com", "secret1"))
        .await
        .unwrap();

    for (email, password) in [
        ("grace@example.com", "wrong-password"),
        ("nobody@example.com", "secret1"),
    ] {
        let err = engine.login(email, password).await.unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized(_)));
    }

    let err = engine.user_by_token("not-a-token").await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine.user("missing").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn expenses_are_validated_and_listed_newest_first() {
    let (engine, user_id) = engine_with_user().await;

    let older = NewExpense {
        date: Some(Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()),
        method: Some("card".to_string()),
        ..expense("Textbooks", 4_500, "Books")
    };
    let stored = engine.add_expense(&user_id, older).await.unwrap();
    assert_eq!(stored.category, ExpenseCategory::Books);
    assert_eq!(stored.method, "card");

    let recent = engine
        .add_expense(&user_id, expense("Lunch", 250, "food"))
        .await
        .unwrap();
    assert_eq!(recent.method, "cash");

    let listed = engine.expenses(&user_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, recent.id);
    assert_eq!(listed[1].id, stored.id);

    let err = engine
        .add_expense(&user_id, expense("  ", 100, "food"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    let err = engine
        .add_expense(&user_id, expense("Bus", 0, "transportation"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    let err = engine
        .add_expense(&user_id, expense("Party", 100, "fun"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert_eq!(engine.expenses(&user_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn expense_stats_and_overview_include_expenses() {
    let (engine, user_id) = engine_with_user().await;
    for (description, amount, category) in [
        ("Lab coat", 1_200, "lab"),
        ("Lunch", 300, "food"),
        ("Dinner", 500, "food"),
    ] {
        engine
            .add_expense(&user_id, expense(description, amount, category))
            .await
            .unwrap();
    }

    let stats = engine.expense_stats(&user_id).await.unwrap();
    assert_eq!(stats.total_minor, 2_000);
    assert_eq!(stats.categories[0].category, ExpenseCategory::Lab);
    assert_eq!(stats.categories[1].category, ExpenseCategory::Food);
    assert_eq!(stats.categories[1].count, 2);
    assert_eq!(stats.monthly.len(), 1);
    assert_eq!(stats.monthly[0].count, 3);

    let overview = engine.financial_overview(&user_id).await.unwrap();
    assert_eq!(overview.total_expenses_minor, 2_000);
}

#[tokio::test]
async fn overflowing_expense_totals_are_errors() {
    let (engine, user_id) = engine_with_user().await;
    let huge = i64::MAX / 2 + 1;
    for description in ["Endowment", "Another endowment"] {
        engine
            .add_expense(&user_id, expense(description, huge, "other"))
            .await
            .unwrap();
    }

    assert!(matches!(
        engine.expense_stats(&user_id).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.financial_overview(&user_id).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn documents_are_stored_listed_and_owned() {
    let (engine, user_id) = engine_with_user().await;
    let (other, _) = engine
        .register_user(new_user("ada@example.com", "secret1"))
        .await
        .unwrap();

    let summary = engine
        .store_document(
            &user_id,
            "fees.txt",
            "text/plain",
            b"Tuition fee: 50000 due 2026-11-01".to_vec(),
        )
        .await
        .unwrap();
    assert_eq!(summary.extracted_text, "Tuition fee: 50000 due 2026-11-01");

    let pdf = engine
        .store_document(&user_id, "receipt.pdf", "application/pdf", b"%PDF-1.7".to_vec())
        .await
        .unwrap();
    assert_eq!(pdf.extracted_text, documents::PDF_PLACEHOLDER);

    let listed = engine.documents(&user_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, pdf.id);

    let full = engine.document(&user_id, summary.id).await.unwrap();
    assert_eq!(full.data, b"Tuition fee: 50000 due 2026-11-01".to_vec());

    let err = engine.document(&other.id, summary.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine.document(&user_id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .store_document(&user_id, "empty.txt", "text/plain", Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    let err = engine
        .store_document(&user_id, " ", "text/plain", b"x".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn insights_are_cached_per_document() {
    let (engine, user_id) = engine_with_user().await;
    let mut ids = Vec::new();
    for n in 0..6 {
        let summary = engine
            .store_document(
                &user_id,
                &format!("doc-{n}.txt"),
                "text/plain",
                format!("document {n}").into_bytes(),
            )
            .await
            .unwrap();
        ids.push(summary.id);
    }

    let report = serde_json::json!({"summary": "Document analysis complete"});
    engine
        .save_insights(&user_id, ids[5], &report)
        .await
        .unwrap();

    let recent = engine.recent_insights(&user_id, 5).await.unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].document_id, ids[5]);
    assert_eq!(recent[0].ai_insights, Some(report));
    assert!(recent[1].ai_insights.is_none());
    assert!(recent.iter().all(|insight| insight.document_id != ids[0]));

    let (other, _) = engine
        .register_user(new_user("ada@example.com", "secret1"))
        .await
        .unwrap();
    let err = engine
        .save_insights(&other.id, ids[0], &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
