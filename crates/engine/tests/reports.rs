use sea_orm::Database;

use engine::{Engine, SeriesFilter, TransactionRecord, month_label};
use migration::MigratorTrait;

async fn engine_with_user() -> (Engine, String) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let user = engine
        .create_user("Alice", "alice@example.com", "password")
        .await
        .unwrap();
    (engine, user.id)
}

fn record(amount: f64, category: &str, date: &str) -> TransactionRecord {
    TransactionRecord {
        amount,
        category: category.to_string(),
        date: date.to_string(),
        status: Some("completed".to_string()),
        description: None,
        kind: None,
    }
}

#[tokio::test]
async fn summary_classifies_by_category() {
    let (engine, alice) = engine_with_user().await;
    engine
        .upload_transactions(
            &alice,
            vec![
                record(100.0, "salary", "2024-03-01"),
                record(40.0, "rent", "2024-03-02"),
                record(15.0, "food", "2024-03-03"),
            ],
        )
        .await
        .unwrap();

    let summary = engine.summary(&alice).await.unwrap();
    assert_eq!(summary.revenue, 100.0);
    assert_eq!(summary.expenses, 55.0);
    assert_eq!(summary.savings, 45.0);
    assert_eq!(summary.balance, 45.0);
    assert_eq!(summary.transaction_count, 3);
}

#[tokio::test]
async fn summary_of_no_transactions_is_all_zero() {
    let (engine, alice) = engine_with_user().await;

    let summary = engine.summary(&alice).await.unwrap();
    assert_eq!(summary.revenue, 0.0);
    assert_eq!(summary.expenses, 0.0);
    assert_eq!(summary.savings, 0.0);
    assert_eq!(summary.balance, 0.0);
    assert_eq!(summary.transaction_count, 0);
}

#[tokio::test]
async fn summary_savings_identity_holds() {
    let (engine, alice) = engine_with_user().await;
    engine
        .upload_transactions(
            &alice,
            vec![
                record(1234.56, "salary", "2024-01-01"),
                record(78.9, "groceries", "2024-01-02"),
                record(0.01, "refund", "2024-01-03"),
                record(400.0, "emi", "2024-01-04"),
            ],
        )
        .await
        .unwrap();

    let summary = engine.summary(&alice).await.unwrap();
    assert_eq!(summary.savings, summary.revenue - summary.expenses);
    assert_eq!(summary.balance, summary.savings);
    assert_eq!(summary.transaction_count, 4);
}

#[tokio::test]
async fn series_orders_months_ascending_without_duplicates() {
    let (engine, alice) = engine_with_user().await;
    engine
        .upload_transactions(
            &alice,
            vec![
                record(30.0, "salary", "2024-03-05"),
                record(10.0, "food", "2024-03-20"),
                record(50.0, "salary", "2023-12-01"),
                record(20.0, "salary", "2024-01-15"),
                record(5.0, "rent", "2024-01-16"),
            ],
        )
        .await
        .unwrap();

    let rows = engine
        .monthly_series(&alice, &SeriesFilter::default())
        .await
        .unwrap();

    let keys: Vec<(i32, u32)> = rows.iter().map(|row| (row.year, row.month)).collect();
    assert_eq!(keys, vec![(2023, 12), (2024, 1), (2024, 3)]);

    assert_eq!(rows[0].revenue, 50.0);
    assert_eq!(rows[0].expenses, 0.0);
    assert_eq!(rows[1].revenue, 20.0);
    assert_eq!(rows[1].expenses, 5.0);
    assert_eq!(rows[2].revenue, 30.0);
    assert_eq!(rows[2].expenses, 10.0);

    assert_eq!(month_label(rows[0].year, rows[0].month), "Dec 2023");
    assert_eq!(month_label(rows[2].year, rows[2].month), "Mar 2024");
}

#[tokio::test]
async fn series_has_no_rows_for_empty_months() {
    let (engine, alice) = engine_with_user().await;
    engine
        .upload_transactions(
            &alice,
            vec![
                record(10.0, "salary", "2024-01-01"),
                record(10.0, "salary", "2024-06-01"),
            ],
        )
        .await
        .unwrap();

    let rows = engine
        .monthly_series(&alice, &SeriesFilter::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn series_applies_category_and_status_filters() {
    let (engine, alice) = engine_with_user().await;
    engine
        .upload_transactions(
            &alice,
            vec![
                record(100.0, "salary", "2024-01-01"),
                record(40.0, "rent", "2024-01-02"),
                TransactionRecord {
                    status: Some("pending".to_string()),
                    ..record(25.0, "rent", "2024-02-02")
                },
            ],
        )
        .await
        .unwrap();

    let rows = engine
        .monthly_series(
            &alice,
            &SeriesFilter {
                category: Some("rent".to_string()),
                status: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].expenses, 40.0);
    assert_eq!(rows[0].revenue, 0.0);

    let rows = engine
        .monthly_series(
            &alice,
            &SeriesFilter {
                category: None,
                status: Some("pending".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].month, 2);
}

#[tokio::test]
async fn series_is_scoped_to_the_owning_user() {
    let (engine, alice) = engine_with_user().await;
    let bob = engine
        .create_user("Bob", "bob@example.com", "password")
        .await
        .unwrap()
        .id;
    engine
        .upload_transactions(&bob, vec![record(999.0, "salary", "2024-01-01")])
        .await
        .unwrap();

    let rows = engine
        .monthly_series(&alice, &SeriesFilter::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}
