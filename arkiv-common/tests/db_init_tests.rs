//! Integration tests for database initialization
//!
//! Covers:
//! - Automatic database creation with the repository schema
//! - Idempotent re-initialization of an existing database
//! - Seeding of the default Dublin Core registry and bitstream formats

use arkiv_common::db::init::{init_database, BITSTREAM_FORMATS, DUBLIN_CORE_FIELDS};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("arkiv.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("arkiv.db")).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "bitstream_formats",
        "bitstreams",
        "collection_communities",
        "collections",
        "comments",
        "communities",
        "epersons",
        "items",
        "metadata_fields",
        "metadata_schemas",
        "metadata_values",
        "ratings",
        "resource_policies",
    ] {
        assert!(tables.iter().any(|t| t == expected), "Missing table: {}", expected);
    }
}

#[tokio::test]
async fn test_dublin_core_registry_seeded() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("arkiv.db")).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM metadata_fields")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, DUBLIN_CORE_FIELDS.len() as i64);

    let title: (String, String, Option<String>) = sqlx::query_as(
        r#"
        SELECT s.short_id, f.element, f.qualifier
        FROM metadata_fields f
        JOIN metadata_schemas s ON s.id = f.schema_id
        WHERE f.id = 5
        "#,
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(title, ("dc".to_string(), "title".to_string(), None));
}

#[tokio::test]
async fn test_internal_bitstream_formats_flagged() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("arkiv.db")).await.unwrap();

    let internal: Vec<String> = sqlx::query_scalar(
        "SELECT short_description FROM bitstream_formats WHERE internal = 1 ORDER BY id",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(internal, vec!["License".to_string(), "CC License".to_string()]);
    assert_eq!(
        BITSTREAM_FORMATS.iter().filter(|f| f.3).count(),
        internal.len()
    );
}

#[tokio::test]
async fn test_idempotent_initialization() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("arkiv.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO items (id, in_archive) VALUES (42, 1)")
        .execute(&pool1)
        .await
        .unwrap();
    let fields1: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM metadata_fields")
        .fetch_one(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    // Second initialization must neither fail nor duplicate seed rows
    let pool2 = init_database(&db_path).await.unwrap();
    let fields2: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM metadata_fields")
        .fetch_one(&pool2)
        .await
        .unwrap();
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&pool2)
        .await
        .unwrap();

    assert_eq!(fields1, fields2, "Seed rows duplicated on re-initialization");
    assert_eq!(items, 1, "Existing content lost on re-initialization");
}

#[tokio::test]
async fn test_rating_value_constraint() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("arkiv.db")).await.unwrap();

    sqlx::query("INSERT INTO epersons (id, email) VALUES (1, 'reader@example.org')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO items (id) VALUES (1)")
        .execute(&pool)
        .await
        .unwrap();

    let result = sqlx::query("INSERT INTO ratings (item_id, eperson_id, value) VALUES (1, 1, 9)")
        .execute(&pool)
        .await;
    assert!(result.is_err(), "Out-of-range rating should be rejected");
}
