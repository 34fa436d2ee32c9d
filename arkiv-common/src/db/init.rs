//! Database initialization
//!
//! Creates the repository schema on first run and seeds the default field
//! registry and bitstream formats. Every step is idempotent so the same
//! call opens an existing database without touching its content.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Fields of the default Dublin Core registry, in id order
pub const DUBLIN_CORE_FIELDS: &[(i64, &str, Option<&str>)] = &[
    (1, "contributor", None),
    (2, "contributor", Some("author")),
    (3, "date", Some("accessioned")),
    (4, "date", Some("issued")),
    (5, "title", None),
    (6, "title", Some("alternative")),
    (7, "description", None),
    (8, "description", Some("abstract")),
    (9, "subject", None),
    (10, "identifier", Some("uri")),
    (11, "type", None),
    (12, "language", Some("iso")),
    (13, "publisher", None),
    (14, "rights", None),
];

/// Default bitstream formats: (id, short description, MIME type, internal)
pub const BITSTREAM_FORMATS: &[(i64, &str, &str, bool)] = &[
    (1, "Unknown", "application/octet-stream", false),
    (2, "License", "text/plain; charset=utf-8", true),
    (3, "CC License", "text/html; charset=utf-8", true),
    (4, "Adobe PDF", "application/pdf", false),
    (5, "Text", "text/plain", false),
    (6, "JPEG", "image/jpeg", false),
];

/// Open (or create) the database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL lets listings proceed while a metadata edit is committing
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;
    seed_dublin_core_registry(&pool).await?;
    seed_bitstream_formats(&pool).await?;

    Ok(pool)
}

/// Create every table if missing
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_epersons_table(pool).await?;
    create_registry_tables(pool).await?;
    create_container_tables(pool).await?;
    create_items_table(pool).await?;
    create_metadata_values_table(pool).await?;
    create_bitstream_tables(pool).await?;
    create_comments_table(pool).await?;
    create_ratings_table(pool).await?;
    create_resource_policies_table(pool).await?;
    Ok(())
}

async fn create_epersons_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS epersons (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            is_admin INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_registry_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metadata_schemas (
            id INTEGER PRIMARY KEY,
            short_id TEXT NOT NULL UNIQUE,
            namespace TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metadata_fields (
            id INTEGER PRIMARY KEY,
            schema_id INTEGER NOT NULL REFERENCES metadata_schemas(id),
            element TEXT NOT NULL,
            qualifier TEXT,
            scope_note TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_metadata_fields_name ON metadata_fields(schema_id, element, qualifier)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_container_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS communities (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            handle TEXT UNIQUE,
            short_description TEXT,
            introductory_text TEXT,
            copyright_text TEXT,
            parent_id INTEGER REFERENCES communities(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            handle TEXT UNIQUE,
            short_description TEXT,
            introductory_text TEXT,
            copyright_text TEXT,
            side_bar_text TEXT,
            license TEXT,
            provenance_description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collection_communities (
            collection_id INTEGER NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
            community_id INTEGER NOT NULL REFERENCES communities(id) ON DELETE CASCADE,
            PRIMARY KEY (collection_id, community_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY,
            handle TEXT UNIQUE,
            submitter_id INTEGER REFERENCES epersons(id),
            owning_collection_id INTEGER REFERENCES collections(id),
            in_archive INTEGER NOT NULL DEFAULT 0,
            withdrawn INTEGER NOT NULL DEFAULT 0,
            last_modified INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_metadata_values_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metadata_values (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
            field_id INTEGER NOT NULL REFERENCES metadata_fields(id),
            value TEXT NOT NULL,
            language TEXT,
            authority TEXT,
            confidence INTEGER NOT NULL DEFAULT -1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_metadata_values_item ON metadata_values(item_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_bitstream_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bitstream_formats (
            id INTEGER PRIMARY KEY,
            short_description TEXT NOT NULL UNIQUE,
            mime_type TEXT NOT NULL,
            internal INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bitstreams (
            id INTEGER PRIMARY KEY,
            item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
            format_id INTEGER NOT NULL REFERENCES bitstream_formats(id),
            name TEXT NOT NULL,
            description TEXT,
            size_bytes INTEGER NOT NULL DEFAULT 0,
            checksum TEXT,
            sequence_id INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_comments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY,
            item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
            parent_id INTEGER REFERENCES comments(id) ON DELETE CASCADE,
            author_id INTEGER REFERENCES epersons(id),
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY,
            item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
            eperson_id INTEGER NOT NULL REFERENCES epersons(id),
            value INTEGER NOT NULL CHECK (value BETWEEN 1 AND 5),
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            UNIQUE (item_id, eperson_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_resource_policies_table(pool: &SqlitePool) -> Result<()> {
    // NULL eperson_id grants the action to everyone, including anonymous callers
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resource_policies (
            id INTEGER PRIMARY KEY,
            item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
            action TEXT NOT NULL CHECK (action IN ('READ', 'WRITE')),
            eperson_id INTEGER REFERENCES epersons(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed the `dc` schema and its default fields
async fn seed_dublin_core_registry(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO metadata_schemas (id, short_id, namespace) VALUES (1, 'dc', 'http://dublincore.org/documents/dcmi-terms/')",
    )
    .execute(pool)
    .await?;

    for (id, element, qualifier) in DUBLIN_CORE_FIELDS {
        sqlx::query(
            "INSERT OR IGNORE INTO metadata_fields (id, schema_id, element, qualifier) VALUES (?, 1, ?, ?)",
        )
        .bind(*id)
        .bind(*element)
        .bind(*qualifier)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn seed_bitstream_formats(pool: &SqlitePool) -> Result<()> {
    for (id, short_description, mime_type, internal) in BITSTREAM_FORMATS {
        sqlx::query(
            "INSERT OR IGNORE INTO bitstream_formats (id, short_description, mime_type, internal) VALUES (?, ?, ?, ?)",
        )
        .bind(*id)
        .bind(*short_description)
        .bind(*mime_type)
        .bind(*internal)
        .execute(pool)
        .await?;
    }

    Ok(())
}
