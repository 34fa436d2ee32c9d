//! Shared fixture for arkiv-er integration tests
//!
//! Layout:
//! - epersons: 1 admin, 2 editor, 3 reader
//! - communities: 1 (top), 2 (child of 1); collection 7 mapped into 2
//! - items 42 and 43 in collection 7, item 44 without a collection
//! - READ for everyone on 42 and 43, WRITE on both for eperson 2,
//!   READ on 44 for eperson 3 only
//! - metadata value 100 (dc.title) on item 43
//! - bitstreams on 42: PDF, license (internal), JPEG
//! - comments on 42: 1 (top), 2 (reply to 1), 3 (top)
//! - rating of item 42 by eperson 3

#![allow(dead_code)]

use arkiv_common::config::ServiceConfig;
use arkiv_common::db::init_database;
use arkiv_er::store::SqliteRepository;
use arkiv_er::{build_router, AppState};
use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const ADMIN: i64 = 1;
pub const EDITOR: i64 = 2;
pub const READER: i64 = 3;

pub struct Fixture {
    // Keeps the database directory alive for the test's duration
    _dir: TempDir,
    pub pool: SqlitePool,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let pool = init_database(&dir.path().join("arkiv.db"))
            .await
            .expect("init database");
        seed(&pool).await;
        Self { _dir: dir, pool }
    }

    pub fn repo(&self) -> SqliteRepository {
        SqliteRepository::new(self.pool.clone())
    }

    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.repo(), ServiceConfig::default()))
    }

    pub fn router_with(&self, config: ServiceConfig) -> axum::Router {
        build_router(AppState::new(self.repo(), config))
    }

    /// `(field name, value)` pairs of the item in insertion order
    pub async fn metadata_of(&self, item_id: i64) -> Vec<(String, String)> {
        sqlx::query_as(
            r#"
            SELECT s.short_id || '.' || f.element || COALESCE('.' || f.qualifier, ''), v.value
            FROM metadata_values v
            JOIN metadata_fields f ON f.id = v.field_id
            JOIN metadata_schemas s ON s.id = f.schema_id
            WHERE v.item_id = ?
            ORDER BY v.id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await
        .expect("read metadata")
    }

    pub async fn last_modified(&self, item_id: i64) -> i64 {
        sqlx::query_scalar("SELECT last_modified FROM items WHERE id = ?")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await
            .expect("read last_modified")
    }
}

async fn seed(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO epersons (id, email, is_admin) VALUES (1, 'admin@example.org', 1)",
        "INSERT INTO epersons (id, email, is_admin) VALUES (2, 'editor@example.org', 0)",
        "INSERT INTO epersons (id, email, is_admin) VALUES (3, 'reader@example.org', 0)",
        "INSERT INTO communities (id, name, handle, short_description) VALUES (1, 'University', '123456789/1', 'Top level')",
        "INSERT INTO communities (id, name, handle, parent_id) VALUES (2, 'Physics', '123456789/2', 1)",
        "INSERT INTO collections (id, name, handle, short_description, license) VALUES (7, 'Theses', '123456789/7', 'Doctoral theses', 'CC-BY')",
        "INSERT INTO collection_communities (collection_id, community_id) VALUES (7, 2)",
        "INSERT INTO items (id, handle, submitter_id, owning_collection_id, in_archive, last_modified) VALUES (42, '123456789/42', 2, 7, 1, 1000)",
        "INSERT INTO items (id, handle, submitter_id, owning_collection_id, in_archive, last_modified) VALUES (43, '123456789/43', 2, 7, 1, 1000)",
        "INSERT INTO items (id, handle, in_archive, last_modified) VALUES (44, '123456789/44', 0, 1000)",
        "INSERT INTO resource_policies (item_id, action, eperson_id) VALUES (42, 'READ', NULL)",
        "INSERT INTO resource_policies (item_id, action, eperson_id) VALUES (43, 'READ', NULL)",
        "INSERT INTO resource_policies (item_id, action, eperson_id) VALUES (42, 'WRITE', 2)",
        "INSERT INTO resource_policies (item_id, action, eperson_id) VALUES (43, 'WRITE', 2)",
        "INSERT INTO resource_policies (item_id, action, eperson_id) VALUES (44, 'READ', 3)",
        "INSERT INTO metadata_values (id, item_id, field_id, value) VALUES (100, 43, 5, 'Other title')",
        "INSERT INTO bitstreams (id, item_id, format_id, name, size_bytes, sequence_id) VALUES (1, 42, 4, 'thesis.pdf', 2048, 1)",
        "INSERT INTO bitstreams (id, item_id, format_id, name, size_bytes, sequence_id) VALUES (2, 42, 2, 'license.txt', 120, 2)",
        "INSERT INTO bitstreams (id, item_id, format_id, name, size_bytes, sequence_id) VALUES (3, 42, 6, 'cover.jpg', 512, 3)",
        "INSERT INTO comments (id, item_id, parent_id, author_id, body) VALUES (1, 42, NULL, 3, 'Great work')",
        "INSERT INTO comments (id, item_id, parent_id, author_id, body) VALUES (2, 42, 1, 2, 'Thanks')",
        "INSERT INTO comments (id, item_id, parent_id, author_id, body) VALUES (3, 42, NULL, 1, 'Featured')",
        "INSERT INTO ratings (item_id, eperson_id, value) VALUES (42, 3, 4)",
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await.expect(sql);
    }
}

/// Request with an optional authenticated principal and JSON body
pub fn request(method: &str, uri: &str, principal: Option<i64>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = principal {
        builder = builder.header("X-Arkiv-EPerson", id.to_string());
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
