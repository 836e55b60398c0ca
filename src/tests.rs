//! Integration tests for the Farmstand backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

const ADMIN_KEY: &str = "test-admin-key";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_admin_key(Some(ADMIN_KEY.to_string())).await
    }

    async fn with_admin_key(admin_key: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let data_dir = temp_dir.path().join("data");

        write_seed_files(&data_dir);

        // Initialize database and catalog
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));
        let catalog = Arc::new(Catalog::load(&data_dir).expect("Failed to load catalog"));

        // Create config
        let config = Config {
            admin_key: admin_key.clone(),
            db_path,
            data_dir,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            cors_origins: None,
            email: None,
        };

        let state = AppState {
            repo,
            catalog,
            config: Arc::new(config),
            mailer: None,
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = admin_key {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", key).parse().unwrap(),
            );
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Write the catalog seed files the fixture server loads.
fn write_seed_files(data_dir: &std::path::Path) {
    std::fs::create_dir_all(data_dir).expect("Failed to create data dir");

    let produce = json!([
        {
            "id": "tropical-fruit",
            "name": "Tropical Fruit",
            "items": [
                { "id": "mango-alphonso", "name": "Alphonso Mango", "season": "Summer" },
                { "id": "papaya", "name": "Papaya", "season": "Year-round" }
            ]
        },
        {
            "id": "leafy-greens",
            "name": "Leafy Greens",
            "items": [
                { "id": "kale", "name": "Curly Kale", "season": "Winter" }
            ]
        }
    ]);

    let farms = json!([
        {
            "id": "farm-1",
            "name": "Sunrise Orchard",
            "location": "Ratnagiri, Maharashtra",
            "specialties": ["Mangoes", "Cashews"],
            "certifications": ["Organic"],
            "features": ["Tours"],
            "established": 1987
        },
        {
            "id": "farm-2",
            "name": "Green Valley Collective",
            "location": "Nashik",
            "specialties": ["Grapes"]
        }
    ]);

    let faqs = json!([
        {
            "id": "faq-1",
            "category": "delivery",
            "question": "When do you deliver?",
            "answer": "Twice a week."
        },
        {
            "id": "faq-2",
            "category": "billing",
            "question": "How do I pay?",
            "answer": "Card or UPI at checkout."
        }
    ]);

    for (name, value) in [
        ("produce.json", produce),
        ("farms.json", farms),
        ("faqs.json", faqs),
    ] {
        std::fs::write(data_dir.join(name), value.to_string()).expect("Failed to write seed");
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_produce_list_and_filters() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/produce"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // Category filter, case-insensitive substring on category id
    let resp = fixture
        .client
        .get(fixture.url("/api/produce?category=TROPICAL"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Season filter
    let resp = fixture
        .client
        .get(fixture.url("/api/produce?season=winter"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "kale");
}

#[tokio::test]
async fn test_produce_by_id_merges_category() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/produce/mango-alphonso"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Alphonso Mango");
    assert_eq!(body["data"]["categoryId"], "tropical-fruit");
    assert_eq!(body["data"]["categoryName"], "Tropical Fruit");

    // Unknown id
    let resp = fixture
        .client
        .get(fixture.url("/api/produce/durian"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_farms_location_filter() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/farms?location=maharashtra"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let farms = body["data"].as_array().unwrap();
    assert_eq!(farms.len(), 1);
    assert_eq!(farms[0]["id"], "farm-1");
}

#[tokio::test]
async fn test_faqs_category_filter() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/faqs?category=billing"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let faqs = body["data"].as_array().unwrap();
    assert_eq!(faqs.len(), 1);
    assert_eq!(faqs[0]["id"], "faq-2");
}

#[tokio::test]
async fn test_search_mango_hits_produce_and_farms() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/search?q=mango"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    let produce = body["data"]["produce"].as_array().unwrap();
    assert_eq!(produce.len(), 1);
    assert_eq!(produce[0]["id"], "mango-alphonso");

    // Farm matches on specialty "Mangoes"
    let farms = body["data"]["farms"].as_array().unwrap();
    assert_eq!(farms.len(), 1);
    assert_eq!(farms[0]["id"], "farm-1");
}

#[tokio::test]
async fn test_search_query_too_short() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/search?q=m"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Whitespace padding does not count toward the minimum
    let resp = fixture
        .client
        .get(fixture.url("/api/search?q=%20m%20"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_waitlist_duplicate_email_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/waitlist"))
        .json(&json!({ "name": "Asha", "email": "asha@example.com", "zipCode": "400001" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["email"], "asha@example.com");

    // Same email, different case
    let resp = fixture
        .client
        .post(fixture.url("/api/waitlist"))
        .json(&json!({ "email": "ASHA@Example.COM" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Stored count unchanged
    let resp = fixture
        .client
        .get(fixture.url("/api/admin/stats"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["waitlist"], 1);
}

#[tokio::test]
async fn test_signup_rejects_malformed_email() {
    let fixture = TestFixture::new().await;

    for path in ["/api/waitlist", "/api/newsletter", "/api/early-access"] {
        let resp = fixture
            .client
            .post(fixture.url(path))
            .json(&json!({ "email": "not-an-email" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "expected 400 for {}", path);
    }
}

#[tokio::test]
async fn test_farm_application_requires_fields() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/farm-applications"))
        .json(&json!({ "farmName": "", "contactName": "Ben", "email": "ben@farm.example" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .post(fixture.url("/api/farm-applications"))
        .json(&json!({
            "farmName": "Sunrise Orchard",
            "contactName": "Ben",
            "email": "ben@farm.example",
            "products": "Mangoes, cashews"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn test_chat_session_log() {
    let fixture = TestFixture::new().await;

    for content in ["hello", "is the mango share still open?"] {
        let resp = fixture
            .client
            .post(fixture.url("/api/chat/messages/session-abc"))
            .json(&json!({ "sender": "visitor", "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = fixture
        .client
        .get(fixture.url("/api/chat/messages/session-abc"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "hello");

    // Other sessions are empty
    let resp = fixture
        .client
        .get(fixture.url("/api/chat/messages/session-other"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    // Empty message rejected
    let resp = fixture
        .client
        .post(fixture.url("/api/chat/messages/session-abc"))
        .json(&json!({ "sender": "visitor", "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_admin_requires_token() {
    let fixture = TestFixture::new().await;

    // No token
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/admin/blog-posts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // Wrong token
    let resp = client
        .get(fixture.url("/api/admin/blog-posts"))
        .header("Authorization", "Bearer wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Public routes stay open
    let resp = client
        .get(fixture.url("/api/produce"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_admin_auth_disabled_without_key() {
    let fixture = TestFixture::with_admin_key(None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/blog-posts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_blog_post_crud() {
    let fixture = TestFixture::new().await;

    // Create
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/blog-posts"))
        .json(&json!({
            "title": "Meet our mango growers",
            "category": "farms",
            "content": "A visit to Ratnagiri.",
            "readTime": 4
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let post_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["title"], "Meet our mango growers");

    // Get
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .json(&json!({ "title": "Meet our mango growers, part two" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Meet our mango growers, part two");
    // Untouched fields survive the partial update
    assert_eq!(body["data"]["content"], "A visit to Ratnagiri.");

    // List
    let resp = fixture
        .client
        .get(fixture.url("/api/admin/blog-posts"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Verify deleted
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_blog_post_malformed_id_rejected() {
    let fixture = TestFixture::new().await;

    for method in ["get", "put", "delete"] {
        let url = fixture.url("/api/admin/blog-posts/not-a-uuid");
        let request = match method {
            "get" => fixture.client.get(&url),
            "put" => fixture.client.put(&url).json(&json!({ "title": "x" })),
            _ => fixture.client.delete(&url),
        };
        let resp = request.send().await.unwrap();
        assert_eq!(resp.status(), 400, "expected 400 for {}", method);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_blog_post_ownership() {
    let fixture = TestFixture::new().await;

    // Create a post owned by "A"
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/blog-posts"))
        .json(&json!({
            "title": "Owned post",
            "content": "Original content",
            "ownerId": "A"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let post_id = body["data"]["id"].as_str().unwrap().to_string();
    let original_updated_at = body["data"]["updatedAt"].as_str().unwrap().to_string();

    // PUT as "B" is refused
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .json(&json!({ "title": "Stolen", "ownerId": "B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    // Record unchanged
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Owned post");
    assert_eq!(body["data"]["updatedAt"], original_updated_at.as_str());

    // DELETE as "B" is refused
    let resp = fixture
        .client
        .delete(fixture.url(&format!(
            "/api/admin/blog-posts/{}?ownerId=B",
            post_id
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // PUT as "A" succeeds and bumps updatedAt
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .json(&json!({ "title": "Revised by owner", "ownerId": "A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Revised by owner");
    assert_ne!(body["data"]["updatedAt"], original_updated_at.as_str());

    // PUT with no owner token also succeeds
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/blog-posts/{}", post_id)))
        .json(&json!({ "category": "news" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_admin_stats() {
    let fixture = TestFixture::new().await;

    fixture
        .client
        .post(fixture.url("/api/newsletter"))
        .json(&json!({ "email": "reader@example.com" }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/stats"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["newsletter"], 1);
    assert_eq!(body["data"]["produceItems"], 3);
    assert_eq!(body["data"]["farms"], 2);
    assert_eq!(body["data"]["faqs"], 2);
}

#[tokio::test]
async fn test_waitlist_csv_export() {
    let fixture = TestFixture::new().await;

    // One entry with an embedded comma in the name
    fixture
        .client
        .post(fixture.url("/api/waitlist"))
        .json(&json!({ "name": "Shah, Asha", "email": "asha@example.com" }))
        .send()
        .await
        .unwrap();
    fixture
        .client
        .post(fixture.url("/api/waitlist"))
        .json(&json!({ "email": "ben@example.com" }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/export/waitlist"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let body = resp.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3); // header + two entries
    assert_eq!(lines[0], "id,name,email,zip_code,created_at");
    assert!(lines[1].contains("\"Shah, Asha\""));
    assert!(lines[2].contains("ben@example.com"));
}

#[tokio::test]
async fn test_export_unknown_kind() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/export/testimonials"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
