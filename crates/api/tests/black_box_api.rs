use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use stockscan_ai::{AiError, Detection, ImagePayload, ScanResult, VisionModel};
use stockscan_api::app::services::AppServices;
use stockscan_api::config::AppConfig;
use stockscan_auth::{InMemoryIdentityProvider, JwtClaims};
use stockscan_core::{SessionId, UserId};
use stockscan_infra::InMemoryInventoryStore;

const JWT_SECRET: &str = "test-secret";
const PASSWORD: &str = "Passw0rd!";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(test_config(), Arc::new(FixedVision::counts(&[]))).await
    }

    async fn spawn_with(config: AppConfig, vision: Arc<dyn VisionModel>) -> Self {
        // Same router as prod, in-memory collaborators, ephemeral port.
        let services = AppServices::new(
            &config,
            Arc::new(InMemoryInventoryStore::new()),
            Arc::new(InMemoryIdentityProvider::new()),
            vision,
        );
        let app = stockscan_api::app::build_router(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn sign_up(&self, email: &str) -> String {
        let res = self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({ "email": email, "password": PASSWORD, "confirm_password": PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn post_json(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post_empty(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn get_json(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn add(&self, token: &str, name: &str) -> Value {
        let (status, body) = self.post_json(token, "/inventory/items", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::OK, "add {name}: {body}");
        body
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

/// Vision model returning a canned reply.
struct FixedVision {
    reply: Result<Vec<Detection>, String>,
}

impl FixedVision {
    fn counts(counts: &[(&str, i64)]) -> Self {
        Self {
            reply: Ok(counts
                .iter()
                .map(|(name, quantity)| Detection {
                    name: name.to_string(),
                    quantity: *quantity,
                })
                .collect()),
        }
    }

    fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl VisionModel for FixedVision {
    fn model_name(&self) -> &str {
        "fixed"
    }

    async fn scan(&self, _image: &ImagePayload) -> Result<ScanResult, AiError> {
        match &self.reply {
            Ok(detections) => Ok(ScanResult {
                model: "fixed".to_string(),
                detections: detections.clone(),
            }),
            Err(reason) => Err(AiError::InferenceFailed(reason.clone())),
        }
    }
}

fn names_and_quantities(page: &Value) -> Vec<(String, u64)> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            (
                item["name"].as_str().unwrap().to_string(),
                item["quantity"].as_u64().unwrap(),
            )
        })
        .collect()
}

fn pairs(items: &[(&str, u64)]) -> Vec<(String, u64)> {
    items.iter().map(|(n, q)| (n.to_string(), *q)).collect()
}

fn mint_jwt(secret: &str, sub: UserId, sid: SessionId) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        sid,
        email: "forged@example.com".to_string(),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn image_form(bytes: &[u8], file_name: &str, mime: &str) -> Form {
    let part = Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap();
    Form::new().part("file", part)
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    for path in ["/whoami", "/inventory", "/inventory/export"] {
        let res = srv.client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn sign_up_validation_reports_first_failure() {
    let srv = TestServer::spawn().await;

    let cases = [
        (json!({ "email": "", "password": PASSWORD, "confirm_password": PASSWORD }), "Missing email"),
        (
            json!({ "email": "a@example.com", "password": PASSWORD, "confirm_password": "other" }),
            "Passwords do not match",
        ),
        (
            json!({ "email": "a@example.com", "password": "Sh0rt!", "confirm_password": "Sh0rt!" }),
            "Password needs at least 8 characters",
        ),
        (
            json!({ "email": "a@example.com", "password": "Password1", "confirm_password": "Password1" }),
            "Password requires at least a special character",
        ),
    ];

    for (body, message) in cases {
        let res = srv.client.post(srv.url("/auth/signup")).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn sign_up_login_and_whoami() {
    let srv = TestServer::spawn().await;
    srv.sign_up("Alice@Example.com ").await;

    // Duplicate accounts are rejected regardless of email casing.
    let res = srv
        .client
        .post(srv.url("/auth/signup"))
        .json(&json!({ "email": "alice@example.com", "password": PASSWORD, "confirm_password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "Wr0ng-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": " ALICE@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let login: Value = res.json().await.unwrap();
    let token = login["token"].as_str().unwrap();

    let (status, me) = srv.get_json(token, "/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["user_id"], login["user_id"]);
}

#[tokio::test]
async fn tokens_without_a_live_session_are_rejected() {
    let srv = TestServer::spawn().await;

    // Correctly signed, but no session was ever started for it.
    let forged = mint_jwt(JWT_SECRET, UserId::new(), SessionId::new());
    let (status, _) = srv.get_json(&forged, "/whoami").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong_secret = mint_jwt("other-secret", UserId::new(), SessionId::new());
    let (status, _) = srv.get_json(&wrong_secret, "/whoami").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("bob@example.com").await;
    srv.add(&token, "milk").await;

    let res = srv.client.post(srv.url("/auth/logout")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, _) = srv.get_json(&token, "/inventory").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The stored inventory survives; only the session is gone.
    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "bob@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    let login: Value = res.json().await.unwrap();
    let (_, page) = srv.get_json(login["token"].as_str().unwrap(), "/inventory").await;
    assert_eq!(names_and_quantities(&page), pairs(&[("milk", 1)]));
}

#[tokio::test]
async fn add_increment_decrement_delete_lifecycle() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("carol@example.com").await;

    srv.add(&token, "Apples").await;
    let page = srv.add(&token, "  apples ").await;
    assert_eq!(names_and_quantities(&page), pairs(&[("apples", 2)]));

    let (status, body) = srv.post_json(&token, "/inventory/items", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, page) = srv.post_empty(&token, "/inventory/items/apples/increment").await;
    assert_eq!(names_and_quantities(&page), pairs(&[("apples", 3)]));

    let (_, page) = srv.post_empty(&token, "/inventory/items/Apples/decrement").await;
    assert_eq!(names_and_quantities(&page), pairs(&[("apples", 2)]));

    srv.add(&token, "pears").await;
    let res = srv
        .client
        .delete(srv.url("/inventory/items/apples"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(names_and_quantities(&page), pairs(&[("pears", 1)]));
}

#[tokio::test]
async fn decrement_at_one_deletes_the_record() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("dave@example.com").await;

    srv.add(&token, "apples").await;
    let (status, page) = srv.post_empty(&token, "/inventory/items/apples/decrement").await;
    assert_eq!(status, StatusCode::OK);
    assert!(names_and_quantities(&page).is_empty());

    let res = srv.client.get(srv.url("/inventory/export")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "\"name\",\"quantity\"");
}

#[tokio::test]
async fn search_filters_by_substring() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("erin@example.com").await;
    for name in ["apples", "bananas", "oranges"] {
        srv.add(&token, name).await;
    }

    let (status, page) = srv.post_json(&token, "/inventory/view", json!({ "search": "AN" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names_and_quantities(&page), pairs(&[("bananas", 1), ("oranges", 1)]));

    let (_, page) = srv.post_json(&token, "/inventory/view", json!({ "search": "an" })).await;
    assert_eq!(page["matching_items"], 2);
    assert_eq!(page["total_items"], 3);

    // "an" over [apples, bananas] only matches bananas.
    srv.post_empty(&token, "/inventory/items/oranges/decrement").await;
    let (_, page) = srv.get_json(&token, "/inventory").await;
    assert_eq!(page["search_term"], "an");
    assert_eq!(names_and_quantities(&page), pairs(&[("bananas", 1)]));
}

#[tokio::test]
async fn pagination_is_clamped_and_reset_by_search() {
    let config = AppConfig {
        page_size: 2,
        ..test_config()
    };
    let srv = TestServer::spawn_with(config, Arc::new(FixedVision::counts(&[]))).await;
    let token = srv.sign_up("frank@example.com").await;
    for name in ["a1", "a2", "a3", "a4", "b1"] {
        srv.add(&token, name).await;
    }

    let (_, page) = srv.get_json(&token, "/inventory").await;
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["current_page"], 1);

    let (_, page) = srv.post_json(&token, "/inventory/view", json!({ "page": 99 })).await;
    assert_eq!(page["current_page"], 3);
    assert_eq!(names_and_quantities(&page), pairs(&[("b1", 1)]));

    let (_, page) = srv.post_empty(&token, "/inventory/view/next").await;
    assert_eq!(page["current_page"], 3);

    let (_, page) = srv.post_empty(&token, "/inventory/view/prev").await;
    assert_eq!(page["current_page"], 2);
    assert_eq!(names_and_quantities(&page), pairs(&[("a3", 1), ("a4", 1)]));

    let (_, page) = srv.post_json(&token, "/inventory/view", json!({ "search": "a" })).await;
    assert_eq!(page["current_page"], 1);
    assert_eq!(page["total_pages"], 2);

    // Deleting items shrinks total_pages and pulls the cursor back.
    srv.post_json(&token, "/inventory/view", json!({ "page": 2 })).await;
    srv.post_empty(&token, "/inventory/items/a4/decrement").await;
    let (_, page) = srv.post_empty(&token, "/inventory/items/a3/decrement").await;
    assert_eq!(page["total_pages"], 1);
    assert_eq!(page["current_page"], 1);
}

#[tokio::test]
async fn scan_then_import_merges_selected_items() {
    let vision = FixedVision::counts(&[("Apples", 1), ("Oranges ", 3), ("Ghosts", -2)]);
    let srv = TestServer::spawn_with(test_config(), Arc::new(vision)).await;
    let token = srv.sign_up("gina@example.com").await;

    srv.add(&token, "apples").await;
    srv.add(&token, "apples").await;
    srv.add(&token, "bananas").await;

    let res = srv
        .client
        .post(srv.url("/inventory/scan"))
        .bearer_auth(&token)
        .multipart(image_form(b"\x89PNG", "shelf.png", "image/png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let scan: Value = res.json().await.unwrap();
    assert_eq!(
        scan["inventory"],
        json!([
            { "name": "apples", "quantity": 1, "selected": true },
            { "name": "oranges", "quantity": 3, "selected": true },
            { "name": "ghosts", "quantity": 0, "selected": true },
        ])
    );

    // Scanning alone changes nothing.
    let (_, page) = srv.get_json(&token, "/inventory").await;
    assert_eq!(names_and_quantities(&page), pairs(&[("apples", 2), ("bananas", 1)]));

    let (status, page) = srv
        .post_json(&token, "/inventory/import", json!({ "items": scan["inventory"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names_and_quantities(&page),
        pairs(&[("apples", 3), ("bananas", 1), ("oranges", 3)])
    );
    assert!(page.get("failures").is_none());
}

#[tokio::test]
async fn import_skips_unselected_items() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("hank@example.com").await;

    let (_, page) = srv
        .post_json(
            &token,
            "/inventory/import",
            json!({ "items": [
                { "name": "Milk", "quantity": 2, "selected": true },
                { "name": "Eggs", "quantity": 12, "selected": false },
            ] }),
        )
        .await;
    assert_eq!(names_and_quantities(&page), pairs(&[("milk", 2)]));
}

#[tokio::test]
async fn import_clamps_negative_quantities() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("hugo@example.com").await;
    srv.add(&token, "apples").await;

    let (status, page) = srv
        .post_json(
            &token,
            "/inventory/import",
            json!({ "items": [
                { "name": "Apples", "quantity": -2, "selected": true },
                { "name": "Pears", "quantity": -1, "selected": true },
                { "name": "Plums", "quantity": 4, "selected": true },
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(names_and_quantities(&page), pairs(&[("apples", 1), ("plums", 4)]));
}

#[tokio::test]
async fn scan_rejects_missing_or_non_image_uploads() {
    let srv = TestServer::spawn_with(test_config(), Arc::new(FixedVision::counts(&[("milk", 1)]))).await;
    let token = srv.sign_up("ivy@example.com").await;

    let res = srv
        .client
        .post(srv.url("/inventory/scan"))
        .bearer_auth(&token)
        .multipart(Form::new().text("note", "no file here"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "No file uploaded");

    let res = srv
        .client
        .post(srv.url("/inventory/scan"))
        .bearer_auth(&token)
        .multipart(image_form(b"%PDF-1.4", "list.pdf", "application/pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_rejects_oversized_uploads_with_413() {
    let config = AppConfig {
        max_upload_bytes: 1024,
        ..test_config()
    };
    let srv = TestServer::spawn_with(config, Arc::new(FixedVision::counts(&[("milk", 1)]))).await;
    let token = srv.sign_up("iris@example.com").await;

    let res = srv
        .client
        .post(srv.url("/inventory/scan"))
        .bearer_auth(&token)
        .multipart(image_form(&[0xff; 8 * 1024], "shelf.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "payload_too_large");
}

#[tokio::test]
async fn scan_failure_is_a_500_and_leaves_inventory_untouched() {
    let srv = TestServer::spawn_with(test_config(), Arc::new(FixedVision::failing("timeout"))).await;
    let token = srv.sign_up("jack@example.com").await;
    srv.add(&token, "apples").await;

    let res = srv
        .client
        .post(srv.url("/inventory/scan"))
        .bearer_auth(&token)
        .multipart(image_form(b"\xff\xd8\xff", "shelf.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Error processing the image");

    let (_, page) = srv.get_json(&token, "/inventory").await;
    assert_eq!(names_and_quantities(&page), pairs(&[("apples", 1)]));
}

#[tokio::test]
async fn export_posted_inventory_as_csv() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("kim@example.com").await;

    let res = srv
        .client
        .post(srv.url("/inventory/export"))
        .bearer_auth(&token)
        .json(&json!([{ "name": "apples", "quantity": 3 }, { "name": "say \"cheese\"", "quantity": 1 }]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/csv");
    assert_eq!(
        res.headers()["content-disposition"],
        "attachment; filename=inventory.csv"
    );
    assert_eq!(
        res.text().await.unwrap(),
        "\"name\",\"quantity\"\n\"apples\",3\n\"say \"\"cheese\"\"\",1"
    );
}

#[tokio::test]
async fn export_rejects_malformed_payloads_and_wrong_methods() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("lee@example.com").await;

    let (status, body) = srv
        .post_json(&token, "/inventory/export", json!({ "name": "apples", "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid inventory data");

    let (status, _) = srv
        .post_json(&token, "/inventory/export", json!([{ "name": "apples", "quantity": "many" }]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/inventory/export"))
        .bearer_auth(&token)
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .put(srv.url("/inventory/export"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn users_only_see_their_own_inventory() {
    let srv = TestServer::spawn().await;
    let alice = srv.sign_up("alice@example.com").await;
    let bob = srv.sign_up("bob@example.com").await;

    srv.add(&alice, "apples").await;
    srv.add(&bob, "bananas").await;

    let (_, page) = srv.get_json(&alice, "/inventory").await;
    assert_eq!(names_and_quantities(&page), pairs(&[("apples", 1)]));

    let res = srv.client.get(srv.url("/inventory/export")).bearer_auth(&bob).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "\"name\",\"quantity\"\n\"bananas\",1");
}
