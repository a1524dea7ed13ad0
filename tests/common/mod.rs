use std::net::SocketAddr;

use chrono::FixedOffset;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use zis_ledger::config::Config;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create the first administrator account.
    pub async fn setup(&self, username: &str, name: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/setup"))
            .json(&json!({ "username": username, "name": name, "password": password }))
            .send()
            .await
            .expect("setup request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, username: &str, password: &str, role: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "username": username, "password": password, "role": role }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Create the administrator, return its session token.
    pub async fn bootstrap(&self) -> String {
        let (body, status) = self
            .setup(ADMIN_USERNAME, "Administrator Masjid", ADMIN_PASSWORD)
            .await;
        assert_eq!(status, StatusCode::OK, "bootstrap setup failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Create a Panitia ZIS account through the API and log it in.
    pub async fn panitia(&self, admin_token: &str, username: &str) -> String {
        let (body, status) = self
            .post_auth(
                "/api/v1/users",
                admin_token,
                &json!({
                    "username": username,
                    "name": "Panitia Satu",
                    "password": "panitia1",
                    "role": "PANITIA_ZIS",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create panitia failed: {body}");

        let (body, status) = self.login(username, "panitia1", "PANITIA_ZIS").await;
        assert_eq!(status, StatusCode::OK, "panitia login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Record a batch, return the response body.
    pub async fn create_batch(&self, token: &str, batch: &Value) -> Value {
        let (body, status) = self
            .post_auth("/api/v1/transactions/batch", token, batch)
            .await;
        assert_eq!(status, StatusCode::OK, "create batch failed: {body}");
        body
    }

    /// Number of transaction rows carrying `receipt_id`.
    pub async fn count_receipt_rows(&self, receipt_id: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions WHERE receipt_id = $1")
            .bind(receipt_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Make the database raise on any transaction insert whose payer is
    /// `name`, so a write can be failed partway through a request.
    pub async fn fail_inserts_named(&self, name: &str) {
        let sql = format!(
            "CREATE FUNCTION reject_named_payer() RETURNS trigger AS $$
             BEGIN
                 IF NEW.muzakki_name = '{name}' THEN
                     RAISE EXCEPTION 'insert rejected for %', NEW.muzakki_name;
                 END IF;
                 RETURN NEW;
             END
             $$ LANGUAGE plpgsql;
             CREATE TRIGGER reject_named_payer BEFORE INSERT ON transactions
                 FOR EACH ROW EXECUTE FUNCTION reject_named_payer();"
        );
        sqlx::raw_sql(&sql).execute(&self.pool).await.unwrap();
    }

    /// Total number of transaction rows.
    pub async fn count_transactions(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

fn swap_database(url: &str, db_name: &str) -> String {
    url.rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let db_name = format!("zis_test_{}", Uuid::now_v7().simple());
    let admin_url = swap_database(&base_url, "postgres");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = swap_database(&base_url, &db_name);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        session_secret: "test-session-secret-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "warn".to_string(),
        session_hours: 12,
        utc_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        secure_cookies: false,
        db_max_connections: 5,
    };

    let app = zis_ledger::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&swap_database(&base_url, "postgres"))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
