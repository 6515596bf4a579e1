//! Integration tests for the CommunityConnect backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::backend::Backend;
use crate::db::{init_database, Repository};
use crate::store::SessionRegistry;
use crate::{create_router, AppState};

const DESCRIPTION: &str = "We are looking for passionate volunteers to join our weekly programme \
                           and help the community centre reach more families across the city.";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    db_path: PathBuf,
    _temp_dir: TempDir,
}

/// Serve a fresh router (with an empty session registry) over `db_path`.
async fn spawn_server(db_path: &Path) -> String {
    let pool = init_database(db_path).await.expect("Failed to init DB");
    let backend: Arc<dyn Backend> = Arc::new(Repository::new(pool));

    let state = AppState {
        sessions: Arc::new(SessionRegistry::new(backend)),
    };

    let app = create_router(state);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get addr");

    // Spawn server
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to start
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    format!("http://{}", addr)
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let base_url = spawn_server(&db_path).await;

        TestFixture {
            client: Client::new(),
            base_url,
            db_path,
            _temp_dir: temp_dir,
        }
    }

    /// A second server over the same database, as after a restart.
    async fn restarted(&self) -> String {
        spawn_server(&self.db_path).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    fn post(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(&body)
    }

    fn put(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(&body)
    }

    async fn register_ngo(&self, email: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/register/ngo"))
            .json(&ngo_form(email))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn register_volunteer(&self, email: &str, city: &str, skills: &[&str]) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/register/volunteer"))
            .json(&json!({
                "firstName": "Priya",
                "lastName": "Sharma",
                "email": email,
                "password": "password123",
                "confirmPassword": "password123",
                "phone": "+91 98765 43211",
                "city": city,
                "bio": "Teacher by day, volunteer on weekends.",
                "skills": skills,
                "availability": "Weekends"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn create_task(&self, token: &str, title: &str, location: &str, skills: &[&str]) -> String {
        let resp = self
            .post("/api/tasks", token, task_form(title, location, skills))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn data(&self, request: RequestBuilder) -> Value {
        let resp = request.send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["data"].clone()
    }
}

fn ngo_form(email: &str) -> Value {
    json!({
        "organizationName": "Hope Foundation",
        "contactPerson": "Rajesh Kumar",
        "email": email,
        "password": "password123",
        "confirmPassword": "password123",
        "phone": "+91 98765 43210",
        "city": "Mumbai",
        "description": "Empowering communities through education and healthcare since 2015.",
        "causeAreas": ["Education & Literacy", "Healthcare & Medical"],
        "website": "https://hopefoundation.org"
    })
}

fn task_form(title: &str, location: &str, skills: &[&str]) -> Value {
    json!({
        "title": title,
        "description": DESCRIPTION,
        "causeArea": "Education & Literacy",
        "requiredSkills": skills,
        "location": location,
        "hoursPerWeek": 5,
        "durationMonths": 6
    })
}

fn ids(data: &Value) -> Vec<String> {
    data.as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
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
async fn test_vocabulary() {
    let fixture = TestFixture::new().await;

    let data = fixture
        .data(fixture.client.get(fixture.url("/api/vocabulary")))
        .await;
    assert_eq!(data["cities"].as_array().unwrap().len(), 13);
    assert_eq!(data["causeAreas"].as_array().unwrap().len(), 10);
    assert_eq!(data["skills"].as_array().unwrap().len(), 15);
    assert_eq!(data["skills"][0], "Teaching & Tutoring");
}

#[tokio::test]
async fn test_missing_or_unknown_token() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/tasks"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = fixture.get("/api/tasks", "no-such-token").send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_register_ngo_and_restore_session() {
    let fixture = TestFixture::new().await;
    let token = fixture.register_ngo("ngo@example.com").await;

    let data = fixture.data(fixture.get("/api/auth/session", &token)).await;
    assert_eq!(data["user"]["role"], "ngo");
    assert_eq!(data["user"]["organizationName"], "Hope Foundation");
    assert_eq!(data["email"], "ngo@example.com");

    // A new server has an empty registry and restores from the database
    let restarted = fixture.restarted().await;
    let resp = fixture
        .client
        .get(format!("{}/api/auth/session", restarted))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["user"]["role"], "ngo");
}

#[tokio::test]
async fn test_registration_validation_errors() {
    let fixture = TestFixture::new().await;

    let mut form = ngo_form("ngo@example.com");
    form["confirmPassword"] = json!("different1");
    form["causeAreas"] = json!([]);

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/register/ngo"))
        .json(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["confirmPassword", "causeAreas"]);
}

#[tokio::test]
async fn test_duplicate_email_registration() {
    let fixture = TestFixture::new().await;
    fixture.register_ngo("ngo@example.com").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/register/ngo"))
        .json(&ngo_form("NGO@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "REGISTRATION_ERROR");
}

#[tokio::test]
async fn test_login_role_check_and_logout() {
    let fixture = TestFixture::new().await;
    fixture
        .register_volunteer("vol@example.com", "Bangalore", &["Teaching & Tutoring"])
        .await;

    let login = |role: &str| {
        fixture
            .client
            .post(fixture.url("/api/auth/login"))
            .json(&json!({ "email": "vol@example.com", "password": "password123", "role": role }))
    };

    let resp = login("ngo").send().await.unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "AUTH_ERROR");

    let data = fixture.data(login("volunteer")).await;
    assert_eq!(data["user"]["role"], "volunteer");
    let token = data["token"].as_str().unwrap().to_string();

    fixture
        .data(fixture.post("/api/auth/logout", &token, json!({})))
        .await;
    let resp = fixture.get("/api/auth/session", &token).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_browse_filters() {
    let fixture = TestFixture::new().await;
    let ngo = fixture.register_ngo("ngo@example.com").await;
    let teach = fixture
        .create_task(&ngo, "English Teacher for Children", "Mumbai", &["Teaching & Tutoring"])
        .await;
    let camp = fixture
        .create_task(&ngo, "Medical Camp Coordinator", "Delhi", &["Medical & Healthcare"])
        .await;
    let social = fixture
        .create_task(&ngo, "Social Media Campaign Lead", "Remote", &["Social Media Management"])
        .await;

    let vol = fixture
        .register_volunteer("vol@example.com", "Mumbai", &["Content Writing"])
        .await;

    let all = fixture.data(fixture.get("/api/tasks", &vol)).await;
    assert_eq!(ids(&all), vec![teach.clone(), camp.clone(), social.clone()]);

    let data = fixture
        .data(fixture.get("/api/tasks?search=TEACH", &vol))
        .await;
    assert_eq!(ids(&data), vec![teach.clone()]);

    let data = fixture.data(fixture.get("/api/tasks?city=Mumbai", &vol)).await;
    assert_eq!(ids(&data), vec![teach.clone(), social.clone()]);

    let resp = fixture
        .client
        .get(fixture.url("/api/tasks"))
        .query(&[("skills", "Medical & Healthcare,Social Media Management")])
        .bearer_auth(&vol)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(ids(&body["data"]), vec![camp.clone(), social.clone()]);

    let resp = fixture
        .get("/api/tasks?skills=Juggling", &vol)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Deactivated tasks drop out of the volunteer's board after a refresh
    fixture
        .data(fixture.put(&format!("/api/tasks/{}", camp), &ngo, json!({ "status": "inactive" })))
        .await;
    fixture.data(fixture.post("/api/refresh", &vol, json!({}))).await;
    let data = fixture.data(fixture.get("/api/tasks", &vol)).await;
    assert_eq!(ids(&data), vec![teach, social]);
}

#[tokio::test]
async fn test_task_validation_and_role_guard() {
    let fixture = TestFixture::new().await;
    let ngo = fixture.register_ngo("ngo@example.com").await;
    let vol = fixture
        .register_volunteer("vol@example.com", "Pune", &["Graphic Design"])
        .await;

    let mut form = task_form("Poster Design Volunteer", "Pune", &["Graphic Design"]);
    form["hoursPerWeek"] = json!(41);
    let resp = fixture.post("/api/tasks", &ngo, form).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["details"]["fields"][0]["field"], "hoursPerWeek");

    let resp = fixture
        .post(
            "/api/tasks",
            &vol,
            task_form("Poster Design Volunteer", "Pune", &["Graphic Design"]),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture.get("/api/tasks/mine", &vol).send().await.unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_apply_review_and_dashboards() {
    let fixture = TestFixture::new().await;
    let ngo = fixture.register_ngo("ngo@example.com").await;
    let task = fixture
        .create_task(&ngo, "English Teacher for Children", "Mumbai", &["Teaching & Tutoring"])
        .await;
    let other = fixture
        .create_task(&ngo, "Weekend Reading Circle", "Bangalore", &["Teaching & Tutoring"])
        .await;

    let vol = fixture
        .register_volunteer("vol@example.com", "Mumbai", &["Teaching & Tutoring"])
        .await;

    let recommended = fixture.data(fixture.get("/api/tasks/recommended", &vol)).await;
    assert_eq!(ids(&recommended), vec![task.clone(), other.clone()]);

    let application = fixture
        .data(fixture.post(
            &format!("/api/tasks/{}/apply", task),
            &vol,
            json!({ "message": "Happy to help on weekends" }),
        ))
        .await;
    assert_eq!(application["status"], "pending");
    assert!(application.get("respondedAt").is_none());
    assert_eq!(application["task"]["title"], "English Teacher for Children");
    let app_id = application["id"].as_str().unwrap().to_string();

    // Duplicate apply
    let resp = fixture
        .post(&format!("/api/tasks/{}/apply", task), &vol, json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let recommended = fixture.data(fixture.get("/api/tasks/recommended", &vol)).await;
    assert_eq!(ids(&recommended), vec![other.clone()]);

    // NGO side
    fixture.data(fixture.post("/api/refresh", &ngo, json!({}))).await;
    let dash = fixture.data(fixture.get("/api/dashboard", &ngo)).await;
    assert_eq!(dash["role"], "ngo");
    assert_eq!(dash["totalTasks"], 2);
    assert_eq!(dash["activeTasks"], 2);
    assert_eq!(dash["pendingApplications"], 1);

    let accepted = fixture
        .data(fixture.put(
            &format!("/api/applications/{}/status", app_id),
            &ngo,
            json!({ "status": "accepted" }),
        ))
        .await;
    assert_eq!(accepted["status"], "accepted");
    assert!(accepted["respondedAt"].is_string());

    let resp = fixture
        .put(
            &format!("/api/applications/{}/status", app_id),
            &ngo,
            json!({ "status": "rejected" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let mine = fixture.data(fixture.get("/api/tasks/mine", &ngo)).await;
    assert_eq!(mine[0]["applicationCount"], 1);
    assert_eq!(mine[0]["acceptedCount"], 1);
    assert_eq!(mine[1]["applicationCount"], 0);

    // Volunteer side
    fixture.data(fixture.post("/api/refresh", &vol, json!({}))).await;
    let dash = fixture.data(fixture.get("/api/dashboard", &vol)).await;
    assert_eq!(dash["role"], "volunteer");
    assert_eq!(dash["submitted"], 1);
    assert_eq!(dash["accepted"], 1);
    assert_eq!(dash["pending"], 0);

    let pending = fixture
        .data(fixture.get("/api/applications?status=pending", &vol))
        .await;
    assert!(pending.as_array().unwrap().is_empty());

    // Deleting the task removes its applications
    fixture
        .data(fixture.client.delete(fixture.url(&format!("/api/tasks/{}", task))).bearer_auth(&ngo))
        .await;
    let apps = fixture.data(fixture.get("/api/applications", &ngo)).await;
    assert!(apps.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ngo_cannot_touch_other_ngo_task() {
    let fixture = TestFixture::new().await;
    let first = fixture.register_ngo("first@example.com").await;
    let second = fixture.register_ngo("second@example.com").await;
    let task = fixture
        .create_task(&first, "English Teacher for Children", "Mumbai", &["Teaching & Tutoring"])
        .await;

    let resp = fixture
        .put(&format!("/api/tasks/{}", task), &second, json!({ "status": "inactive" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/tasks/{}", task)))
        .bearer_auth(&second)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
