//! End-to-end tests: a real server on a loopback port driven by the client.

use std::time::Duration;

use liftlog::client::{ApiClient, Session, TokenStore};
use liftlog::model::{NewUserRequest, SetRequest, SignupRequest};
use liftlog::password::PasswordHasher;
use liftlog::server::{build_router, serve_on, AppState};
use liftlog::storage::NewUser;
use liftlog::{Error, Role, Storage};
use reqwest::Method;
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

const ADMIN_EMAIL: &str = "admin@local";
const ADMIN_PASSWORD: &str = "admin";

struct TestServer {
    base_url: String,
    dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(Storage::open_in_memory().unwrap(), TempDir::new().unwrap()).await
    }

    async fn start_with(storage: Storage, dir: TempDir) -> Self {
        let state = AppState::new(storage, PasswordHasher::new(1000), chrono::Duration::days(7));
        assert!(state.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_on(listener, build_router(state, 4096)));

        Self {
            base_url: format!("http://{addr}"),
            dir,
        }
    }

    fn api(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    /// A client session whose token lives in its own file.
    fn session(&self, name: &str) -> Session {
        let tokens = TokenStore::new(self.dir.path().join(name));
        Session::new(self.api(), tokens).unwrap()
    }

    async fn admin(&self) -> Session {
        let mut session = self.session("admin-token");
        session.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        session
    }

    async fn client(&self, email: &str) -> Session {
        let mut session = self.session(email);
        session
            .signup(&SignupRequest {
                email: Some(email.to_string()),
                password: Some("pw123".to_string()),
                name: Some("Ana".to_string()),
                surname: Some("Silva".to_string()),
            })
            .await
            .unwrap();
        session
    }
}

fn set(exercise_id: i64, reps: i64, weight: f64) -> SetRequest {
    SetRequest {
        exercise_id: Some(exercise_id),
        reps: Some(reps),
        weight: Some(weight),
    }
}

fn api_error(err: &Error) -> (u16, String) {
    (err.api_status().unwrap_or(0), err.to_string())
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let server = TestServer::start().await;
    let health = server.api().health().await.unwrap();
    assert_eq!(health, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_login_errors() {
    let server = TestServer::start().await;
    let api = server.api();

    let err = api.login(ADMIN_EMAIL, "wrong").await.unwrap_err();
    assert_eq!(api_error(&err), (401, "invalid credentials".to_string()));

    let err = api.login("nobody@local", "pw").await.unwrap_err();
    assert_eq!(api_error(&err), (401, "invalid credentials".to_string()));

    let err = api
        .api(Method::POST, "/login", Some(json!({ "email": ADMIN_EMAIL })), false)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "missing email/password".to_string()));
}

#[tokio::test]
async fn test_signup_logs_in_and_rejects_duplicates() {
    let server = TestServer::start().await;
    let mut session = server.client("ana@example.com").await;

    let me = session.ensure_user().await.unwrap();
    assert_eq!(me.email, "ana@example.com");
    assert_eq!(me.role, Role::Client);

    let err = server
        .api()
        .signup(&SignupRequest {
            email: Some("ana@example.com".to_string()),
            password: Some("other".to_string()),
            name: Some("Ana".to_string()),
            surname: Some("Other".to_string()),
        })
        .await
        .unwrap_err();
    assert_eq!(
        api_error(&err),
        (400, "signup failed (email already exists?)".to_string())
    );

    let err = server
        .api()
        .signup(&SignupRequest {
            email: Some("a@".to_string()),
            password: Some("pw".to_string()),
            name: Some("A".to_string()),
            surname: Some("B".to_string()),
        })
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid values".to_string()));
}

#[tokio::test]
async fn test_authenticated_routes_require_token() {
    let server = TestServer::start().await;

    let err = server
        .api()
        .api(Method::GET, "/workouts", None, false)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (401, "missing bearer token".to_string()));

    let mut api = server.api();
    api.set_token(Some("not-a-session".to_string()));
    let err = api.list_workouts().await.unwrap_err();
    assert_eq!(api_error(&err), (401, "invalid or expired session".to_string()));

    let err = server.api().list_workouts().await.unwrap_err();
    assert!(matches!(err, Error::MissingToken));
}

#[tokio::test]
async fn test_exercise_admin_flow() {
    let server = TestServer::start().await;
    let admin = server.admin().await;
    let mut client = server.client("bob@example.com").await;

    let squat = admin.api().create_exercise("Squat").await.unwrap();
    assert_eq!(squat.name, "Squat");

    let err = client.api().create_exercise("Deadlift").await.unwrap_err();
    assert_eq!(api_error(&err), (403, "admin only".to_string()));
    assert!(matches!(
        client.ensure_admin().await.unwrap_err(),
        Error::AdminOnly
    ));

    let err = admin
        .api()
        .api(Method::POST, "/exercises", Some(json!({ "name": "  " })), true)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid json".to_string()));

    let renamed = admin.api().update_exercise(squat.id, "Back Squat").await.unwrap();
    assert_eq!(renamed.name, "Back Squat");
    assert_eq!(client.api().get_exercise(squat.id).await.unwrap().name, "Back Squat");

    let err = admin.api().update_exercise(999, "Ghost").await.unwrap_err();
    assert_eq!(api_error(&err), (404, "not found".to_string()));

    // Referenced by a set: refused
    let workout = client.api().create_workout().await.unwrap();
    client.api().add_set(workout.id, &set(squat.id, 5, 100.0)).await.unwrap();
    let err = admin.api().delete_exercise(squat.id).await.unwrap_err();
    assert_eq!(err.api_status(), Some(409));

    client.api().delete_workout(workout.id).await.unwrap();
    admin.api().delete_exercise(squat.id).await.unwrap();
    assert!(client.api().list_exercises().await.unwrap().is_empty());

    let err = admin.api().delete_exercise(squat.id).await.unwrap_err();
    assert_eq!(api_error(&err), (404, "not found".to_string()));
}

#[tokio::test]
async fn test_workouts_and_sets() {
    let server = TestServer::start().await;
    let admin = server.admin().await;
    let ana = server.client("ana@example.com").await;
    let bob = server.client("bob@example.com").await;

    let squat = admin.api().create_exercise("Squat").await.unwrap();
    let bench = admin.api().create_exercise("Bench").await.unwrap();

    let first = ana.api().create_workout().await.unwrap();
    let second = ana.api().create_workout().await.unwrap();
    let listed = ana.api().list_workouts().await.unwrap();
    assert_eq!(
        listed.iter().map(|w| w.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
    assert!(bob.api().list_workouts().await.unwrap().is_empty());

    let added = ana.api().add_set(first.id, &set(squat.id, 5, 100.0)).await.unwrap();
    assert_eq!(added.exercise_name, "Squat");
    ana.api().add_set(first.id, &set(bench.id, 8, 60.0)).await.unwrap();

    let workout = ana.api().get_workout(first.id).await.unwrap();
    assert_eq!(workout.sets.len(), 2);
    assert_eq!(workout.sets[0].id, added.id);

    // Another user's workout looks like it does not exist
    let err = bob.api().get_workout(first.id).await.unwrap_err();
    assert_eq!(api_error(&err), (404, "not found".to_string()));
    let err = bob.api().add_set(first.id, &set(squat.id, 1, 1.0)).await.unwrap_err();
    assert_eq!(api_error(&err), (404, "workout not found".to_string()));

    let err = ana.api().add_set(first.id, &set(999, 5, 100.0)).await.unwrap_err();
    assert_eq!(api_error(&err), (404, "exercise not found".to_string()));

    let err = ana.api().add_set(first.id, &set(squat.id, 0, 100.0)).await.unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid values".to_string()));

    let missing = SetRequest {
        exercise_id: Some(squat.id),
        reps: None,
        weight: Some(10.0),
    };
    let err = ana.api().add_set(first.id, &missing).await.unwrap_err();
    assert_eq!(api_error(&err), (400, "missing fields".to_string()));

    let updated = ana
        .api()
        .update_set(first.id, added.id, &SetRequest {
            exercise_id: None,
            reps: Some(6),
            weight: Some(105.0),
        })
        .await
        .unwrap();
    assert_eq!((updated.reps, updated.exercise_id), (6, squat.id));
    assert!((updated.weight - 105.0).abs() < f64::EPSILON);

    let err = ana.api().update_set(second.id, added.id, &set(squat.id, 1, 1.0)).await.unwrap_err();
    assert_eq!(api_error(&err), (404, "not found".to_string()));

    ana.api().delete_set(first.id, added.id).await.unwrap();
    let err = ana.api().delete_set(first.id, added.id).await.unwrap_err();
    assert_eq!(err.api_status(), Some(404));
    assert_eq!(ana.api().get_workout(first.id).await.unwrap().sets.len(), 1);

    let err = ana
        .api()
        .api(Method::PUT, &format!("/workouts/{}", first.id), Some(json!({})), true)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (501, "not implemented".to_string()));

    let err = ana
        .api()
        .api(Method::GET, "/workouts/abc", None, true)
        .await
        .unwrap_err();
    assert_eq!(err.api_status(), Some(400));

    ana.api().delete_workout(first.id).await.unwrap();
    let err = ana.api().get_workout(first.id).await.unwrap_err();
    assert_eq!(err.api_status(), Some(404));
}

#[tokio::test]
async fn test_stats() {
    let server = TestServer::start().await;
    let admin = server.admin().await;
    let ana = server.client("ana@example.com").await;

    let squat = admin.api().create_exercise("Squat").await.unwrap();
    let bench = admin.api().create_exercise("Bench").await.unwrap();

    assert!(ana.api().volume(None).await.unwrap().is_empty());

    let workout = ana.api().create_workout().await.unwrap();
    ana.api().add_set(workout.id, &set(squat.id, 5, 100.0)).await.unwrap();
    ana.api().add_set(workout.id, &set(squat.id, 10, 60.0)).await.unwrap();

    let volume = ana.api().volume(Some(30)).await.unwrap();
    assert_eq!(volume.len(), 1);
    assert!((volume[0].volume - 1100.0).abs() < 1e-9);

    let records = ana.api().personal_records().await.unwrap();
    let squat_pr = records.iter().find(|r| r.exercise_id == squat.id).unwrap();
    assert!((squat_pr.max_weight - 100.0).abs() < f64::EPSILON);
    assert_eq!(squat_pr.max_reps, 10);
    assert!((squat_pr.max_volume - 600.0).abs() < f64::EPSILON);

    let bench_pr = records.iter().find(|r| r.exercise_id == bench.id).unwrap();
    assert_eq!(bench_pr.max_reps, 0);

    // Out-of-range windows fall back to the default week
    let fallback = ana
        .api()
        .api(Method::GET, "/stats/volume?days=0", None, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fallback.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_admin_users() {
    let server = TestServer::start().await;
    let admin = server.admin().await;
    let client = server.client("ana@example.com").await;

    let req = NewUserRequest {
        email: Some("coach@example.com".to_string()),
        password: Some("pw".to_string()),
        name: Some("Coach".to_string()),
        surname: Some("Carter".to_string()),
        role: Some("admin".to_string()),
    };
    let coach = admin.api().create_user(&req).await.unwrap();
    assert_eq!(coach.role, Role::Admin);

    let err = admin.api().create_user(&req).await.unwrap_err();
    assert_eq!(
        api_error(&err),
        (400, "insert failed (email already exists?)".to_string())
    );

    let err = admin
        .api()
        .create_user(&NewUserRequest {
            email: Some("x@example.com".to_string()),
            role: Some("owner".to_string()),
            ..req.clone()
        })
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid role".to_string()));

    let users = admin.api().list_users().await.unwrap();
    assert_eq!(
        users.iter().map(|u| u.email.as_str()).collect::<Vec<_>>(),
        vec![ADMIN_EMAIL, "ana@example.com", "coach@example.com"]
    );

    let err = client.api().list_users().await.unwrap_err();
    assert_eq!(api_error(&err), (403, "admin only".to_string()));

    // The new admin can log in with the password they were given
    let mut coach_session = server.session("coach-token");
    coach_session.login("coach@example.com", "pw").await.unwrap();
    coach_session.ensure_admin().await.unwrap();
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let server = TestServer::start().await;
    let mut session = server.client("ana@example.com").await;
    let token = session.api().token().unwrap().to_string();

    session.logout().await.unwrap();
    assert!(!session.has_token());
    assert!(matches!(
        session.ensure_user().await.unwrap_err(),
        Error::NotLoggedIn
    ));

    // The old token is dead on the server too
    let mut api = server.api();
    api.set_token(Some(token));
    let err = api.me().await.unwrap_err();
    assert_eq!(err.api_status(), Some(401));
}

#[tokio::test]
async fn test_stored_token_survives_restart_of_client() {
    let server = TestServer::start().await;
    server.client("ana@example.com").await;

    // A fresh session reading the same token file is still logged in
    let mut again = server.session("ana@example.com");
    assert!(again.has_token());
    assert_eq!(again.ensure_user().await.unwrap().email, "ana@example.com");
}

#[tokio::test]
async fn test_unknown_route() {
    let server = TestServer::start().await;
    let err = server
        .api()
        .api(Method::GET, "/nope", None, false)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (404, "not found".to_string()));
}

#[tokio::test]
async fn test_wrong_method_on_known_path() {
    let server = TestServer::start().await;
    let api = server.api();

    for (method, path) in [
        (Method::PATCH, "/exercises"),
        (Method::DELETE, "/health"),
        (Method::GET, "/login"),
    ] {
        let err = api.api(method, path, None, false).await.unwrap_err();
        assert_eq!(api_error(&err), (404, "not found".to_string()), "{path}");
    }
}

#[tokio::test]
async fn test_rejected_query_is_json() {
    let server = TestServer::start().await;
    let ana = server.client("ana@example.com").await;

    let err = ana
        .api()
        .api(Method::GET, "/stats/volume?days=1&days=2", None, true)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid query".to_string()));
}

#[tokio::test]
async fn test_malformed_and_oversize_bodies() {
    let server = TestServer::start().await;
    let admin = server.admin().await;

    let response = reqwest::Client::new()
        .post(format!("{}/exercises", server.base_url))
        .bearer_auth(admin.api().token().unwrap())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "invalid body" }));

    // The test server caps bodies at 4096 bytes
    let err = admin.api().create_exercise(&"x".repeat(5000)).await.unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid body".to_string()));
    assert!(admin.api().list_exercises().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_set_route_ids() {
    let server = TestServer::start().await;
    let ana = server.client("ana@example.com").await;

    let err = ana
        .api()
        .api(Method::DELETE, "/workouts/abc/sets/1", None, true)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid ids".to_string()));

    let err = ana
        .api()
        .api(Method::PUT, "/workouts/1/sets/0", Some(json!({ "reps": 1, "weight": 1.0 })), true)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid ids".to_string()));

    let err = ana
        .api()
        .api(Method::POST, "/workouts/-1/sets", Some(json!({})), true)
        .await
        .unwrap_err();
    assert_eq!(api_error(&err), (400, "invalid workout id".to_string()));
}

#[tokio::test]
async fn test_legacy_plaintext_password_is_upgraded_on_login() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("liftlog.db");

    let storage = Storage::open(&db_path).unwrap();
    storage
        .create_user(&NewUser {
            email: "old@example.com",
            password_hash: "letmein",
            name: "Old",
            surname: "Timer",
            role: Role::Client,
        })
        .unwrap();
    let server = TestServer::start_with(storage, dir).await;

    let err = server.api().login("old@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.api_status(), Some(401));

    let mut session = server.session("old-token");
    let auth = session.login("old@example.com", "letmein").await.unwrap();
    assert_eq!(auth.user.email, "old@example.com");

    let stored = Storage::open(&db_path)
        .unwrap()
        .find_credentials("old@example.com")
        .unwrap()
        .unwrap()
        .password_hash;
    assert!(stored.starts_with("pbkdf2$sha256$1000$"), "{stored}");

    // The upgraded hash still accepts the same password
    session.logout().await.unwrap();
    session.login("old@example.com", "letmein").await.unwrap();
}
