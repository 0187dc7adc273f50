use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate};
use habit_tracker::{router, session::SessionStore, AppState, Clock, FileStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    app: Router,
}

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

async fn test_app(today: &str) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path().join("habits.json")).await.unwrap());
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap();
    let state = AppState::new(store, SessionStore::new(Duration::days(30), false))
        .with_clock(Clock::Fixed(today));
    TestApp {
        _dir: dir,
        app: router(state),
    }
}

impl TestApp {
    async fn send(&self, method: Method, path: &str, body: Option<Value>, cookie: Option<&str>) -> Reply {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply {
            status,
            set_cookie,
            body,
        }
    }

    async fn sign_in(&self, email: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/auth/signup",
                Some(json!({ "name": "Tester", "email": email, "password": "secret1" })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        let reply = self
            .send(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": email, "password": "secret1" })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let cookie = reply.set_cookie.expect("login sets a session cookie");
        cookie.split(';').next().unwrap().to_owned()
    }

    async fn create_habit(&self, cookie: &str, body: Value) -> Value {
        let reply = self
            .send(Method::POST, "/api/habits", Some(body), Some(cookie))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["habit"].clone()
    }

    async fn track(&self, cookie: &str, habit_id: &str, date: &str) -> Reply {
        self.send(
            Method::POST,
            "/api/habits/track",
            Some(json!({ "habitId": habit_id, "date": date })),
            Some(cookie),
        )
        .await
    }
}

#[tokio::test]
async fn habit_routes_require_a_session() {
    let app = test_app("2024-03-10").await;

    for (method, path) in [
        (Method::GET, "/api/habits"),
        (Method::GET, "/api/stats"),
        (Method::GET, "/api/calendar"),
        (Method::GET, "/api/auth/me"),
    ] {
        let reply = app.send(method, path, None, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(reply.body["error"], "Unauthorized");
    }

    let reply = app
        .send(
            Method::POST,
            "/api/habits/track",
            Some(json!({ "habitId": "x", "date": "2024-03-10" })),
            Some("habit_session=forged"),
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_and_login_reject_bad_input() {
    let app = test_app("2024-03-10").await;

    let reply = app
        .send(
            Method::POST,
            "/api/auth/signup",
            Some(json!({ "name": "A", "email": "not-an-email", "password": "secret1" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .send(
            Method::POST,
            "/api/auth/signup",
            Some(json!({ "name": "A", "email": "a@b.co", "password": "123" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let cookie = app.sign_in("Person@Example.com").await;
    let reply = app.send(Method::GET, "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["user"]["email"], "person@example.com");

    let reply = app
        .send(
            Method::POST,
            "/api/auth/signup",
            Some(json!({ "name": "Again", "email": "person@example.com", "password": "secret1" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "An account with this email already exists");

    let reply = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "person@example.com", "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "Invalid email or password");
}

#[tokio::test]
async fn racing_signups_create_one_account() {
    let app = test_app("2024-03-10").await;
    let body = json!({ "name": "Twin", "email": "twin@example.com", "password": "secret1" });

    let (first, second) = tokio::join!(
        app.send(Method::POST, "/api/auth/signup", Some(body.clone()), None),
        app.send(Method::POST, "/api/auth/signup", Some(body.clone()), None),
    );
    let mut statuses = vec![first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let rejected = if first.status == StatusCode::BAD_REQUEST { first } else { second };
    assert_eq!(rejected.body["error"], "An account with this email already exists");
}

#[tokio::test]
async fn tracking_flow_updates_streaks() {
    let app = test_app("2024-03-10").await;
    let cookie = app.sign_in("flow@example.com").await;

    let habit = app.create_habit(&cookie, json!({ "name": "  Read  " })).await;
    assert_eq!(habit["name"], "Read");
    assert_eq!(habit["color"], "#3b82f6");
    assert_eq!(habit["trackedDates"], json!([]));
    let habit_id = habit["id"].as_str().unwrap().to_owned();

    let reply = app.track(&cookie, &habit_id, "2024-03-09").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["isTracked"], true);
    assert_eq!(reply.body["habit"]["trackedDates"], json!(["2024-03-09"]));

    let reply = app.send(Method::GET, "/api/habits", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["habits"][0]["currentStreak"], 1);
    assert_eq!(reply.body["habits"][0]["longestStreak"], 1);

    let reply = app.track(&cookie, &habit_id, "2024-03-10").await;
    assert_eq!(reply.body["isTracked"], true);
    let reply = app.send(Method::GET, "/api/stats", None, Some(&cookie)).await;
    assert_eq!(reply.body["currentStreak"], 2);
    assert_eq!(reply.body["completionRate"], 100);
    assert_eq!(reply.body["totalTrackedDays"], 2);

    let reply = app.track(&cookie, &habit_id, "2024-03-10").await;
    assert_eq!(reply.body["isTracked"], false);
    assert_eq!(reply.body["habit"]["trackedDates"], json!(["2024-03-09"]));
}

#[tokio::test]
async fn future_and_malformed_dates_leave_habit_unchanged() {
    let app = test_app("2024-03-10").await;
    let cookie = app.sign_in("future@example.com").await;
    let habit = app.create_habit(&cookie, json!({ "name": "Run", "color": "#10b981" })).await;
    let habit_id = habit["id"].as_str().unwrap().to_owned();

    let reply = app.track(&cookie, &habit_id, "2024-03-11").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Cannot track a date in the future");

    for bad in ["2024-3-09", "2024-02-30", "yesterday"] {
        let reply = app.track(&cookie, &habit_id, bad).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{bad}");
    }

    let reply = app
        .send(
            Method::POST,
            "/api/habits/track",
            Some(json!({ "habitId": habit_id })),
            Some(&cookie),
        )
        .await;
    assert_eq!(reply.body["error"], "Date is required");

    let reply = app.send(Method::GET, "/api/habits", None, Some(&cookie)).await;
    assert_eq!(reply.body["habits"][0]["trackedDates"], json!([]));
}

#[tokio::test]
async fn habits_are_private_to_their_owner() {
    let app = test_app("2024-03-10").await;
    let owner = app.sign_in("owner@example.com").await;
    let intruder = app.sign_in("intruder@example.com").await;
    let habit = app.create_habit(&owner, json!({ "name": "Meditate" })).await;
    let habit_id = habit["id"].as_str().unwrap().to_owned();

    let reply = app.track(&intruder, &habit_id, "2024-03-10").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let path = format!("/api/habits/{habit_id}");
    let reply = app.send(Method::DELETE, &path, None, Some(&intruder)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.send(Method::GET, "/api/habits", None, Some(&intruder)).await;
    assert_eq!(reply.body["habits"], json!([]));

    let reply = app.send(Method::DELETE, &path, None, Some(&owner)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["message"], "Habit deleted successfully");

    let reply = app.send(Method::DELETE, &path, None, Some(&owner)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .send(Method::DELETE, "/api/habits/not-a-uuid", None, Some(&owner))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_habit_validates_name_and_color() {
    let app = test_app("2024-03-10").await;
    let cookie = app.sign_in("validate@example.com").await;

    for body in [
        json!({ "name": "   " }),
        json!({}),
        json!({ "name": "x".repeat(101) }),
        json!({ "name": "Ok", "color": "blue" }),
    ] {
        let reply = app
            .send(Method::POST, "/api/habits", Some(body.clone()), Some(&cookie))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{body}");
        assert!(reply.body["error"].is_string());
    }
}

#[tokio::test]
async fn calendar_marks_tracked_days() {
    let app = test_app("2024-03-10").await;
    let cookie = app.sign_in("calendar@example.com").await;
    let habit = app.create_habit(&cookie, json!({ "name": "Journal" })).await;
    let habit_id = habit["id"].as_str().unwrap().to_owned();
    app.track(&cookie, &habit_id, "2024-03-05").await;

    let reply = app.send(Method::GET, "/api/calendar", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["label"], "March 2024");
    let days = reply.body["days"].as_array().unwrap();
    assert_eq!(days.len(), 42);
    let fifth = days.iter().find(|day| day["date"] == "2024-03-05").unwrap();
    assert_eq!(fifth["tracked"], json!([habit_id]));

    let reply = app
        .send(Method::GET, "/api/calendar?year=2024&month=13", None, Some(&cookie))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calendar_rejects_unusable_months_with_json_errors() {
    let app = test_app("2024-03-10").await;
    let cookie = app.sign_in("calendar-limits@example.com").await;

    let last_year = NaiveDate::MAX.year();
    for path in [
        "/api/calendar?year=2024&month=march".to_owned(),
        "/api/calendar?year=soon".to_owned(),
        format!("/api/calendar?year={last_year}&month=12"),
        format!("/api/calendar?year={}&month=1", last_year + 1),
    ] {
        let reply = app.send(Method::GET, &path, None, Some(&cookie)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{path}");
        assert!(reply.body["error"].is_string(), "{path}: {:?}", reply.body);
    }
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = test_app("2024-03-10").await;
    let cookie = app.sign_in("logout@example.com").await;

    let reply = app.send(Method::POST, "/api/auth/logout", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.set_cookie.unwrap().contains("Max-Age=0"));

    let reply = app.send(Method::GET, "/api/habits", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}
