pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::groceries::handlers as groceries;
use crate::meals::handlers as meals;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        // Meal planner
        .route("/api/meals", post(meals::handle_save_meals))
        .route("/api/meals/dates", get(meals::handle_meal_dates))
        .route("/api/meals/:date", get(meals::handle_get_meals))
        // Grocery list
        .route("/api/groceries", post(groceries::handle_add_groceries))
        .route("/api/groceries/:user_id", get(groceries::handle_get_groceries))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    fn app() -> Router {
        build_router(AppState::in_memory(Config::for_tests()))
    }

    fn app_requiring_auth() -> Router {
        let mut config = Config::for_tests();
        config.require_auth = true;
        build_router(AppState::in_memory(config))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, Some(body), None).await
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, None, None).await
    }

    async fn register(app: &Router, name: &str) -> String {
        let (status, body) = post(
            app,
            "/api/auth/register",
            json!({ "name": name, "email": format!("{name}@example.com"), "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(&app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    // ── groceries ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_groceries_empty_for_new_user() {
        let (status, body) = get(&app(), "/api/groceries/sam").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_grocery_posts_append_without_dedup() {
        let app = app();
        let (status, first) = post(
            &app,
            "/api/groceries",
            json!({ "userId": "sam", "items": [{ "name": "Milk", "quantity": 2 }] }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["items"].as_array().unwrap().len(), 1);

        let (status, second) = post(
            &app,
            "/api/groceries",
            json!({ "userId": "sam", "items": [{ "name": "Milk" }, { "name": "Eggs", "quantity": 12 }] }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let items = second["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], json!({ "name": "Milk", "quantity": 1 }));
        assert_eq!(first["id"], second["id"]);

        let (status, lists) = get(&app, "/api/groceries/sam").await;
        assert_eq!(status, StatusCode::OK);
        let lists = lists.as_array().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0]["items"].as_array().unwrap().len(), 3);
        assert_eq!(lists[0]["userId"], "sam");
    }

    #[tokio::test]
    async fn test_grocery_validation_never_persists() {
        let app = app();
        for body in [
            json!({ "userId": "sam", "items": [] }),
            json!({ "userId": "sam" }),
            json!({ "userId": "sam", "items": "Milk" }),
            json!({ "items": [{ "name": "Milk" }] }),
            json!({ "userId": "", "items": [{ "name": "Milk" }] }),
            json!({ "userId": "sam", "items": [{ "quantity": 3 }] }),
        ] {
            let (status, error) = post(&app, "/api/groceries", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
        }

        let (_, lists) = get(&app, "/api/groceries/sam").await;
        assert_eq!(lists, json!([]));
    }

    #[tokio::test]
    async fn test_grocery_invalid_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/groceries")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ── meals ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_meal_missing_is_not_found() {
        let (status, body) = get(&app(), "/api/meals/2024-05-01?userId=sam").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "No meals found for this date");
    }

    #[tokio::test]
    async fn test_meal_written_empty_is_found() {
        let app = app();
        let meals = json!({ "breakfast": "", "lunch": "", "dinner": "", "snack": "" });
        let (status, _) = post(
            &app,
            "/api/meals",
            json!({ "date": "2024-05-01", "userId": "sam", "meals": meals }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = get(&app, "/api/meals/2024-05-01?userId=sam").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meals"], meals);
        assert_eq!(body["date"], "2024-05-01");
    }

    #[tokio::test]
    async fn test_meal_second_save_overwrites() {
        let app = app();
        let (status, first) = post(
            &app,
            "/api/meals",
            json!({
                "date": "2024-05-02",
                "userId": "sam",
                "meals": { "breakfast": "Oats", "lunch": "Soup", "dinner": "Pasta", "snack": "Nuts" }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, second) = post(
            &app,
            "/api/meals",
            json!({ "date": "2024-05-02", "userId": "sam", "meals": { "dinner": "Tacos" } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["id"], second["id"]);

        let (_, stored) = get(&app, "/api/meals/2024-05-02?userId=sam").await;
        assert_eq!(
            stored["meals"],
            json!({ "breakfast": null, "lunch": null, "dinner": "Tacos", "snack": null })
        );

        let (_, dates) = get(&app, "/api/meals/dates?userId=sam").await;
        assert_eq!(dates, json!(["2024-05-02"]));
    }

    #[tokio::test]
    async fn test_meal_dates_reflect_distinct_posts() {
        let app = app();
        for date in ["2024-06-10", "2024-06-01", "2024-06-10", "2024-06-05"] {
            post(
                &app,
                "/api/meals",
                json!({ "date": date, "userId": "sam", "meals": { "lunch": "Wrap" } }),
            )
            .await;
        }
        post(
            &app,
            "/api/meals",
            json!({ "date": "2024-06-03", "userId": "alex", "meals": {} }),
        )
        .await;

        let (status, dates) = get(&app, "/api/meals/dates?userId=sam").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dates, json!(["2024-06-01", "2024-06-05", "2024-06-10"]));
    }

    #[tokio::test]
    async fn test_meal_validation() {
        let app = app();
        let (status, _) = get(&app, "/api/meals/dates").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app, "/api/meals/2024-05-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app, "/api/meals/yesterday?userId=sam").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post(&app, "/api/meals", json!({ "date": "2024-05-01", "meals": {} })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post(&app, "/api/meals", json!({ "userId": "sam", "meals": {} })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, dates) = get(&app, "/api/meals/dates?userId=sam").await;
        assert_eq!(dates, json!([]));
    }

    // ── auth & sessions ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_register_then_login() {
        let app = app();
        register(&app, "sam").await;

        let (status, body) = post(
            &app,
            "/api/auth/login",
            json!({ "email": "SAM@example.com", "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "sam");
        assert!(body["token"].as_str().is_some());

        let (status, _) = post(
            &app,
            "/api/auth/login",
            json!({ "email": "sam", "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post(
            &app,
            "/api/auth/login",
            json!({ "email": "sam@example.com", "password": "wrong-one" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_duplicate_conflicts() {
        let app = app();
        register(&app, "sam").await;
        let (status, body) = post(
            &app,
            "/api/auth/register",
            json!({ "name": "sam", "email": "another@example.com", "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_token_supplies_identity() {
        let app = app();
        let token = register(&app, "sam").await;

        let (status, list) = send(
            &app,
            Method::POST,
            "/api/groceries",
            Some(json!({ "items": [{ "name": "Rice" }] })),
            Some(token.as_str()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(list["userId"], "sam");

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/groceries/alex",
            None,
            Some(token.as_str()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/meals/dates",
            None,
            Some("garbage"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_rejects_anonymous() {
        let app = app_requiring_auth();
        let (status, _) = get(&app, "/api/groceries/sam").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = register(&app, "sam").await;
        let (status, _) = send(
            &app,
            Method::GET,
            "/api/meals/dates",
            None,
            Some(token.as_str()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
