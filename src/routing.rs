//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, update_category_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        get_expenses_by_month_endpoint, get_expenses_endpoint, get_expenses_in_range_endpoint,
        update_expense_endpoint,
    },
    logging::logging_middleware,
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are allowed from any origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            get(get_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSES_BY_MONTH,
            get(get_expenses_by_month_endpoint),
        )
        .route(
            endpoints::EXPENSES_IN_RANGE,
            get(get_expenses_in_range_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn get_404_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod router_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{AppState, routing::build_router};

    fn get_test_router() -> Router {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(connection, "Etc/UTC").expect("Could not create app state.");

        build_router(state)
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Option<Value>) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("Could not build request");

        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Could not read response body")
            .to_bytes();
        let json = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).expect("Response body is not JSON"))
        };

        (status, json)
    }

    async fn create_food_category(router: &Router) -> Value {
        let (status, body) = send(
            router,
            "POST",
            "/api/categories",
            Some(json!({"name": "Food", "color": "#FF0000"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        body.expect("want category in response")
    }

    async fn create_lunch(router: &Router, category_id: &Value) -> Value {
        let (status, body) = send(
            router,
            "POST",
            "/api/expenses",
            Some(json!({
                "amount": 1200,
                "description": "lunch",
                "date": "2024-05-10",
                "category": {"id": category_id},
                "type": "EXPENSE",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        body.expect("want expense in response")
    }

    #[tokio::test]
    async fn category_crud() {
        let router = get_test_router();

        let category = create_food_category(&router).await;
        assert_eq!(category, json!({"id": 1, "name": "Food", "color": "#FF0000"}));

        let (status, body) = send(
            &router,
            "PUT",
            "/api/categories/1",
            Some(json!({"name": "Groceries", "color": "#00FF00"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            Some(json!({"id": 1, "name": "Groceries", "color": "#00FF00"}))
        );

        let (status, body) = send(&router, "GET", "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            Some(json!([{"id": 1, "name": "Groceries", "color": "#00FF00"}]))
        );

        let (status, body) = send(&router, "DELETE", "/api/categories/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, None);

        let (status, body) = send(&router, "GET", "/api/categories/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, None);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let router = get_test_router();
        let expense = json!({
            "amount": 1,
            "date": "2024-05-10",
            "type": "INCOME",
        });

        for (method, uri, body) in [
            ("GET", "/api/categories/99", None),
            (
                "PUT",
                "/api/categories/99",
                Some(json!({"name": "Food", "color": "#FF0000"})),
            ),
            ("DELETE", "/api/categories/99", None),
            ("GET", "/api/expenses/99", None),
            ("PUT", "/api/expenses/99", Some(expense.clone())),
            ("DELETE", "/api/expenses/99", None),
        ] {
            let (status, _) = send(&router, method, uri, body).await;

            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn expense_month_query() {
        let router = get_test_router();
        let category = create_food_category(&router).await;
        let expense = create_lunch(&router, &category["id"]).await;
        assert_eq!(
            expense,
            json!({
                "id": 1,
                "amount": 1200.0,
                "description": "lunch",
                "date": "2024-05-10",
                "category": {"id": 1, "name": "Food", "color": "#FF0000"},
                "type": "EXPENSE",
            })
        );

        let (status, may) = send(&router, "GET", "/api/expenses/month/2024/5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(may, Some(json!([expense])));

        let (status, june) = send(&router, "GET", "/api/expenses/month/2024/6", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(june, Some(json!([])));

        let (status, impossible) = send(&router, "GET", "/api/expenses/month/2024/13", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(impossible, Some(json!([])));
    }

    #[tokio::test]
    async fn expense_range_query() {
        let router = get_test_router();
        let category = create_food_category(&router).await;
        let expense = create_lunch(&router, &category["id"]).await;

        let (status, body) = send(
            &router,
            "GET",
            "/api/expenses/range?startDate=2024-05-01&endDate=2024-05-10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Some(json!([expense])));

        let (status, body) = send(
            &router,
            "GET",
            "/api/expenses/range?startDate=2024-05-31&endDate=2024-05-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Some(json!([])));

        let (status, _) = send(
            &router,
            "GET",
            "/api/expenses/range?startDate=2024-05-01&endDate=tomorrow",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, "GET", "/api/expenses/range?startDate=2024-05-01", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_invalid_expense_bodies() {
        let router = get_test_router();

        for body in [
            json!({"amount": 0, "date": "2024-05-10", "type": "EXPENSE"}),
            json!({"amount": -100, "date": "2024-05-10", "type": "EXPENSE"}),
            json!({"amount": 100, "type": "EXPENSE"}),
            json!({"amount": 100, "date": "2024-05-10"}),
            json!({"amount": 100, "date": "10/05/2024", "type": "EXPENSE"}),
            json!({"amount": "5", "date": "2024-05-10", "type": "EXPENSE"}),
            json!({"amount": 100, "date": "-0001-05-10", "type": "EXPENSE"}),
            json!({"amount": 100, "date": "2024-05-10", "type": "EXPENSE", "category": {"id": 7}}),
            json!("not an object"),
        ] {
            let (status, error) = send(&router, "POST", "/api/expenses", Some(body.clone())).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(error.is_some_and(|error| error["error"].is_string()));
        }

        let (_, expenses) = send(&router, "GET", "/api/expenses", None).await;
        assert_eq!(expenses, Some(json!([])));
    }

    #[tokio::test]
    async fn rejects_empty_category_name() {
        let router = get_test_router();

        let (status, _) = send(
            &router,
            "POST",
            "/api/categories",
            Some(json!({"name": "", "color": "#FF0000"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_category_keeps_expenses() {
        let router = get_test_router();
        let category = create_food_category(&router).await;
        let expense = create_lunch(&router, &category["id"]).await;

        let (status, _) = send(&router, "DELETE", "/api/categories/1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, "GET", "/api/expenses/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let body = body.expect("want expense in response");
        assert_eq!(body["category"], Value::Null);
        assert_eq!(body["amount"], expense["amount"]);
    }

    #[tokio::test]
    async fn allows_any_origin() {
        let router = get_test_router();
        let request = Request::builder()
            .method("GET")
            .uri("/api/categories")
            .header("origin", "http://localhost:5500")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .expect("missing CORS header"),
            "*"
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let router = get_test_router();

        let (status, _) = send(&router, "GET", "/api/budgets", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
