#[cfg(test)]
mod integration_tests {
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Local};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn json_dec(value: &Value) -> Decimal {
        Decimal::from_str(value.as_str().expect("expected decimal string")).unwrap()
    }

    async fn create_test_budget(server: &TestServer) -> i64 {
        let response = server
            .post("/api/v1/budgets")
            .json(&json!({
                "name": "Household",
                "budget_type": "personal",
                "owner_id": 1
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    async fn create_test_category(
        server: &TestServer,
        budget_id: i64,
        name: &str,
        amount: &str,
        parent_id: Option<i64>,
    ) -> i64 {
        let response = server
            .post(&format!("/api/v1/budgets/{budget_id}/categories"))
            .json(&json!({
                "name": name,
                "amount": amount,
                "parent_id": parent_id
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    async fn create_test_rule(
        server: &TestServer,
        budget_id: i64,
        category_id: i64,
        title: &str,
        amount: &str,
        frequency: &str,
        day: i32,
    ) -> i64 {
        let response = server
            .post(&format!("/api/v1/budgets/{budget_id}/recurring"))
            .json(&json!({
                "category_id": category_id,
                "title": title,
                "amount": amount,
                "transaction_type": "expense",
                "frequency": frequency,
                "day": day
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    async fn get_versions(server: &TestServer, rule_id: i64) -> Vec<Value> {
        let response = server
            .get(&format!("/api/v1/recurring/{rule_id}/versions"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        body.data.as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/users")
            .json(&json!({
                "name": "Alice",
                "email": "alice@example.com"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["email"], "alice@example.com");

        let user_id = body.data["id"].as_i64().unwrap();
        let response = server.get(&format!("/api/v1/users/{user_id}")).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["name"], "Alice");
    }

    #[tokio::test]
    async fn test_budget_crud() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;

        let response = server.get(&format!("/api/v1/budgets/{budget_id}")).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["name"], "Household");
        assert_eq!(body.data["budget_type"], "personal");

        let response = server
            .put(&format!("/api/v1/budgets/{budget_id}"))
            .json(&json!({"name": "Shared flat", "budget_type": "group"}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["name"], "Shared flat");
        assert_eq!(body.data["budget_type"], "group");

        let response = server
            .delete(&format!("/api/v1/budgets/{budget_id}"))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&format!("/api/v1/budgets/{budget_id}")).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_budget_rejects_unknown_type() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/budgets")
            .json(&json!({
                "name": "Broken",
                "budget_type": "corporate",
                "owner_id": 1
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: crate::schemas::ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_BUDGET_TYPE");
    }

    #[tokio::test]
    async fn test_budget_members() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;

        let response = server
            .post("/api/v1/users")
            .json(&json!({"name": "Bob", "email": "bob@example.com"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let user_id = body.data["id"].as_i64().unwrap();

        let response = server
            .post(&format!("/api/v1/budgets/{budget_id}/members"))
            .json(&json!({"user_id": user_id, "share": "60.00"}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/budgets/{budget_id}/members"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        let members = body.data.as_array().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["user_id"].as_i64(), Some(user_id));
        assert_eq!(json_dec(&members[0]["share"]), dec("60"));
    }

    #[tokio::test]
    async fn test_category_listing_rolls_children_into_parent() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let parent_id = create_test_category(&server, budget_id, "Food", "100", None).await;
        let child_id =
            create_test_category(&server, budget_id, "Groceries", "50", Some(parent_id)).await;

        let response = server
            .get(&format!("/api/v1/budgets/{budget_id}/categories"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        let categories = body.data.as_array().unwrap();

        let parent = categories
            .iter()
            .find(|c| c["id"].as_i64() == Some(parent_id))
            .unwrap();
        let child = categories
            .iter()
            .find(|c| c["id"].as_i64() == Some(child_id))
            .unwrap();

        // Parent lists its own allocation plus the child's.
        assert_eq!(json_dec(&parent["amount"]), dec("150"));
        assert_eq!(json_dec(&child["amount"]), dec("50"));
        assert_eq!(child["parent_id"].as_i64(), Some(parent_id));
    }

    #[tokio::test]
    async fn test_transaction_crud() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Food", "200", None).await;

        let response = server
            .post(&format!("/api/v1/budgets/{budget_id}/transactions"))
            .json(&json!({
                "category_id": category_id,
                "title": "Weekly shop",
                "amount": "42.50",
                "transaction_type": "expense",
                "date": "2024-06-15",
                "comment": "supermarket"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let transaction_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["is_recurring"], false);

        let response = server
            .put(&format!("/api/v1/transactions/{transaction_id}"))
            .json(&json!({"amount": "45.00"}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(json_dec(&body.data["amount"]), dec("45"));

        let response = server
            .get(&format!("/api/v1/budgets/{budget_id}/transactions"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data.as_array().unwrap().len(), 1);

        let response = server
            .delete(&format!("/api/v1/transactions/{transaction_id}"))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/budgets/{budget_id}/transactions"))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert!(body.data.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transaction_rejects_category_from_other_budget() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let other_budget_id = create_test_budget(&server).await;
        let foreign_category =
            create_test_category(&server, other_budget_id, "Food", "100", None).await;

        let response = server
            .post(&format!("/api/v1/budgets/{budget_id}/transactions"))
            .json(&json!({
                "category_id": foreign_category,
                "title": "Misplaced",
                "amount": "10",
                "transaction_type": "expense",
                "date": "2024-06-15"
            }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_recurring_creation_seeds_initial_version() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let versions = get_versions(&server, rule_id).await;
        assert_eq!(versions.len(), 1);

        let today = Local::now().date_naive().to_string();
        assert_eq!(versions[0]["effective_from"], today.as_str());
        assert!(versions[0]["effective_until"].is_null());
        assert_eq!(json_dec(&versions[0]["amount"]), dec("950"));
    }

    #[tokio::test]
    async fn test_immediate_update_closes_current_version() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let response = server
            .put(&format!("/api/v1/recurring/{rule_id}"))
            .json(&json!({
                "amount": "980",
                "change_reason": "Rent increase"
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        // Live fields mirror the new current version right away.
        assert_eq!(json_dec(&body.data["amount"]), dec("980"));
        assert!(body.data["pending_version"].is_null());

        let versions = get_versions(&server, rule_id).await;
        assert_eq!(versions.len(), 2);

        let today = Local::now().date_naive().to_string();
        let closed = versions
            .iter()
            .find(|v| !v["effective_until"].is_null())
            .unwrap();
        let open = versions
            .iter()
            .find(|v| v["effective_until"].is_null())
            .unwrap();
        assert_eq!(closed["effective_until"], today.as_str());
        assert_eq!(json_dec(&closed["amount"]), dec("950"));
        assert_eq!(json_dec(&open["amount"]), dec("980"));
        assert_eq!(open["change_reason"], "Rent increase");
    }

    #[tokio::test]
    async fn test_future_update_schedules_pending_version() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let effective = (Local::now().date_naive() + Duration::days(60)).to_string();
        let response = server
            .put(&format!("/api/v1/recurring/{rule_id}"))
            .json(&json!({
                "amount": "1000",
                "effective_date": effective
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();

        // The current version and live fields are untouched.
        assert_eq!(json_dec(&body.data["amount"]), dec("950"));
        let pending = &body.data["pending_version"];
        assert!(!pending.is_null());
        assert_eq!(json_dec(&pending["amount"]), dec("1000"));
        assert_eq!(pending["effective_from"], effective.as_str());

        let versions = get_versions(&server, rule_id).await;
        assert_eq!(versions.len(), 2);
    }

    #[tokio::test]
    async fn test_second_future_update_replaces_pending_version() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let first = (Local::now().date_naive() + Duration::days(30)).to_string();
        let second = (Local::now().date_naive() + Duration::days(90)).to_string();

        server
            .put(&format!("/api/v1/recurring/{rule_id}"))
            .json(&json!({"amount": "1000", "effective_date": first}))
            .await
            .assert_status(StatusCode::OK);
        server
            .put(&format!("/api/v1/recurring/{rule_id}"))
            .json(&json!({"amount": "1100", "effective_date": second}))
            .await
            .assert_status(StatusCode::OK);

        // The first pending version was replaced, never stacked.
        let versions = get_versions(&server, rule_id).await;
        assert_eq!(versions.len(), 2);
        let pending = versions
            .iter()
            .find(|v| v["effective_from"] == second.as_str())
            .unwrap();
        assert_eq!(json_dec(&pending["amount"]), dec("1100"));
    }

    #[tokio::test]
    async fn test_immediate_update_drops_scheduled_pending() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let effective = (Local::now().date_naive() + Duration::days(60)).to_string();
        server
            .put(&format!("/api/v1/recurring/{rule_id}"))
            .json(&json!({"amount": "1000", "effective_date": effective}))
            .await
            .assert_status(StatusCode::OK);

        // An immediate edit supersedes the scheduled change entirely.
        let response = server
            .put(&format!("/api/v1/recurring/{rule_id}"))
            .json(&json!({"amount": "990"}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(json_dec(&body.data["amount"]), dec("990"));
        assert!(body.data["pending_version"].is_null());

        let versions = get_versions(&server, rule_id).await;
        assert_eq!(versions.len(), 2);
        let open: Vec<_> = versions
            .iter()
            .filter(|v| v["effective_until"].is_null())
            .collect();
        assert_eq!(open.len(), 1);
        assert_eq!(json_dec(&open[0]["amount"]), dec("990"));
    }

    #[tokio::test]
    async fn test_cancel_pending_version() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let effective = (Local::now().date_naive() + Duration::days(45)).to_string();
        server
            .put(&format!("/api/v1/recurring/{rule_id}"))
            .json(&json!({"amount": "1000", "effective_date": effective}))
            .await
            .assert_status(StatusCode::OK);

        let versions = get_versions(&server, rule_id).await;
        let pending_id = versions
            .iter()
            .find(|v| v["effective_from"] == effective.as_str())
            .unwrap()["id"]
            .as_i64()
            .unwrap();

        let response = server
            .delete(&format!("/api/v1/recurring/versions/{pending_id}"))
            .await;
        response.assert_status(StatusCode::OK);

        let versions = get_versions(&server, rule_id).await;
        assert_eq!(versions.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_current_version_is_rejected() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let versions = get_versions(&server, rule_id).await;
        let current_id = versions[0]["id"].as_i64().unwrap();

        let response = server
            .delete(&format!("/api/v1/recurring/versions/{current_id}"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: crate::schemas::ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_STATE");

        // The history is untouched.
        let versions = get_versions(&server, rule_id).await;
        assert_eq!(versions.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_recurring_rule() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let response = server
            .put(&format!("/api/v1/recurring/{rule_id}/toggle"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["active"], false);

        let response = server
            .put(&format!("/api/v1/recurring/{rule_id}/toggle"))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["active"], true);
    }

    #[tokio::test]
    async fn test_delete_recurring_rule_removes_versions() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        let rule_id =
            create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let response = server.delete(&format!("/api/v1/recurring/{rule_id}")).await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/recurring/{rule_id}/versions"))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_process_recurring_is_idempotent() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        // Day 1 of the month is always due by the time processing runs.
        create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let response = server
            .post(&format!("/api/v1/budgets/{budget_id}/recurring/process"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        let created = body.data.as_array().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["is_recurring"], true);
        assert_eq!(json_dec(&created[0]["amount"]), dec("950"));

        // Running again must not duplicate the occurrence.
        let response = server
            .post(&format!("/api/v1/budgets/{budget_id}/recurring/process"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert!(body.data.as_array().unwrap().is_empty());

        let response = server
            .get(&format!("/api/v1/budgets/{budget_id}/transactions"))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_projection_totals_over_fixed_range() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        create_test_rule(&server, budget_id, category_id, "Rent", "100", "monthly", 1).await;

        // Three firsts of the month inside the window.
        let response = server
            .get(&format!(
                "/api/v1/budgets/{budget_id}/projection?start_date=2030-01-01&end_date=2030-03-31"
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(json_dec(&body.data["projected_expenses"]), dec("300"));
        assert_eq!(json_dec(&body.data["projected_income"]), dec("0"));
        assert_eq!(json_dec(&body.data["net_balance"]), dec("-300"));
    }

    #[tokio::test]
    async fn test_projection_empty_budget_is_zero() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;

        let response = server
            .get(&format!(
                "/api/v1/budgets/{budget_id}/projection?start_date=2030-01-01&end_date=2030-12-31"
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(json_dec(&body.data["projected_income"]), dec("0"));
        assert_eq!(json_dec(&body.data["projected_expenses"]), dec("0"));
        assert_eq!(json_dec(&body.data["net_balance"]), dec("0"));
    }

    #[tokio::test]
    async fn test_projection_invalid_range_is_rejected() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;

        let response = server
            .get(&format!(
                "/api/v1/budgets/{budget_id}/projection?start_date=2030-06-01&end_date=2030-01-01"
            ))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: crate::schemas::ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_RANGE");
    }

    #[tokio::test]
    async fn test_budget_summary_over_past_range() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Food", "100", None).await;

        server
            .post(&format!("/api/v1/budgets/{budget_id}/transactions"))
            .json(&json!({
                "category_id": category_id,
                "title": "Groceries",
                "amount": "25",
                "transaction_type": "expense",
                "date": "2020-06-15"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        // A past range: no projected occurrences, pure actuals.
        let response = server
            .get(&format!(
                "/api/v1/budgets/{budget_id}/summary?start_date=2020-01-01&end_date=2020-12-31"
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();

        assert_eq!(json_dec(&body.data["total_allocated"]), dec("100"));
        assert_eq!(json_dec(&body.data["total_spent"]), dec("25"));
        assert_eq!(json_dec(&body.data["total_remaining"]), dec("75"));
        assert_eq!(json_dec(&body.data["projected"]["projected_expenses"]), dec("0"));

        let categories = body.data["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(json_dec(&categories[0]["spent"]), dec("25"));
        assert_eq!(json_dec(&categories[0]["remaining"]), dec("75"));
    }

    #[tokio::test]
    async fn test_budget_summary_rejects_reversed_range() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;

        let response = server
            .get(&format!(
                "/api/v1/budgets/{budget_id}/summary?start_date=2024-12-01&end_date=2024-01-01"
            ))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: crate::schemas::ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_RANGE");
    }

    #[tokio::test]
    async fn test_recurring_listing_carries_category_name() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let budget_id = create_test_budget(&server).await;
        let category_id = create_test_category(&server, budget_id, "Housing", "1000", None).await;
        create_test_rule(&server, budget_id, category_id, "Rent", "950", "monthly", 1).await;

        let response = server
            .get(&format!("/api/v1/budgets/{budget_id}/recurring"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        let rules = body.data.as_array().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0]["category_name"], "Housing");
        assert!(rules[0]["pending_version"].is_null());

        let today = Local::now().date_naive().to_string();
        assert_eq!(rules[0]["created_at"], today.as_str());
    }
}
