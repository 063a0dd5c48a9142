use crate::handlers::{
    budgets::{
        add_budget_member, create_budget, delete_budget, get_budget, get_budget_members,
        get_budget_summary, get_budgets, update_budget,
    },
    categories::{create_category, delete_category, get_categories, update_category},
    health::health_check,
    projection::get_budget_projection,
    recurring::{
        cancel_recurring_version, create_recurring_transaction, delete_recurring_transaction,
        get_recurring_transactions, get_recurring_versions, process_recurring_transactions,
        toggle_recurring_transaction, update_recurring_transaction,
    },
    transactions::{
        create_transaction, delete_transaction, get_transactions, update_transaction,
    },
    users::{create_user, get_user, get_users},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        // Budget CRUD routes
        .route("/api/v1/budgets", post(create_budget))
        .route("/api/v1/budgets", get(get_budgets))
        .route("/api/v1/budgets/:budget_id", get(get_budget))
        .route("/api/v1/budgets/:budget_id", put(update_budget))
        .route("/api/v1/budgets/:budget_id", delete(delete_budget))
        .route("/api/v1/budgets/:budget_id/summary", get(get_budget_summary))
        .route("/api/v1/budgets/:budget_id/members", post(add_budget_member))
        .route("/api/v1/budgets/:budget_id/members", get(get_budget_members))
        // Category routes
        .route("/api/v1/budgets/:budget_id/categories", post(create_category))
        .route("/api/v1/budgets/:budget_id/categories", get(get_categories))
        .route("/api/v1/categories/:category_id", put(update_category))
        .route("/api/v1/categories/:category_id", delete(delete_category))
        // Transaction routes
        .route("/api/v1/budgets/:budget_id/transactions", post(create_transaction))
        .route("/api/v1/budgets/:budget_id/transactions", get(get_transactions))
        .route("/api/v1/transactions/:transaction_id", put(update_transaction))
        .route("/api/v1/transactions/:transaction_id", delete(delete_transaction))
        // Recurring rule routes
        .route("/api/v1/budgets/:budget_id/recurring", post(create_recurring_transaction))
        .route("/api/v1/budgets/:budget_id/recurring", get(get_recurring_transactions))
        .route(
            "/api/v1/budgets/:budget_id/recurring/process",
            post(process_recurring_transactions),
        )
        .route("/api/v1/recurring/:rule_id", put(update_recurring_transaction))
        .route("/api/v1/recurring/:rule_id", delete(delete_recurring_transaction))
        .route("/api/v1/recurring/:rule_id/toggle", put(toggle_recurring_transaction))
        .route("/api/v1/recurring/:rule_id/versions", get(get_recurring_versions))
        .route(
            "/api/v1/recurring/versions/:version_id",
            delete(cancel_recurring_version),
        )
        // Projection routes
        .route("/api/v1/budgets/:budget_id/projection", get(get_budget_projection))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
