use common::ProjectionTotals;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive operations
    pub cache: Cache<String, CachedData>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Projection(ProjectionTotals),
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::budgets::create_budget,
        crate::handlers::budgets::get_budgets,
        crate::handlers::budgets::get_budget,
        crate::handlers::budgets::update_budget,
        crate::handlers::budgets::delete_budget,
        crate::handlers::budgets::get_budget_summary,
        crate::handlers::budgets::add_budget_member,
        crate::handlers::budgets::get_budget_members,
        crate::handlers::categories::create_category,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::get_transactions,
        crate::handlers::transactions::update_transaction,
        crate::handlers::transactions::delete_transaction,
        crate::handlers::recurring::create_recurring_transaction,
        crate::handlers::recurring::get_recurring_transactions,
        crate::handlers::recurring::update_recurring_transaction,
        crate::handlers::recurring::toggle_recurring_transaction,
        crate::handlers::recurring::delete_recurring_transaction,
        crate::handlers::recurring::get_recurring_versions,
        crate::handlers::recurring::cancel_recurring_version,
        crate::handlers::recurring::process_recurring_transactions,
        crate::handlers::projection::get_budget_projection,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::budgets::CreateBudgetRequest,
            crate::handlers::budgets::UpdateBudgetRequest,
            crate::handlers::budgets::BudgetResponse,
            crate::handlers::budgets::AddBudgetMemberRequest,
            crate::handlers::budgets::BudgetMemberResponse,
            crate::handlers::budgets::BudgetSummaryResponse,
            crate::handlers::budgets::CategorySummary,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::transactions::CreateTransactionRequest,
            crate::handlers::transactions::UpdateTransactionRequest,
            crate::handlers::transactions::TransactionResponse,
            crate::handlers::recurring::CreateRecurringTransactionRequest,
            crate::handlers::recurring::UpdateRecurringTransactionRequest,
            crate::handlers::recurring::RecurringTransactionResponse,
            crate::handlers::recurring::RecurringVersionResponse,
            common::ProjectionTotals,
            common::CategoryProjection,
            common::DateRange,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User endpoints"),
        (name = "budgets", description = "Budget and summary endpoints"),
        (name = "categories", description = "Category allocation endpoints"),
        (name = "transactions", description = "One-off transaction endpoints"),
        (name = "recurring", description = "Recurring rule and version endpoints"),
        (name = "projection", description = "Projection endpoints"),
    ),
    info(
        title = "Tempo API",
        description = "Budget Tracker API - budgets, category allocations, recurring rules with effective-dated versions, and spending projections",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
