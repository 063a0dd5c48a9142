use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{Datelike, Local, NaiveDate};
use common::{CategoryProjection, DateRange, ProjectionTotals};
use compute::occurrence::days_in_month;
use compute::projection::{project_by_category, project_totals};
use compute::ComputeError;
use model::entities::{budget, budget_member, category, recurring_transaction, transaction, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a budget
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBudgetRequest {
    /// Budget name
    pub name: String,
    /// "personal" or "group"
    pub budget_type: String,
    /// User who owns and administers the budget
    pub owner_id: i32,
}

/// Request body for updating a budget
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateBudgetRequest {
    /// Budget name
    pub name: Option<String>,
    /// "personal" or "group"
    pub budget_type: Option<String>,
}

/// Budget response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub id: i32,
    pub name: String,
    pub budget_type: String,
    pub owner_id: i32,
}

impl From<budget::Model> for BudgetResponse {
    fn from(model: budget::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            budget_type: match model.budget_type {
                budget::BudgetType::Personal => "personal".to_string(),
                budget::BudgetType::Group => "group".to_string(),
            },
            owner_id: model.owner_id,
        }
    }
}

/// Per-category breakdown inside a budget summary
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    /// Allocated amount for this category alone
    pub allocated: Decimal,
    /// Expenses already recorded inside the range
    pub spent: Decimal,
    /// Projected expenses from recurring rules, strictly after today
    pub projected: Decimal,
    /// allocated - spent - projected
    pub remaining: Decimal,
}

/// Budget summary over a date range
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetSummaryResponse {
    pub id: i32,
    pub name: String,
    pub range: DateRange,
    pub total_allocated: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    /// Recurring projection over the part of the range after today
    pub projected: ProjectionTotals,
    pub categories: Vec<CategorySummary>,
}

/// Query parameters for the budget summary
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct SummaryQuery {
    /// First day of the range (default: first day of the current month)
    pub start_date: Option<NaiveDate>,
    /// Last day of the range (default: last day of the current month)
    pub end_date: Option<NaiveDate>,
}

fn parse_budget_type(value: &str) -> Result<budget::BudgetType, (StatusCode, Json<ErrorResponse>)> {
    match value {
        "personal" => Ok(budget::BudgetType::Personal),
        "group" => Ok(budget::BudgetType::Group),
        other => {
            warn!("Rejected unknown budget type: {}", other);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Unknown budget type '{other}', expected 'personal' or 'group'"),
                    code: "INVALID_BUDGET_TYPE".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Create a new budget
#[utoipa::path(
    post,
    path = "/api/v1/budgets",
    tag = "budgets",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget created successfully", body = ApiResponse<BudgetResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_budget(
    State(state): State<AppState>,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_budget function");
    debug!("Creating budget '{}' for owner {}", request.name, request.owner_id);

    let budget_type = parse_budget_type(&request.budget_type)?;

    let new_budget = budget::ActiveModel {
        name: Set(request.name.clone()),
        budget_type: Set(budget_type),
        owner_id: Set(request.owner_id),
        ..Default::default()
    };

    match new_budget.insert(&state.db).await {
        Ok(budget_model) => {
            info!("Budget created successfully with ID: {}", budget_model.id);
            let response = ApiResponse {
                data: BudgetResponse::from(budget_model),
                message: "Budget created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create budget '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while creating budget".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Get all budgets
#[utoipa::path(
    get,
    path = "/api/v1/budgets",
    tag = "budgets",
    responses(
        (status = 200, description = "Budgets retrieved successfully", body = ApiResponse<Vec<BudgetResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_budgets(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BudgetResponse>>>, StatusCode> {
    trace!("Entering get_budgets function");

    match budget::Entity::find().all(&state.db).await {
        Ok(budgets) => {
            debug!("Retrieved {} budgets from database", budgets.len());
            let response = ApiResponse {
                data: budgets.into_iter().map(BudgetResponse::from).collect(),
                message: "Budgets retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve budgets: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific budget by ID
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{budget_id}",
    tag = "budgets",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    responses(
        (status = 200, description = "Budget retrieved successfully", body = ApiResponse<BudgetResponse>),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_budget(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BudgetResponse>>, StatusCode> {
    trace!("Entering get_budget function for budget_id: {}", budget_id);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(budget_model)) => {
            let response = ApiResponse {
                data: BudgetResponse::from(budget_model),
                message: "Budget retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Budget with ID {} not found", budget_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve budget with ID {}: {}", budget_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a budget
#[utoipa::path(
    put,
    path = "/api/v1/budgets/{budget_id}",
    tag = "budgets",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    request_body = UpdateBudgetRequest,
    responses(
        (status = 200, description = "Budget updated successfully", body = ApiResponse<BudgetResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_budget(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateBudgetRequest>,
) -> Result<Json<ApiResponse<BudgetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_budget function for budget_id: {}", budget_id);

    let existing = match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(budget_model)) => budget_model,
        Ok(None) => {
            warn!("Budget with ID {} not found for update", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {} for update: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let mut budget_active: budget::ActiveModel = existing.into();

    if let Some(name) = request.name {
        debug!("Updating budget name to: {}", name);
        budget_active.name = Set(name);
    }
    if let Some(budget_type) = request.budget_type {
        budget_active.budget_type = Set(parse_budget_type(&budget_type)?);
    }

    match budget_active.update(&state.db).await {
        Ok(updated) => {
            info!("Budget with ID {} updated successfully", budget_id);
            let response = ApiResponse {
                data: BudgetResponse::from(updated),
                message: "Budget updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update budget with ID {}: {}", budget_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Delete a budget and everything under it
#[utoipa::path(
    delete,
    path = "/api/v1/budgets/{budget_id}",
    tag = "budgets",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    responses(
        (status = 200, description = "Budget deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_budget(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_budget function for budget_id: {}", budget_id);

    match budget::Entity::delete_by_id(budget_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Budget with ID {} deleted successfully", budget_id);
                let response = ApiResponse {
                    data: format!("Budget {budget_id} deleted"),
                    message: "Budget deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Budget with ID {} not found for deletion", budget_id);
                Err(StatusCode::NOT_FOUND)
            }
        }
        Err(db_error) => {
            error!("Failed to delete budget with ID {}: {}", budget_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a budget summary with per-category breakdown
///
/// Actual spending inside the range is combined with recurring projections
/// over the part of the range strictly after today, so already-recorded
/// occurrences are never double counted.
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{budget_id}/summary",
    tag = "budgets",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
        SummaryQuery,
    ),
    responses(
        (status = 200, description = "Summary computed successfully", body = ApiResponse<BudgetSummaryResponse>),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_budget_summary(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<SummaryQuery>>,
) -> Result<Json<ApiResponse<BudgetSummaryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_budget_summary function for budget_id: {}", budget_id);

    let today = Local::now().date_naive();
    let range = resolve_range(&query, today)?;
    debug!("Summarizing budget {} over [{}, {}]", budget_id, range.start, range.end);

    let budget_model = match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(budget_model)) => budget_model,
        Ok(None) => {
            warn!("Budget with ID {} not found for summary", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {} for summary: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let categories = match category::Entity::find()
        .filter(category::Column::BudgetId.eq(budget_id))
        .all(&state.db)
        .await
    {
        Ok(categories) => categories,
        Err(db_error) => {
            error!("Failed to load categories for budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let transactions = match transaction::Entity::find()
        .filter(transaction::Column::BudgetId.eq(budget_id))
        .filter(transaction::Column::Date.gte(range.start))
        .filter(transaction::Column::Date.lte(range.end))
        .all(&state.db)
        .await
    {
        Ok(transactions) => transactions,
        Err(db_error) => {
            error!("Failed to load transactions for budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let rules = match recurring_transaction::Entity::find()
        .filter(recurring_transaction::Column::BudgetId.eq(budget_id))
        .all(&state.db)
        .await
    {
        Ok(rules) => rules,
        Err(db_error) => {
            error!("Failed to load recurring rules for budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    // Actual spend per category: expenses only, incomes do not reduce spend.
    let mut spent_by_category: HashMap<i32, Decimal> = HashMap::new();
    for tx in &transactions {
        if tx.transaction_type == transaction::TransactionType::Expense {
            *spent_by_category.entry(tx.category_id).or_default() += tx.amount;
        }
    }

    // Projections only cover dates strictly after today; everything up to and
    // including today is expected to exist as recorded transactions.
    let projection_start = range.start.max(today.succ_opt().unwrap_or(today));
    let (projected, projected_by_category) = if projection_start <= range.end {
        let totals = project_totals(&rules, projection_start, range.end)
            .map_err(compute_error_response)?;
        let by_category = project_by_category(&rules, projection_start, range.end)
            .map_err(compute_error_response)?;
        (totals, by_category)
    } else {
        (ProjectionTotals::zero(), HashMap::new())
    };

    let mut total_allocated = Decimal::ZERO;
    let mut total_spent = Decimal::ZERO;
    let mut category_summaries = Vec::with_capacity(categories.len());

    for cat in categories {
        let spent = spent_by_category.get(&cat.id).copied().unwrap_or(Decimal::ZERO);
        let projected_expenses = projected_by_category
            .get(&cat.id)
            .map(CategoryProjection::clone)
            .unwrap_or_default()
            .projected_expenses;

        total_allocated += cat.amount;
        total_spent += spent;

        category_summaries.push(CategorySummary {
            id: cat.id,
            name: cat.name,
            allocated: cat.amount.round_dp(2),
            spent: spent.round_dp(2),
            projected: projected_expenses.round_dp(2),
            remaining: (cat.amount - spent - projected_expenses).round_dp(2),
        });
    }

    let summary = BudgetSummaryResponse {
        id: budget_model.id,
        name: budget_model.name,
        range,
        total_allocated: total_allocated.round_dp(2),
        total_spent: total_spent.round_dp(2),
        total_remaining: (total_allocated - total_spent - projected.projected_expenses).round_dp(2),
        projected: projected.rounded(),
        categories: category_summaries,
    };

    info!(
        "Summary for budget {} computed: allocated={}, spent={}",
        budget_id, summary.total_allocated, summary.total_spent
    );
    let response = ApiResponse {
        data: summary,
        message: "Budget summary computed successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Request body for adding a member to a budget
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddBudgetMemberRequest {
    pub user_id: i32,
    /// Share of common expenses carried by this member, in percent
    pub share: Decimal,
}

/// Budget member response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetMemberResponse {
    pub budget_id: i32,
    pub user_id: i32,
    pub share: Decimal,
}

impl From<budget_member::Model> for BudgetMemberResponse {
    fn from(model: budget_member::Model) -> Self {
        Self {
            budget_id: model.budget_id,
            user_id: model.user_id,
            share: model.share,
        }
    }
}

/// Add a member to a budget
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{budget_id}/members",
    tag = "budgets",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    request_body = AddBudgetMemberRequest,
    responses(
        (status = 201, description = "Member added successfully", body = ApiResponse<BudgetMemberResponse>),
        (status = 404, description = "Budget or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn add_budget_member(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<AddBudgetMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetMemberResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering add_budget_member for budget_id: {}", budget_id);
    debug!("Adding user {} to budget {} with share {}", request.user_id, budget_id, request.share);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for member insert", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    match user::Entity::find_by_id(request.user_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("User with ID {} not found for member insert", request.user_id);
            return Err(not_found_response("User"));
        }
        Err(db_error) => {
            error!("Failed to lookup user {}: {}", request.user_id, db_error);
            return Err(database_error_response());
        }
    }

    let new_member = budget_member::ActiveModel {
        budget_id: Set(budget_id),
        user_id: Set(request.user_id),
        share: Set(request.share),
    };

    match new_member.insert(&state.db).await {
        Ok(member_model) => {
            info!("User {} added to budget {}", member_model.user_id, budget_id);
            let response = ApiResponse {
                data: BudgetMemberResponse::from(member_model),
                message: "Member added successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to add user {} to budget {}: {}",
                request.user_id, budget_id, db_error
            );
            Err(database_error_response())
        }
    }
}

/// List the members of a budget
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{budget_id}/members",
    tag = "budgets",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    responses(
        (status = 200, description = "Members retrieved successfully", body = ApiResponse<Vec<BudgetMemberResponse>>),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_budget_members(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BudgetMemberResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_budget_members for budget_id: {}", budget_id);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for member listing", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    match budget_member::Entity::find()
        .filter(budget_member::Column::BudgetId.eq(budget_id))
        .all(&state.db)
        .await
    {
        Ok(members) => {
            debug!("Retrieved {} members for budget {}", members.len(), budget_id);
            let response = ApiResponse {
                data: members.into_iter().map(BudgetMemberResponse::from).collect(),
                message: "Members retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to load members for budget {}: {}", budget_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Defaults to the current calendar month when no range is given.
fn resolve_range(
    query: &SummaryQuery,
    today: NaiveDate,
) -> Result<DateRange, (StatusCode, Json<ErrorResponse>)> {
    let start = query.start_date.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
    });
    let end = query.end_date.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(
            today.year(),
            today.month(),
            days_in_month(today.year(), today.month()),
        )
        .unwrap_or(today)
    });

    if start > end {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("start_date {start} is after end_date {end}"),
                code: "INVALID_RANGE".to_string(),
                success: false,
            }),
        ));
    }
    Ok(DateRange::new(start, end))
}

pub(crate) fn not_found_response(entity: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{entity} not found"),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

pub(crate) fn database_error_response() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}

pub(crate) fn compute_error_response(error: ComputeError) -> (StatusCode, Json<ErrorResponse>) {
    match error {
        ComputeError::InvalidRange { start, end } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("start date {start} is after end date {end}"),
                code: "INVALID_RANGE".to_string(),
                success: false,
            }),
        ),
        ComputeError::InvalidState(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message,
                code: "INVALID_STATE".to_string(),
                success: false,
            }),
        ),
        ComputeError::NotFound(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: message,
                code: "VERSION_HISTORY_CORRUPT".to_string(),
                success: false,
            }),
        ),
    }
}
