use crate::handlers::budgets::{database_error_response, not_found_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{Local, NaiveDate};
use model::entities::{budget, category, transaction};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub category_id: i32,
    pub title: String,
    pub amount: Decimal,
    /// "expense" or "income"
    pub transaction_type: String,
    /// The day the money moved
    pub date: NaiveDate,
    pub comment: Option<String>,
    /// The member who fronted the money
    pub paid_by_user_id: Option<i32>,
}

/// Request body for updating a transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateTransactionRequest {
    pub category_id: Option<i32>,
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub transaction_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub paid_by_user_id: Option<i32>,
}

/// Transaction response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub budget_id: i32,
    pub category_id: i32,
    pub title: String,
    pub amount: Decimal,
    pub transaction_type: String,
    pub date: NaiveDate,
    pub comment: Option<String>,
    /// True for rows materialized from a recurring rule
    pub is_recurring: bool,
    pub paid_by_user_id: Option<i32>,
}

impl From<transaction::Model> for TransactionResponse {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            category_id: model.category_id,
            title: model.title,
            amount: model.amount,
            transaction_type: transaction_type_str(model.transaction_type).to_string(),
            date: model.date,
            comment: model.comment,
            is_recurring: model.is_recurring,
            paid_by_user_id: model.paid_by_user_id,
        }
    }
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct TransactionQuery {
    /// Filter by category
    pub category_id: Option<i32>,
    /// Only transactions on or after this date
    pub start_date: Option<NaiveDate>,
    /// Only transactions on or before this date
    pub end_date: Option<NaiveDate>,
}

pub(crate) fn transaction_type_str(value: transaction::TransactionType) -> &'static str {
    match value {
        transaction::TransactionType::Expense => "expense",
        transaction::TransactionType::Income => "income",
    }
}

pub(crate) fn parse_transaction_type(
    value: &str,
) -> Result<transaction::TransactionType, (StatusCode, Json<ErrorResponse>)> {
    match value {
        "expense" => Ok(transaction::TransactionType::Expense),
        "income" => Ok(transaction::TransactionType::Income),
        other => {
            warn!("Rejected unknown transaction type: {}", other);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!(
                        "Unknown transaction type '{other}', expected 'expense' or 'income'"
                    ),
                    code: "INVALID_TRANSACTION_TYPE".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Record a transaction against a budget
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{budget_id}/transactions",
    tag = "transactions",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Budget or category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_transaction(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_transaction function for budget_id: {}", budget_id);
    debug!(
        "Creating transaction '{}' of {} in budget {}",
        request.title, request.amount, budget_id
    );

    let transaction_type = parse_transaction_type(&request.transaction_type)?;

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for transaction creation", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    match category::Entity::find_by_id(request.category_id).one(&state.db).await {
        Ok(Some(cat)) if cat.budget_id == budget_id => {}
        Ok(_) => {
            warn!(
                "Category {} not found in budget {} for transaction creation",
                request.category_id, budget_id
            );
            return Err(not_found_response("Category"));
        }
        Err(db_error) => {
            error!("Failed to lookup category {}: {}", request.category_id, db_error);
            return Err(database_error_response());
        }
    }

    let new_transaction = transaction::ActiveModel {
        budget_id: Set(budget_id),
        category_id: Set(request.category_id),
        title: Set(request.title.clone()),
        amount: Set(request.amount),
        transaction_type: Set(transaction_type),
        date: Set(request.date),
        comment: Set(request.comment.clone()),
        is_recurring: Set(false),
        paid_by_user_id: Set(request.paid_by_user_id),
        created_at: Set(Local::now().date_naive()),
        ..Default::default()
    };

    match new_transaction.insert(&state.db).await {
        Ok(transaction_model) => {
            info!(
                "Transaction created successfully with ID: {}",
                transaction_model.id
            );
            let response = ApiResponse {
                data: TransactionResponse::from(transaction_model),
                message: "Transaction created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create transaction '{}': {}", request.title, db_error);
            Err(database_error_response())
        }
    }
}

/// List the transactions of a budget
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{budget_id}/transactions",
    tag = "transactions",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
        TransactionQuery,
    ),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_transactions(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<TransactionQuery>>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_transactions function for budget_id: {}", budget_id);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for transaction listing", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    let mut finder = transaction::Entity::find()
        .filter(transaction::Column::BudgetId.eq(budget_id));

    if let Some(category_id) = query.category_id {
        finder = finder.filter(transaction::Column::CategoryId.eq(category_id));
    }
    if let Some(start_date) = query.start_date {
        finder = finder.filter(transaction::Column::Date.gte(start_date));
    }
    if let Some(end_date) = query.end_date {
        finder = finder.filter(transaction::Column::Date.lte(end_date));
    }

    match finder
        .order_by_desc(transaction::Column::Date)
        .all(&state.db)
        .await
    {
        Ok(transactions) => {
            debug!(
                "Retrieved {} transactions for budget {}",
                transactions.len(),
                budget_id
            );
            let response = ApiResponse {
                data: transactions.into_iter().map(TransactionResponse::from).collect(),
                message: "Transactions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to load transactions for budget {}: {}", budget_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Update a transaction
#[utoipa::path(
    put,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_transaction(
    Path(transaction_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_transaction function for transaction_id: {}", transaction_id);

    let existing = match transaction::Entity::find_by_id(transaction_id).one(&state.db).await {
        Ok(Some(transaction_model)) => transaction_model,
        Ok(None) => {
            warn!("Transaction with ID {} not found for update", transaction_id);
            return Err(not_found_response("Transaction"));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup transaction {} for update: {}",
                transaction_id, db_error
            );
            return Err(database_error_response());
        }
    };

    let mut transaction_active: transaction::ActiveModel = existing.into();

    if let Some(category_id) = request.category_id {
        transaction_active.category_id = Set(category_id);
    }
    if let Some(title) = request.title {
        transaction_active.title = Set(title);
    }
    if let Some(amount) = request.amount {
        transaction_active.amount = Set(amount);
    }
    if let Some(transaction_type) = request.transaction_type {
        transaction_active.transaction_type = Set(parse_transaction_type(&transaction_type)?);
    }
    if let Some(date) = request.date {
        transaction_active.date = Set(date);
    }
    if let Some(comment) = request.comment {
        transaction_active.comment = Set(Some(comment));
    }
    if let Some(paid_by_user_id) = request.paid_by_user_id {
        transaction_active.paid_by_user_id = Set(Some(paid_by_user_id));
    }

    match transaction_active.update(&state.db).await {
        Ok(updated) => {
            info!("Transaction with ID {} updated successfully", transaction_id);
            let response = ApiResponse {
                data: TransactionResponse::from(updated),
                message: "Transaction updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update transaction with ID {}: {}", transaction_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Delete a transaction
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    responses(
        (status = 200, description = "Transaction deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_transaction(
    Path(transaction_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_transaction function for transaction_id: {}", transaction_id);

    match transaction::Entity::delete_by_id(transaction_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Transaction with ID {} deleted successfully", transaction_id);
                let response = ApiResponse {
                    data: format!("Transaction {transaction_id} deleted"),
                    message: "Transaction deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Transaction with ID {} not found for deletion", transaction_id);
                Err(StatusCode::NOT_FOUND)
            }
        }
        Err(db_error) => {
            error!("Failed to delete transaction with ID {}: {}", transaction_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
