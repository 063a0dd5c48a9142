use crate::handlers::budgets::{
    compute_error_response, database_error_response, not_found_response,
};
use crate::handlers::transactions::{
    parse_transaction_type, transaction_type_str, TransactionResponse,
};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Datelike, Local, NaiveDate};
use compute::occurrence::occurrence_dates;
use compute::versioning::{check_cancellable, plan_update, resolve_pending, UpdatePlan};
use model::entities::{
    budget, category, recurring_transaction, recurring_transaction_version, transaction,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a recurring rule
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateRecurringTransactionRequest {
    pub category_id: i32,
    pub title: String,
    pub amount: Decimal,
    /// "expense" or "income"
    pub transaction_type: String,
    /// "monthly", "weekly" or "yearly"
    pub frequency: String,
    /// Day-of-month (1-31) for monthly/yearly, day-of-week (0-6, Monday = 0)
    /// for weekly
    pub day: Option<i32>,
}

/// Request body for an effective-dated update of a recurring rule
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateRecurringTransactionRequest {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub category_id: Option<i32>,
    pub frequency: Option<String>,
    pub day: Option<i32>,
    /// When the change takes effect (default: today). A future date schedules
    /// the change without touching the current version.
    pub effective_date: Option<NaiveDate>,
    pub change_reason: Option<String>,
}

/// Recurring rule response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecurringTransactionResponse {
    pub id: i32,
    pub budget_id: i32,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub title: String,
    pub amount: Decimal,
    pub transaction_type: String,
    pub frequency: String,
    pub day: Option<i32>,
    pub active: bool,
    pub created_at: NaiveDate,
    /// The scheduled future version, if one exists
    pub pending_version: Option<RecurringVersionResponse>,
}

/// Version history entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecurringVersionResponse {
    pub id: i32,
    pub recurring_transaction_id: i32,
    pub title: String,
    pub amount: Decimal,
    pub category_id: i32,
    pub frequency: String,
    pub day: Option<i32>,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
    pub created_at: NaiveDate,
    pub change_reason: Option<String>,
}

impl From<recurring_transaction_version::Model> for RecurringVersionResponse {
    fn from(model: recurring_transaction_version::Model) -> Self {
        Self {
            id: model.id,
            recurring_transaction_id: model.recurring_transaction_id,
            title: model.title,
            amount: model.amount,
            category_id: model.category_id,
            frequency: frequency_str(model.frequency).to_string(),
            day: model.day,
            effective_from: model.effective_from,
            effective_until: model.effective_until,
            created_at: model.created_at,
            change_reason: model.change_reason,
        }
    }
}

fn frequency_str(value: recurring_transaction::Frequency) -> &'static str {
    match value {
        recurring_transaction::Frequency::Monthly => "monthly",
        recurring_transaction::Frequency::Weekly => "weekly",
        recurring_transaction::Frequency::Yearly => "yearly",
    }
}

fn parse_frequency(
    value: &str,
) -> Result<recurring_transaction::Frequency, (StatusCode, Json<ErrorResponse>)> {
    match value {
        "monthly" => Ok(recurring_transaction::Frequency::Monthly),
        "weekly" => Ok(recurring_transaction::Frequency::Weekly),
        "yearly" => Ok(recurring_transaction::Frequency::Yearly),
        other => {
            warn!("Rejected unknown frequency: {}", other);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!(
                        "Unknown frequency '{other}', expected 'monthly', 'weekly' or 'yearly'"
                    ),
                    code: "INVALID_FREQUENCY".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

fn rule_response(
    rule: recurring_transaction::Model,
    category_name: Option<String>,
    pending: Option<recurring_transaction_version::Model>,
) -> RecurringTransactionResponse {
    RecurringTransactionResponse {
        id: rule.id,
        budget_id: rule.budget_id,
        category_id: rule.category_id,
        category_name,
        title: rule.title,
        amount: rule.amount,
        transaction_type: transaction_type_str(rule.transaction_type).to_string(),
        frequency: frequency_str(rule.frequency).to_string(),
        day: rule.day,
        active: rule.active,
        created_at: rule.created_at,
        pending_version: pending.map(RecurringVersionResponse::from),
    }
}

/// Create a recurring rule
///
/// Seeds the version history with an initial open version effective today,
/// inside the same database transaction as the rule itself.
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{budget_id}/recurring",
    tag = "recurring",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    request_body = CreateRecurringTransactionRequest,
    responses(
        (status = 201, description = "Recurring rule created successfully", body = ApiResponse<RecurringTransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Budget or category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_recurring_transaction(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<CreateRecurringTransactionRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<RecurringTransactionResponse>>),
    (StatusCode, Json<ErrorResponse>),
> {
    trace!("Entering create_recurring_transaction for budget_id: {}", budget_id);
    debug!("Creating recurring rule '{}' in budget {}", request.title, budget_id);

    let transaction_type = parse_transaction_type(&request.transaction_type)?;
    let frequency = parse_frequency(&request.frequency)?;

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for recurring rule creation", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    let category_name = match category::Entity::find_by_id(request.category_id)
        .one(&state.db)
        .await
    {
        Ok(Some(cat)) if cat.budget_id == budget_id => cat.name,
        Ok(_) => {
            warn!(
                "Category {} not found in budget {} for recurring rule creation",
                request.category_id, budget_id
            );
            return Err(not_found_response("Category"));
        }
        Err(db_error) => {
            error!("Failed to lookup category {}: {}", request.category_id, db_error);
            return Err(database_error_response());
        }
    };

    let today = Local::now().date_naive();

    let txn = match state.db.begin().await {
        Ok(txn) => txn,
        Err(db_error) => {
            error!("Failed to open transaction for rule creation: {}", db_error);
            return Err(database_error_response());
        }
    };

    let rule_result = async {
        let rule = recurring_transaction::ActiveModel {
            budget_id: Set(budget_id),
            category_id: Set(request.category_id),
            title: Set(request.title.clone()),
            amount: Set(request.amount),
            transaction_type: Set(transaction_type),
            frequency: Set(frequency),
            day: Set(request.day),
            active: Set(true),
            created_at: Set(today),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        recurring_transaction_version::ActiveModel {
            recurring_transaction_id: Set(rule.id),
            title: Set(rule.title.clone()),
            amount: Set(rule.amount),
            category_id: Set(rule.category_id),
            frequency: Set(rule.frequency),
            day: Set(rule.day),
            effective_from: Set(today),
            effective_until: Set(None),
            created_at: Set(today),
            change_reason: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok::<_, sea_orm::DbErr>(rule)
    }
    .await;

    match rule_result {
        Ok(rule) => {
            info!("Recurring rule created successfully with ID: {}", rule.id);
            let response = ApiResponse {
                data: rule_response(rule, Some(category_name), None),
                message: "Recurring rule created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create recurring rule '{}': {}", request.title, db_error);
            Err(database_error_response())
        }
    }
}

/// List the recurring rules of a budget
///
/// Each rule carries its category name and the pending (scheduled) version
/// when one exists.
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{budget_id}/recurring",
    tag = "recurring",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    responses(
        (status = 200, description = "Recurring rules retrieved successfully", body = ApiResponse<Vec<RecurringTransactionResponse>>),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_recurring_transactions(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RecurringTransactionResponse>>>, (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering get_recurring_transactions for budget_id: {}", budget_id);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for recurring listing", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    let rules = match recurring_transaction::Entity::find()
        .filter(recurring_transaction::Column::BudgetId.eq(budget_id))
        .order_by_asc(recurring_transaction::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(rules) => rules,
        Err(db_error) => {
            error!("Failed to load recurring rules for budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let categories: HashMap<i32, String> = match category::Entity::find()
        .filter(category::Column::BudgetId.eq(budget_id))
        .all(&state.db)
        .await
    {
        Ok(categories) => categories.into_iter().map(|c| (c.id, c.name)).collect(),
        Err(db_error) => {
            error!("Failed to load categories for budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let today = Local::now().date_naive();
    let mut responses = Vec::with_capacity(rules.len());

    for rule in rules {
        let versions = match recurring_transaction_version::Entity::find()
            .filter(recurring_transaction_version::Column::RecurringTransactionId.eq(rule.id))
            .all(&state.db)
            .await
        {
            Ok(versions) => versions,
            Err(db_error) => {
                error!("Failed to load versions for rule {}: {}", rule.id, db_error);
                return Err(database_error_response());
            }
        };

        let pending = resolve_pending(&versions, today).cloned();
        let category_name = categories.get(&rule.category_id).cloned();
        responses.push(rule_response(rule, category_name, pending));
    }

    debug!("Retrieved {} recurring rules for budget {}", responses.len(), budget_id);
    let response = ApiResponse {
        data: responses,
        message: "Recurring rules retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Apply an effective-dated update to a recurring rule
///
/// An effective date of today or earlier closes the current version and the
/// new values take over immediately. A future date schedules the change as a
/// pending version, replacing any previously scheduled one. Version writes
/// and the rule's live fields move inside one database transaction.
#[utoipa::path(
    put,
    path = "/api/v1/recurring/{rule_id}",
    tag = "recurring",
    params(
        ("rule_id" = i32, Path, description = "Recurring rule ID"),
    ),
    request_body = UpdateRecurringTransactionRequest,
    responses(
        (status = 200, description = "Recurring rule updated successfully", body = ApiResponse<RecurringTransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recurring rule not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_recurring_transaction(
    Path(rule_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateRecurringTransactionRequest>,
) -> Result<Json<ApiResponse<RecurringTransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_recurring_transaction for rule_id: {}", rule_id);

    let rule = match recurring_transaction::Entity::find_by_id(rule_id).one(&state.db).await {
        Ok(Some(rule)) => rule,
        Ok(None) => {
            warn!("Recurring rule with ID {} not found for update", rule_id);
            return Err(not_found_response("Recurring rule"));
        }
        Err(db_error) => {
            error!("Failed to lookup recurring rule {}: {}", rule_id, db_error);
            return Err(database_error_response());
        }
    };

    let frequency = match &request.frequency {
        Some(value) => Some(parse_frequency(value)?),
        None => None,
    };

    if let Some(category_id) = request.category_id {
        match category::Entity::find_by_id(category_id).one(&state.db).await {
            Ok(Some(cat)) if cat.budget_id == rule.budget_id => {}
            Ok(_) => {
                warn!(
                    "Category {} not found in budget {} for rule update",
                    category_id, rule.budget_id
                );
                return Err(not_found_response("Category"));
            }
            Err(db_error) => {
                error!("Failed to lookup category {}: {}", category_id, db_error);
                return Err(database_error_response());
            }
        }
    }

    let versions = match recurring_transaction_version::Entity::find()
        .filter(recurring_transaction_version::Column::RecurringTransactionId.eq(rule_id))
        .all(&state.db)
        .await
    {
        Ok(versions) => versions,
        Err(db_error) => {
            error!("Failed to load versions for rule {}: {}", rule_id, db_error);
            return Err(database_error_response());
        }
    };

    let today = Local::now().date_naive();
    let effective_date = request.effective_date.unwrap_or(today);
    let plan = plan_update(&versions, today, effective_date);
    debug!("Planned update for rule {}: {:?}", rule_id, plan);

    // New version fields fall back to the rule's live fields, which mirror
    // the current version.
    let new_title = request.title.clone().unwrap_or_else(|| rule.title.clone());
    let new_amount = request.amount.unwrap_or(rule.amount);
    let new_category_id = request.category_id.unwrap_or(rule.category_id);
    let new_frequency = frequency.unwrap_or(rule.frequency);
    let new_day = request.day.or(rule.day);

    let txn = match state.db.begin().await {
        Ok(txn) => txn,
        Err(db_error) => {
            error!("Failed to open transaction for rule update: {}", db_error);
            return Err(database_error_response());
        }
    };

    let update_result = async {
        match plan {
            UpdatePlan::Immediate {
                close_version_id,
                remove_pending_id,
            } => {
                if let Some(version_id) = remove_pending_id {
                    recurring_transaction_version::Entity::delete_by_id(version_id)
                        .exec(&txn)
                        .await?;
                }
                if let Some(version_id) = close_version_id {
                    if let Some(current) =
                        recurring_transaction_version::Entity::find_by_id(version_id)
                            .one(&txn)
                            .await?
                    {
                        let mut current_active: recurring_transaction_version::ActiveModel =
                            current.into();
                        current_active.effective_until = Set(Some(effective_date));
                        current_active.update(&txn).await?;
                    }
                }

                recurring_transaction_version::ActiveModel {
                    recurring_transaction_id: Set(rule_id),
                    title: Set(new_title.clone()),
                    amount: Set(new_amount),
                    category_id: Set(new_category_id),
                    frequency: Set(new_frequency),
                    day: Set(new_day),
                    effective_from: Set(effective_date),
                    effective_until: Set(None),
                    created_at: Set(today),
                    change_reason: Set(request.change_reason.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                let mut rule_active: recurring_transaction::ActiveModel = rule.clone().into();
                rule_active.title = Set(new_title.clone());
                rule_active.amount = Set(new_amount);
                rule_active.category_id = Set(new_category_id);
                rule_active.frequency = Set(new_frequency);
                rule_active.day = Set(new_day);
                let updated_rule = rule_active.update(&txn).await?;

                txn.commit().await?;
                Ok::<_, sea_orm::DbErr>(updated_rule)
            }
            UpdatePlan::Scheduled { replace_version_id } => {
                if let Some(version_id) = replace_version_id {
                    recurring_transaction_version::Entity::delete_by_id(version_id)
                        .exec(&txn)
                        .await?;
                }

                recurring_transaction_version::ActiveModel {
                    recurring_transaction_id: Set(rule_id),
                    title: Set(new_title.clone()),
                    amount: Set(new_amount),
                    category_id: Set(new_category_id),
                    frequency: Set(new_frequency),
                    day: Set(new_day),
                    effective_from: Set(effective_date),
                    effective_until: Set(None),
                    created_at: Set(today),
                    change_reason: Set(request.change_reason.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                txn.commit().await?;
                Ok::<_, sea_orm::DbErr>(rule.clone())
            }
        }
    }
    .await;

    let updated_rule = match update_result {
        Ok(updated_rule) => updated_rule,
        Err(db_error) => {
            error!("Failed to apply update to rule {}: {}", rule_id, db_error);
            return Err(database_error_response());
        }
    };

    // Reload the pending version for the response.
    let pending = match recurring_transaction_version::Entity::find()
        .filter(recurring_transaction_version::Column::RecurringTransactionId.eq(rule_id))
        .all(&state.db)
        .await
    {
        Ok(versions) => resolve_pending(&versions, today).cloned(),
        Err(db_error) => {
            error!("Failed to reload versions for rule {}: {}", rule_id, db_error);
            return Err(database_error_response());
        }
    };

    let category_name = match category::Entity::find_by_id(updated_rule.category_id)
        .one(&state.db)
        .await
    {
        Ok(cat) => cat.map(|c| c.name),
        Err(db_error) => {
            error!("Failed to load category for rule {}: {}", rule_id, db_error);
            return Err(database_error_response());
        }
    };

    info!(
        "Recurring rule {} updated successfully, effective {}",
        rule_id, effective_date
    );
    let response = ApiResponse {
        data: rule_response(updated_rule, category_name, pending),
        message: "Recurring rule updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Toggle a recurring rule between active and suspended
#[utoipa::path(
    put,
    path = "/api/v1/recurring/{rule_id}/toggle",
    tag = "recurring",
    params(
        ("rule_id" = i32, Path, description = "Recurring rule ID"),
    ),
    responses(
        (status = 200, description = "Recurring rule toggled successfully", body = ApiResponse<RecurringTransactionResponse>),
        (status = 404, description = "Recurring rule not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn toggle_recurring_transaction(
    Path(rule_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RecurringTransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering toggle_recurring_transaction for rule_id: {}", rule_id);

    let rule = match recurring_transaction::Entity::find_by_id(rule_id).one(&state.db).await {
        Ok(Some(rule)) => rule,
        Ok(None) => {
            warn!("Recurring rule with ID {} not found for toggle", rule_id);
            return Err(not_found_response("Recurring rule"));
        }
        Err(db_error) => {
            error!("Failed to lookup recurring rule {}: {}", rule_id, db_error);
            return Err(database_error_response());
        }
    };

    let was_active = rule.active;
    let mut rule_active: recurring_transaction::ActiveModel = rule.into();
    rule_active.active = Set(!was_active);

    match rule_active.update(&state.db).await {
        Ok(updated) => {
            info!(
                "Recurring rule {} toggled: active {} -> {}",
                rule_id, was_active, updated.active
            );
            let response = ApiResponse {
                data: rule_response(updated, None, None),
                message: "Recurring rule toggled successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to toggle recurring rule {}: {}", rule_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Delete a recurring rule and its whole version history
#[utoipa::path(
    delete,
    path = "/api/v1/recurring/{rule_id}",
    tag = "recurring",
    params(
        ("rule_id" = i32, Path, description = "Recurring rule ID"),
    ),
    responses(
        (status = 200, description = "Recurring rule deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Recurring rule not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_recurring_transaction(
    Path(rule_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_recurring_transaction for rule_id: {}", rule_id);

    match recurring_transaction::Entity::delete_by_id(rule_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Recurring rule {} deleted successfully", rule_id);
                let response = ApiResponse {
                    data: format!("Recurring rule {rule_id} deleted"),
                    message: "Recurring rule deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Recurring rule with ID {} not found for deletion", rule_id);
                Err(StatusCode::NOT_FOUND)
            }
        }
        Err(db_error) => {
            error!("Failed to delete recurring rule {}: {}", rule_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// List the version history of a recurring rule, newest first
#[utoipa::path(
    get,
    path = "/api/v1/recurring/{rule_id}/versions",
    tag = "recurring",
    params(
        ("rule_id" = i32, Path, description = "Recurring rule ID"),
    ),
    responses(
        (status = 200, description = "Versions retrieved successfully", body = ApiResponse<Vec<RecurringVersionResponse>>),
        (status = 404, description = "Recurring rule not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_recurring_versions(
    Path(rule_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RecurringVersionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_recurring_versions for rule_id: {}", rule_id);

    match recurring_transaction::Entity::find_by_id(rule_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Recurring rule with ID {} not found for version listing", rule_id);
            return Err(not_found_response("Recurring rule"));
        }
        Err(db_error) => {
            error!("Failed to lookup recurring rule {}: {}", rule_id, db_error);
            return Err(database_error_response());
        }
    }

    match recurring_transaction_version::Entity::find()
        .filter(recurring_transaction_version::Column::RecurringTransactionId.eq(rule_id))
        .order_by_desc(recurring_transaction_version::Column::EffectiveFrom)
        .all(&state.db)
        .await
    {
        Ok(versions) => {
            debug!("Retrieved {} versions for rule {}", versions.len(), rule_id);
            let response = ApiResponse {
                data: versions.into_iter().map(RecurringVersionResponse::from).collect(),
                message: "Versions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to load versions for rule {}: {}", rule_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Cancel a scheduled (pending) version
///
/// Only a future-effective open version may be cancelled; the current
/// version and closed history stay immutable.
#[utoipa::path(
    delete,
    path = "/api/v1/recurring/versions/{version_id}",
    tag = "recurring",
    params(
        ("version_id" = i32, Path, description = "Version ID"),
    ),
    responses(
        (status = 200, description = "Version cancelled successfully", body = ApiResponse<String>),
        (status = 400, description = "Version is current or already closed", body = ErrorResponse),
        (status = 404, description = "Version not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn cancel_recurring_version(
    Path(version_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering cancel_recurring_version for version_id: {}", version_id);

    let version = match recurring_transaction_version::Entity::find_by_id(version_id)
        .one(&state.db)
        .await
    {
        Ok(Some(version)) => version,
        Ok(None) => {
            warn!("Version with ID {} not found for cancellation", version_id);
            return Err(not_found_response("Version"));
        }
        Err(db_error) => {
            error!("Failed to lookup version {}: {}", version_id, db_error);
            return Err(database_error_response());
        }
    };

    let today = Local::now().date_naive();
    if let Err(compute_error) = check_cancellable(&version, today) {
        warn!("Refused to cancel version {}: {}", version_id, compute_error);
        return Err(compute_error_response(compute_error));
    }

    match recurring_transaction_version::Entity::delete_by_id(version_id)
        .exec(&state.db)
        .await
    {
        Ok(_) => {
            info!("Pending version {} cancelled successfully", version_id);
            let response = ApiResponse {
                data: format!("Version {version_id} cancelled"),
                message: "Version cancelled successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to cancel version {}: {}", version_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Materialize this month's due recurring occurrences as transactions
///
/// Walks every active rule of the budget from the first of the current month
/// through today and records a transaction per occurrence. Occurrences that
/// already have a matching recurring transaction row are skipped, so the
/// endpoint is safe to call repeatedly.
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{budget_id}/recurring/process",
    tag = "recurring",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    responses(
        (status = 200, description = "Occurrences processed successfully", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn process_recurring_transactions(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering process_recurring_transactions for budget_id: {}", budget_id);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for processing", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    let rules = match recurring_transaction::Entity::find()
        .filter(recurring_transaction::Column::BudgetId.eq(budget_id))
        .filter(recurring_transaction::Column::Active.eq(true))
        .all(&state.db)
        .await
    {
        Ok(rules) => rules,
        Err(db_error) => {
            error!("Failed to load recurring rules for budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let today = Local::now().date_naive();
    let month_start = match NaiveDate::from_ymd_opt(today.year(), today.month(), 1) {
        Some(date) => date,
        None => today,
    };

    let mut created = Vec::new();

    for rule in &rules {
        let dates = match occurrence_dates(rule, month_start, today) {
            Ok(dates) => dates,
            Err(compute_error) => {
                error!("Failed to expand occurrences for rule {}: {}", rule.id, compute_error);
                return Err(compute_error_response(compute_error));
            }
        };

        for date in dates {
            // An occurrence is identified by the rule's live fields and the
            // date, so reprocessing never duplicates rows.
            let already_recorded = match transaction::Entity::find()
                .filter(transaction::Column::BudgetId.eq(budget_id))
                .filter(transaction::Column::CategoryId.eq(rule.category_id))
                .filter(transaction::Column::Title.eq(rule.title.clone()))
                .filter(transaction::Column::Amount.eq(rule.amount))
                .filter(transaction::Column::Date.eq(date))
                .filter(transaction::Column::IsRecurring.eq(true))
                .one(&state.db)
                .await
            {
                Ok(existing) => existing.is_some(),
                Err(db_error) => {
                    error!(
                        "Failed to check existing occurrence for rule {}: {}",
                        rule.id, db_error
                    );
                    return Err(database_error_response());
                }
            };
            if already_recorded {
                trace!("Occurrence of rule {} on {} already recorded", rule.id, date);
                continue;
            }

            let inserted = transaction::ActiveModel {
                budget_id: Set(budget_id),
                category_id: Set(rule.category_id),
                title: Set(rule.title.clone()),
                amount: Set(rule.amount),
                transaction_type: Set(rule.transaction_type),
                date: Set(date),
                comment: Set(None),
                is_recurring: Set(true),
                paid_by_user_id: Set(None),
                created_at: Set(today),
                ..Default::default()
            }
            .insert(&state.db)
            .await;

            match inserted {
                Ok(transaction_model) => {
                    debug!("Recorded occurrence of rule {} on {}", rule.id, date);
                    created.push(TransactionResponse::from(transaction_model));
                }
                Err(db_error) => {
                    error!("Failed to record occurrence of rule {}: {}", rule.id, db_error);
                    return Err(database_error_response());
                }
            }
        }
    }

    info!(
        "Processed {} recurring rules for budget {}: {} transactions created",
        rules.len(),
        budget_id,
        created.len()
    );
    let response = ApiResponse {
        data: created,
        message: "Recurring occurrences processed successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
