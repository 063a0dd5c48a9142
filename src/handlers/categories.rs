use crate::handlers::budgets::{database_error_response, not_found_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{budget, category};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name
    pub name: String,
    /// Allocated amount for the category
    pub amount: Decimal,
    /// Optional parent category for subcategories
    pub parent_id: Option<i32>,
}

/// Request body for updating a category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub parent_id: Option<i32>,
}

/// Category response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub budget_id: i32,
    pub name: String,
    /// For parents this includes the sum of child allocations
    pub amount: Decimal,
    pub parent_id: Option<i32>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            name: model.name,
            amount: model.amount,
            parent_id: model.parent_id,
        }
    }
}

/// Create a category under a budget
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{budget_id}/categories",
    tag = "categories",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_category(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_category function for budget_id: {}", budget_id);
    debug!("Creating category '{}' in budget {}", request.name, budget_id);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for category creation", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    if let Some(parent_id) = request.parent_id {
        match category::Entity::find_by_id(parent_id).one(&state.db).await {
            Ok(Some(parent)) if parent.budget_id == budget_id => {}
            Ok(_) => {
                warn!("Parent category {} not found in budget {}", parent_id, budget_id);
                return Err(not_found_response("Parent category"));
            }
            Err(db_error) => {
                error!("Failed to lookup parent category {}: {}", parent_id, db_error);
                return Err(database_error_response());
            }
        }
    }

    let new_category = category::ActiveModel {
        budget_id: Set(budget_id),
        name: Set(request.name.clone()),
        amount: Set(request.amount),
        parent_id: Set(request.parent_id),
        ..Default::default()
    };

    match new_category.insert(&state.db).await {
        Ok(category_model) => {
            info!("Category created successfully with ID: {}", category_model.id);
            let response = ApiResponse {
                data: CategoryResponse::from(category_model),
                message: "Category created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create category '{}': {}", request.name, db_error);
            Err(database_error_response())
        }
    }
}

/// List the categories of a budget
///
/// A parent category is reported with its own allocation plus the sum of
/// its direct children, so the list reads as effective envelope sizes.
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{budget_id}/categories",
    tag = "categories",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_categories(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_categories function for budget_id: {}", budget_id);

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for category listing", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

    let categories = match category::Entity::find()
        .filter(category::Column::BudgetId.eq(budget_id))
        .order_by_asc(category::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(categories) => categories,
        Err(db_error) => {
            error!("Failed to load categories for budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    };

    let mut child_totals: HashMap<i32, Decimal> = HashMap::new();
    for cat in &categories {
        if let Some(parent_id) = cat.parent_id {
            *child_totals.entry(parent_id).or_default() += cat.amount;
        }
    }

    let category_count = categories.len();
    let responses: Vec<CategoryResponse> = categories
        .into_iter()
        .map(|cat| {
            let rolled_up = cat.amount
                + child_totals.get(&cat.id).copied().unwrap_or(Decimal::ZERO);
            CategoryResponse {
                id: cat.id,
                budget_id: cat.budget_id,
                name: cat.name,
                amount: rolled_up,
                parent_id: cat.parent_id,
            }
        })
        .collect();

    debug!("Retrieved {} categories for budget {}", category_count, budget_id);
    let response = ApiResponse {
        data: responses,
        message: "Categories retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_category function for category_id: {}", category_id);

    let existing = match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(category_model)) => category_model,
        Ok(None) => {
            warn!("Category with ID {} not found for update", category_id);
            return Err(not_found_response("Category"));
        }
        Err(db_error) => {
            error!("Failed to lookup category {} for update: {}", category_id, db_error);
            return Err(database_error_response());
        }
    };

    let mut category_active: category::ActiveModel = existing.into();

    if let Some(name) = request.name {
        debug!("Updating category name to: {}", name);
        category_active.name = Set(name);
    }
    if let Some(amount) = request.amount {
        debug!("Updating category amount to: {}", amount);
        category_active.amount = Set(amount);
    }
    if let Some(parent_id) = request.parent_id {
        category_active.parent_id = Set(Some(parent_id));
    }

    match category_active.update(&state.db).await {
        Ok(updated) => {
            info!("Category with ID {} updated successfully", category_id);
            let response = ApiResponse {
                data: CategoryResponse::from(updated),
                message: "Category updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update category with ID {}: {}", category_id, db_error);
            Err(database_error_response())
        }
    }
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Category deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_category function for category_id: {}", category_id);

    match category::Entity::delete_by_id(category_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Category with ID {} deleted successfully", category_id);
                let response = ApiResponse {
                    data: format!("Category {category_id} deleted"),
                    message: "Category deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Category with ID {} not found for deletion", category_id);
                Err(StatusCode::NOT_FOUND)
            }
        }
        Err(db_error) => {
            error!("Failed to delete category with ID {}: {}", category_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
