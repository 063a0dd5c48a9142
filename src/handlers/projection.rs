use crate::handlers::budgets::{
    compute_error_response, database_error_response, not_found_response,
};
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use common::ProjectionTotals;
use compute::projection::project_totals;
use model::entities::{budget, recurring_transaction};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use tracing::{debug, error, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for a projection
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ProjectionQuery {
    /// First day of the projection window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the projection window (inclusive)
    pub end_date: NaiveDate,
}

/// Project recurring income and expenses over a date range
///
/// Sums amount times occurrence count for every active recurring rule of the
/// budget. Results are cached per budget and range.
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{budget_id}/projection",
    tag = "projection",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
        ProjectionQuery,
    ),
    responses(
        (status = 200, description = "Projection computed successfully", body = ApiResponse<ProjectionTotals>),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_budget_projection(
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ProjectionQuery>>,
) -> Result<Json<ApiResponse<ProjectionTotals>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_budget_projection for budget_id: {}", budget_id);

    if query.start_date > query.end_date {
        warn!(
            "Rejected projection with start {} after end {}",
            query.start_date, query.end_date
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "start_date {} is after end_date {}",
                    query.start_date, query.end_date
                ),
                code: "INVALID_RANGE".to_string(),
                success: false,
            }),
        ));
    }

    let cache_key = format!("projection_{}_{}_{}", budget_id, query.start_date, query.end_date);

    if let Some(CachedData::Projection(totals)) = state.cache.get(&cache_key).await {
        debug!("Projection cache hit for key {}", cache_key);
        let response = ApiResponse {
            data: totals,
            message: "Projection retrieved from cache".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    match budget::Entity::find_by_id(budget_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget with ID {} not found for projection", budget_id);
            return Err(not_found_response("Budget"));
        }
        Err(db_error) => {
            error!("Failed to lookup budget {}: {}", budget_id, db_error);
            return Err(database_error_response());
        }
    }

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

    let totals = match project_totals(&rules, query.start_date, query.end_date) {
        Ok(totals) => totals.rounded(),
        Err(compute_error) => {
            error!("Failed to project budget {}: {}", budget_id, compute_error);
            return Err(compute_error_response(compute_error));
        }
    };

    debug!(
        "Projected budget {} over [{}, {}]: net {}",
        budget_id, query.start_date, query.end_date, totals.net_balance
    );
    state
        .cache
        .insert(cache_key, CachedData::Projection(totals.clone()))
        .await;

    let response = ApiResponse {
        data: totals,
        message: "Projection computed successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
