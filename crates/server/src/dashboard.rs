//! Dashboard API endpoints

use api_types::dashboard::{SeriesParams, SeriesPoint, SummaryResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, user};

/// Handle requests for the dashboard summary.
pub async fn summary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let summary = state.engine.summary(&user.id).await?;

    Ok(Json(SummaryResponse {
        revenue: summary.revenue,
        expenses: summary.expenses,
        savings: summary.savings,
        balance: summary.balance,
        transaction_count: summary.transaction_count,
    }))
}

/// Handle requests for the monthly revenue/expense series.
pub async fn series(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<Vec<SeriesPoint>>, ServerError> {
    let filter = engine::SeriesFilter {
        category: params.category,
        status: params.status,
    };
    let rows = state.engine.monthly_series(&user.id, &filter).await?;

    let points = rows
        .into_iter()
        .map(|row| SeriesPoint {
            month: engine::month_label(row.year, row.month),
            revenue: row.revenue,
            expenses: row.expenses,
        })
        .collect();

    Ok(Json(points))
}
