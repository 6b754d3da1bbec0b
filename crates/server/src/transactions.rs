//! Transactions API endpoints

use api_types::transaction::{
    SortDirection as ApiSortDirection, SortField as ApiSortField, TransactionListParams,
    TransactionListResponse, TransactionUpload, TransactionView, UploadResponse,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};

use crate::{ServerError, server::ServerState, user};

fn map_sort_field(field: ApiSortField) -> engine::SortField {
    match field {
        ApiSortField::Date => engine::SortField::Date,
        ApiSortField::Amount => engine::SortField::Amount,
        ApiSortField::Category => engine::SortField::Category,
        ApiSortField::Status => engine::SortField::Status,
    }
}

fn map_sort_dir(dir: ApiSortDirection) -> engine::SortDirection {
    match dir {
        ApiSortDirection::Asc => engine::SortDirection::Asc,
        ApiSortDirection::Desc => engine::SortDirection::Desc,
    }
}

pub(crate) fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        amount: tx.amount,
        category: tx.category,
        date: tx.date.fixed_offset(),
        status: tx.status,
        description: tx.description,
        kind: tx.kind,
    }
}

fn parse_date_param(
    name: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ServerError> {
    value
        .map(|raw| {
            engine::parse_flexible_date(raw)
                .ok_or_else(|| ServerError::Generic(format!("invalid {name}: {raw}")))
        })
        .transpose()
}

fn parse_amount_param(name: &str, value: Option<&str>) -> Result<Option<f64>, ServerError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| ServerError::Generic(format!("invalid {name}: {raw}")))
        })
        .transpose()
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let query = engine::TransactionQuery {
        category: params.category,
        status: params.status,
        date_from: parse_date_param("dateFrom", params.date_from.as_deref())?,
        date_to: parse_date_param("dateTo", params.date_to.as_deref())?,
        amount_min: parse_amount_param("amountMin", params.amount_min.as_deref())?,
        amount_max: parse_amount_param("amountMax", params.amount_max.as_deref())?,
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(10),
        sort_by: map_sort_field(params.sort_by.unwrap_or_default()),
        sort_dir: map_sort_dir(params.sort_dir.unwrap_or_default()),
    };

    let page = state.engine.list_transactions(&user.id, &query).await?;

    Ok(Json(TransactionListResponse {
        transactions: page.transactions.into_iter().map(map_transaction).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    }))
}

pub async fn upload(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<Vec<TransactionUpload>>,
) -> Result<(StatusCode, Json<UploadResponse>), ServerError> {
    let records = payload
        .into_iter()
        .map(|record| engine::TransactionRecord {
            amount: record.amount,
            category: record.category,
            date: record.date,
            status: record.status,
            description: record.description,
            kind: record.kind,
        })
        .collect();

    let outcome = state.engine.upload_transactions(&user.id, records).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            inserted: outcome.inserted,
            skipped: outcome.skipped,
        }),
    ))
}
