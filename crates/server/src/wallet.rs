//! Wallet API endpoints
//!
//! The path carries the target wallet owner; the engine re-asserts that
//! it matches the authenticated caller.

use api_types::wallet::{WalletBalanceResponse, WalletHistoryResponse, WalletOp};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState, transactions::map_transaction, user};

pub async fn balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<WalletBalanceResponse>, ServerError> {
    let wallet_balance = state.engine.wallet_balance(&user_id, &user.id).await?;
    Ok(Json(WalletBalanceResponse { wallet_balance }))
}

pub async fn history(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<WalletHistoryResponse>, ServerError> {
    let transactions = state
        .engine
        .wallet_history(&user_id, &user.id)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();
    Ok(Json(WalletHistoryResponse { transactions }))
}

pub async fn add(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<WalletOp>,
) -> Result<Json<WalletBalanceResponse>, ServerError> {
    let wallet_balance = state
        .engine
        .wallet_add(&user_id, &user.id, payload.amount)
        .await?;
    Ok(Json(WalletBalanceResponse { wallet_balance }))
}

pub async fn withdraw(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<WalletOp>,
) -> Result<Json<WalletBalanceResponse>, ServerError> {
    let wallet_balance = state
        .engine
        .wallet_withdraw(&user_id, &user.id, payload.amount)
        .await?;
    Ok(Json(WalletBalanceResponse { wallet_balance }))
}
