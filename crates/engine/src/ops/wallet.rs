//! Wallet ledger: balance-affecting operations plus their log entries.
//!
//! Every credit/debit mutates `users.wallet_balance` through a single
//! atomic SQL update and appends the matching `transactions` row inside
//! the same database transaction, so balance and ledger cannot diverge
//! through a half-applied operation.

use chrono::Utc;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{EngineError, ResultEngine, Transaction, transactions, users};

use super::{Engine, with_tx};

const WALLET_ADD: &str = "wallet_add";
const WALLET_WITHDRAW: &str = "wallet_withdraw";
const STATUS_COMPLETED: &str = "completed";

fn ensure_owner(user_id: &str, requester: &str) -> ResultEngine<()> {
    if user_id != requester {
        return Err(EngineError::Forbidden(
            "wallet does not belong to the requester".to_string(),
        ));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> ResultEngine<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::InvalidAmount(
            "amount must be a finite number > 0".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Returns the stored wallet balance for `user_id`.
    pub async fn wallet_balance(&self, user_id: &str, requester: &str) -> ResultEngine<f64> {
        ensure_owner(user_id, requester)?;
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            Ok(user.wallet_balance)
        })
    }

    /// Lists wallet movements (credits and debits) newest first.
    pub async fn wallet_history(
        &self,
        user_id: &str,
        requester: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        ensure_owner(user_id, requester)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let rows = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::Category.is_in([WALLET_ADD, WALLET_WITHDRAW]))
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for model in rows {
                out.push(Transaction::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Credits `amount` to the wallet and logs a `wallet_add` entry.
    ///
    /// Returns the post-operation balance.
    pub async fn wallet_add(
        &self,
        user_id: &str,
        requester: &str,
        amount: f64,
    ) -> ResultEngine<f64> {
        ensure_owner(user_id, requester)?;
        validate_amount(amount)?;
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            // Atomic in-store increment; concurrent credits must not lose updates.
            users::Entity::update_many()
                .col_expr(
                    users::Column::WalletBalance,
                    Expr::col(users::Column::WalletBalance).add(amount),
                )
                .filter(users::Column::Id.eq(user_id))
                .exec(&db_tx)
                .await?;

            let tx = Transaction::new(
                user_id.to_string(),
                amount,
                WALLET_ADD.to_string(),
                now,
                Some(STATUS_COMPLETED.to_string()),
                Some("Added to wallet".to_string()),
                Some("income".to_string()),
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            let user = self.require_user(&db_tx, user_id).await?;
            Ok(user.wallet_balance)
        })
    }

    /// Debits `amount` from the wallet and logs a `wallet_withdraw` entry.
    ///
    /// The decrement only applies while `wallet_balance >= amount`; a
    /// losing race or an overdraft attempt aborts with
    /// [`EngineError::InsufficientFunds`] and mutates nothing.
    pub async fn wallet_withdraw(
        &self,
        user_id: &str,
        requester: &str,
        amount: f64,
    ) -> ResultEngine<f64> {
        ensure_owner(user_id, requester)?;
        validate_amount(amount)?;
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let result = users::Entity::update_many()
                .col_expr(
                    users::Column::WalletBalance,
                    Expr::col(users::Column::WalletBalance).sub(amount),
                )
                .filter(users::Column::Id.eq(user_id))
                .filter(users::Column::WalletBalance.gte(amount))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::InsufficientFunds(format!(
                    "withdrawal of {amount} exceeds the wallet balance"
                )));
            }

            let tx = Transaction::new(
                user_id.to_string(),
                amount,
                WALLET_WITHDRAW.to_string(),
                now,
                Some(STATUS_COMPLETED.to_string()),
                Some("Withdrawn from wallet".to_string()),
                Some("expense".to_string()),
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            let user = self.require_user(&db_tx, user_id).await?;
            Ok(user.wallet_balance)
        })
    }
}
