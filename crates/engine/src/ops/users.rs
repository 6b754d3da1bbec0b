//! User bootstrap and lookup.
//!
//! Registration and authentication live outside the engine; these
//! operations exist for the admin CLI, the auth layer, and tests.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, users};

use super::{Engine, with_tx};

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Returns a user snapshot from DB.
    pub async fn user(&self, user_id: &str) -> ResultEngine<users::Model> {
        with_tx!(self, |db_tx| { self.require_user(&db_tx, user_id).await })
    }

    /// Creates a user with an empty wallet.
    ///
    /// Email addresses are unique across users.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<users::Model> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidFilter(
                "name, email and password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email.to_string()));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name.to_string()),
                email: ActiveValue::Set(email.to_string()),
                password: ActiveValue::Set(password.to_string()),
                wallet_balance: ActiveValue::Set(0.0),
                join_date: ActiveValue::Set(Utc::now()),
            };
            let model = model.insert(&db_tx).await?;
            Ok(model)
        })
    }
}
