//! Transaction primitives.
//!
//! A `Transaction` is an immutable ledger entry owned by a single user.
//! The stored `amount` is always a positive magnitude; whether it counts
//! as money in or money out is decided by `category` at reporting time.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
}

impl Transaction {
    pub fn new(
        user_id: String,
        amount: f64,
        category: String,
        date: DateTime<Utc>,
        status: Option<String>,
        description: Option<String>,
        kind: Option<String>,
    ) -> ResultEngine<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount must be a finite number > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            category,
            date,
            status,
            description,
            kind,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    pub date: DateTimeUtc,
    pub status: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            amount: ActiveValue::Set(tx.amount),
            category: ActiveValue::Set(tx.category.clone()),
            date: ActiveValue::Set(tx.date),
            status: ActiveValue::Set(tx.status.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            kind: ActiveValue::Set(tx.kind.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            user_id: model.user_id,
            amount: model.amount,
            category: model.category,
            date: model.date,
            status: model.status,
            description: model.description,
            kind: model.kind,
        })
    }
}
