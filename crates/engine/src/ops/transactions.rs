//! Transaction listing and bulk ingestion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use sea_orm::{
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::{Engine, with_tx};

/// Hard cap on `page_size`, so a single request cannot drain the table.
const MAX_PAGE_SIZE: u64 = 1000;
const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Category,
    Status,
}

impl SortField {
    fn column(self) -> transactions::Column {
        match self {
            Self::Date => transactions::Column::Date,
            Self::Amount => transactions::Column::Amount,
            Self::Category => transactions::Column::Category,
            Self::Status => transactions::Column::Status,
        }
    }
}

impl TryFrom<&str> for SortField {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "category" => Ok(Self::Category),
            "status" => Ok(Self::Status),
            other => Err(EngineError::InvalidFilter(format!(
                "invalid sort field: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl TryFrom<&str> for SortDirection {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(EngineError::InvalidFilter(format!(
                "invalid sort direction: {other}"
            ))),
        }
    }
}

/// Filters for listing a user's transactions.
///
/// All bounds are inclusive. `page` is 1-indexed; values below 1 are
/// normalized to 1 and `page_size` is clamped to `1..=1000`.
#[derive(Clone, Debug)]
pub struct TransactionQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    pub page: u64,
    pub page_size: u64,
    pub sort_by: SortField,
    pub sort_dir: SortDirection,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            category: None,
            status: None,
            date_from: None,
            date_to: None,
            amount_min: None,
            amount_max: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortField::default(),
            sort_dir: SortDirection::default(),
        }
    }
}

fn validate_query(query: &TransactionQuery) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (query.date_from, query.date_to)
        && from > to
    {
        return Err(EngineError::InvalidFilter(
            "invalid date range: dateFrom must be <= dateTo".to_string(),
        ));
    }
    for bound in [query.amount_min, query.amount_max].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(EngineError::InvalidFilter(
                "amount bounds must be finite numbers".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (query.amount_min, query.amount_max)
        && min > max
    {
        return Err(EngineError::InvalidFilter(
            "invalid amount range: amountMin must be <= amountMax".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, query: &TransactionQuery) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, query: &TransactionQuery) -> Self {
        if let Some(category) = &query.category {
            self = self.filter(transactions::Column::Category.eq(category.clone()));
        }
        if let Some(status) = &query.status {
            self = self.filter(transactions::Column::Status.eq(status.clone()));
        }
        if let Some(from) = query.date_from {
            self = self.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = query.date_to {
            self = self.filter(transactions::Column::Date.lte(to));
        }
        if let Some(min) = query.amount_min {
            self = self.filter(transactions::Column::Amount.gte(min));
        }
        if let Some(max) = query.amount_max {
            self = self.filter(transactions::Column::Amount.lte(max));
        }
        self
    }
}

/// One page of a user's transactions, with the unpaginated match count.
#[derive(Clone, Debug)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// A transaction-like record as received by bulk upload.
///
/// `date` stays a raw string here: a record with an unparsable date is
/// skipped rather than failing the batch.
#[derive(Clone, Debug)]
pub struct TransactionRecord {
    pub amount: f64,
    pub category: String,
    pub date: String,
    pub status: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
}

/// Result of a bulk upload: how many rows landed, and which input
/// indices were dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    pub inserted: usize,
    pub skipped: Vec<usize>,
}

/// Parse a date string, normalized to UTC.
///
/// Accepts RFC 3339, a naive datetime, or a bare date (midnight UTC).
/// Used for upload records and for the `dateFrom`/`dateTo` query bounds.
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

impl Engine {
    /// Returns one page of `user_id`'s transactions matching `query`.
    ///
    /// The owning-user predicate is always applied, so no filter
    /// combination can surface another user's rows. Results are ordered
    /// by the requested column with `id` as tiebreaker, making pages
    /// stable across requests.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        query: &TransactionQuery,
    ) -> ResultEngine<TransactionPage> {
        validate_query(query)?;
        let page = query.page.max(1);
        let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);

        with_tx!(self, |db_tx| {
            let select = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .apply_tx_filters(query);

            let total = select.clone().count(&db_tx).await?;

            let column = query.sort_by.column();
            let select = match query.sort_dir {
                SortDirection::Asc => select
                    .order_by_asc(column)
                    .order_by_asc(transactions::Column::Id),
                SortDirection::Desc => select
                    .order_by_desc(column)
                    .order_by_desc(transactions::Column::Id),
            };

            let rows = select
                .offset((page - 1) * page_size)
                .limit(page_size)
                .all(&db_tx)
                .await?;

            let mut transactions = Vec::with_capacity(rows.len());
            for model in rows {
                transactions.push(Transaction::try_from(model)?);
            }

            Ok(TransactionPage {
                transactions,
                total,
                page,
                page_size,
            })
        })
    }

    /// Ingests a batch of transaction records for `user_id`.
    ///
    /// Records with an unparsable date or a non-finite/non-positive
    /// amount are skipped; the remainder is inserted. Partial success is
    /// expected, and the outcome reports the skipped indices.
    pub async fn upload_transactions(
        &self,
        user_id: &str,
        records: Vec<TransactionRecord>,
    ) -> ResultEngine<UploadOutcome> {
        let mut models = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let Some(date) = parse_flexible_date(&record.date) else {
                skipped.push(index);
                continue;
            };
            let tx = match Transaction::new(
                user_id.to_string(),
                record.amount,
                record.category,
                date,
                record.status,
                record.description,
                record.kind,
            ) {
                Ok(tx) => tx,
                Err(_) => {
                    skipped.push(index);
                    continue;
                }
            };
            models.push(transactions::ActiveModel::from(&tx));
        }

        let inserted = models.len();
        if inserted > 0 {
            with_tx!(self, |db_tx| {
                transactions::Entity::insert_many(models)
                    .exec(&db_tx)
                    .await?;
                Ok(())
            })?;
        }

        Ok(UploadOutcome { inserted, skipped })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn record_date_accepts_rfc3339() {
        let date = parse_flexible_date("2024-03-05T10:30:00+02:00").unwrap();
        assert_eq!(date.hour(), 8);
        assert_eq!(date.day(), 5);
    }

    #[test]
    fn record_date_accepts_naive_and_bare_dates() {
        assert!(parse_flexible_date("2024-03-05T10:30:00").is_some());
        let midnight = parse_flexible_date("2024-03-05").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn record_date_rejects_garbage() {
        assert!(parse_flexible_date("not-a-date").is_none());
        assert!(parse_flexible_date("").is_none());
    }

    #[test]
    fn reversed_ranges_fail_validation() {
        let query = TransactionQuery {
            amount_min: Some(100.0),
            amount_max: Some(10.0),
            ..Default::default()
        };
        assert!(matches!(
            validate_query(&query),
            Err(EngineError::InvalidFilter(_))
        ));
    }

    #[test]
    fn non_finite_bounds_fail_validation() {
        let query = TransactionQuery {
            amount_min: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            validate_query(&query),
            Err(EngineError::InvalidFilter(_))
        ));
    }

    #[test]
    fn sort_field_parses_known_names() {
        assert_eq!(SortField::try_from("amount").unwrap(), SortField::Amount);
        assert!(SortField::try_from("balance").is_err());
    }
}
