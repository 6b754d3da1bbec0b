//! Dashboard reports: summary totals and the monthly revenue/expense
//! series.

use std::collections::BTreeMap;

use chrono::Datelike;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{ResultEngine, transactions};

use super::{Engine, with_tx};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Human-readable month label, e.g. `"Mar 2024"`.
pub fn month_label(year: i32, month: u32) -> String {
    let name = match month {
        1..=12 => MONTH_NAMES[month as usize - 1],
        _ => "???",
    };
    format!("{name} {year}")
}

/// Totals over all of a user's transactions.
///
/// `balance` is derived from the transactions alone (`savings` with an
/// assumed starting balance of zero). It is not the stored wallet
/// balance and the two can disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    pub revenue: f64,
    pub expenses: f64,
    pub savings: f64,
    pub balance: f64,
    pub transaction_count: u64,
}

/// Optional equality filters for the monthly series.
#[derive(Clone, Debug, Default)]
pub struct SeriesFilter {
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Revenue and expense totals for one calendar month.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonthlyFlow {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub expenses: f64,
}

impl Engine {
    /// Computes the dashboard summary for `user_id`.
    ///
    /// A user with no transactions gets an all-zero summary.
    pub async fn summary(&self, user_id: &str) -> ResultEngine<Summary> {
        let rows = with_tx!(self, |db_tx| {
            let rows: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?;
            Ok(rows)
        })?;

        let mut summary = Summary::default();
        for row in &rows {
            if self.classifier().is_expense(&row.category) {
                summary.expenses += row.amount;
            } else {
                summary.revenue += row.amount;
            }
        }
        summary.transaction_count = rows.len() as u64;
        summary.savings = summary.revenue - summary.expenses;
        summary.balance = summary.savings;
        Ok(summary)
    }

    /// Computes the monthly revenue/expense series for `user_id`.
    ///
    /// Rows are grouped by the calendar (year, month) of the transaction
    /// date and returned strictly ascending; months without a matching
    /// transaction are absent, not zero-filled.
    pub async fn monthly_series(
        &self,
        user_id: &str,
        filter: &SeriesFilter,
    ) -> ResultEngine<Vec<MonthlyFlow>> {
        let rows = with_tx!(self, |db_tx| {
            let mut select = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id));
            if let Some(category) = &filter.category {
                select = select.filter(transactions::Column::Category.eq(category.clone()));
            }
            if let Some(status) = &filter.status {
                select = select.filter(transactions::Column::Status.eq(status.clone()));
            }
            let rows: Vec<transactions::Model> = select.all(&db_tx).await?;
            Ok(rows)
        })?;

        let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
        for row in &rows {
            let key = (row.date.year(), row.date.month());
            let bucket = buckets.entry(key).or_insert((0.0, 0.0));
            if self.classifier().is_expense(&row.category) {
                bucket.1 += row.amount;
            } else {
                bucket.0 += row.amount;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|((year, month), (revenue, expenses))| MonthlyFlow {
                year,
                month,
                revenue,
                expenses,
            })
            .collect())
    }
}
