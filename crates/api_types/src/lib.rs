use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transaction {
    use super::*;

    /// Sort column for the transaction list.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortField {
        #[default]
        Date,
        Amount,
        Category,
        Status,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortDirection {
        #[default]
        Asc,
        Desc,
    }

    /// Query parameters for `GET /transactions`.
    ///
    /// Dates and amount bounds arrive as raw strings so the handler can
    /// reject a malformed value with a message naming the parameter.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct TransactionListParams {
        pub category: Option<String>,
        pub status: Option<String>,
        /// RFC3339 timestamp, inclusive lower bound.
        pub date_from: Option<String>,
        /// RFC3339 timestamp, inclusive upper bound.
        pub date_to: Option<String>,
        pub amount_min: Option<String>,
        pub amount_max: Option<String>,
        /// 1-indexed page number.
        pub page: Option<u64>,
        pub page_size: Option<u64>,
        pub sort_by: Option<SortField>,
        pub sort_dir: Option<SortDirection>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount: f64,
        pub category: String,
        /// RFC3339 timestamp, including timezone offset.
        pub date: DateTime<FixedOffset>,
        pub status: Option<String>,
        pub description: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Count of matching rows with pagination ignored.
        pub total: u64,
        pub page: u64,
        pub page_size: u64,
    }

    /// One element of the `POST /transactions/upload` payload.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpload {
        pub amount: f64,
        pub category: String,
        /// Date string; a record with an unparsable date is skipped.
        pub date: String,
        pub status: Option<String>,
        pub description: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UploadResponse {
        pub inserted: usize,
        /// Zero-based indices of the records that were dropped.
        pub skipped: Vec<usize>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SummaryResponse {
        pub revenue: f64,
        pub expenses: f64,
        pub savings: f64,
        /// Derived from transactions with an assumed zero starting
        /// balance; independent of the stored wallet balance.
        pub balance: f64,
        pub transaction_count: u64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct SeriesParams {
        pub category: Option<String>,
        pub status: Option<String>,
    }

    /// One month of the revenue/expense series, oldest first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SeriesPoint {
        /// Human-readable label, e.g. "Mar 2024".
        pub month: String,
        pub revenue: f64,
        pub expenses: f64,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletBalanceResponse {
        pub wallet_balance: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletHistoryResponse {
        pub transactions: Vec<super::transaction::TransactionView>,
    }

    /// Body for `POST /wallet/{user_id}/add` and `.../withdraw`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletOp {
        pub amount: f64,
    }
}
