pub use categories::{CategoryClassifier, CategoryKind, EXPENSE_CATEGORIES};
pub use error::EngineError;
pub use ops::{
    Engine, EngineBuilder, MonthlyFlow, SeriesFilter, SortDirection, SortField, Summary,
    TransactionPage, TransactionQuery, TransactionRecord, UploadOutcome, month_label,
    parse_flexible_date,
};
pub use transactions::Transaction;

mod categories;
mod error;
mod ops;
mod transactions;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
