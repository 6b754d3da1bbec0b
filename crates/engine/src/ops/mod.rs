use sea_orm::DatabaseConnection;

use crate::{CategoryClassifier, ResultEngine};

mod reports;
mod transactions;
mod users;
mod wallet;

pub use reports::{MonthlyFlow, SeriesFilter, Summary, month_label};
pub use transactions::{
    SortDirection, SortField, TransactionPage, TransactionQuery, TransactionRecord, UploadOutcome,
    parse_flexible_date,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    classifier: CategoryClassifier,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    classifier: Option<CategoryClassifier>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default expense-category set.
    pub fn classifier(mut self, classifier: CategoryClassifier) -> EngineBuilder {
        self.classifier = Some(classifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            classifier: self.classifier.unwrap_or_default(),
        })
    }
}
