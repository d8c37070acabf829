use sea_orm::DatabaseConnection;

mod documents;
mod expenses;
mod fees;
mod payments;
mod users;

pub use fees::{FinancialOverview, PaymentReceipt};

/// Default tuition assigned to a fee account created on first access
/// (100,000.00 in minor units).
pub const DEFAULT_TOTAL_FEE_MINOR: i64 = 10_000_000;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
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
    default_total_fee_minor: i64,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    default_total_fee_minor: i64,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            default_total_fee_minor: DEFAULT_TOTAL_FEE_MINOR,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the total fee of lazily created accounts.
    pub fn default_total_fee(mut self, total_fee_minor: i64) -> EngineBuilder {
        self.default_total_fee_minor = total_fee_minor;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        if self.default_total_fee_minor < 0 {
            return Err(crate::EngineError::InvalidAmount(
                "default total fee must be >= 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            default_total_fee_minor: self.default_total_fee_minor,
        })
    }
}
