//! Domain engine for EduFinance.
//!
//! The [`Engine`] owns the database handle and exposes every operation the
//! HTTP layer and the admin tools need: the fee ledger, payments, expenses,
//! documents and user sessions.

pub use documents::{Document, DocumentInsight, DocumentSummary};
pub use error::EngineError;
pub use expenses::{
    CategoryTotal, Expense, ExpenseCategory, ExpenseStats, MonthlyTotal, NewExpense,
};
pub use fees::FeeAccount;
pub use money::Money;
pub use ops::{DEFAULT_TOTAL_FEE_MINOR, Engine, EngineBuilder, FinancialOverview, PaymentReceipt};
pub use payments::{Payment, PaymentStatus};
pub use users::{NewUser, User};

pub mod documents;
mod error;
pub mod expenses;
pub mod fees;
mod money;
mod ops;
pub mod payments;
pub mod sessions;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
