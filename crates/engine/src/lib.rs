//! Domain core of the association finance portal.
//!
//! [`Store`] holds the members, the ledger, budgets, community messages and
//! settings of one association, keeps the derived metrics up to date and
//! mirrors every change to a [`Persistence`] endpoint.

pub use budgets::{Budget, BudgetTotals, BudgetUsage};
pub use commands::{NewMember, NewTransaction, Performer};
pub use error::EngineError;
pub use members::{Gender, Level, Member, Sector};
pub use messages::{CommunityMessage, MemberSnapshot};
pub use metrics::Stats;
pub use money::Money;
pub use persistence::{Persistence, PersistenceError};
pub use report::{AssistantError, ReportAssistant};
pub use roles::{Capability, UserRole};
pub use session::SessionUser;
pub use settings::AppSettings;
pub use store::{MemberProfile, Store, StoreBuilder};
pub use transactions::{Transaction, TransactionStatus, TransactionType};

pub mod budgets;
pub mod categories;
mod commands;
mod error;
pub mod members;
mod messages;
pub mod metrics;
mod money;
mod persistence;
pub mod report;
pub mod roles;
mod session;
mod settings;
mod store;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
