//! Ledger entries and their approval workflow.
//!
//! A `Transaction` is either an income (`ENTREE`) or an expense (`SORTIE`). Only
//! `APPROVED` entries count towards balances and budget consumption.
//!
//! Status workflow:
//!
//! ```text
//! PENDING ──approve──▶ APPROVED
//!    └─────reject────▶ REJECTED
//! ```
//!
//! Both `APPROVED` and `REJECTED` are terminal.

use api_types::transaction::{TransactionRecord, TransactionRow};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{EngineError, Money, ResultEngine, UserRole, util::parse_day};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TransactionType {
    #[serde(rename = "ENTREE")]
    Income,
    #[serde(rename = "SORTIE")]
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "ENTREE",
            Self::Expense => "SORTIE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "ENTREE" => Ok(Self::Income),
            "SORTIE" => Ok(Self::Expense),
            other => Err(EngineError::InvalidValue(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Treasurers book directly into the ledger; everybody else files a request.
    pub fn initial_for(role: UserRole) -> Self {
        match role {
            UserRole::Treasurer => Self::Approved,
            UserRole::President | UserRole::Member => Self::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Validates a move to `target`, returning the new status.
    pub fn transition(self, target: TransactionStatus) -> ResultEngine<TransactionStatus> {
        match (self, target) {
            (Self::Pending, Self::Approved | Self::Rejected) => Ok(target),
            (from, to) => Err(EngineError::InvalidTransition(format!(
                "{} -> {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidValue(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub description: String,
    pub performed_by: String,
    pub matricule: String,
    pub function: String,
    /// Generated for incomes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    /// Expenses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    pub status: TransactionStatus,
    pub responsible: String,
    pub signature: String,
}

impl Transaction {
    pub fn is_approved(&self) -> bool {
        self.status == TransactionStatus::Approved
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Approved expense booked on `category`.
    pub fn consumes_budget(&self, category: &str) -> bool {
        self.kind == TransactionType::Expense && self.is_approved() && self.category == category
    }

    pub fn to_record(&self) -> TransactionRecord {
        TransactionRecord {
            id: self.id.clone(),
            kind: self.kind.as_str().to_string(),
            category: self.category.clone(),
            amount: self.amount.to_major(),
            date: self.date.format("%Y-%m-%d").to_string(),
            description: self.description.clone(),
            performed_by: self.performed_by.clone(),
            matricule: self.matricule.clone(),
            function: self.function.clone(),
            receipt_number: self.receipt_number.clone(),
            proof_url: self.proof_url.clone(),
            status: self.status.as_str().to_string(),
            responsible: self.responsible.clone(),
            signature: self.signature.clone(),
        }
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = EngineError;

    fn try_from(row: TransactionRow) -> ResultEngine<Self> {
        Ok(Self {
            kind: TransactionType::try_from(row.kind.as_str())?,
            status: TransactionStatus::try_from(row.status.as_str())?,
            amount: Money::from_major(row.amount)?,
            date: parse_day(&row.date, "transaction date")?,
            id: row.id,
            category: row.category,
            description: row.description,
            performed_by: row.performed_by,
            matricule: row.matricule,
            function: row.function,
            receipt_number: row.receipt_number.filter(|r| !r.is_empty()),
            proof_url: row.proof_url.filter(|p| !p.is_empty()),
            responsible: row.responsible,
            signature: row.signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_treasurer_books_approved() {
        assert_eq!(
            TransactionStatus::initial_for(UserRole::Treasurer),
            TransactionStatus::Approved
        );
        assert_eq!(
            TransactionStatus::initial_for(UserRole::President),
            TransactionStatus::Pending
        );
        assert_eq!(
            TransactionStatus::initial_for(UserRole::Member),
            TransactionStatus::Pending
        );
    }

    #[test]
    fn terminal_states_have_no_way_out() {
        let pending = TransactionStatus::Pending;
        assert_eq!(
            pending.transition(TransactionStatus::Approved).unwrap(),
            TransactionStatus::Approved
        );
        assert_eq!(
            pending.transition(TransactionStatus::Rejected).unwrap(),
            TransactionStatus::Rejected
        );
        assert!(pending.transition(TransactionStatus::Pending).is_err());

        for terminal in [TransactionStatus::Approved, TransactionStatus::Rejected] {
            assert!(terminal.is_terminal());
            for target in [
                TransactionStatus::Pending,
                TransactionStatus::Approved,
                TransactionStatus::Rejected,
            ] {
                assert!(matches!(
                    terminal.transition(target),
                    Err(EngineError::InvalidTransition(_))
                ));
            }
        }
    }

    #[test]
    fn row_maps_to_domain_and_back() {
        let row = TransactionRow {
            id: "tx1".to_string(),
            kind: "ENTREE".to_string(),
            category: "Cotisation".to_string(),
            amount: 5000.0,
            date: "2025-02-10T00:00:00.000Z".to_string(),
            description: "Cotisation annuelle".to_string(),
            performed_by: "Awa Traore".to_string(),
            matricule: "M-01".to_string(),
            function: "Etudiante".to_string(),
            receipt_number: Some("REC-1".to_string()),
            proof_url: Some(String::new()),
            status: "APPROVED".to_string(),
            responsible: "Tresorier".to_string(),
            signature: "SIG-1".to_string(),
        };

        let tx = Transaction::try_from(row).unwrap();
        assert_eq!(tx.kind, TransactionType::Income);
        assert_eq!(tx.amount, Money::from_units(5000));
        assert_eq!(tx.proof_url, None);

        let record = tx.to_record();
        assert_eq!(record.kind, "ENTREE");
        assert_eq!(record.date, "2025-02-10");
        assert_eq!(record.amount, 5000.0);
        assert_eq!(record.receipt_number.as_deref(), Some("REC-1"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(TransactionStatus::try_from("VOID").is_err());
        assert!(TransactionType::try_from("INCOME").is_err());
    }
}
