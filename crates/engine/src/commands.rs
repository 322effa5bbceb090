//! Command structs for store operations.
//!
//! These types group the caller-supplied fields of creation operations,
//! keeping call sites readable and avoiding long argument lists. Everything the
//! store derives itself (ids, status, signature, receipt number, unique id) is
//! absent here.

use chrono::NaiveDate;

use crate::{Gender, Level, Money, Sector, TransactionType};

/// Who handled the money on the association's behalf.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Performer {
    /// Full name.
    pub name: String,
    pub matricule: String,
    pub function: String,
}

/// Record an income or an expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: Money,
    pub date: NaiveDate,
    /// Free text, validated against the categories of `kind`. Empty means "Autre".
    pub category: String,
    pub description: String,
    pub performer: Performer,
    /// Responsible of the performer's function.
    pub responsible: String,
    /// Kept on expenses only.
    pub proof_url: Option<String>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(kind: TransactionType, amount: Money, date: NaiveDate) -> Self {
        Self {
            kind,
            amount,
            date,
            category: String::new(),
            description: String::new(),
            performer: Performer::default(),
            responsible: String::new(),
            proof_url: None,
        }
    }

    #[must_use]
    pub fn income(amount: Money, date: NaiveDate) -> Self {
        Self::new(TransactionType::Income, amount, date)
    }

    #[must_use]
    pub fn expense(amount: Money, date: NaiveDate) -> Self {
        Self::new(TransactionType::Expense, amount, date)
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn performed_by(
        mut self,
        name: impl Into<String>,
        matricule: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        self.performer = Performer {
            name: name.into(),
            matricule: matricule.into(),
            function: function.into(),
        };
        self
    }

    #[must_use]
    pub fn responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = responsible.into();
        self
    }

    #[must_use]
    pub fn proof_url(mut self, proof_url: impl Into<String>) -> Self {
        self.proof_url = Some(proof_url.into());
        self
    }
}

/// Enrol a new member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub sector: Sector,
    pub level: Level,
    pub gender: Gender,
    pub dossier_number: String,
    pub ine: String,
    pub balance: Money,
}

impl NewMember {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        gender: Gender,
        dob: NaiveDate,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            dob,
            sector: Sector::ComputerScience,
            level: Level::L1,
            gender,
            dossier_number: String::new(),
            ine: String::new(),
            balance: Money::ZERO,
        }
    }

    #[must_use]
    pub fn enrolment(mut self, sector: Sector, level: Level) -> Self {
        self.sector = sector;
        self.level = level;
        self
    }

    #[must_use]
    pub fn dossier_number(mut self, dossier_number: impl Into<String>) -> Self {
        self.dossier_number = dossier_number.into();
        self
    }

    #[must_use]
    pub fn ine(mut self, ine: impl Into<String>) -> Self {
        self.ine = ine.into();
        self
    }

    #[must_use]
    pub fn balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }
}
