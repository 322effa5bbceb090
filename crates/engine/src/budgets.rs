//! Yearly allocations per expense category.
//!
//! `spent_amount` is never persisted; it is recomputed from the ledger by
//! [`crate::metrics::recompute_budgets`].

use api_types::budget::{BudgetRow, BudgetUpsert};
use serde::Serialize;

use crate::{EngineError, Money, ResultEngine, categories::EXPENSE_CATEGORIES};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub allocated_amount: Money,
    pub spent_amount: Money,
    pub year: i32,
}

/// Consumption of a single budget row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BudgetUsage {
    pub remaining: Money,
    /// `0.0` when nothing is allocated.
    pub usage_percent: f64,
    pub is_over: bool,
}

impl Budget {
    pub fn usage(&self) -> BudgetUsage {
        let remaining = self.allocated_amount - self.spent_amount;
        let usage_percent = if self.allocated_amount.minor() > 0 {
            self.spent_amount.minor() as f64 / self.allocated_amount.minor() as f64 * 100.0
        } else {
            0.0
        };
        BudgetUsage {
            remaining,
            usage_percent,
            is_over: remaining.is_negative(),
        }
    }

    pub fn to_upsert(&self) -> BudgetUpsert {
        BudgetUpsert {
            id: self.id.clone(),
            amount: self.allocated_amount.to_major(),
            category: self.category.clone(),
            year: self.year,
        }
    }
}

impl TryFrom<BudgetRow> for Budget {
    type Error = EngineError;

    fn try_from(row: BudgetRow) -> ResultEngine<Self> {
        Ok(Self {
            allocated_amount: Money::from_major(row.allocated_amount)?,
            spent_amount: Money::ZERO,
            id: row.id,
            category: row.category,
            year: row.year,
        })
    }
}

/// One zero allocation per known expense category, used when nothing is persisted.
pub fn default_budgets(year: i32) -> Vec<Budget> {
    EXPENSE_CATEGORIES
        .iter()
        .enumerate()
        .map(|(index, category)| Budget {
            id: format!("b-{index}"),
            category: (*category).to_string(),
            allocated_amount: Money::ZERO,
            spent_amount: Money::ZERO,
            year,
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BudgetTotals {
    pub allocated: Money,
    pub spent: Money,
}

pub fn totals(budgets: &[Budget]) -> BudgetTotals {
    budgets.iter().fold(BudgetTotals::default(), |mut acc, b| {
        acc.allocated += b.allocated_amount;
        acc.spent += b.spent_amount;
        acc
    })
}
