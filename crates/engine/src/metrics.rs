//! Aggregates derived from the ledger.
//!
//! Everything here is a pure function of the transaction collection and is
//! recomputed from scratch on every change, never patched incrementally, so a
//! deleted or re-statused transaction is reflected immediately.

use serde::Serialize;

use crate::{Budget, Money, Transaction, TransactionType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub balance: Money,
    pub total_income: Money,
    pub total_expense: Money,
    pub pending_count: usize,
}

fn approved_total(transactions: &[Transaction], kind: TransactionType) -> Money {
    transactions
        .iter()
        .filter(|t| t.kind == kind && t.is_approved())
        .map(|t| t.amount)
        .sum()
}

pub fn total_income(transactions: &[Transaction]) -> Money {
    approved_total(transactions, TransactionType::Income)
}

pub fn total_expense(transactions: &[Transaction]) -> Money {
    approved_total(transactions, TransactionType::Expense)
}

pub fn pending_count(transactions: &[Transaction]) -> usize {
    transactions.iter().filter(|t| t.is_pending()).count()
}

pub fn stats(transactions: &[Transaction]) -> Stats {
    let total_income = total_income(transactions);
    let total_expense = total_expense(transactions);
    Stats {
        balance: total_income - total_expense,
        total_income,
        total_expense,
        pending_count: pending_count(transactions),
    }
}

/// Approved expenses booked on `category`.
pub fn spent_on(transactions: &[Transaction], category: &str) -> Money {
    transactions
        .iter()
        .filter(|t| t.consumes_budget(category))
        .map(|t| t.amount)
        .sum()
}

/// Overwrites `spent_amount` of every row with its value from the ledger.
pub fn recompute_budgets(budgets: &mut [Budget], transactions: &[Transaction]) {
    for budget in budgets.iter_mut() {
        budget.spent_amount = spent_on(transactions, &budget.category);
    }
}

/// Income brought in by a given performer, regardless of status.
pub fn contributed_by(transactions: &[Transaction], performer: &str) -> Money {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Income && t.performed_by == performer)
        .map(|t| t.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{TransactionStatus, budgets::default_budgets};

    fn tx(
        id: &str,
        kind: TransactionType,
        category: &str,
        units: i64,
        status: TransactionStatus,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            kind,
            category: category.to_string(),
            amount: Money::from_units(units),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            description: String::new(),
            performed_by: "Awa".to_string(),
            matricule: String::new(),
            function: String::new(),
            receipt_number: None,
            proof_url: None,
            status,
            responsible: String::new(),
            signature: String::new(),
        }
    }

    fn ledger() -> Vec<Transaction> {
        use TransactionStatus::*;
        use TransactionType::*;
        vec![
            tx("1", Income, "Cotisation", 5000, Approved),
            tx("2", Income, "Don", 700, Pending),
            tx("3", Expense, "Transport", 2000, Approved),
            tx("4", Expense, "Transport", 500, Rejected),
            tx("5", Expense, "Nourriture", 300, Approved),
            tx("6", Expense, "Transport", 100, Pending),
        ]
    }

    #[test]
    fn stats_only_count_approved_entries() {
        let s = stats(&ledger());
        assert_eq!(s.total_income, Money::from_units(5000));
        assert_eq!(s.total_expense, Money::from_units(2300));
        assert_eq!(s.balance, s.total_income - s.total_expense);
        assert_eq!(s.pending_count, 2);
    }

    #[test]
    fn empty_ledger_is_all_zero() {
        assert_eq!(stats(&[]), Stats::default());
    }

    #[test]
    fn budgets_are_fully_replaced_on_recompute() {
        let mut budgets = default_budgets(2025);
        let mut transactions = ledger();
        recompute_budgets(&mut budgets, &transactions);

        let transport = budgets.iter().find(|b| b.category == "Transport").unwrap();
        assert_eq!(transport.spent_amount, Money::from_units(2000));

        transactions.retain(|t| t.id != "3");
        recompute_budgets(&mut budgets, &transactions);
        recompute_budgets(&mut budgets, &transactions);
        let transport = budgets.iter().find(|b| b.category == "Transport").unwrap();
        assert_eq!(transport.spent_amount, Money::ZERO);
        let food = budgets.iter().find(|b| b.category == "Nourriture").unwrap();
        assert_eq!(food.spent_amount, Money::from_units(300));
    }

    #[test]
    fn contributions_follow_performer_name() {
        assert_eq!(contributed_by(&ledger(), "Awa"), Money::from_units(5700));
        assert_eq!(contributed_by(&ledger(), "Moussa"), Money::ZERO);
    }
}
