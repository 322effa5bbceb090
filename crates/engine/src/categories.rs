//! Fixed category lists, one per transaction type.

use crate::{EngineError, ResultEngine, TransactionType, util::normalize_key};

/// Fallback category used when none is given.
pub const OTHER: &str = "Autre";

pub const INCOME_CATEGORIES: &[&str] = &["Cotisation", "Don", "Sponsoring", "Vente", OTHER];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Transport",
    "Nourriture",
    "Fournitures",
    "Communication",
    "Événements",
    "Aides sociales",
    OTHER,
];

pub fn for_type(kind: TransactionType) -> &'static [&'static str] {
    match kind {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// Resolves user input to the canonical label of a category of `kind`.
///
/// Matching ignores case and accents; empty input resolves to [`OTHER`].
pub fn resolve(kind: TransactionType, input: &str) -> ResultEngine<&'static str> {
    let key = normalize_key(input);
    if key.is_empty() {
        return Ok(OTHER);
    }
    for_type(kind)
        .iter()
        .copied()
        .find(|category| normalize_key(category) == key)
        .ok_or_else(|| {
            EngineError::InvalidCategory(format!(
                "\"{}\" is not a {} category",
                input.trim(),
                kind.label()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_canonical_labels() {
        assert_eq!(
            resolve(TransactionType::Expense, "evenements").unwrap(),
            "Événements"
        );
        assert_eq!(
            resolve(TransactionType::Income, "COTISATION").unwrap(),
            "Cotisation"
        );
        assert_eq!(resolve(TransactionType::Expense, "  ").unwrap(), OTHER);
    }

    #[test]
    fn rejects_category_of_other_type() {
        assert!(matches!(
            resolve(TransactionType::Income, "Transport"),
            Err(EngineError::InvalidCategory(_))
        ));
        assert!(resolve(TransactionType::Expense, "Don").is_err());
    }
}
