//! Natural-language financial reports.
//!
//! The text generation itself is an opaque, non-deterministic collaborator
//! behind [`ReportAssistant`]. This module prepares its context and turns every
//! outcome into a user-facing answer: the report flow never fails.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::{Member, Money, Transaction, TransactionType};

/// How many of the most recent ledger entries are shared with the assistant.
pub const RECENT_TRANSACTIONS: usize = 20;

pub const EMPTY_ANSWER: &str = "Désolé, je n'ai pas pu générer de réponse.";
pub const FAILURE_ANSWER: &str =
    "Une erreur est survenue lors de la communication avec l'assistant IA.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssistantError {
    #[error("assistant not configured: {0}")]
    NotConfigured(String),
    #[error("assistant unavailable: {0}")]
    Unavailable(String),
    #[error("assistant rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected assistant response: {0}")]
    Decode(String),
}

pub trait ReportAssistant: Send + Sync {
    /// Answers `question` under the given system `instruction`.
    ///
    /// `Ok(None)` means the model produced no text.
    fn generate(
        &self,
        instruction: &str,
        question: &str,
    ) -> impl Future<Output = Result<Option<String>, AssistantError>> + Send;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_members: usize,
    pub transaction_count: usize,
    pub total_income: Money,
    pub total_expense: Money,
}

/// Data shared with the assistant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContext<'a> {
    pub summary: ReportSummary,
    pub recent_transactions: &'a [Transaction],
}

impl<'a> ReportContext<'a> {
    /// `transactions` is expected newest first, like the store keeps them.
    ///
    /// Summary totals cover every entry whatever its status, so the assistant
    /// can also reason about pending requests.
    pub fn new(transactions: &'a [Transaction], members: &[Member]) -> Self {
        let total = |kind: TransactionType| -> Money {
            transactions
                .iter()
                .filter(|t| t.kind == kind)
                .map(|t| t.amount)
                .sum()
        };
        Self {
            summary: ReportSummary {
                total_members: members.len(),
                transaction_count: transactions.len(),
                total_income: total(TransactionType::Income),
                total_expense: total(TransactionType::Expense),
            },
            recent_transactions: &transactions[..transactions.len().min(RECENT_TRANSACTIONS)],
        }
    }

    pub fn instruction(&self) -> Result<String, serde_json::Error> {
        let data = serde_json::to_string(self)?;
        Ok(format!(
            "Tu es un expert comptable et assistant financier pour une association.\n\
             Tu as accès aux données financières suivantes (format JSON) : {data}.\n\n\
             Tes tâches :\n\
             1. Analyser les données fournies.\n\
             2. Répondre aux questions sur le solde, les tendances, ou des membres spécifiques.\n\
             3. Générer des brouillons de rapports financiers.\n\n\
             Réponds toujours de manière professionnelle, concise et en français.\n\
             Si on te demande un rapport, structure-le clairement \
             (Titre, Période, Chiffres Clés, Analyse, Conclusion)."
        ))
    }
}

/// Asks the assistant and always returns something displayable.
pub async fn generate_report<A: ReportAssistant>(
    assistant: &A,
    transactions: &[Transaction],
    members: &[Member],
    query: &str,
) -> String {
    let instruction = match ReportContext::new(transactions, members).instruction() {
        Ok(instruction) => instruction,
        Err(err) => {
            tracing::error!("failed to serialize report context: {err}");
            return FAILURE_ANSWER.to_string();
        }
    };

    match assistant.generate(&instruction, query).await {
        Ok(Some(text)) if !text.trim().is_empty() => text,
        Ok(_) => EMPTY_ANSWER.to_string(),
        Err(err) => {
            tracing::warn!("report assistant failed: {err}");
            FAILURE_ANSWER.to_string()
        }
    }
}
