//! CSV export of the ledger.

use std::{fs::File, io, path::Path};

use csv::Writer;
use engine::Transaction;
use serde::Serialize;

use crate::error::Result;

/// Column names, in the order `ExportRow` serializes them.
const HEADER: [&str; 14] = [
    "id",
    "date",
    "type",
    "category",
    "amount",
    "status",
    "description",
    "performed_by",
    "matricule",
    "function",
    "responsible",
    "receipt_number",
    "proof_url",
    "signature",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    date: String,
    #[serde(rename = "type")]
    kind: &'static str,
    category: &'a str,
    amount: String,
    status: &'static str,
    description: &'a str,
    performed_by: &'a str,
    matricule: &'a str,
    function: &'a str,
    responsible: &'a str,
    receipt_number: &'a str,
    proof_url: &'a str,
    signature: &'a str,
}

impl<'a> From<&'a Transaction> for ExportRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: &tx.id,
            date: tx.date.format("%Y-%m-%d").to_string(),
            kind: tx.kind.as_str(),
            category: &tx.category,
            amount: tx.amount.to_string(),
            status: tx.status.as_str(),
            description: &tx.description,
            performed_by: &tx.performed_by,
            matricule: &tx.matricule,
            function: &tx.function,
            responsible: &tx.responsible,
            receipt_number: tx.receipt_number.as_deref().unwrap_or_default(),
            proof_url: tx.proof_url.as_deref().unwrap_or_default(),
            signature: &tx.signature,
        }
    }
}

pub fn write_ledger<W: io::Write>(out: W, transactions: &[&Transaction]) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    // serialize() only emits the header along with the first row
    if transactions.is_empty() {
        writer.write_record(HEADER)?;
    }
    for tx in transactions {
        writer.serialize(ExportRow::from(*tx))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_to(path: &Path, transactions: &[&Transaction]) -> Result<()> {
    let file = File::create(path)?;
    write_ledger(file, transactions)?;
    tracing::info!(path = %path.display(), rows = transactions.len(), "ledger exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::{Money, TransactionStatus, TransactionType};

    use super::*;

    #[test]
    fn rows_follow_the_header() {
        let tx = Transaction {
            id: "tx1".to_string(),
            kind: TransactionType::Expense,
            category: "Événements".to_string(),
            amount: Money::new(1_250_050),
            date: NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(),
            description: "Soirée, musique".to_string(),
            performed_by: "Awa Traore".to_string(),
            matricule: "M-01".to_string(),
            function: "Trésorière".to_string(),
            receipt_number: None,
            proof_url: Some("https://drive/p.pdf".to_string()),
            status: TransactionStatus::Approved,
            responsible: "Bureau".to_string(),
            signature: "SIG-1".to_string(),
        };

        let mut out = Vec::new();
        write_ledger(&mut out, &[&tx]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "id,date,type,category,amount,status,description,performed_by,matricule,function,responsible,receipt_number,proof_url,signature"
            )
        );
        assert_eq!(lines.clone().count(), 1);
        assert_eq!(
            lines.next(),
            Some(
                "tx1,2025-06-21,SORTIE,Événements,12500.50,APPROVED,\"Soirée, musique\",Awa Traore,M-01,Trésorière,Bureau,,https://drive/p.pdf,SIG-1"
            )
        );
    }

    #[test]
    fn empty_ledger_still_has_the_header() {
        let mut out = Vec::new();
        write_ledger(&mut out, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\n", HEADER.join(",")));
    }
}
