//! Subcommands of the portal binary. Each one maps to a store operation.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use chrono_tz::Tz;
use clap::{Subcommand, ValueEnum};
use engine::{
    AppSettings, Gender, Level, Money, NewMember, NewTransaction, Persistence, Sector, Stats,
    Store, Transaction, TransactionStatus, TransactionType,
};
use serde::Serialize;

use crate::{
    assistant::Gemini,
    config::AppConfig,
    error::{AppError, Result},
    export,
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Balance, totals and pending requests.
    Summary {
        /// Print the figures as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the ledger entries visible to the session.
    Transactions {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Record an income or an expense.
    Record {
        #[arg(value_enum)]
        kind: KindArg,
        /// Amount, `.` or `,` as decimal separator.
        amount: String,
        #[arg(long, default_value = "")]
        category: String,
        /// YYYY-MM-DD, defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Defaults to the session name.
        #[arg(long, default_value = "")]
        performed_by: String,
        #[arg(long, default_value = "")]
        matricule: String,
        #[arg(long, default_value = "")]
        function: String,
        #[arg(long, default_value = "")]
        responsible: String,
        /// Proof of payment, kept for expenses only.
        #[arg(long)]
        proof_url: Option<String>,
    },
    Approve {
        id: String,
    },
    Reject {
        id: String,
    },
    DeleteTransaction {
        id: String,
    },
    /// List members, optionally filtered by name or unique id.
    Members {
        query: Option<String>,
    },
    AddMember {
        first_name: String,
        last_name: String,
        #[arg(long, value_enum)]
        gender: GenderArg,
        /// Date of birth, YYYY-MM-DD.
        #[arg(long)]
        dob: String,
        #[arg(long, value_enum, default_value = "computer-science")]
        sector: SectorArg,
        #[arg(long, value_enum, default_value = "l1")]
        level: LevelArg,
        #[arg(long, default_value = "")]
        dossier_number: String,
        #[arg(long, default_value = "")]
        ine: String,
        #[arg(long, default_value = "0")]
        balance: String,
    },
    DeleteMember {
        id: String,
    },
    /// Allocation and consumption per category.
    Budgets,
    SetBudget {
        id: String,
        amount: String,
    },
    /// Community board.
    Messages,
    Post {
        content: String,
    },
    DeleteMessage {
        id: String,
    },
    /// Show the settings, or update the given fields.
    Settings {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        logo_url: Option<String>,
    },
    /// The linked member record and its contributions.
    Profile,
    /// Ask the financial assistant.
    Ask {
        question: String,
    },
    /// Write the visible ledger as CSV.
    Export {
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionType {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Income => Self::Income,
            KindArg::Expense => Self::Expense,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for TransactionStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => Self::Pending,
            StatusArg::Approved => Self::Approved,
            StatusArg::Rejected => Self::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GenderArg {
    M,
    F,
}

impl From<GenderArg> for Gender {
    fn from(value: GenderArg) -> Self {
        match value {
            GenderArg::M => Self::Male,
            GenderArg::F => Self::Female,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SectorArg {
    ComputerScience,
    Administration,
    Electromechanics,
    Preparatory,
}

impl From<SectorArg> for Sector {
    fn from(value: SectorArg) -> Self {
        match value {
            SectorArg::ComputerScience => Self::ComputerScience,
            SectorArg::Administration => Self::Administration,
            SectorArg::Electromechanics => Self::Electromechanics,
            SectorArg::Preparatory => Self::Preparatory,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LevelArg {
    L1,
    L2,
    L3,
    Ap,
}

impl From<LevelArg> for Level {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::L1 => Self::L1,
            LevelArg::L2 => Self::L2,
            LevelArg::L3 => Self::L3,
            LevelArg::Ap => Self::AP,
        }
    }
}

fn parse_amount(raw: &str) -> Result<Money> {
    Ok(raw.parse::<Money>()?)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Input(format!("expected YYYY-MM-DD, got {raw}")))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryJson<'a> {
    association_name: &'a str,
    currency: &'a str,
    #[serde(flatten)]
    stats: Stats,
    budget_allocated: Money,
    budget_spent: Money,
}

fn summary_json<P: Persistence>(store: &Store<P>) -> Result<String> {
    let settings = store.settings();
    let totals = store.budget_totals();
    let summary = SummaryJson {
        association_name: &settings.association_name,
        currency: &settings.currency,
        stats: store.stats(),
        budget_allocated: totals.allocated,
        budget_spent: totals.spent,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

fn print_transactions(transactions: &[&Transaction], currency: &str) {
    if transactions.is_empty() {
        println!("No transactions.");
        return;
    }
    for tx in transactions {
        println!(
            "{}  {}  {:<8}  {:<14}  {:>16}  {:<18}  {}  [{}]",
            tx.date.format("%Y-%m-%d"),
            tx.id,
            tx.kind.as_str(),
            tx.category,
            tx.amount.format_with(currency),
            tx.performed_by,
            tx.description,
            tx.status.as_str()
        );
    }
}

pub async fn run<P: Persistence>(
    command: Command,
    store: &mut Store<P>,
    config: &AppConfig,
) -> Result<()> {
    let currency = store.settings().currency.clone();

    match command {
        Command::Summary { json: true } => {
            println!("{}", summary_json(store)?);
        }
        Command::Summary { json: false } => {
            let stats = store.stats();
            let totals = store.budget_totals();
            println!("{}", store.settings().association_name);
            println!("Balance:          {}", stats.balance.format_with(&currency));
            println!("Total income:     {}", stats.total_income.format_with(&currency));
            println!("Total expense:    {}", stats.total_expense.format_with(&currency));
            println!("Pending requests: {}", stats.pending_count);
            println!(
                "Budgets:          {} spent of {}",
                totals.spent.format_with(&currency),
                totals.allocated.format_with(&currency)
            );
        }
        Command::Transactions { status } => {
            let mut visible = store.visible_transactions()?;
            if let Some(status) = status {
                let status = TransactionStatus::from(status);
                visible.retain(|t| t.status == status);
            }
            print_transactions(&visible, &currency);
        }
        Command::Record {
            kind,
            amount,
            category,
            date,
            description,
            performed_by,
            matricule,
            function,
            responsible,
            proof_url,
        } => {
            let date = match date {
                Some(raw) => parse_date(&raw)?,
                None => Local::now().date_naive(),
            };
            let mut command = NewTransaction::new(kind.into(), parse_amount(&amount)?, date)
                .category(category)
                .description(description)
                .performed_by(performed_by, matricule, function)
                .responsible(responsible);
            if let Some(proof_url) = proof_url {
                command = command.proof_url(proof_url);
            }
            let tx = store.add_transaction(command)?;
            println!(
                "Recorded {} {} ({}), signature {}",
                tx.id,
                tx.amount.format_with(&currency),
                tx.status.as_str(),
                tx.signature
            );
            if let Some(receipt) = &tx.receipt_number {
                println!("Receipt {receipt}");
            }
        }
        Command::Approve { id } => {
            store.approve_transaction(&id)?;
            println!("Approved {id}");
        }
        Command::Reject { id } => {
            store.reject_transaction(&id)?;
            println!("Rejected {id}");
        }
        Command::DeleteTransaction { id } => {
            store.delete_transaction(&id)?;
            println!("Deleted {id}");
        }
        Command::Members { query } => {
            let members = store.member_filter(query.as_deref().unwrap_or_default());
            if members.is_empty() {
                println!("No members.");
            }
            for m in members {
                println!(
                    "{}  {}  {:<24}  {:<24}  {:<3}  {}",
                    m.unique_id,
                    m.id,
                    m.full_name(),
                    m.sector.as_str(),
                    m.level.as_str(),
                    m.balance.format_with(&currency)
                );
            }
        }
        Command::AddMember {
            first_name,
            last_name,
            gender,
            dob,
            sector,
            level,
            dossier_number,
            ine,
            balance,
        } => {
            let command = NewMember::new(first_name, last_name, gender.into(), parse_date(&dob)?)
                .enrolment(sector.into(), level.into())
                .dossier_number(dossier_number)
                .ine(ine)
                .balance(parse_amount(&balance)?);
            let member = store.add_member(command)?;
            println!("Added {} ({}) as {}", member.full_name(), member.id, member.unique_id);
        }
        Command::DeleteMember { id } => {
            store.delete_member(&id)?;
            println!("Deleted member {id}");
        }
        Command::Budgets => {
            for budget in store.budgets() {
                let usage = budget.usage();
                println!(
                    "{}  {}  {:<16}  {:>16} / {:>16}  {:>6.1}%{}",
                    budget.id,
                    budget.year,
                    budget.category,
                    budget.spent_amount.format_with(&currency),
                    budget.allocated_amount.format_with(&currency),
                    usage.usage_percent,
                    if usage.is_over { "  OVER" } else { "" }
                );
            }
        }
        Command::SetBudget { id, amount } => {
            let amount = parse_amount(&amount)?;
            store.update_budget(&id, amount)?;
            println!("Budget {id} set to {}", amount.format_with(&currency));
        }
        Command::Messages => {
            let tz: Tz = config.timezone()?;
            for msg in store.messages() {
                let badge = msg
                    .member_info
                    .map(|info| format!(" ({} {})", info.sector.as_str(), info.level.as_str()))
                    .unwrap_or_default();
                println!(
                    "[{}] {} - {}{}  #{}",
                    msg.timestamp.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
                    msg.user_name,
                    msg.user_role.label(),
                    badge,
                    msg.id
                );
                println!("    {}", msg.content);
            }
        }
        Command::Post { content } => {
            let msg = store.add_message(&content)?;
            println!("Posted {}", msg.id);
        }
        Command::DeleteMessage { id } => {
            store.delete_message(&id)?;
            println!("Deleted message {id}");
        }
        Command::Settings {
            name,
            currency,
            logo_url,
        } => {
            if name.is_some() || currency.is_some() || logo_url.is_some() {
                let current = store.settings().clone();
                store.update_settings(AppSettings {
                    association_name: name.unwrap_or(current.association_name),
                    currency: currency.unwrap_or(current.currency),
                    logo_url: logo_url.unwrap_or(current.logo_url),
                })?;
            }
            let settings = store.settings();
            println!("Association: {}", settings.association_name);
            println!("Currency:    {}", settings.currency);
            println!("Logo:        {}", settings.logo_url);
        }
        Command::Profile => {
            let profile = store.member_profile()?;
            println!("{} <{}> {}", profile.user.name, profile.user.email, profile.user.role.label());
            match profile.member {
                Some(m) => println!(
                    "Member {}  {} {}  born {}  dossier {}  INE {}",
                    m.unique_id,
                    m.sector.as_str(),
                    m.level.as_str(),
                    m.dob.format("%Y-%m-%d"),
                    m.dossier_number,
                    m.ine
                ),
                None => println!("No member record linked to this account."),
            }
            println!("Contributed: {}", profile.contributed.format_with(&currency));
        }
        Command::Ask { question } => {
            let assistant = Gemini::new(config.assistant.clone());
            println!("{}", store.report(&assistant, &question).await?);
        }
        Command::Export { output } => {
            let visible = store.visible_transactions()?;
            export::export_to(&output, &visible)?;
            println!("Exported {} transactions to {}", visible.len(), output.display());
        }
    }

    Ok(())
}
