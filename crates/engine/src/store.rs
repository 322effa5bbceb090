//! The in-memory application state and every operation that changes it.
//!
//! Mutations follow one policy: check the session capability, validate, change
//! the local collections, recompute derived metrics, then hand the write to the
//! [`Persistence`] endpoint in a background task. Local state is never rolled
//! back when that write fails; the failure is only logged. Call
//! [`Store::flush`] to wait for outstanding writes.

use std::sync::Arc;

use api_types::{
    mutation::{IdBody, Mutation},
    transaction::StatusUpdate,
    user::LoginRequest,
};
use chrono::{Datelike, Local, Utc};
use tokio::{runtime::Handle, task::JoinSet};
use uuid::Uuid;

use crate::{
    Budget, Capability, CommunityMessage, EngineError, Member, MemberSnapshot, Money,
    ResultEngine, SessionUser, Transaction, TransactionStatus, TransactionType,
    budgets::{self, BudgetTotals, default_budgets},
    categories,
    commands::{NewMember, NewTransaction},
    members::{generate_unique_id, validate_enrolment},
    metrics::{self, Stats},
    persistence::{Persistence, PersistenceError},
    report::{ReportAssistant, generate_report},
    settings::AppSettings,
    util::{normalize_optional_text, require_text},
};

/// The session member record and what they brought in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberProfile<'a> {
    pub user: &'a SessionUser,
    /// `None` when the account is not linked to a member, or the link is dangling.
    pub member: Option<&'a Member>,
    pub contributed: Money,
}

pub struct Store<P: Persistence> {
    persistence: Arc<P>,
    session: Option<SessionUser>,
    members: Vec<Member>,
    /// Newest first.
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    messages: Vec<CommunityMessage>,
    settings: AppSettings,
    stats: Stats,
    /// Year given to synthesized budget rows.
    year: i32,
    in_flight: JoinSet<()>,
}

impl<P: Persistence> Store<P> {
    /// Return a builder for `Store`.
    pub fn builder(persistence: P) -> StoreBuilder<P> {
        StoreBuilder {
            persistence: Arc::new(persistence),
            year: None,
        }
    }

    pub fn session(&self) -> Option<&SessionUser> {
        self.session.as_ref()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn budget_totals(&self) -> BudgetTotals {
        budgets::totals(&self.budgets)
    }

    pub fn messages(&self) -> &[CommunityMessage] {
        &self.messages
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Writes handed to the endpoint and not yet reaped.
    pub fn pending_sync(&self) -> usize {
        self.in_flight.len()
    }

    fn current_user(&self) -> ResultEngine<&SessionUser> {
        self.session.as_ref().ok_or(EngineError::Unauthenticated)
    }

    fn authorize(&self, capability: Capability) -> ResultEngine<&SessionUser> {
        let user = self.current_user()?;
        user.require(capability)?;
        Ok(user)
    }

    fn recompute(&mut self) {
        metrics::recompute_budgets(&mut self.budgets, &self.transactions);
        self.stats = metrics::stats(&self.transactions);
    }

    /// Fire-and-forget write.
    fn dispatch(&mut self, mutation: Mutation) {
        while let Some(done) = self.in_flight.try_join_next() {
            if let Err(err) = done {
                tracing::error!("sync task did not complete: {err}");
            }
        }

        let action = mutation.action();
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(action, "no async runtime, write dropped");
            return;
        };
        let persistence = Arc::clone(&self.persistence);
        self.in_flight.spawn_on(
            async move {
                match persistence.apply(&mutation).await {
                    Ok(()) => tracing::debug!(action, "write synced"),
                    Err(err) => tracing::warn!(action, "write failed, local state kept: {err}"),
                }
            },
            &handle,
        );
    }

    /// Waits for every outstanding write.
    pub async fn flush(&mut self) {
        while let Some(done) = self.in_flight.join_next().await {
            if let Err(err) = done {
                tracing::error!("sync task did not complete: {err}");
            }
        }
    }

    /// Checks the credentials against the endpoint and opens a session.
    ///
    /// Any failure (refused credentials, unreachable endpoint, unknown role)
    /// returns `false` and leaves no session behind.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.session = None;

        let row = match self.persistence.login(&request).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::info!(email = %request.email, "login refused");
                return false;
            }
            Err(err) => {
                tracing::warn!(email = %request.email, "login failed: {err}");
                return false;
            }
        };

        match SessionUser::try_from(row) {
            Ok(user) => {
                tracing::info!(email = %user.email, role = %user.role, "session opened");
                self.session = Some(user);
                true
            }
            Err(err) => {
                tracing::warn!(email = %request.email, "login answered an unusable user: {err}");
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.session.take() {
            tracing::info!(email = %user.email, "session closed");
        }
    }

    /// Replaces every collection with what the endpoint holds.
    ///
    /// Rows that cannot be mapped are skipped with a warning. When no budget is
    /// persisted, one zero allocation per expense category is synthesized. An
    /// empty settings row keeps the current settings.
    pub async fn refresh(&mut self) -> Result<(), PersistenceError> {
        let init = self.persistence.init().await?;

        let members: Vec<Member> = map_rows(init.members, "member");
        let transactions: Vec<Transaction> = map_rows(init.transactions, "transaction");
        let mut budgets: Vec<Budget> = map_rows(init.budgets, "budget");
        let messages: Vec<CommunityMessage> = map_rows(init.messages, "message");
        if budgets.is_empty() {
            tracing::info!(year = self.year, "no budget persisted, using defaults");
            budgets = default_budgets(self.year);
        }

        self.members = members;
        self.transactions = transactions;
        self.budgets = budgets;
        self.messages = messages;
        if let Some(settings) = AppSettings::from_row(init.settings) {
            self.settings = settings;
        }
        self.recompute();

        tracing::info!(
            members = self.members.len(),
            transactions = self.transactions.len(),
            budgets = self.budgets.len(),
            messages = self.messages.len(),
            "state loaded"
        );
        Ok(())
    }

    /// Records an income or an expense on behalf of the session user.
    ///
    /// Treasurer entries are approved at once, everybody else's wait for
    /// approval. An empty performer name defaults to the session name.
    pub fn add_transaction(&mut self, command: NewTransaction) -> ResultEngine<&Transaction> {
        let user = self.authorize(Capability::RecordTransaction)?;
        command.amount.check_entry("amount")?;
        let category = categories::resolve(command.kind, &command.category)?;

        let millis = Utc::now().timestamp_millis();
        let performed_by = normalize_optional_text(Some(&command.performer.name))
            .unwrap_or_else(|| user.name.clone());
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            kind: command.kind,
            category: category.to_string(),
            amount: command.amount,
            date: command.date,
            description: command.description.trim().to_string(),
            performed_by,
            matricule: command.performer.matricule.trim().to_string(),
            function: command.performer.function.trim().to_string(),
            receipt_number: (command.kind == TransactionType::Income)
                .then(|| format!("REC-{millis}")),
            proof_url: match command.kind {
                TransactionType::Expense => normalize_optional_text(command.proof_url.as_deref()),
                TransactionType::Income => None,
            },
            status: TransactionStatus::initial_for(user.role),
            responsible: command.responsible.trim().to_string(),
            signature: format!("SIG-{millis}"),
        };

        tracing::info!(
            id = %transaction.id,
            kind = transaction.kind.as_str(),
            status = transaction.status.as_str(),
            amount = %transaction.amount,
            "transaction recorded"
        );
        let record = transaction.to_record();
        self.transactions.insert(0, transaction);
        self.recompute();
        self.dispatch(Mutation::AddTransaction(record));
        Ok(&self.transactions[0])
    }

    pub fn approve_transaction(&mut self, id: &str) -> ResultEngine<()> {
        self.set_status(id, TransactionStatus::Approved)
    }

    pub fn reject_transaction(&mut self, id: &str) -> ResultEngine<()> {
        self.set_status(id, TransactionStatus::Rejected)
    }

    /// An unknown id is a no-op.
    fn set_status(&mut self, id: &str, target: TransactionStatus) -> ResultEngine<()> {
        self.authorize(Capability::ApproveTransaction)?;
        let Some(transaction) = self.transactions.iter_mut().find(|t| t.id == id) else {
            tracing::debug!(id, "status change on unknown transaction ignored");
            return Ok(());
        };
        transaction.status = transaction.status.transition(target)?;

        tracing::info!(id, status = target.as_str(), "transaction status changed");
        self.recompute();
        self.dispatch(Mutation::UpdateTransactionStatus(StatusUpdate {
            id: id.to_string(),
            status: target.as_str().to_string(),
        }));
        Ok(())
    }

    /// An unknown id is a no-op.
    pub fn delete_transaction(&mut self, id: &str) -> ResultEngine<()> {
        self.authorize(Capability::DeleteTransaction)?;
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            tracing::debug!(id, "delete of unknown transaction ignored");
            return Ok(());
        }

        tracing::info!(id, "transaction deleted");
        self.recompute();
        self.dispatch(Mutation::DeleteTransaction(IdBody { id: id.to_string() }));
        Ok(())
    }

    pub fn add_member(&mut self, command: NewMember) -> ResultEngine<&Member> {
        self.authorize(Capability::ManageMembers)?;
        validate_enrolment(command.sector, command.level)?;
        let first_name = require_text(&command.first_name, "first name")
            .map_err(|err| EngineError::InvalidMember(err.to_string()))?;
        let last_name = require_text(&command.last_name, "last name")
            .map_err(|err| EngineError::InvalidMember(err.to_string()))?;
        command.balance.check_entry("member balance")?;

        let member = Member {
            id: Uuid::new_v4().to_string(),
            unique_id: generate_unique_id(command.gender),
            first_name,
            last_name,
            dob: command.dob,
            sector: command.sector,
            level: command.level,
            gender: command.gender,
            dossier_number: command.dossier_number.trim().to_string(),
            ine: command.ine.trim().to_string(),
            balance: command.balance,
        };

        tracing::info!(id = %member.id, unique_id = %member.unique_id, "member added");
        let record = member.to_record();
        self.members.push(member);
        self.dispatch(Mutation::AddMember(record));
        Ok(&self.members[self.members.len() - 1])
    }

    /// Transactions and messages referring to the member are left untouched.
    pub fn delete_member(&mut self, id: &str) -> ResultEngine<()> {
        self.authorize(Capability::ManageMembers)?;
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        if self.members.len() == before {
            tracing::debug!(id, "delete of unknown member ignored");
            return Ok(());
        }

        tracing::info!(id, "member deleted");
        self.dispatch(Mutation::DeleteMember(IdBody { id: id.to_string() }));
        Ok(())
    }

    /// Sets the allocation of an existing budget row. Category and year stay.
    pub fn update_budget(&mut self, id: &str, amount: Money) -> ResultEngine<()> {
        self.authorize(Capability::ManageBudgets)?;
        amount.check_entry("allocation")?;
        let budget = self
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        budget.allocated_amount = amount;

        tracing::info!(id, category = %budget.category, %amount, "budget allocation updated");
        let upsert = budget.to_upsert();
        self.dispatch(Mutation::UpdateBudget(upsert));
        Ok(())
    }

    pub fn update_settings(&mut self, settings: AppSettings) -> ResultEngine<()> {
        self.authorize(Capability::ManageSettings)?;
        let settings = AppSettings {
            association_name: require_text(&settings.association_name, "association name")?,
            currency: require_text(&settings.currency, "currency")?,
            logo_url: settings.logo_url.trim().to_string(),
        };

        tracing::info!(name = %settings.association_name, "settings updated");
        let record = settings.to_record();
        self.settings = settings;
        self.dispatch(Mutation::UpdateSettings(record));
        Ok(())
    }

    /// Posts on the community board.
    ///
    /// When the session is linked to a known member, their current enrolment
    /// is attached to the message.
    pub fn add_message(&mut self, content: &str) -> ResultEngine<&CommunityMessage> {
        let user = self.current_user()?;
        let content = content.trim();
        if content.is_empty() {
            return Err(EngineError::InvalidMessage(
                "message must not be empty".to_string(),
            ));
        }

        let member_info = user
            .member_id
            .as_deref()
            .and_then(|id| self.member(id))
            .map(|m| MemberSnapshot {
                sector: m.sector,
                level: m.level,
            });
        let message = CommunityMessage {
            id: Uuid::new_v4().to_string(),
            user_id: user.email.clone(),
            user_name: user.name.clone(),
            user_role: user.role,
            member_info,
            content: content.to_string(),
            timestamp: Utc::now(),
        };

        tracing::info!(id = %message.id, author = %message.user_id, "message posted");
        let record = message.to_record();
        self.messages.push(message);
        self.dispatch(Mutation::AddMessage(record));
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Authors may delete their own messages, moderators any message.
    pub fn delete_message(&mut self, id: &str) -> ResultEngine<()> {
        let user = self.current_user()?;
        let Some(message) = self.messages.iter().find(|m| m.id == id) else {
            tracing::debug!(id, "delete of unknown message ignored");
            return Ok(());
        };
        if message.user_id != user.email {
            user.require(Capability::ModerateMessages)?;
        }

        tracing::info!(id, "message deleted");
        self.messages.retain(|m| m.id != id);
        self.dispatch(Mutation::DeleteMessage(IdBody { id: id.to_string() }));
        Ok(())
    }

    /// The ledger as the session may see it: everything for the board,
    /// only their own entries for members.
    pub fn visible_transactions(&self) -> ResultEngine<Vec<&Transaction>> {
        let user = self.current_user()?;
        if user.can(Capability::ViewAllTransactions) {
            return Ok(self.transactions.iter().collect());
        }
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.performed_by == user.name)
            .collect())
    }

    pub fn member_filter(&self, query: &str) -> Vec<&Member> {
        self.members.iter().filter(|m| m.matches(query)).collect()
    }

    pub fn member_profile(&self) -> ResultEngine<MemberProfile<'_>> {
        let user = self.current_user()?;
        Ok(MemberProfile {
            member: user.member_id.as_deref().and_then(|id| self.member(id)),
            contributed: metrics::contributed_by(&self.transactions, &user.name),
            user,
        })
    }

    /// Answers a free-text question about the finances. Assistant failures
    /// come back as an apology text, never as an error.
    pub async fn report<A: ReportAssistant>(
        &self,
        assistant: &A,
        query: &str,
    ) -> ResultEngine<String> {
        self.authorize(Capability::ViewReports)?;
        Ok(generate_report(assistant, &self.transactions, &self.members, query).await)
    }
}

fn map_rows<R, T>(rows: Vec<R>, kind: &'static str) -> Vec<T>
where
    T: TryFrom<R, Error = EngineError>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(kind, "skipping persisted row: {err}");
                None
            }
        })
        .collect()
}

/// The builder for `Store`
pub struct StoreBuilder<P: Persistence> {
    persistence: Arc<P>,
    year: Option<i32>,
}

impl<P: Persistence> StoreBuilder<P> {
    /// Year of synthesized budget rows. Defaults to the current local year.
    pub fn year(mut self, year: i32) -> StoreBuilder<P> {
        self.year = Some(year);
        self
    }

    /// Construct an empty `Store`. Call [`Store::refresh`] to load it.
    pub fn build(self) -> Store<P> {
        let year = self.year.unwrap_or_else(|| Local::now().year());
        let mut store = Store {
            persistence: self.persistence,
            session: None,
            members: Vec::new(),
            transactions: Vec::new(),
            budgets: default_budgets(year),
            messages: Vec::new(),
            settings: AppSettings::default(),
            stats: Stats::default(),
            year,
            in_flight: JoinSet::new(),
        };
        store.recompute();
        store
    }
}
