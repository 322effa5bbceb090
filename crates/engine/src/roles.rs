//! Roles of the association board and the capabilities they grant.
//!
//! Every store mutator consults [`UserRole::allows`] instead of trusting the
//! caller to hide actions a role may not perform.

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserRole {
    President,
    Treasurer,
    Member,
}

impl UserRole {
    /// Returns the canonical role string stored by the persistence endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::President => "PRESIDENT",
            Self::Treasurer => "TRESORIER",
            Self::Member => "MEMBRE",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::President => "Président",
            Self::Treasurer => "Trésorier",
            Self::Member => "Membre",
        }
    }

    /// Board roles approve transactions, moderate and administer the portal.
    pub fn is_board(self) -> bool {
        matches!(self, Self::President | Self::Treasurer)
    }

    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::RecordTransaction => true,
            Capability::ApproveTransaction
            | Capability::DeleteTransaction
            | Capability::ManageMembers
            | Capability::ManageBudgets
            | Capability::ManageSettings
            | Capability::ModerateMessages
            | Capability::ViewReports
            | Capability::ViewAllTransactions => self.is_board(),
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "PRESIDENT" => Ok(Self::President),
            "TRESORIER" => Ok(Self::Treasurer),
            "MEMBRE" => Ok(Self::Member),
            other => Err(EngineError::InvalidRole(format!("invalid user role: {other}"))),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a session may or may not be allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    RecordTransaction,
    ApproveTransaction,
    DeleteTransaction,
    ManageMembers,
    ManageBudgets,
    ManageSettings,
    ModerateMessages,
    ViewReports,
    ViewAllTransactions,
}

impl Capability {
    pub fn describe(self) -> &'static str {
        match self {
            Self::RecordTransaction => "record transactions",
            Self::ApproveTransaction => "approve or reject transactions",
            Self::DeleteTransaction => "delete transactions",
            Self::ManageMembers => "manage members",
            Self::ManageBudgets => "manage budgets",
            Self::ManageSettings => "manage settings",
            Self::ModerateMessages => "moderate messages",
            Self::ViewReports => "query financial reports",
            Self::ViewAllTransactions => "view the whole ledger",
        }
    }
}

/// Fails with [`EngineError::Forbidden`] when `role` lacks `capability`.
pub fn require(role: UserRole, capability: Capability) -> Result<(), EngineError> {
    if role.allows(capability) {
        return Ok(());
    }
    Err(EngineError::Forbidden(format!(
        "{} may not {}",
        role.label(),
        capability.describe()
    )))
}
