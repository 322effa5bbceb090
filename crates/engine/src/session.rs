use api_types::user::UserRow;

use crate::{Capability, EngineError, ResultEngine, UserRole, roles};

/// The logged-in user. Lives only as long as the session; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Member record this account belongs to, if any.
    pub member_id: Option<String>,
}

impl SessionUser {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.allows(capability)
    }

    pub fn require(&self, capability: Capability) -> ResultEngine<()> {
        roles::require(self.role, capability)
    }
}

impl TryFrom<UserRow> for SessionUser {
    type Error = EngineError;

    fn try_from(row: UserRow) -> ResultEngine<Self> {
        Ok(Self {
            role: UserRole::try_from(row.role.as_str())?,
            email: row.email,
            name: row.name,
            member_id: row.member_id.filter(|id| !id.is_empty()),
        })
    }
}
