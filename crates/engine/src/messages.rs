//! Community board messages. Immutable once posted, except for deletion.

use api_types::message::{MessageRecord, MessageRow};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{EngineError, Level, ResultEngine, Sector, UserRole, util::parse_timestamp};

/// Enrolment of the author at the time the message was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub sector: Sector,
    pub level: Level,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommunityMessage {
    pub id: String,
    /// Author email.
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub member_info: Option<MemberSnapshot>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl CommunityMessage {
    pub fn to_record(&self) -> MessageRecord {
        MessageRecord {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            user_role: self.user_role.as_str().to_string(),
            member_info: self.member_info.map(|info| api_types::member::MemberInfo {
                sector: info.sector.as_str().to_string(),
                level: info.level.as_str().to_string(),
            }),
            content: self.content.clone(),
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl TryFrom<MessageRow> for CommunityMessage {
    type Error = EngineError;

    fn try_from(row: MessageRow) -> ResultEngine<Self> {
        // An unreadable snapshot only loses the badge, not the message.
        let member_info = match row.member_info() {
            Ok(Some(info)) => match (
                Sector::try_from(info.sector.as_str()),
                Level::try_from(info.level.as_str()),
            ) {
                (Ok(sector), Ok(level)) => Some(MemberSnapshot { sector, level }),
                _ => None,
            },
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(message_id = %row.id, "ignoring member info: {err}");
                None
            }
        };

        Ok(Self {
            user_role: UserRole::try_from(row.user_role.as_str())?,
            timestamp: parse_timestamp(&row.timestamp)?,
            member_info,
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            content: row.content,
        })
    }
}
