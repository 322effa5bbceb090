//! Wire contract of the persistence endpoint.
//!
//! Every operation is selected by the `action` query parameter. Rows returned by
//! `init` use the relational column names (snake_case), while request bodies use
//! the camelCase attribute names of the domain records; the endpoint translates
//! on write.

use serde::{Deserialize, Serialize};

/// Lenient decoders for numeric columns.
///
/// Relational `numeric` columns come back as JSON strings (`"5000.00"`), serial
/// ids as numbers. Both shapes are accepted.
pub mod numeric {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(0.0),
            Some(NumberOrText::Number(number)) => number
                .as_f64()
                .ok_or_else(|| D::Error::custom("number out of range")),
            Some(NumberOrText::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("invalid numeric value: {text}")))
            }
        }
    }

    pub fn i32_lenient<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64_lenient(deserializer)?;
        if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
            return Err(D::Error::custom(format!("invalid integer value: {value}")));
        }
        Ok(value as i32)
    }

    pub fn string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(number) => Ok(number.to_string()),
            NumberOrText::Text(text) => Ok(text),
        }
    }
}

/// Body of any error answer (`{ "error": "..." }`).
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Acknowledgement returned by every write action.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
}

pub mod member {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MemberRow {
        #[serde(deserialize_with = "numeric::string_lenient")]
        pub id: String,
        pub unique_id: String,
        pub first_name: String,
        pub last_name: String,
        #[serde(default)]
        pub dob: String,
        pub sector: String,
        pub level: String,
        pub gender: String,
        #[serde(default)]
        pub dossier_number: String,
        #[serde(default)]
        pub ine: String,
        #[serde(default, deserialize_with = "numeric::f64_lenient")]
        pub balance: f64,
    }

    /// Full member record sent by `add_member`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MemberRecord {
        pub id: String,
        pub unique_id: String,
        pub first_name: String,
        pub last_name: String,
        pub dob: String,
        pub sector: String,
        pub level: String,
        pub gender: String,
        pub dossier_number: String,
        pub ine: String,
        pub balance: f64,
    }

    /// Snapshot of the sender's enrolment attached to a community message.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MemberInfo {
        pub sector: String,
        pub level: String,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionRow {
        #[serde(deserialize_with = "numeric::string_lenient")]
        pub id: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub category: String,
        #[serde(deserialize_with = "numeric::f64_lenient")]
        pub amount: f64,
        pub date: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub performed_by: String,
        #[serde(default)]
        pub matricule: String,
        #[serde(default)]
        pub function: String,
        #[serde(default)]
        pub receipt_number: Option<String>,
        #[serde(default)]
        pub proof_url: Option<String>,
        pub status: String,
        #[serde(default)]
        pub responsible: String,
        #[serde(default)]
        pub signature: String,
    }

    /// Full transaction record sent by `add_transaction`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionRecord {
        pub id: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub category: String,
        pub amount: f64,
        pub date: String,
        pub description: String,
        pub performed_by: String,
        pub matricule: String,
        pub function: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub receipt_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub proof_url: Option<String>,
        pub status: String,
        pub responsible: String,
        pub signature: String,
    }

    /// Body of `update_transaction_status`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub id: String,
        pub status: String,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BudgetRow {
        #[serde(deserialize_with = "numeric::string_lenient")]
        pub id: String,
        pub category: String,
        #[serde(default, deserialize_with = "numeric::f64_lenient")]
        pub allocated_amount: f64,
        #[serde(deserialize_with = "numeric::i32_lenient")]
        pub year: i32,
    }

    /// Body of `update_budget`, an upsert keyed by `id`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BudgetUpsert {
        pub id: String,
        pub amount: f64,
        pub category: String,
        pub year: i32,
    }
}

pub mod message {
    use super::*;
    use crate::member::MemberInfo;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MessageRow {
        #[serde(deserialize_with = "numeric::string_lenient")]
        pub id: String,
        pub user_id: String,
        pub user_name: String,
        pub user_role: String,
        /// JSON-encoded [`MemberInfo`], `null` when the author is not a member.
        #[serde(default)]
        pub member_info_json: Option<String>,
        pub content: String,
        pub timestamp: String,
    }

    impl MessageRow {
        /// Decodes the embedded member snapshot.
        ///
        /// The column may hold the JSON literal `null` or be absent altogether.
        pub fn member_info(&self) -> Result<Option<MemberInfo>, serde_json::Error> {
            match self.member_info_json.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(raw) => serde_json::from_str(raw),
            }
        }
    }

    /// Full message record sent by `add_message`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRecord {
        pub id: String,
        pub user_id: String,
        pub user_name: String,
        pub user_role: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub member_info: Option<MemberInfo>,
        pub content: String,
        pub timestamp: String,
    }
}

pub mod settings {
    use super::*;

    /// The singleton settings row. Empty object when the table has no row.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct SettingsRow {
        #[serde(default)]
        pub association_name: Option<String>,
        #[serde(default)]
        pub currency: Option<String>,
        #[serde(default)]
        pub logo_url: Option<String>,
    }

    /// Body of `update_settings`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SettingsRecord {
        pub association_name: String,
        pub currency: String,
        pub logo_url: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserRow {
        pub email: String,
        pub name: String,
        pub role: String,
        #[serde(default, deserialize_with = "optional_id")]
        pub member_id: Option<String>,
    }

    fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(deserialize_with = "numeric::string_lenient")] String);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct LoginResponse {
        #[serde(default)]
        pub success: bool,
        #[serde(default)]
        pub user: Option<UserRow>,
    }
}

pub mod init {
    use super::*;
    use crate::{
        budget::BudgetRow, member::MemberRow, message::MessageRow, settings::SettingsRow,
        transaction::TransactionRow,
    };

    /// Answer of the `init` action: every collection in one payload.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct InitResponse {
        pub members: Vec<MemberRow>,
        pub transactions: Vec<TransactionRow>,
        pub budgets: Vec<BudgetRow>,
        pub messages: Vec<MessageRow>,
        pub settings: SettingsRow,
    }
}

pub mod mutation {
    use super::*;
    use crate::{
        budget::BudgetUpsert, member::MemberRecord, message::MessageRecord,
        settings::SettingsRecord,
        transaction::{StatusUpdate, TransactionRecord},
    };

    /// Action names understood by the endpoint.
    pub const INIT: &str = "init";
    pub const LOGIN: &str = "login";

    /// Body of every delete action.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct IdBody {
        pub id: String,
    }

    /// A write request. Serializes as its bare body; the variant picks the action.
    #[derive(Clone, Debug, PartialEq, Serialize)]
    #[serde(untagged)]
    pub enum Mutation {
        AddTransaction(TransactionRecord),
        UpdateTransactionStatus(StatusUpdate),
        DeleteTransaction(IdBody),
        AddMember(MemberRecord),
        DeleteMember(IdBody),
        AddMessage(MessageRecord),
        DeleteMessage(IdBody),
        UpdateBudget(BudgetUpsert),
        UpdateSettings(SettingsRecord),
    }

    impl Mutation {
        pub fn action(&self) -> &'static str {
            match self {
                Self::AddTransaction(_) => "add_transaction",
                Self::UpdateTransactionStatus(_) => "update_transaction_status",
                Self::DeleteTransaction(_) => "delete_transaction",
                Self::AddMember(_) => "add_member",
                Self::DeleteMember(_) => "delete_member",
                Self::AddMessage(_) => "add_message",
                Self::DeleteMessage(_) => "delete_message",
                Self::UpdateBudget(_) => "update_budget",
                Self::UpdateSettings(_) => "update_settings",
            }
        }
    }
}
