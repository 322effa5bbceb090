use api_types::settings::{SettingsRecord, SettingsRow};

use crate::util::normalize_optional_text;

const DEFAULT_ASSOCIATION_NAME: &str = "A.E.U.C.A.B.DK";
const DEFAULT_CURRENCY: &str = "FCFA";

/// Portal-wide settings. There is always exactly one active instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppSettings {
    pub association_name: String,
    /// Display label appended to amounts.
    pub currency: String,
    pub logo_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            association_name: DEFAULT_ASSOCIATION_NAME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            logo_url: String::new(),
        }
    }
}

impl AppSettings {
    /// Settings from the persisted row, or `None` when the table is still empty.
    pub fn from_row(row: SettingsRow) -> Option<Self> {
        let association_name = normalize_optional_text(row.association_name.as_deref())?;
        Some(Self {
            association_name,
            currency: normalize_optional_text(row.currency.as_deref())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            logo_url: row.logo_url.unwrap_or_default(),
        })
    }

    pub fn to_record(&self) -> SettingsRecord {
        SettingsRecord {
            association_name: self.association_name.clone(),
            currency: self.currency.clone(),
            logo_url: self.logo_url.clone(),
        }
    }
}
