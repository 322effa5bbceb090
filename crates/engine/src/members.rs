//! Association members.
//!
//! Every member carries a human readable `unique_id` made of a gender prefix
//! (`A` for `M`, `B` for `F`) followed by an 11-digit numeral. It is generated
//! once at creation and never reassigned.

use api_types::member::{MemberInfo, MemberRecord, MemberRow};
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

use crate::{EngineError, Money, ResultEngine, util::normalize_key, util::parse_day};

const UNIQUE_ID_DIGITS: usize = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    pub fn unique_id_prefix(self) -> char {
        match self {
            Self::Male => 'A',
            Self::Female => 'B',
        }
    }
}

impl TryFrom<&str> for Gender {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            other => Err(EngineError::InvalidMember(format!("invalid gender: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Sector {
    #[serde(rename = "INFORMATIQUE DE GESTION")]
    ComputerScience,
    #[serde(rename = "ADMINISTRATION")]
    Administration,
    #[serde(rename = "ELECTROMECANIQUE")]
    Electromechanics,
    #[serde(rename = "ANNEE PREPARATOIRE")]
    Preparatory,
}

impl Sector {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ComputerScience => "INFORMATIQUE DE GESTION",
            Self::Administration => "ADMINISTRATION",
            Self::Electromechanics => "ELECTROMECANIQUE",
            Self::Preparatory => "ANNEE PREPARATOIRE",
        }
    }
}

impl TryFrom<&str> for Sector {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "INFORMATIQUE DE GESTION" => Ok(Self::ComputerScience),
            "ADMINISTRATION" => Ok(Self::Administration),
            "ELECTROMECANIQUE" => Ok(Self::Electromechanics),
            "ANNEE PREPARATOIRE" => Ok(Self::Preparatory),
            other => Err(EngineError::InvalidMember(format!("invalid sector: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Level {
    L1,
    L2,
    L3,
    /// Preparatory year.
    AP,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::AP => "AP",
        }
    }
}

impl TryFrom<&str> for Level {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "L1" => Ok(Self::L1),
            "L2" => Ok(Self::L2),
            "L3" => Ok(Self::L3),
            "AP" => Ok(Self::AP),
            other => Err(EngineError::InvalidMember(format!("invalid level: {other}"))),
        }
    }
}

/// The preparatory sector only has the `AP` level, and `AP` only exists there.
pub fn validate_enrolment(sector: Sector, level: Level) -> ResultEngine<()> {
    let preparatory = sector == Sector::Preparatory;
    if preparatory != (level == Level::AP) {
        return Err(EngineError::InvalidMember(format!(
            "level {} does not exist in sector {}",
            level.as_str(),
            sector.as_str()
        )));
    }
    Ok(())
}

/// Draws a fresh unique id for a member of the given gender.
pub fn generate_unique_id(gender: Gender) -> String {
    let suffix: u64 = rand::rng().random_range(10_000_000_000..100_000_000_000);
    format!("{}{suffix}", gender.unique_id_prefix())
}

/// Checks the `A|B` + 11 digits shape, with the prefix matching `gender`.
pub fn is_valid_unique_id(unique_id: &str, gender: Gender) -> bool {
    let mut chars = unique_id.chars();
    chars.next() == Some(gender.unique_id_prefix())
        && chars.as_str().len() == UNIQUE_ID_DIGITS
        && chars.all(|c| c.is_ascii_digit())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub unique_id: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub sector: Sector,
    pub level: Level,
    pub gender: Gender,
    pub dossier_number: String,
    /// National student identifier.
    pub ine: String,
    pub balance: Money,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Search used by the member directory: first or last name containing
    /// `query` (case and accent insensitive), or unique id containing it.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let key = normalize_key(query);
        normalize_key(&self.first_name).contains(&key)
            || normalize_key(&self.last_name).contains(&key)
            || self.unique_id.contains(query)
    }

    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            sector: self.sector.as_str().to_string(),
            level: self.level.as_str().to_string(),
        }
    }

    pub fn to_record(&self) -> MemberRecord {
        MemberRecord {
            id: self.id.clone(),
            unique_id: self.unique_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            dob: self.dob.format("%Y-%m-%d").to_string(),
            sector: self.sector.as_str().to_string(),
            level: self.level.as_str().to_string(),
            gender: self.gender.as_str().to_string(),
            dossier_number: self.dossier_number.clone(),
            ine: self.ine.clone(),
            balance: self.balance.to_major(),
        }
    }
}

impl TryFrom<MemberRow> for Member {
    type Error = EngineError;

    fn try_from(row: MemberRow) -> ResultEngine<Self> {
        Ok(Self {
            dob: parse_day(&row.dob, "date of birth")?,
            sector: Sector::try_from(row.sector.as_str())?,
            level: Level::try_from(row.level.as_str())?,
            gender: Gender::try_from(row.gender.as_str())?,
            balance: Money::from_major(row.balance)?,
            id: row.id,
            unique_id: row.unique_id,
            first_name: row.first_name,
            last_name: row.last_name,
            dossier_number: row.dossier_number,
            ine: row.ine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(first: &str, last: &str, unique_id: &str) -> Member {
        Member {
            id: "m1".to_string(),
            unique_id: unique_id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            dob: NaiveDate::from_ymd_opt(2003, 5, 17).unwrap(),
            sector: Sector::Administration,
            level: Level::L2,
            gender: Gender::Female,
            dossier_number: "D-2024-001".to_string(),
            ine: "N00112233".to_string(),
            balance: Money::ZERO,
        }
    }

    #[test]
    fn unique_id_has_gender_prefix_and_eleven_digits() {
        for _ in 0..200 {
            let male = generate_unique_id(Gender::Male);
            assert!(male.starts_with('A'));
            assert_eq!(male.len(), 12);
            assert!(is_valid_unique_id(&male, Gender::Male));

            let female = generate_unique_id(Gender::Female);
            assert!(female.starts_with('B'));
            assert!(is_valid_unique_id(&female, Gender::Female));
            assert!(!is_valid_unique_id(&female, Gender::Male));
        }
    }

    #[test]
    fn preparatory_sector_requires_ap_level() {
        assert!(validate_enrolment(Sector::Preparatory, Level::AP).is_ok());
        assert!(validate_enrolment(Sector::Preparatory, Level::L1).is_err());
        assert!(validate_enrolment(Sector::Administration, Level::AP).is_err());
        assert!(validate_enrolment(Sector::ComputerScience, Level::L3).is_ok());
    }

    #[test]
    fn directory_search_ignores_case_and_accents() {
        let m = member("Aïcha", "Koné", "B12345678901");
        assert!(m.matches("aicha"));
        assert!(m.matches("KONE"));
        assert!(m.matches("4567"));
        assert!(m.matches(""));
        assert!(!m.matches("traore"));
    }

    #[test]
    fn row_with_numeric_string_balance_maps() {
        let row = MemberRow {
            id: "7".to_string(),
            unique_id: "A10000000001".to_string(),
            first_name: "Moussa".to_string(),
            last_name: "Diallo".to_string(),
            dob: "2002-01-09".to_string(),
            sector: "ANNEE PREPARATOIRE".to_string(),
            level: "AP".to_string(),
            gender: "M".to_string(),
            dossier_number: "D1".to_string(),
            ine: "I1".to_string(),
            balance: 2500.5,
        };
        let m = Member::try_from(row).unwrap();
        assert_eq!(m.balance, Money::new(250_050));
        assert_eq!(m.sector, Sector::Preparatory);
        assert_eq!(m.to_record().dob, "2002-01-09");
    }
}
