//! Classifier identifiers and dataset types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level domain of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetType {
    /// Records describe individual people.
    Person,
    /// Records describe organizations.
    Company,
}

impl DatasetType {
    /// All dataset types.
    pub const ALL: [DatasetType; 2] = [DatasetType::Person, DatasetType::Company];

    /// Wire name of the dataset type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Person => "PERSON",
            DatasetType::Company => "COMPANY",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERSON" => Ok(DatasetType::Person),
            "COMPANY" => Ok(DatasetType::Company),
            other => Err(format!("Invalid dataset type: {}", other)),
        }
    }
}

/// Namespaced identifier of a classifier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassifierId {
    #[serde(rename = "person:name")]
    PersonName,
    #[serde(rename = "person:first_name")]
    PersonFirstName,
    #[serde(rename = "person:last_name")]
    PersonLastName,
    #[serde(rename = "person:email")]
    PersonEmail,
    #[serde(rename = "person:phone")]
    PersonPhone,
    #[serde(rename = "person:role")]
    PersonRole,
    #[serde(rename = "person:social")]
    PersonSocial,
    #[serde(rename = "person:website")]
    PersonWebsite,
    #[serde(rename = "company:name")]
    CompanyName,
    #[serde(rename = "company:email")]
    CompanyEmail,
    #[serde(rename = "company:phone")]
    CompanyPhone,
    #[serde(rename = "company:social")]
    CompanySocial,
    #[serde(rename = "company:website")]
    CompanyWebsite,
}

impl ClassifierId {
    /// Every classifier id, persons first.
    pub const ALL: [ClassifierId; 13] = [
        ClassifierId::PersonName,
        ClassifierId::PersonFirstName,
        ClassifierId::PersonLastName,
        ClassifierId::PersonEmail,
        ClassifierId::PersonPhone,
        ClassifierId::PersonRole,
        ClassifierId::PersonSocial,
        ClassifierId::PersonWebsite,
        ClassifierId::CompanyName,
        ClassifierId::CompanyEmail,
        ClassifierId::CompanyPhone,
        ClassifierId::CompanySocial,
        ClassifierId::CompanyWebsite,
    ];

    /// Wire name, e.g. `person:first_name`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierId::PersonName => "person:name",
            ClassifierId::PersonFirstName => "person:first_name",
            ClassifierId::PersonLastName => "person:last_name",
            ClassifierId::PersonEmail => "person:email",
            ClassifierId::PersonPhone => "person:phone",
            ClassifierId::PersonRole => "person:role",
            ClassifierId::PersonSocial => "person:social",
            ClassifierId::PersonWebsite => "person:website",
            ClassifierId::CompanyName => "company:name",
            ClassifierId::CompanyEmail => "company:email",
            ClassifierId::CompanyPhone => "company:phone",
            ClassifierId::CompanySocial => "company:social",
            ClassifierId::CompanyWebsite => "company:website",
        }
    }

    /// The dataset type whose namespace this id lives in.
    pub fn namespace(&self) -> DatasetType {
        if self.as_str().starts_with("person:") {
            DatasetType::Person
        } else {
            DatasetType::Company
        }
    }
}

impl fmt::Display for ClassifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassifierId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}
