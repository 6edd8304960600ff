//! The classifier catalog and column-bound classifier instances.

use std::collections::BTreeMap;

use phonenumber::country;
use serde::Serialize;

use crate::dataset::Column;
use crate::operations::Operation;

use super::comparator::{ComparatorKind, ComparatorSpec};
use super::id::{ClassifierId, DatasetType};
use super::name::parse_full_name;
use super::transforms;

/// Normalization strategy applied to a classifier's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Full person name, split into first/last columns instead of transformed.
    FullName,
    /// A single name component.
    Name,
    Email,
    Phone,
    Url,
    CompanyName,
    Social,
    Role,
}

/// A classifier variant: metadata plus its normalization strategy.
#[derive(Debug, Clone, Serialize)]
pub struct Classifier {
    /// Namespaced identifier.
    pub id: ClassifierId,
    /// Description of the columns this classifier recognizes, used when
    /// asking the suggestion generator for classifications.
    pub situation: &'static str,
    /// What applying the classifier does to a column.
    pub description: &'static str,
    /// Dataset types this classifier applies to.
    pub allowed_dataset_types: &'static [DatasetType],
    /// Normalization strategy.
    pub kind: ValueKind,
    /// Comparison used by the probabilistic matcher, if any.
    pub comparator: Option<ComparatorKind>,
}

impl Classifier {
    /// Whether the classifier applies to the given dataset type.
    pub fn allows(&self, dataset_type: DatasetType) -> bool {
        self.allowed_dataset_types.contains(&dataset_type)
    }
}

const PERSON: &[DatasetType] = &[DatasetType::Person];
const COMPANY: &[DatasetType] = &[DatasetType::Company];

/// The built-in classifier catalog.
const STANDARD_CLASSIFIERS: &[Classifier] = &[
    Classifier {
        id: ClassifierId::PersonName,
        situation: "Is a full name of a person. For example - Albert Einstein. URLs are not names.",
        description: "Splits full names into separate first and last name columns",
        allowed_dataset_types: PERSON,
        kind: ValueKind::FullName,
        comparator: None,
    },
    Classifier {
        id: ClassifierId::PersonFirstName,
        situation: "Is a first name of a person",
        description: "Standardizes first names by trimming whitespace and proper casing",
        allowed_dataset_types: PERSON,
        kind: ValueKind::Name,
        comparator: Some(ComparatorKind::Name),
    },
    Classifier {
        id: ClassifierId::PersonLastName,
        situation: "Is a last name of a person",
        description: "Standardizes last names by trimming whitespace and proper casing",
        allowed_dataset_types: PERSON,
        kind: ValueKind::Name,
        comparator: Some(ComparatorKind::Name),
    },
    Classifier {
        id: ClassifierId::PersonEmail,
        situation: "Is a valid email address, usually containing an '@' symbol",
        description: "Standardizes email addresses by converting to lowercase and trimming whitespace",
        allowed_dataset_types: PERSON,
        kind: ValueKind::Email,
        comparator: Some(ComparatorKind::Email),
    },
    Classifier {
        id: ClassifierId::PersonPhone,
        situation: "Is a mobile, landline, or other phone number of a person",
        description: "Formats phone numbers into standardized E.164 format (+12345678900)",
        allowed_dataset_types: PERSON,
        kind: ValueKind::Phone,
        comparator: Some(ComparatorKind::ExactTermFrequency),
    },
    Classifier {
        id: ClassifierId::PersonRole,
        situation: "Is a job title or role of a person, such as 'CEO' or 'Sales Manager'",
        description: "Tidies job titles by collapsing whitespace",
        allowed_dataset_types: PERSON,
        kind: ValueKind::Role,
        comparator: None,
    },
    Classifier {
        id: ClassifierId::PersonSocial,
        situation: "Is a social media handle or profile URL of a person, such as '@janedoe' or 'linkedin.com/in/janedoe'",
        description: "Lowercases handles and normalizes profile URLs",
        allowed_dataset_types: PERSON,
        kind: ValueKind::Social,
        comparator: Some(ComparatorKind::Exact),
    },
    Classifier {
        id: ClassifierId::PersonWebsite,
        situation: "Is a personal website or homepage URL of a person",
        description: "Adds a missing https:// scheme and removes trailing slashes",
        allowed_dataset_types: PERSON,
        kind: ValueKind::Url,
        comparator: Some(ComparatorKind::Url),
    },
    Classifier {
        id: ClassifierId::CompanyName,
        situation: "Is the name of a company or organization, such as 'Acme Inc.'",
        description: "Removes legal suffixes such as Inc, LLC or Ltd from company names",
        allowed_dataset_types: COMPANY,
        kind: ValueKind::CompanyName,
        comparator: Some(ComparatorKind::Name),
    },
    Classifier {
        id: ClassifierId::CompanyEmail,
        situation: "Is a valid email address of a company, usually containing an '@' symbol and having a prefix like 'info@', 'contact@', 'support@', etc.",
        description: "Standardizes email addresses by converting to lowercase and trimming whitespace",
        allowed_dataset_types: COMPANY,
        kind: ValueKind::Email,
        comparator: Some(ComparatorKind::Email),
    },
    Classifier {
        id: ClassifierId::CompanyPhone,
        situation: "Is a phone number of a company, usually containing extensions like 'ext. 1234' or 'x1234'",
        description: "Formats phone numbers into standardized E.164 format (+12345678900)",
        allowed_dataset_types: COMPANY,
        kind: ValueKind::Phone,
        comparator: Some(ComparatorKind::ExactTermFrequency),
    },
    Classifier {
        id: ClassifierId::CompanySocial,
        situation: "Is a social media handle or profile URL of a company, such as '@acme' or 'linkedin.com/company/acme'",
        description: "Lowercases handles and normalizes profile URLs",
        allowed_dataset_types: COMPANY,
        kind: ValueKind::Social,
        comparator: Some(ComparatorKind::Exact),
    },
    Classifier {
        id: ClassifierId::CompanyWebsite,
        situation: "Is the website or domain of a company, such as 'acme.com' or 'https://www.acme.com'",
        description: "Adds a missing https:// scheme and removes trailing slashes",
        allowed_dataset_types: COMPANY,
        kind: ValueKind::Url,
        comparator: Some(ComparatorKind::Url),
    },
];

/// Configuration for the classifier registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Region assumed for phone numbers written without a country code.
    pub default_phone_region: country::Id,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_phone_region: country::Id::US,
        }
    }
}

impl RegistryConfig {
    /// Set the default phone region.
    pub fn with_default_phone_region(mut self, region: country::Id) -> Self {
        self.default_phone_region = region;
        self
    }
}

/// Immutable catalog of classifiers, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct ClassifierRegistry {
    classifiers: BTreeMap<ClassifierId, Classifier>,
    config: RegistryConfig,
}

impl ClassifierRegistry {
    /// Create a registry with the standard classifiers.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with the standard classifiers and custom configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        let classifiers = STANDARD_CLASSIFIERS
            .iter()
            .map(|c| (c.id, c.clone()))
            .collect();
        Self { classifiers, config }
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Get a classifier by id.
    pub fn get(&self, id: ClassifierId) -> Option<&Classifier> {
        self.classifiers.get(&id)
    }

    /// Resolve a classification name and bind it to a column.
    pub fn lookup(&self, classification: &str, column_id: &str) -> Option<BoundClassifier<'_>> {
        let id = classification.parse::<ClassifierId>().ok()?;
        self.bind(id, column_id)
    }

    /// Bind a known classifier id to a column.
    pub fn bind(&self, id: ClassifierId, column_id: &str) -> Option<BoundClassifier<'_>> {
        let classifier = self.classifiers.get(&id)?;
        Some(BoundClassifier {
            registry: self,
            classifier,
            column_id: column_id.to_string(),
        })
    }

    /// Whether the registry knows a classification name.
    pub fn contains(&self, classification: &str) -> bool {
        classification
            .parse::<ClassifierId>()
            .is_ok_and(|id| self.classifiers.contains_key(&id))
    }

    /// All classifiers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Classifier> {
        self.classifiers.values()
    }

    /// Classifiers offered for a dataset type.
    pub fn for_dataset_type(&self, dataset_type: DatasetType) -> impl Iterator<Item = &Classifier> {
        self.classifiers
            .values()
            .filter(move |c| c.allows(dataset_type))
    }

    /// Whether a column with this classification is pre-selected for deduplication.
    pub fn is_default_deduplication(
        &self,
        classification: Option<ClassifierId>,
        dataset_type: Option<DatasetType>,
    ) -> bool {
        match (classification.and_then(|id| self.get(id)), dataset_type) {
            (Some(classifier), Some(dataset_type)) => classifier.allows(dataset_type),
            _ => false,
        }
    }

    /// Apply a value strategy to a single value.
    fn transform_value(&self, kind: ValueKind, value: &str) -> String {
        match kind {
            ValueKind::FullName => value.to_string(),
            ValueKind::Name => transforms::title_case_name(value),
            ValueKind::Email => transforms::normalize_email(value),
            ValueKind::Phone => {
                transforms::normalize_phone(value, self.config.default_phone_region)
            }
            ValueKind::Url => transforms::normalize_url(value),
            ValueKind::CompanyName => transforms::normalize_company_name(value),
            ValueKind::Social => transforms::normalize_social(value),
            ValueKind::Role => transforms::normalize_role(value),
        }
    }
}

impl Default for ClassifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// What classifying a column does to the dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Set the classification and replace the column's values.
    InPlace(Vec<Option<String>>),
    /// Apply these structural edits instead.
    Derived(Vec<Operation>),
}

/// A classifier bound to one column.
#[derive(Debug, Clone)]
pub struct BoundClassifier<'r> {
    registry: &'r ClassifierRegistry,
    classifier: &'r Classifier,
    column_id: String,
}

impl<'r> BoundClassifier<'r> {
    pub fn id(&self) -> ClassifierId {
        self.classifier.id
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn situation(&self) -> &'static str {
        self.classifier.situation
    }

    pub fn allowed_dataset_types(&self) -> &'static [DatasetType] {
        self.classifier.allowed_dataset_types
    }

    /// The underlying classifier record.
    pub fn classifier(&self) -> &'r Classifier {
        self.classifier
    }

    /// Normalize a single value.
    pub fn transform(&self, value: &str) -> String {
        self.registry.transform_value(self.classifier.kind, value)
    }

    /// Normalize every non-null, non-empty value of a column.
    pub fn transform_values(&self, values: &[Option<String>]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|value| match value {
                Some(v) if !v.is_empty() => Some(self.transform(v)),
                other => other.clone(),
            })
            .collect()
    }

    /// Comparator bound to this column, if the classifier has one.
    pub fn comparator_spec(&self) -> Option<ComparatorSpec> {
        self.classifier
            .comparator
            .map(|kind| ComparatorSpec::new(self.column_id.clone(), kind))
    }

    /// Structural edits that replace an in-place transform.
    pub fn derived_operations(&self, column: &Column) -> Vec<Operation> {
        match self.classifier.kind {
            ValueKind::FullName => split_name_operations(&self.column_id, column),
            _ => Vec::new(),
        }
    }

    /// Decide how classifying the column changes the dataset.
    pub fn classify(&self, column: &Column) -> Classification {
        let derived = self.derived_operations(column);
        if derived.is_empty() {
            Classification::InPlace(self.transform_values(&column.values))
        } else {
            Classification::Derived(derived)
        }
    }
}

/// Replace a full-name column with first/last name columns.
fn split_name_operations(column_id: &str, column: &Column) -> Vec<Operation> {
    let (first_names, last_names): (Vec<_>, Vec<_>) = column
        .values
        .iter()
        .map(|value| match value {
            Some(v) => {
                let parsed = parse_full_name(v);
                (Some(parsed.first), Some(parsed.last))
            }
            None => (None, None),
        })
        .unzip();

    vec![
        Operation::AddColumn {
            label: "First Name".to_string(),
            values: first_names,
            classification: Some(ClassifierId::PersonFirstName),
        },
        Operation::AddColumn {
            label: "Last Name".to_string(),
            values: last_names,
            classification: Some(ClassifierId::PersonLastName),
        },
        Operation::RemoveColumn {
            column_id: column_id.to_string(),
        },
    ]
}
