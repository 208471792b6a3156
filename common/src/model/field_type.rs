use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of input a field definition renders and the rule its answers obey.
///
/// Stored in the database as its upper-case tag (`"TEXT"`, `"EMAIL"`, ...), which
/// is also the serde representation sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Text,
    Email,
    Checkbox,
    Radio,
    Dropdown,
    File,
    Date,
    Time,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Dropdown,
        FieldType::File,
        FieldType::Date,
        FieldType::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Email => "EMAIL",
            FieldType::Checkbox => "CHECKBOX",
            FieldType::Radio => "RADIO",
            FieldType::Dropdown => "DROPDOWN",
            FieldType::File => "FILE",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
        }
    }

    /// Choice-based fields own options and store their answers as option links.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Checkbox | FieldType::Radio | FieldType::Dropdown
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or submitted tag names no known field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldType(pub String);

impl fmt::Display for UnknownFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field type: {}", self.0)
    }
}

impl std::error::Error for UnknownFieldType {}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|field_type| field_type.as_str() == tag)
            .ok_or_else(|| UnknownFieldType(tag.to_string()))
    }
}
