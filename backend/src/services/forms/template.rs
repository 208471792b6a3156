//! The fixed set of fields every new form starts with.

use form_common::model::field_type::FieldType;
use form_common::model::form::{FieldDefinition, FieldOption};
use uuid::Uuid;

pub struct TemplateField {
    pub text: &'static str,
    pub field_type: FieldType,
    pub options: &'static [&'static str],
}

pub const FORM_TEMPLATE: [TemplateField; 8] = [
    TemplateField {
        text: "Name",
        field_type: FieldType::Text,
        options: &[],
    },
    TemplateField {
        text: "Email",
        field_type: FieldType::Email,
        options: &[],
    },
    TemplateField {
        text: "Occupation",
        field_type: FieldType::Checkbox,
        options: &["Programmer", "Designer", "Other"],
    },
    TemplateField {
        text: "Gender",
        field_type: FieldType::Radio,
        options: &["Male", "Female", "Other"],
    },
    TemplateField {
        text: "Country",
        field_type: FieldType::Dropdown,
        options: &["USA", "Canada", "Mexico"],
    },
    TemplateField {
        text: "File",
        field_type: FieldType::File,
        options: &[],
    },
    TemplateField {
        text: "Date of Birth",
        field_type: FieldType::Date,
        options: &[],
    },
    TemplateField {
        text: "Time of Arrival",
        field_type: FieldType::Time,
        options: &[],
    },
];

/// Field definitions (with fresh ids) for a new form.
pub fn instantiate(form_id: &str) -> Vec<FieldDefinition> {
    FORM_TEMPLATE
        .iter()
        .enumerate()
        .map(|(position, template)| {
            let field_id = Uuid::new_v4().to_string();
            let options = template
                .options
                .iter()
                .enumerate()
                .map(|(option_position, text)| FieldOption {
                    id: Uuid::new_v4().to_string(),
                    field_id: field_id.clone(),
                    position: option_position as i64,
                    text: text.to_string(),
                })
                .collect();
            FieldDefinition {
                id: field_id,
                form_id: form_id.to_string(),
                position: position as i64,
                text: template.text.to_string(),
                field_type: template.field_type,
                options,
            }
        })
        .collect()
}
