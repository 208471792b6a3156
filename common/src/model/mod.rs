pub mod answer;
pub mod field_type;
pub mod form;
