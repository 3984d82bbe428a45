use std::collections::HashMap;
use serde::Serialize;

/// One `label: value` segment of an option string, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub label: String,
    pub value: String,
}

/// An option string split into display entries and a normalized lookup index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOption {
    pub display: Vec<OptionEntry>,
    pub lookup: HashMap<String, String>,
}

impl ParsedOption {
    /// Value for an exact display label.
    pub fn display_value(&self, label: &str) -> Option<&str> {
        self.display
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.value.as_str())
    }

    /// Value for an already-normalized lookup key.
    pub fn lookup_value(&self, key: &str) -> Option<&str> {
        self.lookup.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}

/// The option values the report cares about, resolved through label aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionFields {
    pub departure: String,
    #[serde(rename = "return")]
    pub return_date: String,
    pub return_checkbox: String,
    pub damage_checkbox: String,
    pub detail_confirmation: String,
    pub product_choice: String,
}
