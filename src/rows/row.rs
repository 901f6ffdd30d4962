use serde::{Deserialize, Serialize};

use super::identity::RowId;

/// Editable content of a row: everything except identity and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContent {
    pub key: String,
    pub value: String,
    pub enabled: bool,
    pub category: Option<String>,
    pub private: bool,
}

impl Default for RowContent {
    fn default() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
            enabled: true,
            category: None,
            private: false,
        }
    }
}

impl RowContent {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A real member of a `RowCollection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowData {
    pub id: RowId,
    pub order: usize,
    pub enabled: bool,
    pub category: Option<String>,
    pub key: String,
    pub value: String,
    pub private: bool,
}

impl RowData {
    pub fn new(content: RowContent, order: usize) -> Self {
        Self::with_id(RowId::fresh(), content, order)
    }

    pub fn with_id(id: RowId, content: RowContent, order: usize) -> Self {
        Self {
            id,
            order,
            enabled: content.enabled,
            category: content.category,
            key: content.key,
            value: content.value,
            private: content.private,
        }
    }

    pub fn content(&self) -> RowContent {
        RowContent {
            key: self.key.clone(),
            value: self.value.clone(),
            enabled: self.enabled,
            category: self.category.clone(),
            private: self.private,
        }
    }

    /// Replace everything but identity and position.
    pub fn replace_content(&mut self, content: RowContent) {
        self.enabled = content.enabled;
        self.category = content.category;
        self.key = content.key;
        self.value = content.value;
        self.private = content.private;
    }

    /// Value as it should be shown: masked when the row is private.
    pub fn display_value(&self) -> String {
        if self.private {
            "•".repeat(self.value.chars().count().clamp(1, 8))
        } else {
            self.value.clone()
        }
    }

    /// The persisted shape of this row, without identity.
    pub fn to_entry(&self) -> FlatEntry {
        FlatEntry {
            order: self.order,
            enabled: self.enabled,
            category: self.category.clone(),
            key: self.key.clone(),
            value: self.value.clone(),
            private: self.private,
        }
    }
}

/// A row as rendered: the real rows followed by one trailing placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Real(RowData),
    /// The blank row after the last real row. Has no identity; editing it
    /// always creates a new row.
    Placeholder,
}

impl Row {
    pub fn as_real(&self) -> Option<&RowData> {
        match self {
            Row::Real(data) => Some(data),
            Row::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Row::Placeholder)
    }
}

/// Where an edit is aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Row(usize),
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusField {
    Key,
    Value,
}

/// Which input should take focus right after a row is (re)built.
///
/// Handed out once by the collection and then forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusIntent {
    pub row: RowId,
    pub field: FocusField,
}

/// Persisted row: a `RowData` stripped of its session identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub order: usize,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub private: bool,
}

impl FlatEntry {
    pub fn content(&self) -> RowContent {
        RowContent {
            key: self.key.clone(),
            value: self.value.clone(),
            enabled: self.enabled,
            category: self.category.clone(),
            private: self.private,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_strips_identity() {
        let row = RowData::new(RowContent::new("Accept", "*/*"), 3);
        let entry = row.to_entry();
        assert_eq!(entry.order, 3);
        assert_eq!(entry.key, "Accept");
        assert_eq!(entry.content(), row.content());
    }

    #[test]
    fn test_private_value_is_masked_for_display_only() {
        let mut content = RowContent::new("token", "supersecret");
        content.private = true;
        let row = RowData::new(content, 0);
        assert_eq!(row.display_value(), "••••••••");
        assert_eq!(row.to_entry().value, "supersecret");
    }

    #[test]
    fn test_private_empty_value_still_masked() {
        let mut content = RowContent::new("token", "");
        content.private = true;
        assert_eq!(RowData::new(content, 0).display_value(), "•");
    }

    #[test]
    fn test_entry_json_omits_missing_category() {
        let entry = RowData::new(RowContent::new("q", "1"), 0).to_entry();
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("category"));
        let back: FlatEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
