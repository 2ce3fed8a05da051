use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique document identifier
pub type DocumentId = u64;

/// A single field value as it appears in input documents
///
/// Integers become long columns, floats become double columns and strings are
/// category paths (`"Author/Lisa"`) resolved against a taxonomy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Long(i64),
    Double(f64),
    Longs(Vec<i64>),
    Doubles(Vec<f64>),
    Category(String),
    Categories(Vec<String>),
}

impl FieldValue {
    /// Number of values carried by this field
    pub fn value_count(&self) -> usize {
        match self {
            FieldValue::Long(_) | FieldValue::Double(_) | FieldValue::Category(_) => 1,
            FieldValue::Longs(values) => values.len(),
            FieldValue::Doubles(values) => values.len(),
            FieldValue::Categories(values) => values.len(),
        }
    }
}

/// Document with named facetable fields
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field value, replacing any previous value
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_long(self, name: impl Into<String>, value: i64) -> Self {
        self.with_field(name, FieldValue::Long(value))
    }

    pub fn with_longs(self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.with_field(name, FieldValue::Longs(values))
    }

    pub fn with_double(self, name: impl Into<String>, value: f64) -> Self {
        self.with_field(name, FieldValue::Double(value))
    }

    pub fn with_doubles(self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.with_field(name, FieldValue::Doubles(values))
    }

    pub fn with_category(self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.with_field(name, FieldValue::Category(path.into()))
    }

    pub fn with_categories(self, name: impl Into<String>, paths: Vec<String>) -> Self {
        self.with_field(name, FieldValue::Categories(paths))
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = Document::new(7)
            .with_long("price", 10)
            .with_doubles("weights", vec![0.5, 1.5])
            .with_category("author", "Author/Lisa");

        assert_eq!(doc.field("price"), Some(&FieldValue::Long(10)));
        assert_eq!(doc.field("weights").map(FieldValue::value_count), Some(2));
        assert!(doc.field("missing").is_none());
    }

    #[test]
    fn test_field_value_json() {
        let doc: Document = serde_json::from_str(
            r#"{"id": 1, "fields": {"price": 12, "score": 0.5, "tags": [1, 2], "author": "Author/Bob"}}"#,
        )
        .unwrap();

        assert_eq!(doc.field("price"), Some(&FieldValue::Long(12)));
        assert_eq!(doc.field("score"), Some(&FieldValue::Double(0.5)));
        assert_eq!(doc.field("tags"), Some(&FieldValue::Longs(vec![1, 2])));
        assert_eq!(
            doc.field("author"),
            Some(&FieldValue::Category("Author/Bob".to_string()))
        );
    }
}
