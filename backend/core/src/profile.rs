//! The creator profile document.
//!
//! A semi-structured, ordered mapping of field name to value. Field names keep
//! the casing they were written with but are matched case-insensitively. Key
//! order matters: resolution always picks the first match in iteration order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The field that pins a document to its owner. Never mutable through actions.
pub const CREATOR_FIELD: &str = "Creator";

/// A single profile value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    /// Plain text, e.g. `Name` or `DOB`.
    Scalar(String),
    /// Flat list, e.g. `Hobbies`.
    List(Vec<String>),
    /// Category → list, e.g. `Skills`.
    Nested(IndexMap<String, Vec<String>>),
}

impl ProfileValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ProfileValue::Scalar(_) => "text",
            ProfileValue::List(_) => "list",
            ProfileValue::Nested(_) => "section",
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ProfileValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ProfileValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// The profile document describing the creator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileDocument {
    fields: IndexMap<String, ProfileValue>,
}

impl ProfileDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in document used whenever the persisted one is unusable.
    pub fn default_for(creator: &str) -> Self {
        let mut doc = Self::new();
        doc.insert(CREATOR_FIELD, ProfileValue::Scalar(creator.to_string()));
        doc.insert("Name", ProfileValue::Scalar(creator.to_string()));
        doc.insert(
            "Occupation",
            ProfileValue::Scalar(
                "student pursuing bachelor of technology in the field of artificial intelligence and machine learning"
                    .to_string(),
            ),
        );

        let mut skills = IndexMap::new();
        skills.insert("coding language".to_string(), strings(&["python", "C++"]));
        skills.insert(
            "Concepts".to_string(),
            strings(&[
                "Data Structures",
                "data preprocessing",
                "data visualization",
                "machine learning",
                "deep learning",
                "model building",
            ]),
        );
        skills.insert(
            "Libraries".to_string(),
            strings(&[
                "Numpy",
                "Pandas",
                "Matplotlib",
                "Seaborn",
                "SciKitLearn",
                "Tensorflow",
                "Keras",
            ]),
        );
        skills.insert(
            "languages".to_string(),
            strings(&["Hindi", "English", "little bit German"]),
        );
        doc.insert("Skills", ProfileValue::Nested(skills));

        doc.insert(
            "Hobbies",
            ProfileValue::List(strings(&[
                "swimming",
                "play football",
                "sketching",
                "painting",
                "skating",
            ])),
        );
        doc
    }

    /// Resolve a requested field name to the stored key.
    ///
    /// Case-insensitive; the first match in iteration order wins.
    pub fn resolve_key(&self, requested: &str) -> Option<&str> {
        let requested = requested.trim();
        self.fields
            .keys()
            .find(|k| k.eq_ignore_ascii_case(requested))
            .map(String::as_str)
    }

    /// Find a nested category by name across all nested sections.
    ///
    /// Returns `(parent key, category key)` for the first match in iteration
    /// order. Two parents holding the same category name resolve to the first.
    pub fn resolve_category(&self, requested: &str) -> Option<(&str, &str)> {
        let requested = requested.trim();
        self.fields.iter().find_map(|(parent, value)| match value {
            ProfileValue::Nested(categories) => categories
                .keys()
                .find(|k| k.eq_ignore_ascii_case(requested))
                .map(|k| (parent.as_str(), k.as_str())),
            _ => None,
        })
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ProfileValue> {
        self.fields.get_mut(key)
    }

    /// Insert or replace a field, keeping its position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: ProfileValue) -> Option<ProfileValue> {
        self.fields.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProfileValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value of the `Creator` field, if it is a scalar.
    pub fn creator(&self) -> Option<&str> {
        self.fields.get(CREATOR_FIELD).and_then(ProfileValue::as_scalar)
    }

    /// Force the `Creator` field to the given identity.
    pub fn set_creator(&mut self, creator: &str) {
        self.fields.insert(
            CREATOR_FIELD.to_string(),
            ProfileValue::Scalar(creator.to_string()),
        );
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_is_owned_by_creator() {
        let doc = ProfileDocument::default_for("Shreyash");
        assert_eq!(doc.creator(), Some("Shreyash"));
        let keys: Vec<&String> = doc.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Creator", "Name", "Occupation", "Skills", "Hobbies"]);
    }

    #[test]
    fn resolve_key_ignores_case() {
        let doc = ProfileDocument::default_for("Shreyash");
        assert_eq!(doc.resolve_key("hobbies"), Some("Hobbies"));
        assert_eq!(doc.resolve_key("  NAME "), Some("Name"));
        assert_eq!(doc.resolve_key("email"), None);
    }

    #[test]
    fn resolve_category_takes_first_parent() {
        let mut doc = ProfileDocument::new();
        let mut a = IndexMap::new();
        a.insert("Tools".to_string(), vec!["git".to_string()]);
        let mut b = IndexMap::new();
        b.insert("tools".to_string(), vec!["hammer".to_string()]);
        doc.insert("Work", ProfileValue::Nested(a));
        doc.insert("Home", ProfileValue::Nested(b));

        assert_eq!(doc.resolve_category("TOOLS"), Some(("Work", "Tools")));
    }

    #[test]
    fn deserializes_all_value_kinds() {
        let raw = r#"{
            "Creator": "Shreyash",
            "Hobbies": ["chess"],
            "Skills": {"Libraries": ["Numpy"]}
        }"#;
        let doc: ProfileDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.get("Creator"), Some(&ProfileValue::Scalar("Shreyash".into())));
        assert_eq!(doc.get("Hobbies").and_then(ProfileValue::as_list), Some(&["chess".to_string()][..]));
        assert!(matches!(doc.get("Skills"), Some(ProfileValue::Nested(_))));
    }

    #[test]
    fn rejects_unsupported_values() {
        let raw = r#"{"Creator": "Shreyash", "Age": 21}"#;
        assert!(serde_json::from_str::<ProfileDocument>(raw).is_err());
    }
}
