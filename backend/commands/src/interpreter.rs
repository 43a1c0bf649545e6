//! Deterministic application of an action to a profile document.
//!
//! Every check runs before the first write to `doc`: an `Err` always leaves
//! the document untouched.

use ambassador_core::{ProfileDocument, ProfileValue};
use indexmap::IndexMap;

use crate::schema::{is_creator_field, is_dob_field, validate_dob, ActionError};
use crate::types::{Action, ActionOutcome};

/// Apply `action` to `doc` and describe what happened.
pub fn apply(doc: &mut ProfileDocument, action: &Action) -> Result<ActionOutcome, ActionError> {
    match action {
        Action::Update { field, value } => apply_update(doc, field.trim(), value.trim()),
        Action::AddItem { field, sub_field, item } => {
            let (field, sub_field, item) = item_args(field, sub_field.as_deref(), item)?;
            apply_add(doc, field, sub_field, item)
        }
        Action::RemoveItem { field, sub_field, item } => {
            let (field, sub_field, item) = item_args(field, sub_field.as_deref(), item)?;
            apply_remove(doc, field, sub_field, item)
        }
    }
}

fn item_args<'a>(
    field: &'a str,
    sub_field: Option<&'a str>,
    item: &'a str,
) -> Result<(&'a str, Option<&'a str>, &'a str), ActionError> {
    let field = field.trim();
    if field.is_empty() {
        return Err(ActionError::EmptyField);
    }
    let item = item.trim();
    if item.is_empty() {
        return Err(ActionError::EmptyItem { field: field.to_string() });
    }
    let sub_field = sub_field.map(str::trim).filter(|s| !s.is_empty());
    Ok((field, sub_field, item))
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

fn apply_update(doc: &mut ProfileDocument, field: &str, value: &str) -> Result<ActionOutcome, ActionError> {
    if field.is_empty() {
        return Err(ActionError::EmptyField);
    }
    if is_creator_field(field) {
        return Err(ActionError::CreatorImmutable);
    }
    if value.is_empty() {
        return Err(ActionError::EmptyValue { field: field.to_string() });
    }
    if is_dob_field(field) {
        validate_dob(value)?;
    }

    let key = doc.resolve_key(field).unwrap_or(field).to_string();
    match doc.get_mut(&key) {
        Some(ProfileValue::Scalar(current)) => {
            if current == value {
                return Ok(ActionOutcome::Unchanged { field: key, value: value.to_string() });
            }
            let old = std::mem::replace(current, value.to_string());
            Ok(ActionOutcome::Updated { field: key, old, new: value.to_string() })
        }
        Some(other) => Err(ActionError::CompositeUpdate { kind: other.kind(), field: key }),
        None => {
            doc.insert(key.clone(), ProfileValue::Scalar(value.to_string()));
            Ok(ActionOutcome::FieldCreated { field: key, value: value.to_string() })
        }
    }
}

// ---------------------------------------------------------------------------
// add_item / remove_item
// ---------------------------------------------------------------------------

/// Where an item operation lands after name resolution.
enum ListTarget {
    /// Top-level list field.
    Field(String),
    /// `parent > category` inside a nested section.
    Category(String, String),
    /// Nothing matched.
    Missing,
}

fn resolve_list_target(
    doc: &ProfileDocument,
    field: &str,
    sub_field: Option<&str>,
) -> Result<ListTarget, ActionError> {
    let Some(key) = doc.resolve_key(field).map(str::to_string) else {
        if sub_field.is_none() {
            if let Some((parent, category)) = doc.resolve_category(field) {
                return Ok(ListTarget::Category(parent.to_string(), category.to_string()));
            }
        }
        return Ok(ListTarget::Missing);
    };

    match (doc.get(&key), sub_field) {
        (Some(ProfileValue::List(_)), None) => Ok(ListTarget::Field(key)),
        (Some(ProfileValue::Nested(categories)), None) => Err(ActionError::CategoryRequired {
            categories: categories.keys().cloned().collect::<Vec<_>>().join(", "),
            example: categories.keys().next().cloned().unwrap_or_else(|| "category".to_string()),
            field: key,
        }),
        (Some(ProfileValue::Nested(categories)), Some(sub)) => {
            match categories.keys().find(|k| k.eq_ignore_ascii_case(sub)) {
                Some(category) => Ok(ListTarget::Category(key.clone(), category.clone())),
                None => Ok(ListTarget::Category(key, sub.to_string())),
            }
        }
        (Some(ProfileValue::Scalar(_)), None) => Err(ActionError::NotAList { field: key }),
        (Some(_), Some(_)) => Err(ActionError::NotASection { field: key }),
        (None, _) => Ok(ListTarget::Missing),
    }
}

fn list_mut<'a>(doc: &'a mut ProfileDocument, target: &ListTarget) -> Option<&'a mut Vec<String>> {
    match target {
        ListTarget::Field(key) => match doc.get_mut(key) {
            Some(ProfileValue::List(items)) => Some(items),
            _ => None,
        },
        ListTarget::Category(parent, category) => match doc.get_mut(parent) {
            Some(ProfileValue::Nested(categories)) => categories.get_mut(category),
            _ => None,
        },
        ListTarget::Missing => None,
    }
}

fn display_target(target: &ListTarget, field: &str) -> String {
    match target {
        ListTarget::Field(key) => key.clone(),
        ListTarget::Category(parent, category) => format!("{parent} > {category}"),
        ListTarget::Missing => field.to_string(),
    }
}

fn same_item(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn apply_add(
    doc: &mut ProfileDocument,
    field: &str,
    sub_field: Option<&str>,
    item: &str,
) -> Result<ActionOutcome, ActionError> {
    let target = resolve_list_target(doc, field, sub_field)?;
    let name = display_target(&target, field);

    if let ListTarget::Missing = target {
        let value = match sub_field {
            Some(sub) => {
                let mut categories = IndexMap::new();
                categories.insert(sub.to_string(), vec![item.to_string()]);
                ProfileValue::Nested(categories)
            }
            None => ProfileValue::List(vec![item.to_string()]),
        };
        doc.insert(field, value);
        let target = match sub_field {
            Some(sub) => format!("{field} > {sub}"),
            None => field.to_string(),
        };
        return Ok(ActionOutcome::SectionCreated { target, item: item.to_string() });
    }

    if let ListTarget::Category(parent, category) = &target {
        let exists = matches!(
            doc.get(parent),
            Some(ProfileValue::Nested(categories)) if categories.contains_key(category)
        );
        if !exists {
            if let Some(ProfileValue::Nested(categories)) = doc.get_mut(parent) {
                categories.insert(category.clone(), vec![item.to_string()]);
            }
            return Ok(ActionOutcome::SectionCreated { target: name, item: item.to_string() });
        }
    }

    let Some(items) = list_mut(doc, &target) else {
        return Err(ActionError::NotAList { field: name });
    };
    if let Some(existing) = items.iter().find(|i| same_item(i, item)) {
        return Ok(ActionOutcome::AlreadyPresent { target: name, item: existing.clone() });
    }
    items.push(item.to_string());
    Ok(ActionOutcome::ItemAdded { target: name, item: item.to_string() })
}

fn apply_remove(
    doc: &mut ProfileDocument,
    field: &str,
    sub_field: Option<&str>,
    item: &str,
) -> Result<ActionOutcome, ActionError> {
    let target = resolve_list_target(doc, field, sub_field)?;
    let name = display_target(&target, field);

    let Some(items) = list_mut(doc, &target) else {
        return Ok(ActionOutcome::NothingToRemove { target: name });
    };
    match items.iter().position(|i| same_item(i, item)) {
        Some(index) => {
            let removed = items.remove(index);
            Ok(ActionOutcome::ItemRemoved { target: name, item: removed })
        }
        None => Ok(ActionOutcome::ItemNotFound { target: name, item: item.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> ProfileDocument {
        ProfileDocument::default_for("Shreyash")
    }

    fn update(field: &str, value: &str) -> Action {
        Action::Update { field: field.into(), value: value.into() }
    }

    fn add(field: &str, sub: Option<&str>, item: &str) -> Action {
        Action::AddItem { field: field.into(), sub_field: sub.map(Into::into), item: item.into() }
    }

    fn remove(field: &str, sub: Option<&str>, item: &str) -> Action {
        Action::RemoveItem { field: field.into(), sub_field: sub.map(Into::into), item: item.into() }
    }

    fn list<'a>(doc: &'a ProfileDocument, key: &str) -> &'a [String] {
        doc.get(key).and_then(ProfileValue::as_list).unwrap()
    }

    #[test]
    fn scalar_update_reports_old_value() {
        let mut d = doc();
        d.insert("Occupation", ProfileValue::Scalar("student".into()));
        let outcome = apply(&mut d, &update("Occupation", "Software Engineer")).unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Updated {
                field: "Occupation".into(),
                old: "student".into(),
                new: "Software Engineer".into(),
            }
        );
        assert_eq!(d.get("Occupation").and_then(ProfileValue::as_scalar), Some("Software Engineer"));
    }

    #[test]
    fn update_matches_existing_key_case_insensitively() {
        let mut d = doc();
        let before = d.len();
        apply(&mut d, &update("name", "X")).unwrap();
        assert_eq!(d.get("Name").and_then(ProfileValue::as_scalar), Some("X"));
        assert!(!d.contains_key("name"));
        assert_eq!(d.len(), before);
    }

    #[test]
    fn update_creates_missing_field() {
        let mut d = doc();
        let outcome = apply(&mut d, &update("City", "Pune")).unwrap();
        assert_eq!(outcome, ActionOutcome::FieldCreated { field: "City".into(), value: "Pune".into() });
        assert_eq!(d.iter().last().map(|(k, _)| k.as_str()), Some("City"));
    }

    #[test]
    fn update_with_same_value_is_unchanged() {
        let mut d = doc();
        let outcome = apply(&mut d, &update("Name", "Shreyash")).unwrap();
        assert!(!outcome.is_mutation());
    }

    #[test]
    fn creator_is_immutable_in_any_casing() {
        for field in ["Creator", "creator", "CREATOR", " cReAtOr "] {
            let mut d = doc();
            let before = d.clone();
            assert_eq!(apply(&mut d, &update(field, "Mallory")), Err(ActionError::CreatorImmutable));
            assert_eq!(d, before);
        }
    }

    #[test]
    fn composite_fields_reject_update() {
        let mut d = doc();
        let before = d.clone();
        assert!(matches!(
            apply(&mut d, &update("Hobbies", "running")),
            Err(ActionError::CompositeUpdate { kind: "list", .. })
        ));
        assert!(matches!(
            apply(&mut d, &update("skills", "everything")),
            Err(ActionError::CompositeUpdate { kind: "section", .. })
        ));
        assert_eq!(d, before);
    }

    #[test]
    fn dob_must_be_a_calendar_date() {
        let mut d = doc();
        let before = d.clone();
        assert!(matches!(apply(&mut d, &update("DOB", "13/40/2020")), Err(ActionError::InvalidDate { .. })));
        assert_eq!(d, before);

        let outcome = apply(&mut d, &update("dob", "02/05/2005")).unwrap();
        assert_eq!(outcome, ActionOutcome::FieldCreated { field: "dob".into(), value: "02/05/2005".into() });
        apply(&mut d, &update("DOB", "03/06/2005")).unwrap();
        assert_eq!(d.get("dob").and_then(ProfileValue::as_scalar), Some("03/06/2005"));
    }

    #[test]
    fn add_and_duplicate_add() {
        let mut d = doc();
        let outcome = apply(&mut d, &add("hobbies", None, "cycling")).unwrap();
        assert_eq!(outcome, ActionOutcome::ItemAdded { target: "Hobbies".into(), item: "cycling".into() });

        let snapshot = d.clone();
        let outcome = apply(&mut d, &add("Hobbies", None, "CYCLING")).unwrap();
        assert_eq!(outcome, ActionOutcome::AlreadyPresent { target: "Hobbies".into(), item: "cycling".into() });
        assert!(!outcome.is_mutation());
        assert_eq!(d, snapshot);
    }

    #[test]
    fn add_to_missing_field_creates_list() {
        let mut d = doc();
        let outcome = apply(&mut d, &add("Interests", None, "astronomy")).unwrap();
        assert_eq!(outcome, ActionOutcome::SectionCreated { target: "Interests".into(), item: "astronomy".into() });
        assert_eq!(list(&d, "Interests"), ["astronomy".to_string()]);
    }

    #[test]
    fn add_to_scalar_is_rejected() {
        let mut d = doc();
        assert!(matches!(apply(&mut d, &add("Name", None, "x")), Err(ActionError::NotAList { .. })));
    }

    #[test]
    fn add_to_section_requires_category() {
        let mut d = doc();
        let err = apply(&mut d, &add("Skills", None, "Rust")).unwrap_err();
        assert!(matches!(err, ActionError::CategoryRequired { .. }));
        assert!(err.to_string().contains("Skills/coding language"));
    }

    #[test]
    fn add_with_category() {
        let mut d = doc();
        let outcome = apply(&mut d, &add("skills", Some("LIBRARIES"), "Polars")).unwrap();
        assert_eq!(outcome, ActionOutcome::ItemAdded { target: "Skills > Libraries".into(), item: "Polars".into() });

        let outcome = apply(&mut d, &add("Skills", Some("Tools"), "git")).unwrap();
        assert_eq!(outcome, ActionOutcome::SectionCreated { target: "Skills > Tools".into(), item: "git".into() });

        let outcome = apply(&mut d, &add("Projects", Some("2024"), "chatbot")).unwrap();
        assert_eq!(outcome, ActionOutcome::SectionCreated { target: "Projects > 2024".into(), item: "chatbot".into() });
        assert!(matches!(d.get("Projects"), Some(ProfileValue::Nested(_))));
    }

    #[test]
    fn category_named_directly_resolves_inside_section() {
        let mut d = doc();
        let outcome = apply(&mut d, &add("Coding Language", None, "Rust")).unwrap();
        assert_eq!(outcome, ActionOutcome::ItemAdded { target: "Skills > coding language".into(), item: "Rust".into() });
    }

    #[test]
    fn category_on_list_is_rejected() {
        let mut d = doc();
        assert!(matches!(
            apply(&mut d, &add("Hobbies", Some("outdoor"), "hiking")),
            Err(ActionError::NotASection { .. })
        ));
    }

    #[test]
    fn remove_present_and_absent() {
        let mut d = doc();
        let outcome = apply(&mut d, &remove("hobbies", None, "Skating")).unwrap();
        assert_eq!(outcome, ActionOutcome::ItemRemoved { target: "Hobbies".into(), item: "skating".into() });
        assert!(!list(&d, "Hobbies").contains(&"skating".to_string()));

        let snapshot = d.clone();
        let outcome = apply(&mut d, &remove("Hobbies", None, "skating")).unwrap();
        assert_eq!(outcome, ActionOutcome::ItemNotFound { target: "Hobbies".into(), item: "skating".into() });
        assert_eq!(d, snapshot);
    }

    #[test]
    fn remove_from_missing_field_is_noop() {
        let mut d = doc();
        let snapshot = d.clone();
        let outcome = apply(&mut d, &remove("Pets", None, "cat")).unwrap();
        assert_eq!(outcome, ActionOutcome::NothingToRemove { target: "Pets".into() });
        let outcome = apply(&mut d, &remove("Skills", Some("Frameworks"), "Django")).unwrap();
        assert_eq!(outcome, ActionOutcome::NothingToRemove { target: "Skills > Frameworks".into() });
        assert_eq!(d, snapshot);
    }

    #[test]
    fn remove_from_category() {
        let mut d = doc();
        let outcome = apply(&mut d, &remove("Skills", Some("languages"), "little bit german")).unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::ItemRemoved { target: "Skills > languages".into(), item: "little bit German".into() }
        );
    }

    #[test]
    fn empty_arguments_are_rejected() {
        let mut d = doc();
        assert_eq!(apply(&mut d, &update("  ", "x")), Err(ActionError::EmptyField));
        assert!(matches!(apply(&mut d, &update("Name", " ")), Err(ActionError::EmptyValue { .. })));
        assert!(matches!(apply(&mut d, &add("Hobbies", None, "")), Err(ActionError::EmptyItem { .. })));
    }
}
