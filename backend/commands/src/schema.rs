//! Action schema: decoding model output and the validation rules every
//! action passes before it may touch the profile.
//!
//! Field names coming from the model are untrusted input; nothing here
//! assumes they match an existing key or carry a sane value.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use ambassador_core::CREATOR_FIELD;

use crate::types::{Action, ActionKind};

/// Field name that carries the date-of-birth check.
pub const DOB_FIELD: &str = "DOB";

static DOB_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*(.*?)\s*```$").unwrap());

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Why an action was rejected before any mutation happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Sorry, the 'Creator' field cannot be changed directly for security reasons.")]
    CreatorImmutable,

    #[error("'{field}' is a {kind}; use 'add ITEM to {field}' or 'remove ITEM from {field}' instead of replacing it.")]
    CompositeUpdate { field: String, kind: &'static str },

    #[error("Cannot add to or remove from '{field}': it is not a list. Try 'update my info: {field} to [new value]' to change its value.")]
    NotAList { field: String },

    #[error("'{field}' is a section with categories ({categories}); say which one, e.g. '{field}/{example}'.")]
    CategoryRequired { field: String, categories: String, example: String },

    #[error("'{field}' has no categories; target '{field}' directly.")]
    NotASection { field: String },

    #[error("'{value}' is not a valid date of birth; please use MM/DD/YYYY, for example 02/05/2005.")]
    InvalidDate { value: String },

    #[error("Please say which field to change.")]
    EmptyField,

    #[error("Please give the new value for '{field}'.")]
    EmptyValue { field: String },

    #[error("Please say which item to use for '{field}'.")]
    EmptyItem { field: String },

    #[error("I couldn't understand that {kind} request: {reason}.")]
    Malformed { kind: &'static str, reason: String },
}

pub fn is_creator_field(field: &str) -> bool {
    field.trim().eq_ignore_ascii_case(CREATOR_FIELD)
}

pub fn is_dob_field(field: &str) -> bool {
    field.trim().eq_ignore_ascii_case(DOB_FIELD)
}

/// `MM/DD/YYYY` and a real calendar date.
pub fn validate_dob(value: &str) -> Result<(), ActionError> {
    let value = value.trim();
    let valid = DOB_PATTERN.is_match(value) && NaiveDate::parse_from_str(value, "%m/%d/%Y").is_ok();
    if valid {
        Ok(())
    } else {
        Err(ActionError::InvalidDate { value: value.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Model output decoding
// ---------------------------------------------------------------------------

/// What the external model produced for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// Natural language for the user.
    Text(String),
    /// A well-formed action.
    Action(Action),
    /// A recognized `action` key with an unusable payload.
    Invalid(ActionError),
}

/// Decode model output. Non-JSON, non-object JSON, or JSON without a
/// recognized `action` key is ordinary text.
pub fn decode_model_output(raw: &str) -> ModelOutput {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    if !body.starts_with('{') {
        return ModelOutput::Text(raw.to_string());
    }
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) else {
        return ModelOutput::Text(raw.to_string());
    };
    let Some(kind) = obj.get("action").and_then(Value::as_str).and_then(ActionKind::from_wire) else {
        return ModelOutput::Text(raw.to_string());
    };

    match decode_action(kind, &obj) {
        Ok(action) => ModelOutput::Action(action),
        Err(reason) => ModelOutput::Invalid(ActionError::Malformed { kind: kind.verb(), reason }),
    }
}

fn decode_action(kind: ActionKind, obj: &serde_json::Map<String, Value>) -> Result<Action, String> {
    let field = text_field(obj, "field")?.ok_or("no field was named")?;
    match kind {
        ActionKind::Update => {
            let value = text_field(obj, "value")?.ok_or("no new value was given")?;
            Ok(Action::Update { field, value })
        }
        ActionKind::AddItem | ActionKind::RemoveItem => {
            let item = text_field(obj, "item")?.ok_or("no item was given")?;
            let sub_field = text_field(obj, "sub_field")?.filter(|s| !s.trim().is_empty());
            Ok(match kind {
                ActionKind::AddItem => Action::AddItem { field, sub_field, item },
                _ => Action::RemoveItem { field, sub_field, item },
            })
        }
    }
}

/// Strings pass through; numbers and booleans are stringified; null or
/// absent is `None`; anything else is an error.
fn text_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(format!("'{key}' must be plain text")),
    }
}
