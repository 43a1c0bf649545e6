/// Profile-mutation action types.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A structured mutation intent against the profile document.
///
/// Produced by the text grammar or decoded from the model's JSON output;
/// both paths end up in the same `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Update {
        field: String,
        value: String,
    },
    AddItem {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sub_field: Option<String>,
        item: String,
    },
    RemoveItem {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sub_field: Option<String>,
        item: String,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Update { .. } => ActionKind::Update,
            Action::AddItem { .. } => ActionKind::AddItem,
            Action::RemoveItem { .. } => ActionKind::RemoveItem,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Action::Update { field, .. }
            | Action::AddItem { field, .. }
            | Action::RemoveItem { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Update,
    AddItem,
    RemoveItem,
}

impl ActionKind {
    /// Wire name, as used in the model's `action` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Update => "update",
            ActionKind::AddItem => "add_item",
            ActionKind::RemoveItem => "remove_item",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "update" => Some(ActionKind::Update),
            "add_item" => Some(ActionKind::AddItem),
            "remove_item" => Some(ActionKind::RemoveItem),
            _ => None,
        }
    }

    /// Verb used in refusal messages.
    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Update => "update",
            ActionKind::AddItem => "add",
            ActionKind::RemoveItem => "remove",
        }
    }
}

// ---------------------------------------------------------------------------
// Text commands
// ---------------------------------------------------------------------------

/// A mutation command that matched the grammar but is missing a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandUsage {
    pub kind: ActionKind,
    pub hint: &'static str,
}

pub type ParsedAction = Result<Action, CommandUsage>;

/// A chat message recognized by the explicit text grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    /// `I am <creator> <password>`
    Login { password: String },
    /// `I am <creator>` without a password.
    LoginUsage,
    Logout,
    Help,
    Mutation(ParsedAction),
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of applying a valid action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Updated { field: String, old: String, new: String },
    Unchanged { field: String, value: String },
    FieldCreated { field: String, value: String },
    ItemAdded { target: String, item: String },
    SectionCreated { target: String, item: String },
    AlreadyPresent { target: String, item: String },
    ItemRemoved { target: String, item: String },
    ItemNotFound { target: String, item: String },
    NothingToRemove { target: String },
}

impl ActionOutcome {
    /// Whether the document changed and has to be written.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Updated { .. }
                | ActionOutcome::FieldCreated { .. }
                | ActionOutcome::ItemAdded { .. }
                | ActionOutcome::SectionCreated { .. }
                | ActionOutcome::ItemRemoved { .. }
        )
    }

    /// Field or `Parent > Category` path the outcome refers to.
    pub fn target(&self) -> &str {
        match self {
            ActionOutcome::Updated { field, .. }
            | ActionOutcome::Unchanged { field, .. }
            | ActionOutcome::FieldCreated { field, .. } => field,
            ActionOutcome::ItemAdded { target, .. }
            | ActionOutcome::SectionCreated { target, .. }
            | ActionOutcome::AlreadyPresent { target, .. }
            | ActionOutcome::ItemRemoved { target, .. }
            | ActionOutcome::ItemNotFound { target, .. }
            | ActionOutcome::NothingToRemove { target } => target,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ActionOutcome::Updated { field, old, new } => {
                format!("Changed '{field}' from '{old}' to '{new}'.")
            }
            ActionOutcome::Unchanged { field, value } => {
                format!("'{field}' is already '{value}'.")
            }
            ActionOutcome::FieldCreated { field, value } => {
                format!("Added new information: '{field}' as '{value}'.")
            }
            ActionOutcome::ItemAdded { target, item } => format!("Added '{item}' to '{target}'."),
            ActionOutcome::SectionCreated { target, item } => {
                format!("Created new section '{target}' and added '{item}'.")
            }
            ActionOutcome::AlreadyPresent { target, item } => {
                format!("'{item}' is already in '{target}'.")
            }
            ActionOutcome::ItemRemoved { target, item } => {
                format!("Removed '{item}' from '{target}'.")
            }
            ActionOutcome::ItemNotFound { target, item } => {
                format!("'{item}' is not found in '{target}'.")
            }
            ActionOutcome::NothingToRemove { target } => {
                format!("There is no '{target}' section, so there is nothing to remove.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_format() {
        let action = Action::AddItem {
            field: "Skills".into(),
            sub_field: Some("Libraries".into()),
            item: "Polars".into(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "add_item", "field": "Skills", "sub_field": "Libraries", "item": "Polars"})
        );

        let update: Action =
            serde_json::from_str(r#"{"action":"update","field":"Name","value":"Shrey"}"#).unwrap();
        assert_eq!(update.kind(), ActionKind::Update);
        assert_eq!(update.field(), "Name");
    }

    #[test]
    fn informational_outcomes_do_not_mutate() {
        let dup = ActionOutcome::AlreadyPresent { target: "Hobbies".into(), item: "chess".into() };
        assert!(!dup.is_mutation());
        assert_eq!(dup.describe(), "'chess' is already in 'Hobbies'.");
        assert!(ActionOutcome::ItemRemoved { target: "Hobbies".into(), item: "chess".into() }.is_mutation());
    }
}
