/// Text command detection: the explicit chat grammar.
///
/// Recognized forms (prefixes are case-insensitive, everything the user typed
/// for fields and items keeps its casing):
///
/// - `I am <creator> <password>` / `logout` / `help`
/// - `update my info: FIELD to VALUE`
/// - `add ITEM to FIELD` / `add ITEM to FIELD/CATEGORY`
/// - `remove ITEM from FIELD` / `remove ITEM from FIELD/CATEGORY`
///
/// Anything else is ordinary conversation and goes to the model.
use crate::types::{Action, ActionKind, CommandUsage, ParsedAction, TextCommand};

const UPDATE_PREFIX: &str = "update my info:";
const ADD_PREFIX: &str = "add ";
const REMOVE_PREFIX: &str = "remove ";
const LOGIN_PREFIX: &str = "i am ";

/// Detect an explicit command. Returns `None` for a normal message.
pub fn detect_command(text: &str, creator_name: &str) -> Option<TextCommand> {
    let trimmed = text.trim();

    if trimmed.eq_ignore_ascii_case("logout") {
        return Some(TextCommand::Logout);
    }
    if trimmed.eq_ignore_ascii_case("help") || trimmed.eq_ignore_ascii_case("/help") {
        return Some(TextCommand::Help);
    }
    if let Some(rest) = strip_prefix_ci(trimmed, LOGIN_PREFIX) {
        return detect_login(rest, creator_name);
    }
    if let Some(rest) = strip_prefix_ci(trimmed, UPDATE_PREFIX) {
        return Some(TextCommand::Mutation(parse_update(rest)));
    }
    if let Some(rest) = strip_prefix_ci(trimmed, ADD_PREFIX) {
        let (item, target) = rsplit_once_ci(rest, " to ")?;
        return Some(TextCommand::Mutation(parse_item_command(ActionKind::AddItem, item, target)));
    }
    if let Some(rest) = strip_prefix_ci(trimmed, REMOVE_PREFIX) {
        let (item, target) = rsplit_once_ci(rest, " from ")?;
        return Some(TextCommand::Mutation(parse_item_command(ActionKind::RemoveItem, item, target)));
    }
    None
}

fn detect_login(rest: &str, creator_name: &str) -> Option<TextCommand> {
    let rest = rest.trim_start();
    let name = strip_prefix_ci(rest, creator_name)?;
    // "I am Shreyash's friend" is conversation, not a login.
    if !name.is_empty() && !name.starts_with(char::is_whitespace) {
        return None;
    }
    let password = name.trim();
    if password.is_empty() {
        Some(TextCommand::LoginUsage)
    } else {
        Some(TextCommand::Login { password: password.to_string() })
    }
}

fn parse_update(rest: &str) -> ParsedAction {
    let usage = CommandUsage {
        kind: ActionKind::Update,
        hint: "Please specify what you'd like to update using 'update my info: [field] to [new value]'. For example: 'update my info: Occupation to Software Engineer'.",
    };
    let (field, value) = split_once_ci(rest, " to ").ok_or(usage)?;
    let (field, value) = (field.trim(), value.trim());
    if field.is_empty() || value.is_empty() {
        return Err(usage);
    }
    Ok(Action::Update { field: field.to_string(), value: value.to_string() })
}

fn parse_item_command(kind: ActionKind, item: &str, target: &str) -> ParsedAction {
    let (missing_item, missing_target) = match kind {
        ActionKind::AddItem => (
            "Please specify what you want to add. Example: 'add cycling to hobbies'.",
            "Please specify which section you want to add to. Example: 'add cycling to hobbies'.",
        ),
        _ => (
            "Please specify what you want to remove. Example: 'remove cycling from hobbies'.",
            "Please specify which section you want to remove from. Example: 'remove cycling from hobbies'.",
        ),
    };

    let item = item.trim();
    if item.is_empty() {
        return Err(CommandUsage { kind, hint: missing_item });
    }
    let (field, sub_field) = match target.split_once('/') {
        Some((field, sub)) => (field.trim(), Some(sub.trim()).filter(|s| !s.is_empty())),
        None => (target.trim(), None),
    };
    if field.is_empty() {
        return Err(CommandUsage { kind, hint: missing_target });
    }

    let field = field.to_string();
    let sub_field = sub_field.map(str::to_string);
    let item = item.to_string();
    Ok(match kind {
        ActionKind::AddItem => Action::AddItem { field, sub_field, item },
        _ => Action::RemoveItem { field, sub_field, item },
    })
}

// ---------------------------------------------------------------------------
// ASCII case-insensitive helpers that never slice inside a UTF-8 sequence.
// ---------------------------------------------------------------------------

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

fn split_once_ci<'a>(text: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    let at = text
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| matches_at(text, i, sep))?;
    Some((&text[..at], &text[at + sep.len()..]))
}

fn rsplit_once_ci<'a>(text: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    let at = text
        .char_indices()
        .map(|(i, _)| i)
        .rev()
        .find(|&i| matches_at(text, i, sep))?;
    Some((&text[..at], &text[at + sep.len()..]))
}

fn matches_at(text: &str, at: usize, sep: &str) -> bool {
    text.get(at..at + sep.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(sep))
}
