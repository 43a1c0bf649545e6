/// Chat command registry: the text grammar as a listable table.
///
/// Drives the `help` reply; detection itself lives in `detection.rs`.

/// One entry of the chat grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    pub key: &'static str,
    pub usage: String,
    pub description: &'static str,
    /// Only meaningful for a verified creator with creator mode on.
    pub creator_only: bool,
}

fn def(key: &'static str, usage: String, description: &'static str, creator_only: bool) -> CommandDef {
    CommandDef { key, usage, description, creator_only }
}

/// Build the built-in command table for a given creator name.
pub fn builtin_commands(creator_name: &str) -> Vec<CommandDef> {
    vec![
        def("help", "help".into(), "Show this list.", false),
        def(
            "login",
            format!("I am {creator_name} <password>"),
            "Verify as the creator and turn creator mode on.",
            false,
        ),
        def("logout", "logout".into(), "End creator verification for this session.", false),
        def(
            "update",
            "update my info: FIELD to VALUE".into(),
            "Replace a text field, or create it if missing.",
            true,
        ),
        def(
            "add",
            "add ITEM to FIELD[/CATEGORY]".into(),
            "Append an item to a list or to a category of a section.",
            true,
        ),
        def(
            "remove",
            "remove ITEM from FIELD[/CATEGORY]".into(),
            "Remove an item from a list or from a category of a section.",
            true,
        ),
    ]
}

/// Render the help reply. Creator-only commands are marked rather than
/// hidden so guests know what verification unlocks.
pub fn help_text(bot_name: &str, creator_name: &str) -> String {
    let mut out = format!("{bot_name}: Here is what I understand. Anything else is a question about {creator_name}.\n");
    for cmd in builtin_commands(creator_name) {
        let marker = if cmd.creator_only { " (creator only)" } else { "" };
        out.push_str(&format!("  • {}: {}{}\n", cmd.usage, cmd.description, marker));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keys_are_unique() {
        let cmds = builtin_commands("Shreyash");
        let mut keys: Vec<_> = cmds.iter().map(|c| c.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), cmds.len());
    }

    #[test]
    fn help_mentions_creator_and_marks_mutations() {
        let text = help_text("Shrey", "Shreyash");
        assert!(text.starts_with("Shrey: "));
        assert!(text.contains("I am Shreyash <password>"));
        assert_eq!(text.matches("(creator only)").count(), 3);
    }
}
