//! Localized message lookup.

use std::collections::HashMap;

/// Host service for localized strings.
pub trait LocaleStrings {
    /// Returns the message for `key` with `$1`..`$9` placeholders replaced by `substitutions`.
    ///
    /// Unknown keys resolve to an empty string.
    fn get_message(&self, key: &str, substitutions: &[&str]) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
/// Locale service that knows no messages.
pub struct NoopLocaleStrings;

impl LocaleStrings for NoopLocaleStrings {
    fn get_message(&self, _key: &str, _substitutions: &[&str]) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory message table.
pub struct MemoryLocaleStrings {
    messages: HashMap<String, String>,
}

impl MemoryLocaleStrings {
    /// Adds or replaces a message template.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }
}

impl LocaleStrings for MemoryLocaleStrings {
    fn get_message(&self, key: &str, substitutions: &[&str]) -> String {
        let Some(template) = self.messages.get(key) else {
            return String::new();
        };
        // Highest index first so `$1` never matches the prefix of `$1N`.
        substitutions
            .iter()
            .enumerate()
            .rev()
            .fold(template.clone(), |text, (index, value)| {
                text.replace(&format!("${}", index + 1), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_strings_substitute_positional_markers() {
        let mut strings = MemoryLocaleStrings::default();
        strings.insert("tipAmount", "Send $1 to $2");

        assert_eq!(
            strings.get_message("tipAmount", &["5 BAT", "example.com"]),
            "Send 5 BAT to example.com"
        );
        assert_eq!(strings.get_message("missing", &["x"]), "");
        assert_eq!(NoopLocaleStrings.get_message("tipAmount", &[]), "");
    }
}
