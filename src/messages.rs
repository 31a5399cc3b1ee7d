use anyhow::Result;
use regex::Regex;
use std::collections::BTreeMap;

// One message definition per line, `Msg.KEY = 'value';`. Anything else on a
// Msg line is reported back so the caller can warn about it.
pub fn extract_messages(source: &str) -> (BTreeMap<String, String>, Vec<String>) {
    let line_re = Regex::new(r"^\s*Msg\.([A-Za-z0-9_]+)\s*=\s*'((?:[^'\\]|\\.)*)'\s*;\s*$")
        .expect("message line pattern");
    let mut messages = BTreeMap::new();
    let mut skipped = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if let Some(captures) = line_re.captures(line) {
            let key = captures[1].to_string();
            let value = unescape(&captures[2]);
            messages.insert(key, value);
        } else if line.trim_start().starts_with("Msg.") {
            skipped.push(format!("line {}: {}", index + 1, line.trim()));
        }
    }
    (messages, skipped)
}

pub fn messages_to_json(messages: &BTreeMap<String, String>) -> Result<String> {
    let mut map = serde_json::Map::new();
    for (key, value) in messages {
        map.insert(key.clone(), serde_json::Value::String(value.clone()));
    }
    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(
        map,
    ))?)
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_definitions() {
        let source = "Msg.HELLO = 'Hello';\nMsg.BYE = 'Bye';\n";
        let (messages, skipped) = extract_messages(source);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages["HELLO"], "Hello");
        assert_eq!(messages["BYE"], "Bye");
        assert!(skipped.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let source = "Msg.GOOD = 'ok';\nMsg.BAD = \"double quoted\";\nMsg.ALSO_GOOD = 'yes';\n";
        let (messages, skipped) = extract_messages(source);
        assert_eq!(messages.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].contains("line 2"));
    }

    #[test]
    fn escaped_quotes_and_newlines_unescape() {
        let source = r"Msg.QUOTED = 'it\'s\nfine';";
        let (messages, _) = extract_messages(source);
        assert_eq!(messages["QUOTED"], "it's\nfine");
    }

    #[test]
    fn non_message_lines_are_ignored_silently() {
        let source = "// a comment\n\nvar x = 3;\nMsg.K = 'v';\n";
        let (messages, skipped) = extract_messages(source);
        assert_eq!(messages.len(), 1);
        assert!(skipped.is_empty());
    }

    #[test]
    fn later_definition_wins() {
        let source = "Msg.K = 'first';\nMsg.K = 'second';\n";
        let (messages, _) = extract_messages(source);
        assert_eq!(messages["K"], "second");
    }
}
