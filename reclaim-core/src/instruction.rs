use crate::{InvocationContext, ReclaimError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Matches placeholders like `{purchase_history}` or `{is_refund_eligible?}`.
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("invalid regex pattern"))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn replace_match(ctx: &dyn InvocationContext, match_str: &str) -> Result<String> {
    let var_name = match_str.trim_matches(|c| c == '{' || c == '}').trim();

    let (var_name, optional) = match var_name.strip_suffix('?') {
        Some(name) => (name, true),
        None => (var_name, false),
    };

    if !is_identifier(var_name) {
        // Not a slot reference; leave the braces as literal text.
        return Ok(match_str.to_string());
    }

    match ctx.session().state_get(var_name) {
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(value) => Ok(value.to_string()),
        None if optional => Ok(String::new()),
        None => Err(ReclaimError::Agent(format!("output slot '{}' not found", var_name))),
    }
}

/// Injects session-state output slots into an instruction template.
///
/// - `{slot}` — required; errors when the slot is missing
/// - `{slot?}` — optional; replaced with the empty string when missing
///
/// Anything between braces that is not a valid identifier is left verbatim,
/// so JSON examples in prompts survive untouched.
pub fn inject_session_state(ctx: &dyn InvocationContext, template: &str) -> Result<String> {
    let regex = placeholder_regex();
    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;

    for found in regex.find_iter(template) {
        result.push_str(&template[last_end..found.start()]);
        result.push_str(&replace_match(ctx, found.as_str())?);
        last_end = found.end();
    }

    result.push_str(&template[last_end..]);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Content, ReadonlyContext, SessionHandle};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct SlotSession {
        state: Mutex<HashMap<String, Value>>,
    }

    impl SlotSession {
        fn with(pairs: &[(&str, Value)]) -> Self {
            let state = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            Self { state: Mutex::new(state) }
        }
    }

    impl SessionHandle for SlotSession {
        fn id(&self) -> &str {
            "s1"
        }
        fn app_name(&self) -> &str {
            "app"
        }
        fn user_id(&self) -> &str {
            "user"
        }
        fn state_get(&self, key: &str) -> Option<Value> {
            self.state.lock().unwrap().get(key).cloned()
        }
        fn state_set(&self, key: String, value: Value) {
            self.state.lock().unwrap().insert(key, value);
        }
        fn state_all(&self) -> HashMap<String, Value> {
            self.state.lock().unwrap().clone()
        }
        fn history(&self) -> Vec<Content> {
            Vec::new()
        }
        fn append_history(&self, _content: Content) {}
        fn last_update_time(&self) -> chrono::DateTime<chrono::Utc> {
            chrono::Utc::now()
        }
    }

    struct SlotContext {
        content: Content,
        session: SlotSession,
    }

    impl SlotContext {
        fn with(pairs: &[(&str, Value)]) -> Self {
            Self {
                content: Content::new("user").with_text("hi"),
                session: SlotSession::with(pairs),
            }
        }
    }

    impl ReadonlyContext for SlotContext {
        fn invocation_id(&self) -> &str {
            "inv-test"
        }
        fn agent_name(&self) -> &str {
            "test"
        }
        fn user_id(&self) -> &str {
            "user"
        }
        fn app_name(&self) -> &str {
            "app"
        }
        fn session_id(&self) -> &str {
            "s1"
        }
        fn branch(&self) -> &str {
            ""
        }
        fn user_content(&self) -> &Content {
            &self.content
        }
    }

    impl InvocationContext for SlotContext {
        fn session(&self) -> &dyn SessionHandle {
            &self.session
        }
        fn end_invocation(&self) {}
        fn ended(&self) -> bool {
            false
        }
    }

    #[test]
    fn required_slot_renders_its_value() {
        let ctx = SlotContext::with(&[("purchase_history", Value::String("order A-101".into()))]);
        let rendered = inject_session_state(&ctx, "History: {purchase_history}").unwrap();
        assert_eq!(rendered, "History: order A-101");
    }

    #[test]
    fn required_slot_accepts_an_empty_string() {
        let ctx = SlotContext::with(&[("purchase_history", Value::String(String::new()))]);
        let rendered = inject_session_state(&ctx, "History: {purchase_history}.").unwrap();
        assert_eq!(rendered, "History: .");
    }

    #[test]
    fn required_slot_errors_only_when_missing() {
        let ctx = SlotContext::with(&[]);
        let err = inject_session_state(&ctx, "History: {purchase_history}").unwrap_err();
        assert!(err.to_string().contains("purchase_history"));
    }

    #[test]
    fn optional_slot_renders_empty_when_missing() {
        let ctx = SlotContext::with(&[]);
        let rendered = inject_session_state(&ctx, "History: {purchase_history?}.").unwrap();
        assert_eq!(rendered, "History: .");
    }

    #[test]
    fn non_identifier_braces_are_left_verbatim() {
        let ctx = SlotContext::with(&[]);
        let template = r#"Reply as {"status": "ok"} would."#;
        let rendered = inject_session_state(&ctx, template).unwrap();
        assert_eq!(rendered, template);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("purchase_history"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("slot2"));
        assert!(!is_identifier("2slot"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("with-dash"));
        assert!(!is_identifier("a b"));
    }
}
