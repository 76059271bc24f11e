//! Lenient extraction of `{subject, body}` from raw model output
//!
//! Models do not reliably honor the JSON-only instruction, so parsing is
//! best-effort with a line-based fallback. This function never fails; the
//! worst case is a pair of empty strings.

use serde_json::Value;

/// Parsed subject/body pair. Fields may be empty but are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectBody {
    pub subject: String,
    pub body: String,
}

/// Extract a subject/body pair from free-form model text.
///
/// Tries the slice between the first `{` and the last `}` as JSON first.
/// Anything that is not a JSON object there falls back to treating the first
/// non-empty line as the subject and the remaining lines, joined with single
/// spaces, as the body.
pub fn parse_subject_body(text: &str) -> SubjectBody {
    let text = text.trim();
    if text.is_empty() {
        return SubjectBody::default();
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
        && let Ok(Value::Object(map)) = serde_json::from_str(&text[start..=end])
    {
        return SubjectBody {
            subject: field_as_string(map.get("subject")),
            body: field_as_string(map.get("body")),
        };
    }

    // Fallback for messy outputs
    let mut lines = text.lines().map(str::trim).filter(|ln| !ln.is_empty());
    let subject = lines.next().unwrap_or_default().to_string();
    let body = lines.collect::<Vec<_>>().join(" ");
    SubjectBody { subject, body }
}

/// Render a JSON field as trimmed text. Strings are used verbatim; other
/// values keep their JSON rendering, matching the lenient original behavior.
fn field_as_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_json() {
        let parsed = parse_subject_body(r#"{"subject":"Hi","body":"Bye"}"#);
        assert_eq!(parsed.subject, "Hi");
        assert_eq!(parsed.body, "Bye");
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let parsed = parse_subject_body(
            "Sure! Here is your email:\n{\"subject\": \"A pick for Ana\", \"body\": \"Hi Ana. Check it out.\"}\nLet me know if you need more.",
        );
        assert_eq!(parsed.subject, "A pick for Ana");
        assert_eq!(parsed.body, "Hi Ana. Check it out.");
    }

    #[test]
    fn test_no_braces_uses_line_fallback() {
        let parsed = parse_subject_body("Line one\nLine two\nLine three");
        assert_eq!(parsed.subject, "Line one");
        assert_eq!(parsed.body, "Line two Line three");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_subject_body(""), SubjectBody::default());
        assert_eq!(parse_subject_body("  \n \t "), SubjectBody::default());
    }

    #[test]
    fn test_single_line_has_empty_body() {
        let parsed = parse_subject_body("Just a subject");
        assert_eq!(parsed.subject, "Just a subject");
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_malformed_json_falls_back_to_lines() {
        let parsed = parse_subject_body("{\"subject\": \"broken\nSecond line}");
        assert_eq!(parsed.subject, "{\"subject\": \"broken");
        assert_eq!(parsed.body, "Second line}");
    }

    #[test]
    fn test_non_object_json_falls_back_to_lines() {
        let parsed = parse_subject_body("{}\nTrailing text");
        // An empty object parses but has no fields
        assert_eq!(parsed.subject, "");
        assert_eq!(parsed.body, "");

        let parsed = parse_subject_body("[1, 2]\nreal subject");
        assert_eq!(parsed.subject, "[1, 2]");
        assert_eq!(parsed.body, "real subject");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let parsed = parse_subject_body(r#"{"subject": "Only subject"}"#);
        assert_eq!(parsed.subject, "Only subject");
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_non_string_values_are_rendered() {
        let parsed = parse_subject_body(r#"{"subject": 42, "body": null}"#);
        assert_eq!(parsed.subject, "42");
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let parsed = parse_subject_body(r#"{"subject": "  Hi  ", "body": " Bye "}"#);
        assert_eq!(parsed.subject, "Hi");
        assert_eq!(parsed.body, "Bye");
    }
}
