pub mod dates;
pub mod error;
pub mod pattern;
pub mod ticket;

pub use error::{ErrorCategory, Result, TicketError, UpstreamError};
pub use pattern::{GapType, KnowledgeGap, RecurringPattern};
pub use ticket::{CanonicalTicket, KbArticle, TicketSource, TicketType};

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract string from JSON value by key.
///
/// Replaces verbose `v.get("key")?.as_str()?.to_string()` patterns when
/// normalizing backend-native records.
#[inline]
pub fn json_string(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}

/// Extract string with default value.
#[inline]
pub fn json_string_or(value: &serde_json::Value, key: &str, default: &str) -> String {
    json_string(value, key).unwrap_or_else(|| default.to_string())
}

/// Extract a display-name string from a nested object by path, e.g.
/// `fields.assignee.displayName`. Missing links in the path yield `None`.
#[inline]
pub fn json_path_string(value: &serde_json::Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_string() {
        let value = json!({"number": "INC0010001", "count": 3});
        assert_eq!(json_string(&value, "number"), Some("INC0010001".to_string()));
        // Non-string values are not coerced
        assert_eq!(json_string(&value, "count"), None);
        assert_eq!(json_string(&value, "missing"), None);
    }

    #[test]
    fn test_json_string_or() {
        let value = json!({"state": "Open"});
        assert_eq!(json_string_or(&value, "state", ""), "Open");
        assert_eq!(json_string_or(&value, "priority", "3 - Moderate"), "3 - Moderate");
    }

    #[test]
    fn test_json_path_string() {
        let value = json!({"fields": {"assignee": {"displayName": "Dana Reyes"}}});
        assert_eq!(
            json_path_string(&value, &["fields", "assignee", "displayName"]),
            Some("Dana Reyes".to_string())
        );
        assert_eq!(json_path_string(&value, &["fields", "reporter", "displayName"]), None);
    }
}
