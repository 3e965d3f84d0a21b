//! Canonical Field Resolution for File Exports
//!
//! Export files arrive with unknown column names. Each canonical field
//! carries an ordered alias list; the first record's key set resolves, for
//! each field, the first alias (case-insensitive, trimmed) that matches a
//! present key. An exact canonical-name match always takes precedence over
//! any alias-list match.
//!
//! The resolved mapping is applied uniformly to every record — headers are
//! not re-resolved per record. Documented limitation: if a hand-edited file
//! mixes header spellings across rows, later rows silently normalize
//! unmapped fields to empty string.

use std::collections::HashMap;

/// Canonical ticket fields an export column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Number,
    Type,
    ShortDescription,
    Description,
    State,
    Priority,
    Category,
    Subcategory,
    OpenedAt,
    ClosedAt,
    ResolvedAt,
    AssignedTo,
    CallerName,
    CloseNotes,
    WorkNotes,
    CiName,
}

impl CanonicalField {
    pub const ALL: &'static [CanonicalField] = &[
        Self::Number,
        Self::Type,
        Self::ShortDescription,
        Self::Description,
        Self::State,
        Self::Priority,
        Self::Category,
        Self::Subcategory,
        Self::OpenedAt,
        Self::ClosedAt,
        Self::ResolvedAt,
        Self::AssignedTo,
        Self::CallerName,
        Self::CloseNotes,
        Self::WorkNotes,
        Self::CiName,
    ];

    /// The canonical column name; an exact (case-insensitive) match on this
    /// beats every alias
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Type => "type",
            Self::ShortDescription => "short_description",
            Self::Description => "description",
            Self::State => "state",
            Self::Priority => "priority",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::OpenedAt => "opened_at",
            Self::ClosedAt => "closed_at",
            Self::ResolvedAt => "resolved_at",
            Self::AssignedTo => "assigned_to",
            Self::CallerName => "caller_name",
            Self::CloseNotes => "close_notes",
            Self::WorkNotes => "work_notes",
            Self::CiName => "ci_name",
        }
    }

    /// Accepted source-header aliases, in precedence order
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Number => &[
                "ticket_number",
                "ticket number",
                "incident_number",
                "id",
                "key",
                "ref",
                "reference",
            ],
            Self::Type => &["ticket_type", "issue_type", "record_type"],
            Self::ShortDescription => &[
                "summary",
                "title",
                "subject",
                "short_desc",
                "brief_description",
            ],
            Self::Description => &["details", "long_description", "body", "full_description"],
            Self::State => &["status", "ticket_state", "ticket_status", "workflow_state"],
            Self::Priority => &["urgency", "severity", "prio"],
            Self::Category => &["classification", "issue_category", "area", "group"],
            Self::Subcategory => &["sub_category", "subcat", "component", "sub_area"],
            Self::OpenedAt => &[
                "opened",
                "created",
                "created_at",
                "creation_date",
                "open_date",
                "date_opened",
                "sys_created_on",
            ],
            Self::ClosedAt => &["closed", "closed_date", "close_date", "date_closed"],
            Self::ResolvedAt => &["resolved", "resolved_date", "resolution_date", "date_resolved"],
            Self::AssignedTo => &["assignee", "assigned", "owner", "technician"],
            Self::CallerName => &[
                "caller",
                "requester",
                "reporter",
                "requested_by",
                "customer",
                "contact",
            ],
            Self::CloseNotes => &["resolution", "resolution_notes", "close_comments", "fix_notes"],
            Self::WorkNotes => &["work_log", "comments", "activity", "journal"],
            Self::CiName => &[
                "ci",
                "configuration_item",
                "affected_ci",
                "cmdb_ci",
                "asset",
                "hostname",
            ],
        }
    }
}

/// Resolved mapping from canonical field to the export's actual column key
pub type ColumnMap = HashMap<CanonicalField, String>;

/// Resolve each canonical field against the first record's key set.
///
/// Pure function from key set to mapping: exact canonical-name match first,
/// then the alias list in order. Fields with no matching key are absent
/// from the map and normalize to empty string downstream.
pub fn resolve_columns<S: AsRef<str>>(first_record_keys: &[S]) -> ColumnMap {
    // Normalized key -> original spelling; first occurrence wins
    let mut normalized: HashMap<String, &str> = HashMap::new();
    for key in first_record_keys {
        let key = key.as_ref();
        normalized
            .entry(key.trim().to_lowercase())
            .or_insert(key);
    }

    let mut resolved = ColumnMap::new();
    for &field in CanonicalField::ALL {
        if let Some(original) = normalized.get(field.canonical_name()) {
            resolved.insert(field, (*original).to_string());
            continue;
        }
        for alias in field.aliases() {
            if let Some(original) = normalized.get(*alias) {
                resolved.insert(field, (*original).to_string());
                break;
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_canonical_name_resolves() {
        let map = resolve_columns(&keys(&["number", "state", "priority"]));
        assert_eq!(map.get(&CanonicalField::Number).unwrap(), "number");
        assert_eq!(map.get(&CanonicalField::State).unwrap(), "state");
    }

    #[test]
    fn test_alias_resolves_when_canonical_absent() {
        let map = resolve_columns(&keys(&["Key", "Summary", "Status", "Created"]));
        assert_eq!(map.get(&CanonicalField::Number).unwrap(), "Key");
        assert_eq!(map.get(&CanonicalField::ShortDescription).unwrap(), "Summary");
        assert_eq!(map.get(&CanonicalField::State).unwrap(), "Status");
        assert_eq!(map.get(&CanonicalField::OpenedAt).unwrap(), "Created");
    }

    #[test]
    fn test_canonical_beats_alias() {
        // Both "number" and the earlier-listed alias "id" are present;
        // the exact canonical name wins regardless of alias order
        let map = resolve_columns(&keys(&["id", "number"]));
        assert_eq!(map.get(&CanonicalField::Number).unwrap(), "number");
    }

    #[test]
    fn test_alias_precedence_order() {
        // "ticket_number" precedes "id" in the alias list
        let map = resolve_columns(&keys(&["id", "ticket_number"]));
        assert_eq!(map.get(&CanonicalField::Number).unwrap(), "ticket_number");
    }

    #[test]
    fn test_case_insensitive_and_trimmed() {
        let map = resolve_columns(&keys(&["  Ticket_Number  ", "SUMMARY"]));
        assert_eq!(map.get(&CanonicalField::Number).unwrap(), "  Ticket_Number  ");
        assert_eq!(map.get(&CanonicalField::ShortDescription).unwrap(), "SUMMARY");
    }

    #[test]
    fn test_unmatched_fields_absent() {
        let map = resolve_columns(&keys(&["number"]));
        assert!(map.get(&CanonicalField::CiName).is_none());
        assert!(map.get(&CanonicalField::WorkNotes).is_none());
    }

    #[test]
    fn test_resolution_preserves_original_spelling() {
        // The returned value is the export's spelling so raw-record lookups work
        let map = resolve_columns(&keys(&["Opened"]));
        assert_eq!(map.get(&CanonicalField::OpenedAt).unwrap(), "Opened");
    }
}
