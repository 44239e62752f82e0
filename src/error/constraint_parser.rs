use std::sync::OnceLock;

use regex::Regex;

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// The storage driver already tags violations by kind; this parser only
/// recovers the entity, field and offending value so the conflict can be
/// reported and logged precisely.
pub struct ConstraintParser;

/// Structured information recovered from a constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConstraint {
    pub entity: String,
    pub field: String,
    pub value: Option<String>,
}

/// Suffixes PostgreSQL appends to generated constraint and index names.
const CONSTRAINT_SUFFIXES: &[&str] = &["_pkey", "_fkey", "_key", "_idx", "_unique", "_check"];

/// Phrasings used by drivers and proxies for a uniqueness conflict.
const UNIQUE_VIOLATION_MARKERS: &[&str] = &[
    "duplicate key",
    "unique constraint",
    "violates unique",
    "unique violation",
];

/// Compiled regex patterns for constraint parsing, cached for performance
struct RegexPatterns {
    key_value: Regex,
    table_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            // Matches "Key (field)=(value)" in PostgreSQL detail lines
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)")
                .expect("key/value pattern is valid"),
            // Matches `table "name"` and `relation "name"`
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#)
                .expect("table pattern is valid"),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Parses a unique constraint violation.
    ///
    /// The constraint name is preferred (e.g. `players_username_key`); when it
    /// is missing the entity and field are recovered from the message text.
    ///
    /// # Examples
    /// ```
    /// use planet_service::error::ConstraintParser;
    ///
    /// let message = "duplicate key value violates unique constraint \"players_username_key\"\nDETAIL: Key (username)=(ann) already exists.";
    /// let parsed = ConstraintParser::parse_unique_violation(message, Some("players_username_key")).unwrap();
    /// assert_eq!(parsed.entity, "players");
    /// assert_eq!(parsed.field, "username");
    /// assert_eq!(parsed.value.as_deref(), Some("ann"));
    /// ```
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<ParsedConstraint> {
        let key_value = Self::extract_key_value_from_message(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            return Some(ParsedConstraint {
                entity,
                field,
                value: key_value.map(|(_, value)| value),
            });
        }

        let (field, value) = key_value?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some(ParsedConstraint {
            entity,
            field,
            value: Some(value),
        })
    }

    /// Parses a foreign key violation such as `planets_player_id_fkey`.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<ParsedConstraint> {
        let key_value = Self::extract_key_value_from_message(message);

        if let Some(constraint) = constraint_name
            && constraint.ends_with("_fkey")
            && let Some((entity, field)) = Self::parse_constraint_name(constraint)
        {
            return Some(ParsedConstraint {
                entity,
                field,
                value: key_value.map(|(_, value)| value),
            });
        }

        let (field, value) = key_value?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some(ParsedConstraint {
            entity,
            field,
            value: Some(value),
        })
    }

    /// Splits a generated constraint name into `(table, column)`.
    ///
    /// - "players_username_key" -> ("players", "username")
    /// - "planets_player_id_fkey" -> ("planets", "player_id")
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))?;
        let (entity, field) = stem.split_once('_')?;
        if entity.is_empty() || field.is_empty() {
            return None;
        }
        Some((entity.to_string(), field.to_string()))
    }

    /// Extracts `(field, value)` from a "Key (field)=(value)" fragment.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }

    /// Extracts the quoted table or relation name from a message.
    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .table_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Recognizes a uniqueness conflict from message text alone.
    ///
    /// Only used for errors the driver could not tag with a kind.
    pub fn looks_like_unique_violation(message: &str) -> bool {
        let lowered = message.to_lowercase();
        UNIQUE_VIOLATION_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
    }
}
