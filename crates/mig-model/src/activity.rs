//! Process activities
//!
//! Provides [`ActivityDescriptor`], the parsed form of one step in a process graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Activity kind classification
///
/// Derived from the raw `type` attribute of a process activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// SQL / JDBC call
    DatabaseCall,
    /// Queue send or receive
    MessageCall,
    /// Outbound HTTP or REST call
    HttpCall,
    /// Anything else (raw type preserved)
    Generic(String),
}

impl ActivityKind {
    /// Classify a raw activity type string
    ///
    /// Matching is case-insensitive on the last dotted segment, so
    /// `com.vendor.plugin.jdbc` and `JDBC` both classify as a database call.
    #[must_use]
    pub fn from_type_str(raw: &str) -> Self {
        let trimmed = raw.trim();
        let last = trimmed.rsplit(['.', ':']).next().unwrap_or(trimmed);
        match last.to_ascii_lowercase().as_str() {
            "jdbc" | "sql" | "database" | "jdbcquery" | "jdbcupdate" => Self::DatabaseCall,
            "jms" | "queue" | "jmssend" | "jmsreceive" => Self::MessageCall,
            "http" | "rest" | "sendhttprequest" | "invokerest" => Self::HttpCall,
            _ => Self::Generic(trimmed.to_string()),
        }
    }

    /// Canonical type name used in textual projections
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::DatabaseCall => "jdbc",
            Self::MessageCall => "jms",
            Self::HttpCall => "http",
            Self::Generic(raw) => raw.as_str(),
        }
    }

    /// Check if this is an HTTP call
    #[inline]
    #[must_use]
    pub fn is_http(&self) -> bool {
        matches!(self, Self::HttpCall)
    }
}

impl Default for ActivityKind {
    fn default() -> Self {
        Self::Generic(String::new())
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Directed edge between two activities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Source activity name
    pub from: String,
    /// Destination activity name
    pub to: String,
    /// Optional guard condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Transition {
    /// Create new transition
    #[inline]
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, condition: Option<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition,
        }
    }
}

/// One parsed process activity
///
/// Owned by its [`crate::ProcessDefinition`]; the similarity index keeps its
/// own copy by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDescriptor {
    /// Activity kind
    pub kind: ActivityKind,
    /// Declared name
    pub name: String,
    /// Protocol-specific configuration (SQL text, queue, HTTP method/URL, ...)
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    /// Outgoing transitions
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl ActivityDescriptor {
    /// Create descriptor with empty configuration
    #[inline]
    #[must_use]
    pub fn new(kind: ActivityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            config: BTreeMap::new(),
            transitions: Vec::new(),
        }
    }

    /// With configuration map
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: BTreeMap<String, String>) -> Self {
        self.config = config;
        self
    }

    /// With a single configuration entry
    #[inline]
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Get configuration value
    #[inline]
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Check whether kind or name carries an HTTP/REST marker
    #[must_use]
    pub fn has_http_marker(&self) -> bool {
        let kind = self.kind.type_name().to_ascii_lowercase();
        let name = self.name.to_ascii_lowercase();
        self.kind.is_http()
            || kind.contains("http")
            || kind.contains("rest")
            || name.contains("http")
            || name.contains("rest")
    }

    /// Textual projection used for similarity indexing
    ///
    /// Empty names and empty configuration values are omitted.
    #[must_use]
    pub fn projection(&self) -> String {
        let mut parts = vec![format!("Activity type: {}", self.kind.type_name())];
        if !self.name.is_empty() {
            parts.push(format!("Activity name: {}", self.name));
        }
        for (key, value) in &self.config {
            if !value.trim().is_empty() {
                parts.push(format!("Config {key}: {}", value.trim()));
            }
        }
        for transition in &self.transitions {
            parts.push(format!("Transition from {} to {}", transition.from, transition.to));
            if let Some(condition) = transition.condition.as_deref().filter(|c| !c.is_empty()) {
                parts.push(format!("Condition: {condition}"));
            }
        }
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_type_str() {
        assert_eq!(ActivityKind::from_type_str("jdbc"), ActivityKind::DatabaseCall);
        assert_eq!(ActivityKind::from_type_str("JMS"), ActivityKind::MessageCall);
        assert_eq!(ActivityKind::from_type_str("bw.http"), ActivityKind::HttpCall);
        assert_eq!(ActivityKind::from_type_str("rest"), ActivityKind::HttpCall);
        assert_eq!(
            ActivityKind::from_type_str("mapper"),
            ActivityKind::Generic("mapper".to_string())
        );
    }

    #[test]
    fn http_marker_from_name() {
        let generic = ActivityDescriptor::new(ActivityKind::Generic("invoke".into()), "RestLookup");
        assert!(generic.has_http_marker());

        let db = ActivityDescriptor::new(ActivityKind::DatabaseCall, "StoreLoan");
        assert!(!db.has_http_marker());
    }

    #[test]
    fn projection_includes_config_and_transitions() {
        let mut descriptor = ActivityDescriptor::new(ActivityKind::DatabaseCall, "StoreLoan")
            .with_entry("sql", "INSERT INTO loans VALUES (?)")
            .with_entry("empty", "  ");
        descriptor
            .transitions
            .push(Transition::new("StoreLoan", "Notify", Some("approved".into())));

        let text = descriptor.projection();
        assert!(text.starts_with("Activity type: jdbc | Activity name: StoreLoan"));
        assert!(text.contains("Config sql: INSERT INTO loans VALUES (?)"));
        assert!(!text.contains("Config empty"));
        assert!(text.contains("Transition from StoreLoan to Notify | Condition: approved"));
    }
}
