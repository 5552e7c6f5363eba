//! Parsed process graphs

use crate::activity::{ActivityDescriptor, ActivityKind, Transition};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Process entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Starter {
    /// Starter name
    pub name: String,
    /// Referenced starter type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A parsed process definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    /// Process name
    pub name: String,
    /// Source file (when parsed from disk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Entry points
    #[serde(default)]
    pub starters: Vec<Starter>,
    /// Activities in document order
    #[serde(default)]
    pub activities: Vec<ActivityDescriptor>,
    /// All transitions in document order
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl ProcessDefinition {
    /// Create empty process
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Record a transition and attach it to its source activity
    ///
    /// Transitions whose source is unknown are kept in the process-level
    /// list only.
    pub fn attach_transition(&mut self, transition: Transition) {
        if let Some(activity) = self.activities.iter_mut().find(|a| a.name == transition.from) {
            if !activity.transitions.contains(&transition) {
                activity.transitions.push(transition.clone());
            }
        }
        if !self.transitions.contains(&transition) {
            self.transitions.push(transition);
        }
    }

    /// Activities of the given kind
    pub fn activities_of<'a>(&'a self, kind: &'a ActivityKind) -> impl Iterator<Item = &'a ActivityDescriptor> + 'a {
        self.activities.iter().filter(move |a| &a.kind == kind)
    }

    /// Check if any activity has the given kind
    #[inline]
    #[must_use]
    pub fn has_kind(&self, kind: &ActivityKind) -> bool {
        self.activities.iter().any(|a| &a.kind == kind)
    }
}
