//! Process definition reader
//!
//! Accepts both layouts seen in the wild:
//!
//! ```text
//! <process name="LoanApproval">              <ProcessDefinition name="LoanApproval">
//!   <starter name="onRequest" ref="http"/>      <activity name="Lookup" type="jdbc">
//!   <activity name="Lookup" type="jdbc">          <config><datasource>loans</datasource></config>
//!     <sql>SELECT ...<param name="id"/></sql>     <ConfigValue key="timeout">30</ConfigValue>
//!   </activity>                                    <Transition to="Notify"/>
//!   <transition from="Lookup" to="Notify"/>     </activity>
//! </process>                                  </ProcessDefinition>
//! ```
//!
//! Matching is on local names, so namespace prefixes are ignored.

use super::ArtifactReader;
use crate::error::ParseError;
use crate::xml::{walk, Attributes, XmlVisitor};
use mig_model::{ActivityDescriptor, ActivityKind, ArtifactKind, ProcessDefinition, Starter, Transition};
use std::collections::BTreeMap;
use std::path::Path;

/// Reader for `.process` files
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessReader;

impl ArtifactReader for ProcessReader {
    type Output = ProcessDefinition;

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::ProcessDefinition
    }

    fn parse(&self, content: &str, path: &Path) -> Result<ProcessDefinition, ParseError> {
        let mut builder = ProcessBuilder::default();
        walk(content, path, &mut builder)?;
        if !builder.seen_root {
            return Err(ParseError::MissingRoot(path.to_path_buf()));
        }

        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut process = builder.process;
        if process.name.trim().is_empty() {
            process.name = fallback;
        }
        if !path.as_os_str().is_empty() {
            process.source = Some(path.to_path_buf());
        }
        for transition in builder.transitions {
            process.attach_transition(transition);
        }

        tracing::debug!(
            process = %process.name,
            activities = process.activities.len(),
            transitions = process.transitions.len(),
            "parsed process definition"
        );
        Ok(process)
    }
}

/// Text being collected for a configuration entry
#[derive(Debug)]
struct Capture {
    depth: usize,
    key: String,
    segments: Vec<String>,
}

#[derive(Debug)]
struct OpenActivity {
    depth: usize,
    descriptor: ActivityDescriptor,
    config_depth: Option<usize>,
}

#[derive(Debug, Default)]
struct ProcessBuilder {
    depth: usize,
    seen_root: bool,
    process: ProcessDefinition,
    activity: Option<OpenActivity>,
    captures: Vec<Capture>,
    transitions: Vec<Transition>,
}

impl ProcessBuilder {
    fn open_in_activity(&mut self, name: &str, mut attributes: Attributes) {
        let depth = self.depth;
        let Some(activity) = self.activity.as_mut() else {
            return;
        };
        let config = &mut activity.descriptor.config;

        match name.to_ascii_lowercase().as_str() {
            "sql" => self.captures.push(Capture::new(depth, "sql")),
            "param" if self.captures.last().is_some_and(|c| c.key == "sql") => {
                let param = attributes.remove("name").unwrap_or_default();
                if let Some(ty) = attributes.remove("type") {
                    config.insert(format!("param.{param}.type"), ty);
                }
                self.captures.push(Capture::new(depth, format!("param.{param}")));
            }
            "jms" => {
                copy_attr(config, &mut attributes, "queue", "queue", None);
                copy_attr(config, &mut attributes, "connection-factory", "connection_factory", None);
                copy_attr(config, &mut attributes, "message-type", "message_type", Some("Text"));
                copy_attr(config, &mut attributes, "delivery-mode", "delivery_mode", Some("PERSISTENT"));
            }
            "http" => {
                copy_attr(config, &mut attributes, "method", "method", Some("POST"));
                copy_attr(config, &mut attributes, "url", "url", None);
                copy_attr(config, &mut attributes, "content-type", "content_type", Some("application/json"));
            }
            "config" => activity.config_depth = Some(depth),
            "configvalue" => {
                let key = attributes.remove("key").or_else(|| attributes.remove("name"));
                match (key, attributes.remove("value")) {
                    (Some(key), Some(value)) => {
                        config.insert(key, value);
                    }
                    (Some(key), None) => self.captures.push(Capture::new(depth, key)),
                    (None, _) => tracing::debug!(activity = %activity.descriptor.name, "ConfigValue without key ignored"),
                }
            }
            "transition" => {
                let from = attributes
                    .remove("from")
                    .unwrap_or_else(|| activity.descriptor.name.clone());
                push_transition(&mut self.transitions, from, attributes);
            }
            _ if activity.config_depth.is_some_and(|d| d + 1 == depth) => {
                self.captures.push(Capture::new(depth, name));
            }
            _ => {}
        }
    }

    fn open_activity(&mut self, mut attributes: Attributes) {
        let raw_type = attributes.remove("type").unwrap_or_default();
        let name = attributes.remove("name").unwrap_or_default();
        self.activity = Some(OpenActivity {
            depth: self.depth,
            descriptor: ActivityDescriptor::new(ActivityKind::from_type_str(&raw_type), name),
            config_depth: None,
        });
    }
}

impl XmlVisitor for ProcessBuilder {
    fn open(&mut self, name: &str, mut attributes: Attributes) {
        self.depth += 1;

        if !self.seen_root {
            self.seen_root = true;
            self.process.name = attributes.remove("name").unwrap_or_default();
            return;
        }

        if self.activity.is_some() {
            self.open_in_activity(name, attributes);
            return;
        }

        match name.to_ascii_lowercase().as_str() {
            "activity" => self.open_activity(attributes),
            "starter" => self.process.starters.push(Starter {
                name: attributes.remove("name").unwrap_or_default(),
                reference: attributes.remove("ref"),
            }),
            "transition" => match attributes.remove("from") {
                Some(from) => push_transition(&mut self.transitions, from, attributes),
                None => tracing::debug!("transition without 'from' ignored"),
            },
            _ => {}
        }
    }

    fn close(&mut self, _name: &str) {
        let depth = self.depth;

        if self.captures.last().is_some_and(|c| c.depth == depth) {
            if let (Some(capture), Some(activity)) = (self.captures.pop(), self.activity.as_mut()) {
                activity.descriptor.config.insert(capture.key, capture.segments.join(" "));
            }
        }

        if let Some(activity) = self.activity.as_mut() {
            if activity.config_depth == Some(depth) {
                activity.config_depth = None;
            }
            if activity.depth == depth {
                if let Some(done) = self.activity.take() {
                    self.process.activities.push(done.descriptor);
                }
            }
        }

        self.depth = self.depth.saturating_sub(1);
    }

    fn text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Some(capture) = self.captures.last_mut() {
            capture.segments.push(text.to_string());
        }
    }
}

impl Capture {
    fn new(depth: usize, key: impl Into<String>) -> Self {
        Self {
            depth,
            key: key.into(),
            segments: Vec::new(),
        }
    }
}

fn copy_attr(
    config: &mut BTreeMap<String, String>,
    attributes: &mut Attributes,
    attr: &str,
    key: &str,
    default: Option<&str>,
) {
    if let Some(value) = attributes.remove(attr).or_else(|| default.map(str::to_string)) {
        config.insert(key.to_string(), value);
    }
}

fn push_transition(transitions: &mut Vec<Transition>, from: String, mut attributes: Attributes) {
    match attributes.remove("to") {
        Some(to) => {
            let condition = attributes.remove("condition").filter(|c| !c.trim().is_empty());
            transitions.push(Transition::new(from, to, condition));
        }
        None => tracing::debug!(%from, "transition without 'to' ignored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FLAT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pd:process xmlns:pd="http://ns.tibco.com/bw/process" name="LoanApproval">
  <pd:starter name="onRequest" ref="httpReceiver"/>
  <pd:activity name="LookupCustomer" type="jdbc">
    <pd:sql>SELECT * FROM customers WHERE id = ?<pd:param name="id" type="int">42</pd:param></pd:sql>
  </pd:activity>
  <pd:activity name="PublishDecision" type="jms">
    <pd:jms queue="loan.decisions" connection-factory="cf"/>
  </pd:activity>
  <pd:activity name="CallCreditBureau" type="http">
    <pd:http url="http://bureau/score"/>
  </pd:activity>
  <pd:transition from="LookupCustomer" to="CallCreditBureau"/>
  <pd:transition from="CallCreditBureau" to="PublishDecision" condition="score &gt; 600"/>
</pd:process>"#;

    const LEGACY: &str = r#"<ProcessDefinition name="Settlement">
  <activity name="Archive" type="com.vendor.plugin.mapper">
    <config>
      <target>archive</target>
      <retries>3</retries>
    </config>
    <ConfigValue key="timeout">30</ConfigValue>
    <ConfigValue key="mode" value="batch"/>
    <Transition to="Done" condition="ok"/>
  </activity>
  <activity name="Done" type="noop"/>
</ProcessDefinition>"#;

    fn parse(xml: &str) -> ProcessDefinition {
        ProcessReader.parse(xml, Path::new("/units/loan/Loan.process")).unwrap()
    }

    #[test]
    fn parses_flat_layout() {
        let process = parse(FLAT);
        assert_eq!(process.name, "LoanApproval");
        assert_eq!(process.starters.len(), 1);
        assert_eq!(process.starters[0].reference.as_deref(), Some("httpReceiver"));
        assert_eq!(process.activities.len(), 3);

        let lookup = &process.activities[0];
        assert_eq!(lookup.kind, ActivityKind::DatabaseCall);
        assert_eq!(lookup.config_value("sql"), Some("SELECT * FROM customers WHERE id = ?"));
        assert_eq!(lookup.config_value("param.id"), Some("42"));
        assert_eq!(lookup.config_value("param.id.type"), Some("int"));

        let publish = &process.activities[1];
        assert_eq!(publish.kind, ActivityKind::MessageCall);
        assert_eq!(publish.config_value("queue"), Some("loan.decisions"));
        assert_eq!(publish.config_value("message_type"), Some("Text"));
        assert_eq!(publish.config_value("delivery_mode"), Some("PERSISTENT"));

        let http = &process.activities[2];
        assert_eq!(http.kind, ActivityKind::HttpCall);
        assert_eq!(http.config_value("method"), Some("POST"));
        assert_eq!(http.config_value("content_type"), Some("application/json"));
    }

    #[test]
    fn top_level_transitions_attach_to_source() {
        let process = parse(FLAT);
        assert_eq!(process.transitions.len(), 2);
        let http = &process.activities[2];
        assert_eq!(http.transitions.len(), 1);
        assert_eq!(http.transitions[0].to, "PublishDecision");
        assert_eq!(http.transitions[0].condition.as_deref(), Some("score > 600"));
    }

    #[test]
    fn parses_legacy_layout() {
        let process = parse(LEGACY);
        assert_eq!(process.name, "Settlement");
        let archive = &process.activities[0];
        assert_eq!(archive.kind, ActivityKind::Generic("com.vendor.plugin.mapper".into()));
        assert_eq!(archive.config_value("target"), Some("archive"));
        assert_eq!(archive.config_value("retries"), Some("3"));
        assert_eq!(archive.config_value("timeout"), Some("30"));
        assert_eq!(archive.config_value("mode"), Some("batch"));
        assert_eq!(
            archive.transitions,
            vec![Transition::new("Archive", "Done", Some("ok".into()))]
        );
        assert_eq!(process.activities[1].kind, ActivityKind::Generic("noop".into()));
    }

    #[test]
    fn missing_name_falls_back_to_file_stem() {
        let process = parse("<process><activity type=\"rest\" name=\"Ping\"/></process>");
        assert_eq!(process.name, "Loan");
        assert!(process.activities[0].has_http_marker());
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = ProcessReader.parse("", Path::new("x.process")).unwrap_err();
        assert!(matches!(err, ParseError::MissingRoot(_)));
    }

    #[test]
    fn malformed_document_is_rejected() {
        let err = ProcessReader
            .parse("<process><activity></process>", Path::new("x.process"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
