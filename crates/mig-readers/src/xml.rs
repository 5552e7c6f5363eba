//! Namespace-agnostic XML event walking

use crate::error::ParseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::path::Path;

/// Element attributes keyed by local name
pub(crate) type Attributes = BTreeMap<String, String>;

/// Receives element events with prefixes stripped
pub(crate) trait XmlVisitor {
    fn open(&mut self, name: &str, attributes: Attributes);
    fn close(&mut self, name: &str);
    fn text(&mut self, text: &str);
}

/// Drive a visitor over the document
///
/// Self-closing elements produce an `open` immediately followed by a
/// `close`. CDATA sections are delivered as text.
pub(crate) fn walk<V: XmlVisitor>(content: &str, path: &Path, visitor: &mut V) -> Result<(), ParseError> {
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.local_name().as_ref());
                visitor.open(&name, attributes(&e, path)?);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(e.local_name().as_ref());
                visitor.open(&name, attributes(&e, path)?);
                visitor.close(&name);
            }
            Ok(Event::End(e)) => {
                visitor.close(&local_name(e.local_name().as_ref()));
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| ParseError::syntax(path, format!("bad text at {}: {e}", reader.buffer_position())))?;
                visitor.text(&text);
            }
            Ok(Event::CData(c)) => {
                visitor.text(&String::from_utf8_lossy(&c));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::syntax(
                    path,
                    format!("at position {}: {e}", reader.error_position()),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn attributes(e: &BytesStart<'_>, path: &Path) -> Result<Attributes, ParseError> {
    let mut map = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::syntax(path, format!("bad attribute: {err}")))?;
        let key = local_name(attr.key.local_name().as_ref());
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError::syntax(path, format!("bad attribute value for '{key}': {err}")))?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl XmlVisitor for Recorder {
        fn open(&mut self, name: &str, attributes: Attributes) {
            let attrs: Vec<String> = attributes.iter().map(|(k, v)| format!("{k}={v}")).collect();
            self.0.push(format!("<{name} {}>", attrs.join(",")));
        }

        fn close(&mut self, name: &str) {
            self.0.push(format!("</{name}>"));
        }

        fn text(&mut self, text: &str) {
            if !text.trim().is_empty() {
                self.0.push(text.trim().to_string());
            }
        }
    }

    #[test]
    fn strips_prefixes_and_expands_empty_elements() {
        let xml = r#"<pd:process xmlns:pd="urn:x" pd:name="A"><pd:starter ref="timer"/>a &amp; b</pd:process>"#;
        let mut recorder = Recorder::default();
        walk(xml, Path::new("a.process"), &mut recorder).unwrap();
        assert_eq!(
            recorder.0,
            vec![
                "<process name=A,pd=urn:x>",
                "<starter ref=timer>",
                "</starter>",
                "a & b",
                "</process>"
            ]
        );
    }

    #[test]
    fn mismatched_end_tag_is_syntax_error() {
        let mut recorder = Recorder::default();
        let err = walk("<a><b></a>", Path::new("bad.xml"), &mut recorder).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
