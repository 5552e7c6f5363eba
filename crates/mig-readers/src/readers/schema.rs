//! XML schema reader
//!
//! Extracts each top-level `element` and the fields of its
//! `complexType/sequence` (or `complexType/all`).

use super::ArtifactReader;
use crate::error::ParseError;
use crate::xml::{walk, Attributes, XmlVisitor};
use mig_model::{ArtifactKind, SchemaEntity, SchemaField, SemanticType};
use std::path::Path;

/// Reader for `.xsd` files
///
/// Returns entities in declaration order. A redeclared element replaces
/// the earlier one in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaReader;

impl ArtifactReader for SchemaReader {
    type Output = Vec<SchemaEntity>;

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Schema
    }

    fn parse(&self, content: &str, path: &Path) -> Result<Vec<SchemaEntity>, ParseError> {
        let mut builder = SchemaBuilder::default();
        walk(content, path, &mut builder)?;

        match builder.root.as_deref() {
            None => Err(ParseError::MissingRoot(path.to_path_buf())),
            Some("schema") => {
                tracing::debug!(path = %path.display(), entities = builder.entities.len(), "parsed schema");
                Ok(builder.entities)
            }
            Some(other) => Err(ParseError::UnexpectedRoot {
                path: path.to_path_buf(),
                expected: "schema",
                found: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct SchemaBuilder {
    root: Option<String>,
    stack: Vec<String>,
    current: Option<SchemaEntity>,
    entities: Vec<SchemaEntity>,
}

impl SchemaBuilder {
    fn path_is(&self, expected: &[&str]) -> bool {
        self.stack.len() == expected.len() && self.stack.iter().zip(expected).all(|(a, b)| a == b)
    }

    fn finish_entity(&mut self) {
        let Some(entity) = self.current.take() else {
            return;
        };
        match self.entities.iter_mut().find(|e| e.name == entity.name) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }
}

impl XmlVisitor for SchemaBuilder {
    fn open(&mut self, name: &str, mut attributes: Attributes) {
        if self.root.is_none() {
            self.root = Some(name.to_string());
        }

        if name == "element" {
            if self.path_is(&["schema"]) {
                self.current = attributes
                    .remove("name")
                    .map(|entity| SchemaEntity::new(entity, Vec::new()));
            } else if self.path_is(&["schema", "element", "complexType", "sequence"])
                || self.path_is(&["schema", "element", "complexType", "all"])
            {
                if let (Some(entity), Some(field)) = (self.current.as_mut(), attributes.remove("name")) {
                    let ty = attributes.remove("type").unwrap_or_default();
                    entity.fields.push(SchemaField::new(field, SemanticType::from_schema_type(&ty)));
                }
            }
        }

        self.stack.push(name.to_string());
    }

    fn close(&mut self, name: &str) {
        self.stack.pop();
        if name == "element" && self.path_is(&["schema"]) {
            self.finish_entity();
        }
    }

    fn text(&mut self, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOAN: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="LoanRequest">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="amount" type="xs:decimal"/>
        <xs:element name="term" type="xs:int"/>
        <xs:element name="address">
          <xs:complexType><xs:sequence><xs:element name="street" type="xs:string"/></xs:sequence></xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:element name="Ping"/>
</xs:schema>"#;

    #[test]
    fn extracts_top_level_entities_in_order() {
        let entities = SchemaReader.parse(LOAN, Path::new("Loan.xsd")).unwrap();
        assert_eq!(
            entities,
            vec![
                SchemaEntity::new(
                    "LoanRequest",
                    vec![
                        SchemaField::new("amount", SemanticType::Decimal),
                        SchemaField::new("term", SemanticType::Integer),
                        SchemaField::new("address", SemanticType::String),
                    ]
                ),
                SchemaEntity::new("Ping", Vec::new()),
            ]
        );
    }

    #[test]
    fn redeclared_element_replaces_earlier() {
        let xml = r#"<schema>
            <element name="A"><complexType><sequence><element name="x" type="int"/></sequence></complexType></element>
            <element name="A"><complexType><all><element name="y" type="long"/></all></complexType></element>
        </schema>"#;
        let entities = SchemaReader.parse(xml, Path::new("a.xsd")).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].fields, vec![SchemaField::new("y", SemanticType::Long)]);
    }

    #[test]
    fn non_schema_root_is_rejected() {
        let err = SchemaReader.parse("<process/>", Path::new("a.xsd")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedRoot { .. }));
    }
}
