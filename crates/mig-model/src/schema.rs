//! Schema-declared entities

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Semantic field type, independent of any target language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    String,
    Integer,
    Long,
    Decimal,
    Double,
    Boolean,
    Date,
    DateTime,
    /// Unmapped type name (prefix stripped)
    Other(std::string::String),
}

impl SemanticType {
    /// Map a schema type name such as `xs:decimal`
    #[must_use]
    pub fn from_schema_type(raw: &str) -> Self {
        let local = raw.rsplit(':').next().unwrap_or(raw).trim();
        match local {
            "string" | "normalizedString" | "token" => Self::String,
            "int" | "integer" | "short" | "byte" => Self::Integer,
            "long" => Self::Long,
            "decimal" => Self::Decimal,
            "double" | "float" => Self::Double,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "dateTime" => Self::DateTime,
            "" => Self::String,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for SemanticType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Decimal => f.write_str("decimal"),
            Self::Double => f.write_str("double"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::DateTime => f.write_str("dateTime"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// One entity field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name
    pub name: String,
    /// Semantic type
    pub ty: SemanticType,
}

impl SchemaField {
    /// Create field
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A declared entity with ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntity {
    /// Declared element name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<SchemaField>,
}

impl SchemaEntity {
    /// Create entity
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_type_mapping() {
        assert_eq!(SemanticType::from_schema_type("xs:decimal"), SemanticType::Decimal);
        assert_eq!(SemanticType::from_schema_type("int"), SemanticType::Integer);
        assert_eq!(SemanticType::from_schema_type("xsd:dateTime"), SemanticType::DateTime);
        assert_eq!(
            SemanticType::from_schema_type("tns:Address"),
            SemanticType::Other("Address".to_string())
        );
    }
}
