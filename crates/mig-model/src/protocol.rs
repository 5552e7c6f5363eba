//! Generation selectors: protocols, architectures, service types

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Unknown selector value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct SelectorError {
    /// Selector family
    pub kind: &'static str,
    /// Rejected value
    pub value: String,
    /// Accepted values
    pub expected: &'static str,
}

impl SelectorError {
    fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Service-exposure protocol a unit needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolTag {
    /// Request/response over HTTP + JSON
    Rest,
    /// Schema-typed request/response
    Soap,
}

impl ProtocolTag {
    /// All protocol tags
    pub const ALL: [ProtocolTag; 2] = [ProtocolTag::Rest, ProtocolTag::Soap];

    /// Lowercase name, also used as the output directory segment
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Soap => "soap",
        }
    }
}

impl Display for ProtocolTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolTag {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "soap" => Ok(Self::Soap),
            _ => Err(SelectorError::new("protocol", s, "rest, soap")),
        }
    }
}

/// Service kind suggested by similarity lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHint {
    /// Outbound HTTP integration
    Http,
    /// Queue-based messaging
    Messaging,
    /// Relational persistence
    Database,
}

/// Generation architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// One project per detected protocol
    #[default]
    Layered,
    /// One project with a domain core and pluggable adapters
    Hexagonal,
}

impl Architecture {
    /// Lower-case name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Layered => "layered",
            Self::Hexagonal => "hexagonal",
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "layered" => Ok(Self::Layered),
            "hexagonal" => Ok(Self::Hexagonal),
            _ => Err(SelectorError::new("architecture", s, "layered, hexagonal")),
        }
    }
}

/// Adapter selection for hexagonal generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// REST adapter only
    Rest,
    /// SOAP adapter only
    Soap,
    /// Both adapters over one domain
    #[default]
    Combined,
}

impl ServiceType {
    /// Lower-case name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Soap => "soap",
            Self::Combined => "combined",
        }
    }

    /// Protocols whose adapters this service type requires
    #[must_use]
    pub fn protocols(self) -> &'static [ProtocolTag] {
        match self {
            Self::Rest => &[ProtocolTag::Rest],
            Self::Soap => &[ProtocolTag::Soap],
            Self::Combined => &ProtocolTag::ALL,
        }
    }
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "soap" => Ok(Self::Soap),
            "combined" => Ok(Self::Combined),
            _ => Err(SelectorError::new("service type", s, "rest, soap, combined")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_parse_case_insensitively() {
        assert_eq!("REST".parse::<ProtocolTag>().unwrap(), ProtocolTag::Rest);
        assert_eq!("Hexagonal".parse::<Architecture>().unwrap(), Architecture::Hexagonal);
        assert_eq!("combined".parse::<ServiceType>().unwrap(), ServiceType::Combined);
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let err = "grpc".parse::<ProtocolTag>().unwrap_err();
        assert!(err.to_string().contains("unknown protocol 'grpc'"));
    }

    #[test]
    fn service_type_protocols() {
        assert_eq!(ServiceType::Soap.protocols(), &[ProtocolTag::Soap]);
        assert_eq!(ServiceType::Combined.protocols().len(), 2);
    }
}
