//! Identifier and path naming helpers

use mig_model::SemanticType;
use std::path::PathBuf;

/// Split text into words on non-alphanumerics and camelCase boundaries
fn words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in text.split(|c: char| !c.is_ascii_alphanumeric()).filter(|c| !c.is_empty()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut start = 0;
        for i in 1..chars.len() {
            let (prev, cur) = (chars[i - 1], chars[i]);
            let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if (prev.is_ascii_lowercase() && cur.is_ascii_uppercase())
                || (prev.is_ascii_uppercase() && cur.is_ascii_uppercase() && next_lower)
            {
                words.push(chars[start..i].iter().collect());
                start = i;
            }
        }
        words.push(chars[start..].iter().collect());
    }
    words
}

/// `loan-approval process` → `LoanApprovalProcess`
///
/// Never empty and never starts with a digit.
#[must_use]
pub fn pascal_case(text: &str) -> String {
    let mut out: String = words(text)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect();
    if out.is_empty() {
        out.push_str("Service");
    } else if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'S');
    }
    out
}

/// `LoanApproval` → `loanApproval`
#[must_use]
pub fn camel_case(text: &str) -> String {
    let pascal = pascal_case(text);
    let mut chars = pascal.chars();
    chars
        .next()
        .map_or_else(String::new, |first| first.to_ascii_lowercase().to_string() + chars.as_str())
}

/// `LoanApproval` → `loan-approval`
#[must_use]
pub fn kebab_case(text: &str) -> String {
    let joined = words(text)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if joined.is_empty() {
        "service".to_string()
    } else {
        joined
    }
}

/// `com.example.app` → `com/example/app`
#[must_use]
pub fn package_path(package: &str) -> PathBuf {
    package.split('.').collect()
}

/// Check that a package is a dotted sequence of Java identifiers
#[must_use]
pub fn is_valid_package(package: &str) -> bool {
    !package.is_empty()
        && package.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Java type for a semantic field type: simple name plus optional import
#[must_use]
pub fn java_type(ty: &SemanticType) -> (&'static str, Option<&'static str>) {
    match ty {
        SemanticType::Integer => ("Integer", None),
        SemanticType::Long => ("Long", None),
        SemanticType::Decimal => ("BigDecimal", Some("java.math.BigDecimal")),
        SemanticType::Double => ("Double", None),
        SemanticType::Boolean => ("Boolean", None),
        SemanticType::Date => ("LocalDate", Some("java.time.LocalDate")),
        SemanticType::DateTime => ("LocalDateTime", Some("java.time.LocalDateTime")),
        SemanticType::String | SemanticType::Other(_) => ("String", None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn case_conversions() {
        assert_eq!(pascal_case("loan-approval process"), "LoanApprovalProcess");
        assert_eq!(pascal_case("LoanApproval"), "LoanApproval");
        assert_eq!(pascal_case("2fa"), "S2fa");
        assert_eq!(pascal_case("--"), "Service");
        assert_eq!(camel_case("LoanApproval"), "loanApproval");
        assert_eq!(kebab_case("LoanApproval"), "loan-approval");
        assert_eq!(kebab_case("HTTPGateway v2"), "http-gateway-v2");
    }

    #[test]
    fn package_validation() {
        assert!(is_valid_package("com.example.migration"));
        assert!(!is_valid_package("com..example"));
        assert!(!is_valid_package("com.1example"));
        assert!(!is_valid_package(""));
        assert_eq!(package_path("com.example"), PathBuf::from("com/example"));
    }

    proptest! {
        #[test]
        fn pascal_case_is_java_identifier(text in ".{0,40}") {
            let name = pascal_case(&text);
            prop_assert!(name.starts_with(|c: char| c.is_ascii_uppercase()));
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
