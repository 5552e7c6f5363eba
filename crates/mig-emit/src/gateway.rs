//! API gateway project
//!
//! Built once per run, after every unit has been dispatched. Routes are
//! declared in `application.yml`; each upstream URI can be overridden by an
//! environment variable.

use crate::error::EmitError;
use crate::java::{application_class, checked_package, deps, pom_xml_with, Project};
use crate::naming::kebab_case;
use mig_model::{FileTag, GeneratedFileMap, ProtocolTag};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const SPRING_CLOUD_VERSION: &str = "2023.0.1";

/// One upstream service exposed through the gateway
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GatewayRoute {
    /// Service class-name stem, e.g. `LoanApproval`
    pub service: String,
    /// Exposure style of the upstream
    pub protocol: ProtocolTag,
    /// Default upstream port
    pub port: u16,
}

impl GatewayRoute {
    /// Create route
    pub fn new(service: impl Into<String>, protocol: ProtocolTag, port: u16) -> Self {
        Self {
            service: service.into(),
            protocol,
            port,
        }
    }

    /// Route id, e.g. `loan-approval-rest`
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}-{}", kebab_case(&self.service), self.protocol)
    }

    /// Public path predicate
    #[must_use]
    pub fn path(&self) -> String {
        match self.protocol {
            ProtocolTag::Rest => format!("/api/{}/**", kebab_case(&self.service)),
            ProtocolTag::Soap => format!("/ws/{}/**", kebab_case(&self.service)),
        }
    }

    /// Environment variable overriding the upstream URI
    #[must_use]
    pub fn env_var(&self) -> String {
        self.id().replace('-', "_").to_ascii_uppercase() + "_URL"
    }
}

/// Emits a Spring Cloud Gateway project routing to every generated service
#[derive(Debug, Clone)]
pub struct GatewayEmitter {
    root: PathBuf,
    package: String,
}

impl GatewayEmitter {
    /// Directory name of the gateway project under the output root
    pub const DIR: &'static str = "api-gateway";

    /// Create emitter writing under `<output_root>/api-gateway`
    pub fn new(output_root: &Path, package: impl Into<String>) -> Self {
        Self {
            root: output_root.join(Self::DIR),
            package: package.into(),
        }
    }

    /// Project root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Produce the gateway project for the given routes
    ///
    /// Routes are sorted and deduplicated, so the output does not depend on
    /// the order units finished in.
    pub fn emit(&self, routes: &[GatewayRoute]) -> Result<GeneratedFileMap, EmitError> {
        let base = checked_package(&self.package)?;
        let package = format!("{base}.gateway");
        let mut routes = routes.to_vec();
        routes.sort();
        routes.dedup_by(|a, b| a.id() == b.id());

        let mut project = Project::new(&self.root, package.as_str(), FileTag::Gateway);
        project.add_java("", "GatewayApplication", application_class(&package, "GatewayApplication"));
        project.add_java("config", "CorsConfig", cors_config(&package));
        project.add_resource("application.yml", application_yml(&routes));
        project.add_file(
            "pom.xml",
            pom_xml_with(
                base,
                Self::DIR,
                "API gateway for migrated services",
                &[deps::GATEWAY, deps::ACTUATOR],
                &format!("        <spring-cloud.version>{SPRING_CLOUD_VERSION}</spring-cloud.version>\n"),
                "\n    <dependencyManagement>\n        <dependencies>\n            <dependency>\n                <groupId>org.springframework.cloud</groupId>\n                <artifactId>spring-cloud-dependencies</artifactId>\n                <version>${spring-cloud.version}</version>\n                <type>pom</type>\n                <scope>import</scope>\n            </dependency>\n        </dependencies>\n    </dependencyManagement>\n",
            ),
        );
        project.add_file("README.md", readme(&routes));

        let files = project.finish();
        tracing::info!(routes = routes.len(), files = files.len(), "emitted API gateway");
        Ok(files)
    }
}

fn application_yml(routes: &[GatewayRoute]) -> String {
    let mut out = String::from("spring:\n  application:\n    name: api-gateway\n  cloud:\n    gateway:\n      routes:");
    if routes.is_empty() {
        out.push_str(" []\n");
    } else {
        out.push('\n');
    }
    for route in routes {
        let _ = write!(
            out,
            "        - id: {}\n          uri: ${{{}:http://localhost:{}}}\n          predicates:\n            - Path={}\n          filters:\n            - AddRequestHeader=X-Gateway-Route, {}\n",
            route.id(),
            route.env_var(),
            route.port,
            route.path(),
            route.id()
        );
        if route.protocol == ProtocolTag::Rest {
            out.push_str("            - name: Retry\n              args:\n                retries: 3\n");
        }
    }
    out.push_str("\nserver:\n  port: 8080\n\nmanagement:\n  endpoints:\n    web:\n      exposure:\n        include: health,info,gateway\n");
    out
}

fn cors_config(package: &str) -> String {
    format!(
        r#"package {package}.config;

import java.util.List;
import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;
import org.springframework.web.cors.CorsConfiguration;
import org.springframework.web.cors.reactive.CorsWebFilter;
import org.springframework.web.cors.reactive.UrlBasedCorsConfigurationSource;

@Configuration
public class CorsConfig {{

    @Bean
    public CorsWebFilter corsWebFilter() {{
        CorsConfiguration config = new CorsConfiguration();
        config.setAllowedOriginPatterns(List.of("*"));
        config.setAllowedMethods(List.of("GET", "POST", "PUT", "DELETE", "OPTIONS"));
        config.setAllowedHeaders(List.of("*"));

        UrlBasedCorsConfigurationSource source = new UrlBasedCorsConfigurationSource();
        source.registerCorsConfiguration("/**", config);
        return new CorsWebFilter(source);
    }}
}}
"#
    )
}

fn readme(routes: &[GatewayRoute]) -> String {
    let mut out = String::from("# API Gateway\n\nSingle entry point on port 8080.\n\n| route | path | upstream | override |\n|---|---|---|---|\n");
    for route in routes {
        let _ = writeln!(
            out,
            "| {} | `{}` | `http://localhost:{}` | `{}` |",
            route.id(),
            route.path(),
            route.port,
            route.env_var()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_sorted_and_overridable() {
        let emitter = GatewayEmitter::new(Path::new("/out"), "com.example");
        let routes = vec![
            GatewayRoute::new("Settlement", ProtocolTag::Rest, 8082),
            GatewayRoute::new("LoanApproval", ProtocolTag::Soap, 8081),
            GatewayRoute::new("LoanApproval", ProtocolTag::Rest, 8081),
            GatewayRoute::new("LoanApproval", ProtocolTag::Rest, 8081),
        ];
        let files = emitter.emit(&routes).unwrap();
        assert!(files.is_rooted_under(Path::new("/out/api-gateway")));
        assert_eq!(files.tags(), vec![FileTag::Gateway]);

        let yml = &files
            .get(Path::new("/out/api-gateway/src/main/resources/application.yml"))
            .unwrap()
            .content;
        assert_eq!(yml.matches("- id: ").count(), 3);
        let rest = yml.find("- id: loan-approval-rest").unwrap();
        let soap = yml.find("- id: loan-approval-soap").unwrap();
        let settlement = yml.find("- id: settlement-rest").unwrap();
        assert!(rest < soap && soap < settlement);
        assert!(yml.contains("uri: ${LOAN_APPROVAL_SOAP_URL:http://localhost:8081}"));
        assert!(yml.contains("- Path=/ws/loan-approval/**"));
    }

    #[test]
    fn pom_imports_cloud_bom() {
        let files = GatewayEmitter::new(Path::new("/out"), "com.example").emit(&[]).unwrap();
        let pom = &files.get(Path::new("/out/api-gateway/pom.xml")).unwrap().content;
        assert!(pom.contains("<artifactId>spring-cloud-dependencies</artifactId>"));
        assert!(pom.contains("<spring-cloud.version>2023.0.1</spring-cloud.version>"));
        assert!(pom.contains("spring-cloud-starter-gateway"));
    }

    #[test]
    fn invalid_package_is_rejected() {
        let emitter = GatewayEmitter::new(Path::new("/out"), "1bad");
        assert!(matches!(emitter.emit(&[]), Err(EmitError::InvalidPackage(_))));
    }
}
