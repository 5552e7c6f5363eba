//! Java and Maven text builders shared by the emitters

use crate::context::AnalysisContext;
use crate::error::EmitError;
use crate::naming::{camel_case, is_valid_package, java_type, kebab_case, package_path, pascal_case};
use mig_model::{
    ActivityDescriptor, ActivityKind, FileTag, GeneratedFileMap, SchemaField, SemanticType, ServiceHint, Transition,
};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::PathBuf;

const SPRING_BOOT_VERSION: &str = "3.2.5";
const JAVA_VERSION: &str = "17";

/// Reject packages that would produce invalid sources
pub(crate) fn checked_package(package: &str) -> Result<&str, EmitError> {
    if is_valid_package(package) {
        Ok(package)
    } else {
        Err(EmitError::InvalidPackage(package.to_string()))
    }
}

/// Files of one generated project, all under one root and one tag
#[derive(Debug)]
pub(crate) struct Project {
    root: PathBuf,
    package: String,
    tag: FileTag,
    files: GeneratedFileMap,
}

impl Project {
    pub(crate) fn new(root: impl Into<PathBuf>, package: impl Into<String>, tag: FileTag) -> Self {
        Self {
            root: root.into(),
            package: package.into(),
            tag,
            files: GeneratedFileMap::new(),
        }
    }

    pub(crate) fn package(&self) -> &str {
        &self.package
    }

    /// `<package>.<sub>`, or the package itself for an empty `sub`
    pub(crate) fn sub_package(&self, sub: &str) -> String {
        if sub.is_empty() {
            self.package.clone()
        } else {
            format!("{}.{sub}", self.package)
        }
    }

    pub(crate) fn add_java(&mut self, sub: &str, class: &str, content: String) {
        let mut path = self.root.join("src/main/java").join(package_path(&self.package));
        if !sub.is_empty() {
            path.push(package_path(sub));
        }
        path.push(format!("{class}.java"));
        self.files.insert(path, content, self.tag);
    }

    pub(crate) fn add_resource(&mut self, relative: &str, content: String) {
        self.files
            .insert(self.root.join("src/main/resources").join(relative), content, self.tag);
    }

    pub(crate) fn add_file(&mut self, relative: &str, content: String) {
        self.files.insert(self.root.join(relative), content, self.tag);
    }

    pub(crate) fn finish(self) -> GeneratedFileMap {
        self.files
    }
}

/// One service operation, derived from a process definition
#[derive(Debug)]
pub(crate) struct Operation<'a> {
    pub(crate) name: String,
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) activities: Vec<&'a ActivityDescriptor>,
    pub(crate) transitions: Vec<&'a Transition>,
}

/// Operations for a context; a unit without processes gets one `process` operation
pub(crate) fn operations(ctx: &AnalysisContext) -> Vec<Operation<'_>> {
    if ctx.processes.is_empty() {
        return vec![Operation {
            name: "process".to_string(),
            method: "process".to_string(),
            path: "process".to_string(),
            activities: Vec::new(),
            transitions: Vec::new(),
        }];
    }
    let mut seen = BTreeSet::new();
    ctx.processes
        .iter()
        .map(|p| {
            let mut method = camel_case(&p.name);
            let base = method.clone();
            let mut n = 2;
            while !seen.insert(method.clone()) {
                method = format!("{base}{n}");
                n += 1;
            }
            Operation {
                name: p.name.clone(),
                path: kebab_case(&method),
                method,
                activities: p.activities.iter().collect(),
                transitions: p.transitions.iter().collect(),
            }
        })
        .collect()
}

/// Request and response class names for a context
pub(crate) fn message_types(ctx: &AnalysisContext) -> (String, String) {
    let service = ctx.service_name();
    let request = ctx
        .entities()
        .first()
        .map_or_else(|| format!("{service}Request"), |e| pascal_case(&e.name));
    (request, format!("{service}Response"))
}

/// DTO annotation style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DtoStyle {
    Plain,
    Jaxb,
}

pub(crate) fn dto_class(package: &str, class: &str, fields: &[SchemaField], style: DtoStyle) -> String {
    let mut imports: BTreeSet<&str> = fields.iter().filter_map(|f| java_type(&f.ty).1).collect();
    if style == DtoStyle::Jaxb {
        imports.insert("jakarta.xml.bind.annotation.XmlAccessType");
        imports.insert("jakarta.xml.bind.annotation.XmlAccessorType");
        imports.insert("jakarta.xml.bind.annotation.XmlRootElement");
    }

    let mut out = format!("package {package};\n\n");
    for import in &imports {
        let _ = writeln!(out, "import {import};");
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    if style == DtoStyle::Jaxb {
        let _ = writeln!(out, "@XmlRootElement(name = \"{class}\")");
        out.push_str("@XmlAccessorType(XmlAccessType.FIELD)\n");
    }
    let _ = writeln!(out, "public class {class} {{");
    for field in fields {
        let _ = writeln!(out, "    private {} {};", java_type(&field.ty).0, camel_case(&field.name));
    }
    for field in fields {
        let ty = java_type(&field.ty).0;
        let name = camel_case(&field.name);
        let accessor = pascal_case(&field.name);
        let _ = write!(
            out,
            "\n    public {ty} get{accessor}() {{\n        return {name};\n    }}\n\n    public void set{accessor}({ty} {name}) {{\n        this.{name} = {name};\n    }}\n"
        );
    }
    out.push_str("}\n");
    out
}

/// Standard response fields
pub(crate) fn response_fields() -> Vec<SchemaField> {
    vec![
        SchemaField::new("status", SemanticType::String),
        SchemaField::new("message", SemanticType::String),
    ]
}

/// Fields of the request message: the first entity's, else a single `payload`
pub(crate) fn request_fields(ctx: &AnalysisContext) -> Vec<SchemaField> {
    ctx.entities().first().map_or_else(
        || vec![SchemaField::new("payload", SemanticType::String)],
        |e| e.fields.clone(),
    )
}

/// Request, response and schema-entity DTOs under `<package>.<sub>`
pub(crate) fn add_dtos(project: &mut Project, ctx: &AnalysisContext, sub: &str, style: DtoStyle) {
    let (request, response) = message_types(ctx);
    let package = project.sub_package(sub);
    let entities = ctx.entities();
    for entity in &entities {
        let class = pascal_case(&entity.name);
        project.add_java(sub, &class, dto_class(&package, &class, &entity.fields, style));
    }
    if entities.is_empty() {
        project.add_java(sub, &request, dto_class(&package, &request, &request_fields(ctx), style));
    }
    project.add_java(sub, &response, dto_class(&package, &response, &response_fields(), style));
}

/// Maven dependency coordinates
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dependency {
    pub(crate) group: &'static str,
    pub(crate) artifact: &'static str,
    pub(crate) scope: Option<&'static str>,
}

impl Dependency {
    const fn new(group: &'static str, artifact: &'static str) -> Self {
        Self {
            group,
            artifact,
            scope: None,
        }
    }

    const fn scoped(group: &'static str, artifact: &'static str, scope: &'static str) -> Self {
        Self {
            group,
            artifact,
            scope: Some(scope),
        }
    }
}

pub(crate) mod deps {
    use super::Dependency;

    const BOOT: &str = "org.springframework.boot";

    pub(crate) const WEB: Dependency = Dependency::new(BOOT, "spring-boot-starter-web");
    pub(crate) const VALIDATION: Dependency = Dependency::new(BOOT, "spring-boot-starter-validation");
    pub(crate) const WEB_SERVICES: Dependency = Dependency::new(BOOT, "spring-boot-starter-web-services");
    pub(crate) const WSDL4J: Dependency = Dependency::new("wsdl4j", "wsdl4j");
    pub(crate) const DATA_JPA: Dependency = Dependency::new(BOOT, "spring-boot-starter-data-jpa");
    pub(crate) const H2: Dependency = Dependency::scoped("com.h2database", "h2", "runtime");
    pub(crate) const ACTIVEMQ: Dependency = Dependency::new(BOOT, "spring-boot-starter-activemq");
    pub(crate) const WEBFLUX: Dependency = Dependency::new(BOOT, "spring-boot-starter-webflux");
    pub(crate) const GATEWAY: Dependency = Dependency::new("org.springframework.cloud", "spring-cloud-starter-gateway");
    pub(crate) const ACTUATOR: Dependency = Dependency::new(BOOT, "spring-boot-starter-actuator");
    pub(crate) const TEST: Dependency = Dependency::scoped(BOOT, "spring-boot-starter-test", "test");
}

/// Integration dependencies a context needs
pub(crate) fn integration_dependencies(ctx: &AnalysisContext) -> Vec<Dependency> {
    let mut out = Vec::new();
    if ctx.needs(ServiceHint::Database) {
        out.push(deps::DATA_JPA);
        out.push(deps::H2);
    }
    if ctx.needs(ServiceHint::Messaging) {
        out.push(deps::ACTIVEMQ);
    }
    if ctx.needs(ServiceHint::Http) {
        out.push(deps::WEBFLUX);
    }
    out
}

pub(crate) fn pom_xml(group: &str, artifact: &str, description: &str, dependencies: &[Dependency]) -> String {
    pom_xml_with(group, artifact, description, dependencies, "", "")
}

/// `pom.xml` with extra `<properties>` entries and a `<dependencyManagement>` block
pub(crate) fn pom_xml_with(
    group: &str,
    artifact: &str,
    description: &str,
    dependencies: &[Dependency],
    properties: &str,
    management: &str,
) -> String {
    let mut entries = String::new();
    for dep in dependencies.iter().chain(std::iter::once(&deps::TEST)) {
        let _ = write!(
            entries,
            "        <dependency>\n            <groupId>{}</groupId>\n            <artifactId>{}</artifactId>\n",
            dep.group, dep.artifact
        );
        if let Some(scope) = dep.scope {
            let _ = writeln!(entries, "            <scope>{scope}</scope>");
        }
        entries.push_str("        </dependency>\n");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>{SPRING_BOOT_VERSION}</version>
        <relativePath/>
    </parent>

    <groupId>{group}</groupId>
    <artifactId>{artifact}</artifactId>
    <version>0.1.0</version>
    <description>{description}</description>

    <properties>
        <java.version>{JAVA_VERSION}</java.version>
{properties}    </properties>

    <dependencies>
{entries}    </dependencies>
{management}
    <build>
        <plugins>
            <plugin>
                <groupId>org.springframework.boot</groupId>
                <artifactId>spring-boot-maven-plugin</artifactId>
            </plugin>
        </plugins>
    </build>
</project>
"#
    )
}

pub(crate) fn application_class(package: &str, class: &str) -> String {
    format!(
        "package {package};\n\nimport org.springframework.boot.SpringApplication;\nimport org.springframework.boot.autoconfigure.SpringBootApplication;\n\n@SpringBootApplication\npublic class {class} {{\n\n    public static void main(String[] args) {{\n        SpringApplication.run({class}.class, args);\n    }}\n}}\n"
    )
}

/// `application.yml` with sections for the integrations a context needs
pub(crate) fn application_yml(ctx: &AnalysisContext, app_name: &str, extra_spring: &str) -> String {
    let mut spring = format!("spring:\n  application:\n    name: {app_name}\n");
    spring.push_str(extra_spring);
    if ctx.needs(ServiceHint::Database) {
        spring.push_str(
            "  datasource:\n    url: jdbc:h2:mem:migration\n    username: sa\n    password:\n  jpa:\n    hibernate:\n      ddl-auto: update\n",
        );
    }
    if ctx.needs(ServiceHint::Messaging) {
        spring.push_str("  activemq:\n    broker-url: tcp://localhost:61616\n");
    }

    let mut out = spring;
    out.push_str("\nserver:\n  port: 8080\n");
    if ctx.needs(ServiceHint::Http) {
        let _ = write!(
            out,
            "\n{}:\n  client:\n    base-url: {}\n",
            kebab_case(&ctx.service_name()),
            http_base_url(ctx)
        );
    }
    out
}

fn http_base_url(ctx: &AnalysisContext) -> String {
    ctx.activities()
        .filter(|a| a.kind == ActivityKind::HttpCall)
        .find_map(|a| a.config_value("url"))
        .unwrap_or("http://localhost:8081")
        .to_string()
}

/// Queue names referenced by messaging activities, sorted
pub(crate) fn queues(ctx: &AnalysisContext) -> Vec<String> {
    let mut queues: BTreeSet<String> = ctx
        .activities()
        .filter(|a| a.kind == ActivityKind::MessageCall)
        .filter_map(|a| a.config_value("queue"))
        .map(str::to_string)
        .collect();
    if queues.is_empty() {
        queues.insert(format!("{}.events", kebab_case(&ctx.service_name())));
    }
    queues.into_iter().collect()
}

/// Repository, JMS and WebClient wiring under `<package>.<base>`
pub(crate) fn add_integrations(project: &mut Project, ctx: &AnalysisContext, base: &str) {
    let service = ctx.service_name();
    let join = |sub: &str| if base.is_empty() { sub.to_string() } else { format!("{base}.{sub}") };

    if ctx.needs(ServiceHint::Database) {
        let sub = join("repository");
        let package = project.sub_package(&sub);
        let record = format!("{service}Record");
        project.add_java(&sub, &record, record_entity(&package, &record, ctx));
        project.add_java(
            &sub,
            &format!("{service}Repository"),
            format!(
                "package {package};\n\nimport org.springframework.data.jpa.repository.JpaRepository;\nimport org.springframework.stereotype.Repository;\n\n@Repository\npublic interface {service}Repository extends JpaRepository<{record}, Long> {{\n}}\n"
            ),
        );
    }

    if ctx.needs(ServiceHint::Messaging) {
        let sub = join("config");
        let package = project.sub_package(&sub);
        let mut constants = String::new();
        for queue in queues(ctx) {
            let constant = kebab_case(&queue).replace('-', "_").to_ascii_uppercase();
            let _ = writeln!(constants, "    public static final String {constant}_QUEUE = \"{queue}\";");
        }
        project.add_java(
            &sub,
            "JmsConfig",
            format!(
                "package {package};\n\nimport org.springframework.context.annotation.Configuration;\nimport org.springframework.jms.annotation.EnableJms;\n\n@Configuration\n@EnableJms\npublic class JmsConfig {{\n{constants}}}\n"
            ),
        );
    }

    if ctx.needs(ServiceHint::Http) {
        let sub = join("config");
        let package = project.sub_package(&sub);
        let property = kebab_case(&service);
        project.add_java(
            &sub,
            "RestClientConfig",
            format!(
                "package {package};\n\nimport org.springframework.beans.factory.annotation.Value;\nimport org.springframework.context.annotation.Bean;\nimport org.springframework.context.annotation.Configuration;\nimport org.springframework.web.reactive.function.client.WebClient;\n\n@Configuration\npublic class RestClientConfig {{\n\n    @Value(\"${{{property}.client.base-url}}\")\n    private String baseUrl;\n\n    @Bean\n    public WebClient webClient() {{\n        return WebClient.builder().baseUrl(baseUrl).build();\n    }}\n}}\n"
            ),
        );
    }
}

fn record_entity(package: &str, class: &str, ctx: &AnalysisContext) -> String {
    let fields: Vec<SchemaField> = ctx
        .entities()
        .first()
        .map(|e| e.fields.clone())
        .unwrap_or_default();
    let mut imports: BTreeSet<&str> = fields.iter().filter_map(|f| java_type(&f.ty).1).collect();
    imports.extend([
        "jakarta.persistence.Entity",
        "jakarta.persistence.GeneratedValue",
        "jakarta.persistence.Id",
        "jakarta.persistence.Table",
    ]);

    let mut out = format!("package {package};\n\n");
    for import in &imports {
        let _ = writeln!(out, "import {import};");
    }
    let table = kebab_case(class).replace('-', "_");
    let _ = write!(
        out,
        "\n@Entity\n@Table(name = \"{table}\")\npublic class {class} {{\n\n    @Id\n    @GeneratedValue\n    private Long id;\n\n    private String status;\n"
    );
    for field in &fields {
        let _ = writeln!(out, "    private {} {};", java_type(&field.ty).0, camel_case(&field.name));
    }
    out.push_str(
        "\n    public Long getId() {\n        return id;\n    }\n\n    public String getStatus() {\n        return status;\n    }\n\n    public void setStatus(String status) {\n        this.status = status;\n    }\n",
    );
    for field in &fields {
        let ty = java_type(&field.ty).0;
        let name = camel_case(&field.name);
        let accessor = pascal_case(&field.name);
        let _ = write!(
            out,
            "\n    public {ty} get{accessor}() {{\n        return {name};\n    }}\n\n    public void set{accessor}({ty} {name}) {{\n        this.{name} = {name};\n    }}\n"
        );
    }
    out.push_str("}\n");
    out
}

/// Comment lines describing an operation's activities and flow
pub(crate) fn activity_comments(op: &Operation<'_>, indent: &str) -> String {
    let mut out = String::new();
    for activity in &op.activities {
        let detail = match activity.kind {
            ActivityKind::DatabaseCall => activity.config_value("sql").map(str::to_string),
            ActivityKind::MessageCall => activity.config_value("queue").map(|q| format!("queue {q}")),
            ActivityKind::HttpCall => activity.config_value("url").map(|u| {
                format!("{} {u}", activity.config_value("method").unwrap_or("POST"))
            }),
            ActivityKind::Generic(_) => None,
        };
        match detail {
            Some(detail) => {
                let _ = writeln!(out, "{indent}// {} ({}): {}", activity.name, activity.kind, one_line(&detail));
            }
            None => {
                let _ = writeln!(out, "{indent}// {} ({})", activity.name, activity.kind);
            }
        }
    }
    for transition in &op.transitions {
        match transition.condition.as_deref() {
            Some(condition) => {
                let _ = writeln!(out, "{indent}// flow: {} -> {} when {}", transition.from, transition.to, one_line(condition));
            }
            None => {
                let _ = writeln!(out, "{indent}// flow: {} -> {}", transition.from, transition.to);
            }
        }
    }
    out
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Layered service class shared by the REST and SOAP projects
pub(crate) fn service_class(project: &Project, ctx: &AnalysisContext, request: &str, response: &str) -> String {
    let package = project.sub_package("service");
    let service = ctx.service_name();
    let db = ctx.needs(ServiceHint::Database);
    let jms = ctx.needs(ServiceHint::Messaging);
    let http = ctx.needs(ServiceHint::Http);

    let mut imports = vec![
        format!("{}.dto.{request}", project.package()),
        format!("{}.dto.{response}", project.package()),
        "org.springframework.stereotype.Service".to_string(),
    ];
    let mut fields = Vec::new();
    if db {
        imports.push(format!("{}.repository.{service}Record", project.package()));
        imports.push(format!("{}.repository.{service}Repository", project.package()));
        fields.push((format!("{service}Repository"), "repository"));
    }
    if jms {
        imports.push("org.springframework.jms.core.JmsTemplate".to_string());
        fields.push(("JmsTemplate".to_string(), "jmsTemplate"));
    }
    if http {
        imports.push("org.springframework.web.reactive.function.client.WebClient".to_string());
        fields.push(("WebClient".to_string(), "webClient"));
    }
    imports.sort();

    let mut out = format!("package {package};\n\n");
    for import in &imports {
        let _ = writeln!(out, "import {import};");
    }
    let _ = writeln!(out, "\n@Service\npublic class {service}Service {{");
    if !fields.is_empty() {
        out.push('\n');
        for (ty, name) in &fields {
            let _ = writeln!(out, "    private final {ty} {name};");
        }
        let params: Vec<String> = fields.iter().map(|(ty, name)| format!("{ty} {name}")).collect();
        let _ = writeln!(out, "\n    public {service}Service({}) {{", params.join(", "));
        for (_, name) in &fields {
            let _ = writeln!(out, "        this.{name} = {name};");
        }
        out.push_str("    }\n");
    }

    let queue = queues(ctx).into_iter().next().unwrap_or_default();
    for op in operations(ctx) {
        let _ = writeln!(out, "\n    public {response} {}({request} request) {{", op.method);
        out.push_str(&activity_comments(&op, "        "));
        if db {
            let _ = writeln!(out, "        {service}Record record = new {service}Record();\n        record.setStatus(\"RECEIVED\");\n        repository.save(record);");
        }
        if http {
            out.push_str("        webClient.post()\n            .bodyValue(request)\n            .retrieve()\n            .toBodilessEntity()\n            .block();\n");
        }
        if jms {
            let _ = writeln!(out, "        jmsTemplate.convertAndSend(\"{queue}\", String.valueOf(request));");
        }
        let _ = writeln!(
            out,
            "        {response} response = new {response}();\n        response.setStatus(\"COMPLETED\");\n        response.setMessage(\"{} processed\");\n        return response;\n    }}",
            op.name
        );
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dto_imports_only_needed_types() {
        let fields = vec![
            SchemaField::new("amount", SemanticType::Decimal),
            SchemaField::new("term", SemanticType::Integer),
        ];
        let java = dto_class("com.example.dto", "LoanRequest", &fields, DtoStyle::Plain);
        assert!(java.starts_with("package com.example.dto;\n\nimport java.math.BigDecimal;\n"));
        assert!(java.contains("    private BigDecimal amount;\n"));
        assert!(java.contains("    public Integer getTerm() {"));
        assert!(!java.contains("XmlRootElement"));
    }

    #[test]
    fn jaxb_dto_is_annotated() {
        let java = dto_class("p", "Ping", &[], DtoStyle::Jaxb);
        assert!(java.contains("@XmlRootElement(name = \"Ping\")"));
        assert!(java.contains("@XmlAccessorType(XmlAccessType.FIELD)"));
    }

    #[test]
    fn project_paths_follow_package() {
        let mut project = Project::new("/out/rest", "com.example", FileTag::Shared);
        project.add_java("dto", "A", String::new());
        project.add_java("", "App", String::new());
        project.add_resource("application.yml", String::new());
        let paths: Vec<String> = project
            .finish()
            .paths()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/out/rest/src/main/java/com/example/App.java",
                "/out/rest/src/main/java/com/example/dto/A.java",
                "/out/rest/src/main/resources/application.yml",
            ]
        );
    }

    #[test]
    fn pom_lists_dependencies_and_test_scope() {
        let pom = pom_xml("com.example", "loan-rest", "d", &[deps::WEB]);
        assert!(pom.contains("<artifactId>spring-boot-starter-web</artifactId>"));
        assert!(pom.contains("<scope>test</scope>"));
        assert!(pom.contains("<artifactId>loan-rest</artifactId>"));
    }
}
