//! Domain core, ports, output adapters and wiring

use super::{copy_fields, project, OutputPort};
use crate::context::AnalysisContext;
use crate::emitter::Emitter;
use crate::error::EmitError;
use crate::java::{
    activity_comments, add_dtos, add_integrations, application_class, application_yml, deps, integration_dependencies,
    message_types, operations, pom_xml, queues, request_fields, Dependency, DtoStyle, Project,
};
use crate::naming::{camel_case, kebab_case};
use mig_model::{FileTag, GeneratedFileMap, ProtocolTag, ServiceType};
use std::fmt::Write as _;

/// Emits everything in the hexagonal project except the input adapters
#[derive(Debug, Clone, Copy, Default)]
pub struct HexagonalDomainEmitter;

impl Emitter for HexagonalDomainEmitter {
    fn emit(&self, ctx: &AnalysisContext, service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
        let mut project = project(ctx, FileTag::HexagonalDomain)?;
        let service = ctx.service_name();
        let artifact = format!("{}-hexagonal-{}", kebab_case(&service), service_type.as_str());
        let (request, response) = message_types(ctx);
        let ports = OutputPort::required(ctx);

        add_dtos(&mut project, ctx, "domain.model", DtoStyle::Plain);
        project.add_java(
            "domain.port.input",
            &format!("{service}UseCase"),
            use_case(&project, ctx, &request, &response),
        );
        for port in &ports {
            project.add_java("domain.port.output", port.interface(), output_port(&project, *port, &request));
        }
        project.add_java(
            "domain.service",
            &format!("{service}Service"),
            domain_service(&project, ctx, &ports, &request, &response),
        );

        add_integrations(&mut project, ctx, "adapter.output");
        for port in &ports {
            let source = output_adapter(&project, ctx, *port, &request);
            project.add_java(port.adapter_package(), port.adapter(), source);
        }

        project.add_java("config", "AdapterConfig", adapter_config(&project, &service, &ports));
        let package = project.package().to_string();
        project.add_java("", &format!("{service}Application"), application_class(&package, &format!("{service}Application")));

        let extra = if service_type.protocols().contains(&ProtocolTag::Soap) {
            "  webservices:\n    path: /ws\n"
        } else {
            ""
        };
        project.add_resource("application.yml", application_yml(ctx, &artifact, extra));
        project.add_file(
            "pom.xml",
            pom_xml(
                ctx.package(),
                &artifact,
                &format!("Hexagonal {} service migrated from {}", service_type.as_str(), ctx.unit_name()),
                &dependencies(ctx, service_type),
            ),
        );
        project.add_file("README.md", readme(ctx, service_type, &ports));

        let files = project.finish();
        tracing::debug!(
            unit = %ctx.unit().name(),
            service_type = %service_type.as_str(),
            files = files.len(),
            "emitted hexagonal domain"
        );
        Ok(files)
    }
}

fn dependencies(ctx: &AnalysisContext, service_type: ServiceType) -> Vec<Dependency> {
    let mut out = Vec::new();
    for protocol in service_type.protocols() {
        match protocol {
            ProtocolTag::Rest => out.extend([deps::WEB, deps::VALIDATION]),
            ProtocolTag::Soap => out.extend([deps::WEB_SERVICES, deps::WSDL4J]),
        }
    }
    out.extend(integration_dependencies(ctx));
    out
}

fn use_case(project: &Project, ctx: &AnalysisContext, request: &str, response: &str) -> String {
    let base = project.package();
    let mut out = format!(
        "package {base}.domain.port.input;\n\nimport {base}.domain.model.{request};\nimport {base}.domain.model.{response};\n\n/**\n * Inbound port: what the service offers, independent of transport.\n */\npublic interface {}UseCase {{\n",
        ctx.service_name()
    );
    for op in operations(ctx) {
        let _ = writeln!(out, "\n    {response} {}({request} request);", op.method);
    }
    out.push_str("}\n");
    out
}

fn output_port(project: &Project, port: OutputPort, request: &str) -> String {
    let base = project.package();
    let (imports, method) = match port {
        OutputPort::Persistence => (
            format!("import {base}.domain.model.{request};\n\n"),
            format!("void save({request} request, String status);"),
        ),
        OutputPort::Messaging => (String::new(), "void publish(String destination, String payload);".to_string()),
        OutputPort::HttpClient => (
            format!("import {base}.domain.model.{request};\n\n"),
            format!("void send({request} request);"),
        ),
    };
    format!(
        "package {base}.domain.port.output;\n\n{imports}public interface {} {{\n\n    {method}\n}}\n",
        port.interface()
    )
}

fn domain_service(
    project: &Project,
    ctx: &AnalysisContext,
    ports: &[OutputPort],
    request: &str,
    response: &str,
) -> String {
    let base = project.package();
    let service = ctx.service_name();
    let mut out = format!(
        "package {base}.domain.service;\n\nimport {base}.domain.model.{request};\nimport {base}.domain.model.{response};\nimport {base}.domain.port.input.{service}UseCase;\n"
    );
    for port in ports {
        let _ = writeln!(out, "import {base}.domain.port.output.{};", port.interface());
    }
    let _ = writeln!(out, "\npublic class {service}Service implements {service}UseCase {{");
    if !ports.is_empty() {
        out.push('\n');
        for port in ports {
            let _ = writeln!(out, "    private final {} {};", port.interface(), port.field());
        }
        let params: Vec<String> = ports.iter().map(|p| format!("{} {}", p.interface(), p.field())).collect();
        let _ = writeln!(out, "\n    public {service}Service({}) {{", params.join(", "));
        for port in ports {
            let _ = writeln!(out, "        this.{0} = {0};", port.field());
        }
        out.push_str("    }\n");
    }

    let queue = queues(ctx).into_iter().next().unwrap_or_default();
    for op in operations(ctx) {
        let _ = writeln!(out, "\n    @Override\n    public {response} {}({request} request) {{", op.method);
        out.push_str(&activity_comments(&op, "        "));
        for port in ports {
            let call = match port {
                OutputPort::Persistence => "save(request, \"RECEIVED\")".to_string(),
                OutputPort::HttpClient => "send(request)".to_string(),
                OutputPort::Messaging => format!("publish(\"{queue}\", String.valueOf(request))"),
            };
            let _ = writeln!(out, "        {}.{call};", port.field());
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

fn output_adapter(project: &Project, ctx: &AnalysisContext, port: OutputPort, request: &str) -> String {
    let base = project.package();
    let package = project.sub_package(port.adapter_package());
    let service = ctx.service_name();
    let interface = port.interface();
    let adapter = port.adapter();
    match port {
        OutputPort::Persistence => {
            let copy = if ctx.entities().is_empty() {
                String::new()
            } else {
                copy_fields(&request_fields(ctx), "request", "record", "        ")
            };
            format!(
                "package {package};\n\nimport {base}.adapter.output.repository.{service}Record;\nimport {base}.adapter.output.repository.{service}Repository;\nimport {base}.domain.model.{request};\nimport {base}.domain.port.output.{interface};\nimport org.springframework.stereotype.Component;\n\n@Component\npublic class {adapter} implements {interface} {{\n\n    private final {service}Repository repository;\n\n    public {adapter}({service}Repository repository) {{\n        this.repository = repository;\n    }}\n\n    @Override\n    public void save({request} request, String status) {{\n        {service}Record record = new {service}Record();\n        record.setStatus(status);\n{copy}        repository.save(record);\n    }}\n}}\n"
            )
        }
        OutputPort::Messaging => format!(
            "package {package};\n\nimport {base}.domain.port.output.{interface};\nimport org.springframework.jms.core.JmsTemplate;\nimport org.springframework.stereotype.Component;\n\n@Component\npublic class {adapter} implements {interface} {{\n\n    private final JmsTemplate jmsTemplate;\n\n    public {adapter}(JmsTemplate jmsTemplate) {{\n        this.jmsTemplate = jmsTemplate;\n    }}\n\n    @Override\n    public void publish(String destination, String payload) {{\n        jmsTemplate.convertAndSend(destination, payload);\n    }}\n}}\n"
        ),
        OutputPort::HttpClient => format!(
            "package {package};\n\nimport {base}.domain.model.{request};\nimport {base}.domain.port.output.{interface};\nimport org.springframework.stereotype.Component;\nimport org.springframework.web.reactive.function.client.WebClient;\n\n@Component\npublic class {adapter} implements {interface} {{\n\n    private final WebClient webClient;\n\n    public {adapter}(WebClient webClient) {{\n        this.webClient = webClient;\n    }}\n\n    @Override\n    public void send({request} request) {{\n        webClient.post()\n            .bodyValue(request)\n            .retrieve()\n            .toBodilessEntity()\n            .block();\n    }}\n}}\n"
        ),
    }
}

fn adapter_config(project: &Project, service: &str, ports: &[OutputPort]) -> String {
    let base = project.package();
    let mut out = format!(
        "package {base}.config;\n\nimport {base}.domain.port.input.{service}UseCase;\nimport {base}.domain.service.{service}Service;\n"
    );
    for port in ports {
        let _ = writeln!(out, "import {base}.domain.port.output.{};", port.interface());
    }
    let params: Vec<String> = ports.iter().map(|p| format!("{} {}", p.interface(), p.field())).collect();
    let args: Vec<String> = ports.iter().map(|p| p.field()).collect();
    let _ = write!(
        out,
        "import org.springframework.context.annotation.Bean;\nimport org.springframework.context.annotation.Configuration;\n\n@Configuration\npublic class AdapterConfig {{\n\n    @Bean\n    public {service}UseCase {}UseCase({}) {{\n        return new {service}Service({});\n    }}\n}}\n",
        camel_case(service),
        params.join(", "),
        args.join(", ")
    );
    out
}

fn readme(ctx: &AnalysisContext, service_type: ServiceType, ports: &[OutputPort]) -> String {
    let service = ctx.service_name();
    let mut out = format!(
        "# {service} (hexagonal, {})\n\nMigrated from `{}`.\n\n## Layout\n\n- `domain/model`: request, response and schema entities\n- `domain/port/input`: `{service}UseCase`\n- `domain/port/output`: ports to infrastructure\n- `domain/service`: use case implementation, no framework imports\n- `adapter/input`: transport adapters\n- `adapter/output`: infrastructure adapters\n- `config`: bean wiring\n\n## Input adapters\n\n",
        service_type.as_str(),
        ctx.unit_name()
    );
    for protocol in service_type.protocols() {
        let line = match protocol {
            ProtocolTag::Rest => format!("- REST: `POST /api/{}/<operation>`\n", kebab_case(&service)),
            ProtocolTag::Soap => "- SOAP: `/ws`, WSDL generated from `src/main/resources/xsd`\n".to_string(),
        };
        out.push_str(&line);
    }
    out.push_str("\n## Output adapters\n\n");
    if ports.is_empty() {
        out.push_str("None.\n");
    }
    for port in ports {
        let _ = writeln!(out, "- `{}` implemented by `{}`", port.interface(), port.adapter());
    }
    out.push_str("\n## Build\n\n```\nmvn -DskipTests package\n```\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context_with;
    use mig_test_utils::{http_process, settlement_process, LOAN_REQUEST_XSD};

    #[test]
    fn domain_is_rooted_under_hexagonal_package() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with(dir.path(), vec![http_process()], &[("LoanRequest.xsd", LOAN_REQUEST_XSD)]);
        let files = HexagonalDomainEmitter.emit(&ctx, ServiceType::Rest).unwrap();

        let root = ctx.output_root().join("hexagonal");
        let java = root.join("src/main/java/com/example/loan/hexagonal");
        assert!(files.is_rooted_under(&root));
        assert_eq!(files.tags(), vec![FileTag::HexagonalDomain]);
        assert!(files.contains(&java.join("domain/model/LoanRequest.java")));
        assert!(files.contains(&java.join("domain/port/input/LoanApprovalUseCase.java")));
        assert!(files.contains(&java.join("domain/port/output/HttpClientPort.java")));
        assert!(files.contains(&java.join("adapter/output/http/WebClientHttpAdapter.java")));
        assert!(!files.contains(&java.join("domain/port/output/PersistencePort.java")));
        assert!(files.contains(&root.join("README.md")));

        let service = &files.get(&java.join("domain/service/LoanApprovalService.java")).unwrap().content;
        assert!(!service.contains("org.springframework"));
        assert!(service.contains("httpClientPort.send(request);"));
    }

    #[test]
    fn pom_follows_service_type() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with(dir.path(), vec![settlement_process()], &[]);
        let root = ctx.output_root().join("hexagonal");

        let soap = HexagonalDomainEmitter.emit(&ctx, ServiceType::Soap).unwrap();
        let pom = &soap.get(&root.join("pom.xml")).unwrap().content;
        assert!(pom.contains("spring-boot-starter-web-services"));
        assert!(!pom.contains("<artifactId>spring-boot-starter-web</artifactId>"));
        assert!(pom.contains("spring-boot-starter-data-jpa"));
        assert!(pom.contains("spring-boot-starter-activemq"));
        assert!(pom.contains("<artifactId>settlement-hexagonal-soap</artifactId>"));

        let rest = HexagonalDomainEmitter.emit(&ctx, ServiceType::Rest).unwrap();
        let pom = &rest.get(&root.join("pom.xml")).unwrap().content;
        assert!(pom.contains("<artifactId>spring-boot-starter-web</artifactId>"));
        assert!(!pom.contains("spring-boot-starter-web-services"));
    }

    #[test]
    fn adapter_config_wires_every_port() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with(dir.path(), vec![settlement_process()], &[]);
        let files = HexagonalDomainEmitter.emit(&ctx, ServiceType::Combined).unwrap();

        let java = ctx.output_root().join("hexagonal/src/main/java/com/example/loan/hexagonal");
        let config = &files.get(&java.join("config/AdapterConfig.java")).unwrap().content;
        assert!(config.contains("return new SettlementService(persistencePort, messagingPort);"));
        let adapter = &files
            .get(&java.join("adapter/output/messaging/JmsMessagingAdapter.java"))
            .unwrap()
            .content;
        assert!(adapter.contains("implements MessagingPort"));
    }
}
