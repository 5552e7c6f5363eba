//! Layered SOAP project under `<unit-root>/soap`

use crate::context::AnalysisContext;
use crate::emitter::Emitter;
use crate::error::EmitError;
use crate::java::{
    add_dtos, add_integrations, application_class, application_yml, checked_package, deps, integration_dependencies,
    message_types, operations, pom_xml, service_class, DtoStyle, Project,
};
use crate::naming::{camel_case, kebab_case};
use mig_model::{FileTag, GeneratedFileMap, ProtocolTag, ServiceType};
use std::fmt::Write as _;

/// Emits a Spring Web Services project with one payload endpoint per process
#[derive(Debug, Clone, Copy, Default)]
pub struct SoapEmitter;

impl Emitter for SoapEmitter {
    fn emit(&self, ctx: &AnalysisContext, _service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
        let package = checked_package(ctx.package())?;
        let service = ctx.service_name();
        let artifact = format!("{}-soap", kebab_case(&service));
        let namespace = target_namespace(package);
        let (request, response) = message_types(ctx);
        let mut project = Project::new(
            ctx.output_root().join(ProtocolTag::Soap.as_str()),
            package,
            FileTag::Protocol(ProtocolTag::Soap),
        );

        add_dtos(&mut project, ctx, "dto", DtoStyle::Jaxb);
        project.add_java(
            "endpoint",
            &format!("{service}Endpoint"),
            endpoint(&project, ctx, &namespace, &request, &response),
        );
        let service_source = service_class(&project, ctx, &request, &response);
        project.add_java("service", &format!("{service}Service"), service_source);
        project.add_java(
            "config",
            "WebServiceConfig",
            web_service_config(&project.sub_package("config"), ctx, &namespace),
        );
        add_integrations(&mut project, ctx, "");
        project.add_java("", &format!("{service}Application"), application_class(package, &format!("{service}Application")));

        for (file, content) in schema_resources(ctx, &namespace, &request, &response) {
            project.add_resource(&format!("xsd/{file}"), content);
        }
        project.add_resource(
            "application.yml",
            application_yml(ctx, &artifact, "  webservices:\n    path: /ws\n"),
        );

        let mut dependencies = vec![deps::WEB_SERVICES, deps::WSDL4J];
        dependencies.extend(integration_dependencies(ctx));
        project.add_file(
            "pom.xml",
            pom_xml(package, &artifact, &format!("SOAP service migrated from {}", ctx.unit_name()), &dependencies),
        );

        let files = project.finish();
        tracing::debug!(unit = %ctx.unit().name(), files = files.len(), "emitted layered SOAP project");
        Ok(files)
    }
}

/// `com.example.loan` → `http://loan.example.com/schema`
pub(crate) fn target_namespace(package: &str) -> String {
    let host: Vec<&str> = package.split('.').rev().collect();
    format!("http://{}/schema", host.join("."))
}

/// Schemas shipped with the project: copies of the unit's schemas, or a
/// generated one describing the request and response messages
pub(crate) fn schema_resources(
    ctx: &AnalysisContext,
    namespace: &str,
    request: &str,
    response: &str,
) -> Vec<(String, String)> {
    let documents = ctx.schema_documents();
    if !documents.is_empty() {
        return documents.iter().map(|d| (d.file_name(), d.content.clone())).collect();
    }
    let file = schema_file_name(ctx);
    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="{namespace}"
           xmlns:tns="{namespace}"
           elementFormDefault="qualified">
    <xs:element name="{request}">
        <xs:complexType>
            <xs:sequence>
                <xs:element name="payload" type="xs:string"/>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
    <xs:element name="{response}">
        <xs:complexType>
            <xs:sequence>
                <xs:element name="status" type="xs:string"/>
                <xs:element name="message" type="xs:string"/>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
</xs:schema>
"#
    );
    vec![(file, content)]
}

/// Name of the first shipped schema
fn schema_file_name(ctx: &AnalysisContext) -> String {
    ctx.schema_documents()
        .first()
        .map_or_else(|| format!("{}.xsd", kebab_case(&ctx.service_name())), |d| d.file_name())
}

fn endpoint(project: &Project, ctx: &AnalysisContext, namespace: &str, request: &str, response: &str) -> String {
    let service = ctx.service_name();
    let base = project.package();
    let mut out = format!(
        "package {base}.endpoint;\n\nimport {base}.dto.{request};\nimport {base}.dto.{response};\nimport {base}.service.{service}Service;\nimport org.springframework.ws.server.endpoint.annotation.Endpoint;\nimport org.springframework.ws.server.endpoint.annotation.PayloadRoot;\nimport org.springframework.ws.server.endpoint.annotation.RequestPayload;\nimport org.springframework.ws.server.endpoint.annotation.ResponsePayload;\n\n@Endpoint\npublic class {service}Endpoint {{\n\n    private static final String NAMESPACE_URI = \"{namespace}\";\n\n    private final {service}Service service;\n\n    public {service}Endpoint({service}Service service) {{\n        this.service = service;\n    }}\n"
    );
    for op in operations(ctx) {
        let _ = write!(
            out,
            "\n    @PayloadRoot(namespace = NAMESPACE_URI, localPart = \"{request}\")\n    @ResponsePayload\n    public {response} {}(@RequestPayload {request} request) {{\n        return service.{}(request);\n    }}\n",
            op.method, op.method
        );
    }
    out.push_str("}\n");
    out
}

/// `@EnableWs` configuration serving the first shipped schema at `/ws`
pub(crate) fn web_service_config(package: &str, ctx: &AnalysisContext, namespace: &str) -> String {
    let service = ctx.service_name();
    let bean = camel_case(&service);
    let schema_file = schema_file_name(ctx);
    format!(
        r#"package {package};

import org.springframework.boot.web.servlet.ServletRegistrationBean;
import org.springframework.context.ApplicationContext;
import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;
import org.springframework.core.io.ClassPathResource;
import org.springframework.ws.config.annotation.EnableWs;
import org.springframework.ws.transport.http.MessageDispatcherServlet;
import org.springframework.ws.wsdl.wsdl11.DefaultWsdl11Definition;
import org.springframework.xml.xsd.SimpleXsdSchema;
import org.springframework.xml.xsd.XsdSchema;

@EnableWs
@Configuration
public class WebServiceConfig {{

    @Bean
    public ServletRegistrationBean<MessageDispatcherServlet> messageDispatcherServlet(ApplicationContext context) {{
        MessageDispatcherServlet servlet = new MessageDispatcherServlet();
        servlet.setApplicationContext(context);
        servlet.setTransformWsdlLocations(true);
        return new ServletRegistrationBean<>(servlet, "/ws/*");
    }}

    @Bean(name = "{bean}")
    public DefaultWsdl11Definition defaultWsdl11Definition(XsdSchema schema) {{
        DefaultWsdl11Definition definition = new DefaultWsdl11Definition();
        definition.setPortTypeName("{service}Port");
        definition.setLocationUri("/ws");
        definition.setTargetNamespace("{namespace}");
        definition.setSchema(schema);
        return definition;
    }}

    @Bean
    public XsdSchema schema() {{
        return new SimpleXsdSchema(new ClassPathResource("xsd/{schema_file}"));
    }}
}}
"#
    )
}
