//! SOAP input adapter: payload endpoint, JAXB messages, mapper and WSDL wiring

use super::{copy_fields, project};
use crate::context::AnalysisContext;
use crate::emitter::Emitter;
use crate::error::EmitError;
use crate::java::{dto_class, message_types, operations, request_fields, response_fields, DtoStyle, Project};
use crate::layered::{schema_resources, target_namespace, web_service_config};
use mig_model::{FileTag, GeneratedFileMap, ProtocolTag, ServiceType};
use std::fmt::Write as _;

const ADAPTER: &str = "adapter.input.soap";

/// Emits the SOAP adapter driving the use case port
#[derive(Debug, Clone, Copy, Default)]
pub struct HexagonalSoapEmitter;

impl Emitter for HexagonalSoapEmitter {
    fn emit(&self, ctx: &AnalysisContext, _service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
        let mut project = project(ctx, FileTag::HexagonalAdapter(ProtocolTag::Soap))?;
        let service = ctx.service_name();
        let namespace = target_namespace(project.package());
        let (request, response) = message_types(ctx);

        let dto = format!("{ADAPTER}.dto");
        let dto_package = project.sub_package(&dto);
        project.add_java(&dto, &request, dto_class(&dto_package, &request, &request_fields(ctx), DtoStyle::Jaxb));
        project.add_java(
            &dto,
            &response,
            dto_class(&dto_package, &response, &response_fields(), DtoStyle::Jaxb),
        );
        project.add_java(
            &format!("{ADAPTER}.mapper"),
            &format!("{service}SoapMapper"),
            mapper(&project, ctx, &request, &response),
        );
        project.add_java(
            ADAPTER,
            &format!("{service}SoapEndpoint"),
            endpoint(&project, ctx, &namespace, &request, &response),
        );
        let config_package = project.sub_package(&format!("{ADAPTER}.config"));
        project.add_java(
            &format!("{ADAPTER}.config"),
            "WebServiceConfig",
            web_service_config(&config_package, ctx, &namespace),
        );
        for (file, content) in schema_resources(ctx, &namespace, &request, &response) {
            project.add_resource(&format!("xsd/{file}"), content);
        }

        let files = project.finish();
        tracing::debug!(unit = %ctx.unit().name(), files = files.len(), "emitted hexagonal SOAP adapter");
        Ok(files)
    }
}

// Transport and domain classes share simple names, so the domain side is fully qualified.
fn mapper(project: &Project, ctx: &AnalysisContext, request: &str, response: &str) -> String {
    let base = project.package();
    let service = ctx.service_name();
    let domain = format!("{base}.domain.model");
    format!(
        "package {base}.{ADAPTER}.mapper;\n\nimport {base}.{ADAPTER}.dto.{request};\nimport {base}.{ADAPTER}.dto.{response};\nimport org.springframework.stereotype.Component;\n\n@Component\npublic class {service}SoapMapper {{\n\n    public {domain}.{request} toDomain({request} message) {{\n        {domain}.{request} domain = new {domain}.{request}();\n{}        return domain;\n    }}\n\n    public {response} toMessage({domain}.{response} domain) {{\n        {response} message = new {response}();\n{}        return message;\n    }}\n}}\n",
        copy_fields(&request_fields(ctx), "message", "domain", "        "),
        copy_fields(&response_fields(), "domain", "message", "        "),
    )
}

fn endpoint(project: &Project, ctx: &AnalysisContext, namespace: &str, request: &str, response: &str) -> String {
    let base = project.package();
    let service = ctx.service_name();
    let mut out = format!(
        "package {base}.{ADAPTER};\n\nimport {base}.{ADAPTER}.dto.{request};\nimport {base}.{ADAPTER}.dto.{response};\nimport {base}.{ADAPTER}.mapper.{service}SoapMapper;\nimport {base}.domain.port.input.{service}UseCase;\nimport org.springframework.ws.server.endpoint.annotation.Endpoint;\nimport org.springframework.ws.server.endpoint.annotation.PayloadRoot;\nimport org.springframework.ws.server.endpoint.annotation.RequestPayload;\nimport org.springframework.ws.server.endpoint.annotation.ResponsePayload;\n\n@Endpoint\npublic class {service}SoapEndpoint {{\n\n    private static final String NAMESPACE_URI = \"{namespace}\";\n\n    private final {service}UseCase useCase;\n    private final {service}SoapMapper mapper;\n\n    public {service}SoapEndpoint({service}UseCase useCase, {service}SoapMapper mapper) {{\n        this.useCase = useCase;\n        this.mapper = mapper;\n    }}\n"
    );
    for op in operations(ctx) {
        let _ = write!(
            out,
            "\n    @PayloadRoot(namespace = NAMESPACE_URI, localPart = \"{request}\")\n    @ResponsePayload\n    public {response} {}(@RequestPayload {request} request) {{\n        return mapper.toMessage(useCase.{}(mapper.toDomain(request)));\n    }}\n",
            op.method, op.method
        );
    }
    out.push_str("}\n");
    out
}
