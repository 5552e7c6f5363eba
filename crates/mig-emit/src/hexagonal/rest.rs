//! REST input adapter: controller, transport DTOs and mapper

use super::{copy_fields, project};
use crate::context::AnalysisContext;
use crate::emitter::Emitter;
use crate::error::EmitError;
use crate::java::{dto_class, message_types, operations, request_fields, response_fields, DtoStyle, Project};
use crate::naming::kebab_case;
use mig_model::{FileTag, GeneratedFileMap, ProtocolTag, ServiceType};
use std::fmt::Write as _;

const ADAPTER: &str = "adapter.input.rest";

/// Emits the REST adapter driving the use case port
#[derive(Debug, Clone, Copy, Default)]
pub struct HexagonalRestEmitter;

impl Emitter for HexagonalRestEmitter {
    fn emit(&self, ctx: &AnalysisContext, _service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
        let mut project = project(ctx, FileTag::HexagonalAdapter(ProtocolTag::Rest))?;
        let service = ctx.service_name();
        let (request, response) = message_types(ctx);
        let (request_dto, response_dto) = (format!("{request}Dto"), format!("{response}Dto"));

        let dto_package = project.sub_package(&format!("{ADAPTER}.dto"));
        project.add_java(
            &format!("{ADAPTER}.dto"),
            &request_dto,
            dto_class(&dto_package, &request_dto, &request_fields(ctx), DtoStyle::Plain),
        );
        project.add_java(
            &format!("{ADAPTER}.dto"),
            &response_dto,
            dto_class(&dto_package, &response_dto, &response_fields(), DtoStyle::Plain),
        );
        project.add_java(
            &format!("{ADAPTER}.mapper"),
            &format!("{service}DtoMapper"),
            mapper(&project, ctx, &request, &response),
        );
        project.add_java(ADAPTER, &format!("{service}RestController"), controller(&project, ctx, &request, &response));

        let files = project.finish();
        tracing::debug!(unit = %ctx.unit().name(), files = files.len(), "emitted hexagonal REST adapter");
        Ok(files)
    }
}

fn mapper(project: &Project, ctx: &AnalysisContext, request: &str, response: &str) -> String {
    let base = project.package();
    let service = ctx.service_name();
    format!(
        "package {base}.{ADAPTER}.mapper;\n\nimport {base}.{ADAPTER}.dto.{request}Dto;\nimport {base}.{ADAPTER}.dto.{response}Dto;\nimport {base}.domain.model.{request};\nimport {base}.domain.model.{response};\nimport org.springframework.stereotype.Component;\n\n@Component\npublic class {service}DtoMapper {{\n\n    public {request} toDomain({request}Dto dto) {{\n        {request} domain = new {request}();\n{}        return domain;\n    }}\n\n    public {response}Dto toDto({response} domain) {{\n        {response}Dto dto = new {response}Dto();\n{}        return dto;\n    }}\n}}\n",
        copy_fields(&request_fields(ctx), "dto", "domain", "        "),
        copy_fields(&response_fields(), "domain", "dto", "        "),
    )
}

fn controller(project: &Project, ctx: &AnalysisContext, request: &str, response: &str) -> String {
    let base = project.package();
    let service = ctx.service_name();
    let mut out = format!(
        "package {base}.{ADAPTER};\n\nimport {base}.{ADAPTER}.dto.{request}Dto;\nimport {base}.{ADAPTER}.dto.{response}Dto;\nimport {base}.{ADAPTER}.mapper.{service}DtoMapper;\nimport {base}.domain.port.input.{service}UseCase;\nimport jakarta.validation.Valid;\nimport org.springframework.http.ResponseEntity;\nimport org.springframework.web.bind.annotation.PostMapping;\nimport org.springframework.web.bind.annotation.RequestBody;\nimport org.springframework.web.bind.annotation.RequestMapping;\nimport org.springframework.web.bind.annotation.RestController;\n\n@RestController\n@RequestMapping(\"/api/{}\")\npublic class {service}RestController {{\n\n    private final {service}UseCase useCase;\n    private final {service}DtoMapper mapper;\n\n    public {service}RestController({service}UseCase useCase, {service}DtoMapper mapper) {{\n        this.useCase = useCase;\n        this.mapper = mapper;\n    }}\n",
        kebab_case(&service)
    );
    for op in operations(ctx) {
        let _ = write!(
            out,
            "\n    @PostMapping(\"/{}\")\n    public ResponseEntity<{response}Dto> {}(@Valid @RequestBody {request}Dto request) {{\n        return ResponseEntity.ok(mapper.toDto(useCase.{}(mapper.toDomain(request))));\n    }}\n",
            op.path, op.method, op.method
        );
    }
    out.push_str("}\n");
    out
}
