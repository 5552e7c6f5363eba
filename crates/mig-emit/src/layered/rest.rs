//! Layered REST project
//!
//! Controller → service → integrations, under `<unit-root>/rest`.

use crate::context::AnalysisContext;
use crate::emitter::Emitter;
use crate::error::EmitError;
use crate::java::{
    add_dtos, add_integrations, application_class, application_yml, checked_package, deps, integration_dependencies,
    message_types, operations, pom_xml, service_class, DtoStyle, Project,
};
use crate::naming::kebab_case;
use mig_model::{FileTag, GeneratedFileMap, ProtocolTag, ServiceType};
use std::fmt::Write as _;

/// Emits a Spring Web project exposing one POST endpoint per process
#[derive(Debug, Clone, Copy, Default)]
pub struct RestEmitter;

impl Emitter for RestEmitter {
    fn emit(&self, ctx: &AnalysisContext, _service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
        let package = checked_package(ctx.package())?;
        let service = ctx.service_name();
        let artifact = format!("{}-rest", kebab_case(&service));
        let mut project = Project::new(
            ctx.output_root().join(ProtocolTag::Rest.as_str()),
            package,
            FileTag::Protocol(ProtocolTag::Rest),
        );

        let (request, response) = message_types(ctx);
        add_dtos(&mut project, ctx, "dto", DtoStyle::Plain);
        project.add_java(
            "controller",
            &format!("{service}Controller"),
            controller(&project, ctx, &request, &response),
        );
        let service_source = service_class(&project, ctx, &request, &response);
        project.add_java("service", &format!("{service}Service"), service_source);
        add_integrations(&mut project, ctx, "");
        project.add_java("", &format!("{service}Application"), application_class(package, &format!("{service}Application")));
        project.add_resource("application.yml", application_yml(ctx, &artifact, ""));

        let mut dependencies = vec![deps::WEB, deps::VALIDATION];
        dependencies.extend(integration_dependencies(ctx));
        project.add_file(
            "pom.xml",
            pom_xml(package, &artifact, &format!("REST service migrated from {}", ctx.unit_name()), &dependencies),
        );

        let files = project.finish();
        tracing::debug!(unit = %ctx.unit().name(), files = files.len(), "emitted layered REST project");
        Ok(files)
    }
}

fn controller(project: &Project, ctx: &AnalysisContext, request: &str, response: &str) -> String {
    let service = ctx.service_name();
    let base = project.package();

    let mut out = format!(
        "package {base}.controller;\n\nimport {base}.dto.{request};\nimport {base}.dto.{response};\nimport {base}.service.{service}Service;\nimport jakarta.validation.Valid;\nimport org.springframework.http.ResponseEntity;\nimport org.springframework.web.bind.annotation.PostMapping;\nimport org.springframework.web.bind.annotation.RequestBody;\nimport org.springframework.web.bind.annotation.RequestMapping;\nimport org.springframework.web.bind.annotation.RestController;\n\n@RestController\n@RequestMapping(\"/api/{}\")\npublic class {service}Controller {{\n\n    private final {service}Service service;\n\n    public {service}Controller({service}Service service) {{\n        this.service = service;\n    }}\n",
        kebab_case(&service)
    );
    for op in operations(ctx) {
        let _ = write!(
            out,
            "\n    @PostMapping(\"/{}\")\n    public ResponseEntity<{response}> {}(@Valid @RequestBody {request} request) {{\n        return ResponseEntity.ok(service.{}(request));\n    }}\n",
            op.path, op.method, op.method
        );
    }
    out.push_str("}\n");
    out
}
