//! Layered emitters: one standalone project per protocol

mod rest;
mod soap;

pub use rest::RestEmitter;
pub use soap::SoapEmitter;
pub(crate) use soap::{schema_resources, target_namespace, web_service_config};
