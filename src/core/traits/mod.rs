pub mod audit_mirror;
pub mod http_transport;
pub mod project_store;
pub mod repository_contents;
pub mod text_generator;
