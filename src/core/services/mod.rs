pub mod ai_service;
pub mod audit_trail;
pub mod metrics_service;
pub mod project_service;
pub mod prompts;
pub mod retry_policy;
pub mod sync_service;
