pub mod github_audit_mirror;
