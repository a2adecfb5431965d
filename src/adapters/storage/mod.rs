pub mod json_project_store;
