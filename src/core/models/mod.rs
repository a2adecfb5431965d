pub mod ai;
pub mod audit_entry;
pub mod common;
pub mod configuration_item;
pub mod github;
pub mod http;
pub mod metrics;
pub mod process_asset;
pub mod project_data;
pub mod requirement;
pub mod risk;
pub mod test_case;
