pub mod ai;
pub mod asset;
pub mod ci;
pub mod dashboard;
pub mod github;
pub mod init;
pub mod link;
pub mod log;
pub mod remove;
pub mod requirement;
pub mod risk;
pub mod sync;
pub mod test_case;
pub mod transfer;
pub mod workspace;
