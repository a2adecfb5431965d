pub mod ai;
pub mod audit;
pub mod github;
pub mod http;
pub mod storage;
