pub mod github_client;

#[cfg(test)]
pub mod memory_repo;
