//! Property-based generators and checks for HNSW construction and search.

mod strategies;
mod tests;
