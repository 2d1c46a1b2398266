//! Unit tests for the HNSW graph that need access to crate internals.

mod fixtures;
mod property;
