//! Benchmark support crate for Simili.
//!
//! Provides seeded synthetic vector sets, parameter labels and a brute-force
//! recall oracle used by the Criterion benchmarks for index build and search.

pub mod error;
pub mod params;
pub mod recall;
pub mod source;
