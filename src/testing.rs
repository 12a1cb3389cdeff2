//! Test support shared by the unit suites and the benchmarks.

pub mod fixture;
